use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Naive layouts the backend emits (Python `isoformat()` without offset and
/// the `alert_time_utc` display format).
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// Parses backend timestamps and renders them in a display timezone.
#[derive(Debug, Clone, Copy)]
pub struct TimezoneHandler {
    display_tz: Tz,
}

impl TimezoneHandler {
    /// Create a handler that renders in `tz_name`.
    ///
    /// Unrecognised names fall back to UTC with a warning.
    pub fn new(tz_name: &str) -> Self {
        let tz = tz_name.parse::<Tz>().unwrap_or_else(|_| {
            warn!(timezone = tz_name, "unrecognised timezone, falling back to UTC");
            Tz::UTC
        });
        Self { display_tz: tz }
    }

    /// Validate that `tz_name` is a recognised IANA timezone identifier.
    pub fn validate_timezone(tz_name: &str) -> bool {
        tz_name.parse::<Tz>().is_ok()
    }

    /// The timezone timestamps are rendered in.
    pub fn display_tz(&self) -> Tz {
        self.display_tz
    }

    /// Convert a UTC instant into the display timezone.
    pub fn to_display(&self, dt: DateTime<Utc>) -> DateTime<Tz> {
        dt.with_timezone(&self.display_tz)
    }

    /// Render `dt` as a local date and time, e.g. `2024-05-01 14:30:05` or
    /// `2024-05-01 02:30:05 PM`.
    pub fn format_local(&self, dt: DateTime<Utc>, use_12h: bool) -> String {
        let local = self.to_display(dt);
        if use_12h {
            local.format("%Y-%m-%d %I:%M:%S %p").to_string()
        } else {
            local.format("%Y-%m-%d %H:%M:%S").to_string()
        }
    }
}

// ── Backend timestamp parsing ────────────────────────────────────────────────

/// Parse a timestamp as the backend writes it.
///
/// RFC 3339 strings (with `Z` or an offset) are honoured as-is; naive strings
/// are interpreted as UTC, which is what the backend stores. Returns `None`
/// for empty or unrecognised input.
pub fn parse_backend_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Serde adapter for optional backend timestamps.
///
/// Accepts a string in any layout [`parse_backend_timestamp`] understands,
/// `null`, or a missing field. Unparseable strings become `None` rather than
/// failing the whole document. Serialises as RFC 3339.
pub mod lenient_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.and_then(|s| {
            let parsed = super::parse_backend_timestamp(&s);
            if parsed.is_none() {
                tracing::warn!(timestamp = %s, "could not parse backend timestamp");
            }
            parsed
        }))
    }
}

// ── 12-hour / 24-hour format detection ───────────────────────────────────────

/// Timezone prefixes whose regions conventionally use a 12-hour clock.
///
/// Canadian `America/*` zones are listed too; every other `America/*` zone
/// falls under the generic `america/` entry.
const TWELVE_HOUR_ZONES: &[&str] = &[
    "america/",
    "australia/",
    "pacific/auckland",
    "pacific/chatham",
    "asia/manila",
    "asia/kolkata",
    "asia/calcutta",
    "asia/karachi",
    "asia/dhaka",
    "asia/kuala_lumpur",
    "asia/kuching",
    "asia/riyadh",
    "asia/dubai",
    "asia/amman",
    "asia/tehran",
    "africa/cairo",
];

/// Decide whether to use a 12-hour clock.
///
/// An explicit `"12h"` / `"24h"` wins; otherwise the decision is derived from
/// `timezone` (or the system timezone). Unknown regions default to 24-hour.
pub fn detect_time_format(timezone: Option<&str>, explicit: Option<&str>) -> bool {
    if let Some(fmt) = explicit {
        match fmt.to_lowercase().as_str() {
            "12h" => return true,
            "24h" => return false,
            _ => {}
        }
    }

    let tz = timezone
        .map(str::to_lowercase)
        .unwrap_or_else(|| get_system_timezone().to_lowercase());

    TWELVE_HOUR_ZONES.iter().any(|prefix| tz.starts_with(prefix))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
