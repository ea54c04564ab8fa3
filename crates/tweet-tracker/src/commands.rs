//! Subcommand handlers.

use anyhow::{anyhow, bail, Context, Result};

use tracker_core::models::TokenMention;
use tracker_core::settings::{
    AccountsCommand, Command, GitHubCommand, MonitoringCommand, Settings, VersionsCommand,
};
use tracker_core::store::{AccountForm, Action, DashboardStore, GitHubForm};
use tracker_runtime::actions::{self, Outcome};
use tracker_runtime::api::{DashboardApi, HttpApi};
use tracker_runtime::loader;
use tracker_runtime::orchestrator::DashboardOrchestrator;

use crate::render::{self, Renderer};

pub async fn run(settings: &Settings) -> Result<()> {
    let renderer = Renderer::new(&settings.timezone, settings.uses_12h_clock());

    match settings.resolved_command() {
        Command::Watch => watch(settings, renderer).await,
        Command::Snapshot => snapshot(&connect(settings)?, &renderer).await,
        Command::Ping => {
            let api = connect(settings)?;
            let info = api.api_info().await?;
            println!("{} {} at {}", info.message, info.version, api.endpoints().api_root());
            Ok(())
        }
        Command::Accounts { action } => accounts(&connect(settings)?, &renderer, action).await,
        Command::Mention {
            token_name,
            account_username,
            tweet_url,
        } => {
            let mention = TokenMention {
                token_name,
                account_username,
                tweet_url,
            };
            report(
                &renderer,
                actions::add_mention(&connect(settings)?, &mention).await,
                "token name and account username are required",
            )
        }
        Command::Monitoring { action } => {
            monitoring(&connect(settings)?, &renderer, action).await
        }
        Command::Versions { action } => versions(&connect(settings)?, &renderer, action).await,
        Command::Github { action } => github(&connect(settings)?, &renderer, action).await,
    }
}

fn connect(settings: &Settings) -> Result<HttpApi> {
    let api = HttpApi::from_settings(settings).context("invalid backend configuration")?;
    tracing::debug!(api = api.endpoints().api_root(), "using backend");
    Ok(api)
}

// ── watch ─────────────────────────────────────────────────────────────────────

async fn watch(settings: &Settings, renderer: Renderer) -> Result<()> {
    let orchestrator =
        DashboardOrchestrator::from_settings(settings).context("invalid backend configuration")?;
    tracing::info!(backend = %settings.backend_url, "starting live dashboard");

    let (mut rx, handle) = orchestrator.start();
    let mut store = DashboardStore::new();

    loop {
        tokio::select! {
            action = rx.recv() => {
                // Ends once the loader is done and the live channel gave up.
                let Some(action) = action else { break };
                print_action(&mut store, &renderer, action);
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl+C received; closing live channel");
                break;
            }
        }
    }

    // Nothing reads the stream any more; let blocked senders fail fast.
    drop(rx);
    handle.shutdown().await;
    Ok(())
}

fn print_action(store: &mut DashboardStore, renderer: &Renderer, action: Action) {
    let initial = matches!(action, Action::InitialDataLoaded(_));
    if let Action::ConnectionChanged(status) = &action {
        tracing::debug!(%status, "connection status");
    }

    if let Some(notice) = store.apply(action) {
        println!("{}", renderer.notice(&notice));
    }
    if initial {
        for line in renderer.summary(store) {
            println!("{line}");
        }
        println!();
    }
}

// ── snapshot / listing ────────────────────────────────────────────────────────

async fn snapshot(api: &dyn DashboardApi, renderer: &Renderer) -> Result<()> {
    let data = loader::load_initial_data(api)
        .await
        .context("Failed to load initial data")?;
    let mut store = DashboardStore::new();
    store.apply(Action::InitialDataLoaded(Box::new(data)));
    for line in renderer.summary(&store) {
        println!("{line}");
    }
    Ok(())
}

async fn accounts(
    api: &dyn DashboardApi,
    renderer: &Renderer,
    action: AccountsCommand,
) -> Result<()> {
    match action {
        AccountsCommand::List => {
            for account in api.accounts().await? {
                println!("{}", render::account(&account));
            }
            Ok(())
        }
        AccountsCommand::Add {
            username,
            display_name,
        } => {
            let form = AccountForm {
                username,
                display_name: display_name.unwrap_or_default(),
            };
            report(
                renderer,
                actions::add_account(api, &form).await,
                "username is required",
            )
        }
        AccountsCommand::Remove { id } => report(
            renderer,
            actions::remove_account(api, &id).await,
            "account id is required",
        ),
    }
}

async fn monitoring(
    api: &dyn DashboardApi,
    renderer: &Renderer,
    action: MonitoringCommand,
) -> Result<()> {
    match action {
        MonitoringCommand::Status => {
            let store = settle(renderer, actions::refresh_monitoring_status(api).await, "")?;
            for line in render::status(&store.monitoring_status, store.alert_threshold) {
                println!("{line}");
            }
            Ok(())
        }
        MonitoringCommand::Start => report(renderer, actions::start_monitoring(api).await, ""),
        MonitoringCommand::Stop => report(renderer, actions::stop_monitoring(api).await, ""),
        MonitoringCommand::Config(args) => {
            let current = api.monitoring_config().await?;
            if args.is_empty() {
                for line in render::config(&current) {
                    println!("{line}");
                }
                return Ok(());
            }
            let updated = args.apply_to(current);
            report(renderer, actions::update_config(api, &updated).await, "")
        }
    }
}

async fn versions(
    api: &dyn DashboardApi,
    renderer: &Renderer,
    action: VersionsCommand,
) -> Result<()> {
    match action {
        VersionsCommand::List => {
            for version in api.versions().await? {
                println!("{}", renderer.version(&version));
            }
            Ok(())
        }
        VersionsCommand::Save => report(
            renderer,
            actions::save_version(api, renderer.timezone(), renderer.use_12h()).await,
            "",
        ),
        VersionsCommand::Load { id } => report(
            renderer,
            actions::load_version(api, &id).await,
            "version id is required",
        ),
    }
}

async fn github(api: &dyn DashboardApi, renderer: &Renderer, action: GitHubCommand) -> Result<()> {
    match action {
        GitHubCommand::Setup { token, username } => report(
            renderer,
            actions::github_setup(api, &GitHubForm { token, username }).await,
            "GitHub token and username are required",
        ),
        GitHubCommand::Backup { version_tag } => report(
            renderer,
            actions::github_backup(api, &version_tag).await,
            "version tag is required",
        ),
        GitHubCommand::Backups => {
            let store = settle(renderer, actions::refresh_backups(api).await, "")?;
            for backup in &store.github_backups {
                println!("{}", renderer.backup(backup));
            }
            Ok(())
        }
        GitHubCommand::Stats => {
            let stats = api.github_stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
    }
}

// ── Outcome reporting ─────────────────────────────────────────────────────────

/// Print the notice an outcome raises and turn failures into an error exit.
fn report(renderer: &Renderer, outcome: Outcome, required: &str) -> Result<()> {
    settle(renderer, outcome, required).map(drop)
}

/// Like [`report`], returning the store the successful action was applied to.
fn settle(renderer: &Renderer, outcome: Outcome, required: &str) -> Result<DashboardStore> {
    match outcome {
        Outcome::Skipped => bail!("nothing sent: {required}"),
        Outcome::Succeeded(action) => {
            let mut store = DashboardStore::new();
            if let Some(notice) = store.apply(action) {
                println!("{}", renderer.notice(&notice));
            }
            Ok(store)
        }
        Outcome::Failed { notice, error } => {
            eprintln!("{}", renderer.notice(&notice));
            Err(anyhow!(error).context(notice.description))
        }
    }
}
