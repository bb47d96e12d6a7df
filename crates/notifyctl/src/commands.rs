//! Command implementations.

use crate::output::{self, AnnouncementReport, ApprovalReport, OutputFormat, RecommendationReport};
use notify_config::{load_service_account, resolve_service_account_path, Config, Paths};
use notify_engine::{AnnouncementPush, ApprovalPush, NotifyEngine};
use push_gateway::{GatewayConfig, HttpPushGateway};
use resident_directory::SqliteDirectory;
use std::sync::OnceLock;
use tracing::info;

type Engine = NotifyEngine<SqliteDirectory, HttpPushGateway>;

static ENGINE: OnceLock<Engine> = OnceLock::new();

/// Build or reuse the process-wide engine.
///
/// Credentials are resolved before any store or provider access; a missing
/// or nonexistent service-account file fails here. Once built, the engine
/// lives for the process and a second call returns the same instance.
fn engine(config: &Config, paths: &Paths) -> anyhow::Result<&'static Engine> {
    if let Some(engine) = ENGINE.get() {
        return Ok(engine);
    }

    let account_path = resolve_service_account_path()?;
    let account = load_service_account(&account_path)?;
    info!(project_id = %account.project_id, "Loaded push service account");

    let store = SqliteDirectory::open(&config.database_file(paths))?;
    let gateway = HttpPushGateway::new(
        GatewayConfig {
            endpoint: config.push_endpoint.clone(),
            ..Default::default()
        },
        &account.api_key,
    );

    // If another caller won the race, this build is dropped and theirs wins.
    Ok(ENGINE.get_or_init(|| NotifyEngine::new(store, gateway)))
}

/// Send an announcement push and print the dispatch report.
pub async fn announce(
    config: &Config,
    paths: &Paths,
    push: &AnnouncementPush,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let engine = engine(config, paths)?;
    let result = engine.send_announcement(push).await?;
    output::print(&AnnouncementReport(result), format);
    Ok(())
}

/// Send an account-approved push and print the dispatch report.
pub async fn approve(
    config: &Config,
    paths: &Paths,
    push: &ApprovalPush,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let engine = engine(config, paths)?;
    let result = engine.send_account_approval(push).await?;
    output::print(&ApprovalReport(result), format);
    Ok(())
}

/// Recommend audience labels for announcement text.
pub fn recommend(
    config: &Config,
    paths: &Paths,
    text: &str,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let rules = audience_rules::load_rules(&config.rules_file(paths));
    let recommendation = audience_rules::recommend_audiences(text, &rules);
    output::print(&RecommendationReport(recommendation), format);
    Ok(())
}
