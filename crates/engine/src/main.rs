//! Xiuxian Engine - Main entry point.
//!
//! Generates one adventure event from the `ADVENTURE_*` environment variables
//! and prints it as JSON.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use xiuxian_domain::{
    AdventureType, GenerationContext, Realm, RealmLevel, RiskLevel, SecretRealmSite,
};
use xiuxian_engine::infrastructure::config::LlmSettings;
use xiuxian_engine::AdventureGenerator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root; local overrides win.
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xiuxian_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = LlmSettings::from_env();
    tracing::info!(settings = %settings.summary(), "Starting Xiuxian Engine");
    if let Err(e) = settings.validate() {
        tracing::warn!(error = %e, "LLM disabled; offline content will be served");
    }

    let ctx = context_from_env()?;
    let generator = AdventureGenerator::from_settings(&settings);

    let outcome = generator.generate_adventure_event(&ctx).await;
    let json = serde_json::to_string_pretty(&outcome).context("serializing outcome")?;
    println!("{json}");

    Ok(())
}

fn context_from_env() -> anyhow::Result<GenerationContext> {
    let realm: Realm = env_or("ADVENTURE_REALM", "qi_refining")
        .parse()
        .context("ADVENTURE_REALM")?;
    let level: u8 = env_or("ADVENTURE_LEVEL", "1")
        .trim()
        .parse()
        .context("ADVENTURE_LEVEL must be a number")?;
    let level = RealmLevel::new(level).context("ADVENTURE_LEVEL")?;
    let adventure: AdventureType = env_or("ADVENTURE_TYPE", "normal")
        .parse()
        .context("ADVENTURE_TYPE")?;

    let mut ctx = GenerationContext::new(realm, level, adventure);

    if let Some(risk) = env_opt("ADVENTURE_RISK") {
        ctx = ctx.with_risk(risk.parse::<RiskLevel>().context("ADVENTURE_RISK")?);
    }
    if let Some(name) = env_opt("ADVENTURE_SITE") {
        let mut site = SecretRealmSite::new(name);
        if let Some(hint) = env_opt("ADVENTURE_SITE_HINT") {
            site = site.with_description(hint);
        }
        ctx = ctx.with_site(site);
    }

    Ok(ctx)
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
