mod api;
mod companion;

use clap::{Parser, Subcommand};
use eko_core::{
    config::{self, shellexpand, Config, OpenAiConfig},
    i18n::Catalog,
    traits::{CompletionProvider, IdentityProvider},
};
use eko_memory::Store;
use eko_providers::{FirebaseIdentity, OpenAiProvider};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use api::{ApiState, TokenIssuer};
use companion::Companion;

#[derive(Parser)]
#[command(name = "eko", version, about = "Eko companion backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API.
    Serve,
    /// Show configuration, storage counts and provider availability.
    Status,
    /// Resolve a localized message.
    Translate {
        /// Dotted key path, e.g. `auth.login.success`.
        key: String,
        /// Language code.
        #[arg(short, long, default_value = "en")]
        lang: String,
        /// Placeholder value as `name=value`. Repeatable.
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))
}

/// Stdout logging, plus a daily rolling file when `log_dir` is set.
///
/// The returned guard must live as long as the process logs.
fn init_logging(cfg: &Config) -> Option<WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.eko.log_level));

    if cfg.eko.log_dir.is_empty() {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(shellexpand(&cfg.eko.log_dir), "eko.log");
    let (file_writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();
    Some(guard)
}

/// The completion provider, when an API key is configured.
fn build_completion(cfg: &Config) -> anyhow::Result<Option<Arc<dyn CompletionProvider>>> {
    match &cfg.provider.openai {
        Some(openai) if !openai.api_key.is_empty() => {
            let provider = OpenAiProvider::from_config(openai)?;
            Ok(Some(Arc::new(provider)))
        }
        _ => Ok(None),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;
    let _guard = init_logging(&cfg);

    match cli.command {
        Commands::Serve => {
            if cfg.auth.token_key.trim().is_empty() {
                anyhow::bail!(
                    "auth.token_key is empty. Set it in {} or the TOKEN_KEY env var.",
                    cli.config
                );
            }
            let firebase = match &cfg.identity.firebase {
                Some(fb) if fb.is_configured() => fb.clone(),
                _ => anyhow::bail!(
                    "No identity provider configured. Set [identity.firebase] api_key \
                     or the FIREBASE_API_KEY env var."
                ),
            };
            if !firebase.has_admin_access() {
                warn!("firebase admin access not configured: name changes and deletes will fail");
            }

            let catalog = Catalog::load(&cfg.i18n)?;
            let store = Store::new(&cfg.memory).await?;
            let identity: Arc<dyn IdentityProvider> =
                Arc::new(FirebaseIdentity::from_config(&firebase)?);

            let openai = cfg.provider.openai.clone().unwrap_or_default();
            let companion = Companion::new(build_completion(&cfg)?, &openai);
            match companion.provider_name() {
                Some(name) => info!("completion provider: {name} ({})", openai.model),
                None => warn!(
                    "no completion provider configured: chats get dated titles and no replies"
                ),
            }

            let tokens = TokenIssuer::new(&cfg.auth.token_key, cfg.auth.token_ttl_days);

            info!("{} starting", cfg.eko.name);
            let state = ApiState {
                catalog: Arc::new(catalog),
                store,
                identity,
                companion,
                tokens,
                config: Arc::new(cfg),
            };
            api::serve(state).await?;
        }
        Commands::Status => {
            println!("{} status\n", cfg.eko.name);
            println!("Config: {}", cli.config);
            println!("API: {}:{}", cfg.api.host, cfg.api.port);
            println!(
                "Token key: {}",
                if cfg.auth.token_key.is_empty() {
                    "missing"
                } else {
                    "set"
                }
            );
            println!();

            let catalog = Catalog::load(&cfg.i18n)?;
            println!(
                "Locales: {} (default: {})",
                catalog.supported_languages().join(", "),
                catalog.default_language()
            );

            if Store::exists(&cfg.memory) {
                let store = Store::new(&cfg.memory).await?;
                let stats = store.stats().await?;
                println!("Database: {} ({} bytes)", cfg.memory.db_path, store.db_size().await?);
                println!(
                    "  users: {}, chats: {}, messages: {}",
                    stats.users, stats.chats, stats.messages
                );
            } else {
                println!("Database: {} (not created yet)", cfg.memory.db_path);
            }
            println!();

            match &cfg.identity.firebase {
                Some(fb) if fb.has_admin_access() => println!("  firebase: configured (admin)"),
                Some(fb) if fb.is_configured() => println!("  firebase: configured"),
                _ => println!("  firebase: not configured"),
            }

            let openai = cfg
                .provider
                .openai
                .clone()
                .unwrap_or_else(OpenAiConfig::default);
            let provider = OpenAiProvider::from_config(&openai)?;
            println!(
                "  openai ({}): {}",
                openai.model,
                if provider.is_available().await {
                    "available"
                } else {
                    "unavailable"
                }
            );
        }
        Commands::Translate { key, lang, params } => {
            let catalog = Catalog::load(&cfg.i18n)?;
            let params: Vec<(&str, &str)> = params
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            println!("{}", catalog.get_with(&lang, &key, &params));
        }
    }

    Ok(())
}
