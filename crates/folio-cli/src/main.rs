mod admin;

use std::io;
use std::sync::Arc;

use anyhow::{bail, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use folio_core::models::NewContactMessage;
use folio_core::services::ContactService;
use folio_core::utils::RateLimiter;
use folio_core::{
    preload_all, validate_contact, Backend, BackendClient, Config, ContentRepository, DualMode,
    FileStore, KeyValueStore, Loaded, PersistedCache, PreloadOutcome, Resource,
};

/// Initialize tracing. Logs go to stderr, and additionally to a daily
/// rolling file under `FOLIO_LOG_DIR` when it is set.
fn init_tracing() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var("FOLIO_LOG_DIR") {
        Ok(dir) if !dir.trim().is_empty() => {
            let appender = tracing_appender::rolling::daily(dir, "folio.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        _ => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

/// Everything a command needs, built once from the loaded configuration.
pub(crate) struct Context {
    pub config: Config,
    pub client: BackendClient,
    pub store: Arc<dyn KeyValueStore>,
    pub cache: PersistedCache,
}

impl Context {
    fn new() -> Result<Self> {
        let config = Config::load()?;
        let client = BackendClient::from_config(&config)?;
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.cache_dir()?)?);
        let cache = PersistedCache::new(Arc::clone(&store), config.cache_prefix());
        Ok(Self {
            config,
            client,
            store,
            cache,
        })
    }

    fn public_backend(&self) -> Arc<dyn Backend> {
        Arc::new(self.client.clone())
    }

    fn repository(&self) -> ContentRepository {
        let dual = DualMode::new(self.cache.clone(), self.config.cache_ttl());
        ContentRepository::new(self.public_backend(), dual)
    }
}

/// Value following `name` in the argument list, e.g. `--email a@b.co`.
pub(crate) fn flag_value(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

pub(crate) fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

fn print_usage() {
    eprintln!("Usage: folio <command>");
    eprintln!();
    eprintln!("  preload                              Fetch every resource and warm the cache");
    eprintln!("  show <resource> [--no-preload]       Print a resource and where it came from");
    eprintln!("  cache status | cache clear           Inspect or empty the local cache");
    eprintln!("  contact --name N --email E --subject S --message M");
    eprintln!("  admin <subcommand>                   Manage content (see `folio admin help`)");
    eprintln!();
    let names: Vec<&str> = Resource::ALL.iter().map(Resource::key).collect();
    eprintln!("Resources: {}", names.join(", "));
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let _guard = init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        print_usage();
        return Ok(());
    };

    let ctx = Context::new()?;
    if !ctx.client.is_configured() {
        eprintln!("Backend not configured - serving bundled content only.");
    }

    match command {
        "preload" => run_preload(&ctx).await,
        "show" => run_show(&ctx, &args[1..]).await,
        "cache" => run_cache(&ctx, &args[1..]),
        "contact" => run_contact(&ctx, &args[1..]).await,
        "admin" => admin::run(&ctx, &args[1..]).await,
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            print_usage();
            bail!("Unknown command '{}'", other)
        }
    }
}

// ============================================================================
// Public content
// ============================================================================

async fn run_preload(ctx: &Context) -> Result<()> {
    eprintln!("Preloading portfolio data...");
    let report = preload_all(&ctx.repository()).await;

    for (resource, outcome) in &report.outcomes {
        match outcome {
            PreloadOutcome::Cached { count } => println!("  {:<15} cached {} item(s)", resource, count),
            PreloadOutcome::Empty => println!("  {:<15} empty, not cached", resource),
            PreloadOutcome::Failed(e) => println!("  {:<15} failed: {}", resource, e),
        }
    }
    println!(
        "\n{} of {} resources cached",
        report.cached(),
        report.outcomes.len()
    );
    Ok(())
}

async fn run_show(ctx: &Context, args: &[String]) -> Result<()> {
    let Some(name) = args.first() else {
        bail!("Usage: folio show <resource> [--no-preload]");
    };
    let resource: Resource = name.parse().map_err(anyhow::Error::msg)?;
    let repo = ctx.repository();

    if !has_flag(args, "--no-preload") {
        preload_all(&repo).await;
    }

    let loaded = repo.load(resource).await;
    match &loaded {
        Loaded::Fallback { reason, .. } => {
            eprintln!("{} ({}: {})", resource.title(), loaded.source(), reason)
        }
        _ => eprintln!("{} ({})", resource.title(), loaded.source()),
    }

    let state = loaded.into_state();
    if let Some(error) = &state.error {
        eprintln!("Error: {}", error);
    }
    println!("{}", serde_json::to_string_pretty(&state.data)?);
    Ok(())
}

fn run_cache(ctx: &Context, args: &[String]) -> Result<()> {
    match args.first().map(String::as_str) {
        Some("status") | None => {
            println!("Cache directory: {}", ctx.config.cache_dir()?.display());
            println!("TTL: {}s\n", ctx.config.cache_ttl().as_secs());
            for resource in Resource::ALL {
                match ctx.cache.entry_age(resource.key()) {
                    Some(age) => println!("  {:<15} {}", resource, age),
                    None => println!("  {:<15} -", resource),
                }
            }
            Ok(())
        }
        Some("clear") => {
            let removed = ctx.cache.clear_all();
            println!("Removed {} cache entr{}", removed, if removed == 1 { "y" } else { "ies" });
            Ok(())
        }
        Some(other) => bail!("Unknown cache command '{}' (expected status or clear)", other),
    }
}

async fn run_contact(ctx: &Context, args: &[String]) -> Result<()> {
    let field = |name: &str| flag_value(args, name).unwrap_or_default();
    let input = NewContactMessage::new(
        &field("--name"),
        &field("--email"),
        &field("--subject"),
        &field("--message"),
    );

    let limiter = RateLimiter::contact_form(Arc::clone(&ctx.store));
    submit_contact(&limiter, &ContactService::new(ctx.public_backend()), &input).await?;

    println!("Message sent successfully! I'll get back to you soon.");
    Ok(())
}

/// Validate before touching the limiter, so a typo never spends an attempt.
async fn submit_contact(
    limiter: &RateLimiter,
    service: &ContactService,
    input: &NewContactMessage,
) -> Result<()> {
    validate_contact(input)?;

    if !limiter.check(&input.email) {
        bail!(
            "Too many messages. Please try again in {} minutes.",
            limiter.window().as_secs() / 60
        );
    }

    service
        .create(input)
        .await
        .into_result()
        .map_err(anyhow::Error::msg)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{MemoryBackend, MemoryStore};

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_flag_parsing() {
        let a = args(&["--name", "Ann", "--hard"]);
        assert_eq!(flag_value(&a, "--name").as_deref(), Some("Ann"));
        assert_eq!(flag_value(&a, "--hard"), None);
        assert!(has_flag(&a, "--hard"));
        assert!(!has_flag(&a, "--soft"));
    }

    #[tokio::test]
    async fn test_invalid_contact_does_not_spend_attempts() {
        let backend = Arc::new(MemoryBackend::new());
        let limiter = RateLimiter::contact_form(Arc::new(MemoryStore::new()));
        let service = ContactService::new(backend.clone());

        let typo = NewContactMessage::new("Ann", "ann@example", "Hello", "A long enough message");
        for _ in 0..5 {
            let err = submit_contact(&limiter, &service, &typo).await.unwrap_err();
            assert_eq!(err.to_string(), "Please enter a valid email address");
        }

        let fixed = NewContactMessage::new("Ann", "ann@example.com", "Hello", "A long enough message");
        for _ in 0..3 {
            submit_contact(&limiter, &service, &fixed).await.unwrap();
        }
        let err = submit_contact(&limiter, &service, &fixed).await.unwrap_err();
        assert!(err.to_string().starts_with("Too many messages"));
        assert_eq!(backend.rows("contacts").len(), 3);
    }
}
