//! CLI entry point for the socialgraph crawler.
//!
//! Logs go to stderr as JSON; the crawl report is written to stdout.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use socialgraph_core::config::{Settings, DEFAULT_FILE_PREFIX};
use socialgraph_core::Context;
use socialgraph_crawl::CrawlPipeline;
use socialgraph_feed::TwitterClient;
use socialgraph_store::{wait_ready_http, GraphClient, HttpProbe, Schema};

/// Budget for the one-shot schema commands, readiness wait included.
const ADMIN_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Parser)]
#[command(name = "socialgraph")]
#[command(about = "Load a social graph fragment into the graph store")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file prefix (default: socialgraph).
    #[arg(short, long, default_value = DEFAULT_FILE_PREFIX, global = true)]
    config: String,
}

#[derive(Subcommand)]
enum Command {
    /// Apply the Person schema to the graph store.
    Schema,
    /// Delete all data in the graph store, keeping the schema.
    DropData,
    /// Crawl a seed user and their friends into the graph store.
    Seed {
        /// Screen name of the seed user.
        #[arg(long)]
        screen_name: String,

        /// Source API bearer token (overrides config).
        #[arg(long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "socialgraph failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut settings = Settings::load(&cli.config).context("loading configuration")?;

    match cli.command {
        Command::Schema => {
            let ctx = cancellable(Context::with_timeout(ADMIN_TIMEOUT));
            let schema = admin_schema(&settings, &ctx).await?;
            schema.apply(&ctx).await.context("applying schema")?;
        }
        Command::DropData => {
            let ctx = cancellable(Context::with_timeout(ADMIN_TIMEOUT));
            let schema = admin_schema(&settings, &ctx).await?;
            schema.drop_data(&ctx).await.context("dropping data")?;
        }
        Command::Seed { screen_name, token } => {
            if let Some(token) = token {
                settings.source.token = token;
            }
            if settings.source.token.is_empty() {
                anyhow::bail!("source API token required: pass --token or set source.token");
            }

            let source = TwitterClient::new(&settings.source)?;
            let store = GraphClient::new(&settings.store)?;
            let probe = HttpProbe::new(&settings.store.health_url(), probe_timeout(&settings))?;
            let origin = settings.source.source()?;
            let pipeline = CrawlPipeline::new(source, store, probe, settings.crawl.clone(), origin);

            let ctx = cancellable(Context::with_timeout(settings.crawl.deadline()));
            let report = pipeline
                .run(&ctx, &screen_name)
                .await
                .with_context(|| format!("seeding from {screen_name}"))?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

/// Wait for the store and hand back a schema manager for it.
async fn admin_schema(settings: &Settings, ctx: &Context) -> anyhow::Result<Schema> {
    wait_ready_http(
        &settings.store.health_url(),
        settings.crawl.retry_interval(),
        ctx,
    )
    .await?;
    Ok(Schema::new(GraphClient::new(&settings.store)?))
}

fn probe_timeout(settings: &Settings) -> Duration {
    settings.crawl.retry_interval().max(Duration::from_secs(1))
}

/// Cancel `ctx` on Ctrl-C.
fn cancellable(ctx: Context) -> Context {
    let token = ctx.token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling");
            token.cancel();
        }
    });
    ctx
}
