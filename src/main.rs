//! Folio CLI
//!
//! Command-line interface for Folio operations:
//! - List and render published articles
//! - Show, leave and watch reactions
//! - Register page views

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::cms::{NotionClient, PageLoader};
use folio::config::{generate_default_config, Config, LoggingConfig};
use folio::content::{render_article, Renderer};
use folio::counter::HttpCounterClient;
use folio::reactions::{FileFlagStore, ReactionKind, ReactionState, ReactionTracker};
use folio::views::record_view;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Personal blog engine")]
#[command(long_about = "Folio renders blog posts kept in a CMS database and tracks reader reactions and page views.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.config/folio/config.toml or ./folio.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the slugs of all published articles
    Paths,

    /// Render an article to HTML
    Render {
        /// Article slug
        slug: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also register a page view
        #[arg(long)]
        view: bool,
    },

    /// Show reaction counts and this device's flags
    Reactions {
        /// Article slug
        slug: String,
    },

    /// Toggle a reaction (like, love, clap, party)
    React {
        /// Article slug
        slug: String,
        /// Reaction kind
        kind: ReactionKind,
    },

    /// Follow reaction counts until interrupted
    Watch {
        /// Article slug
        slug: String,
    },

    /// Register a page view
    View {
        /// Article slug
        slug: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let source = cli.config.clone().or_else(Config::find_default_path);
    let config = match &source {
        Some(path) => Config::load_with_env(path)?,
        None => Config::from_env(),
    };
    init_logging(&config.logging);

    match &source {
        Some(path) => tracing::info!("Loaded config from {:?}", path),
        None => tracing::info!("Using default config with environment overrides"),
    }

    let json = cli.format == "json";

    match cli.command {
        Commands::Paths => {
            let loader = page_loader(&config)?;
            let articles = loader.list_articles().await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&articles)?);
            } else if articles.is_empty() {
                println!("No published articles");
            } else {
                for article in articles {
                    let date = article
                        .published
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!("{:<40} {:<12} {}", article.slug, date, article.title);
                }
            }
        }

        Commands::Render { slug, output, view } => {
            let loader = page_loader(&config)?;
            let article = loader.load(&slug).await?;
            tracing::info!(slug = %slug, blocks = article.block_count(), "Rendering article");

            let pending_view = if view {
                let client = HttpCounterClient::new(config.site.counter_config())?;
                Some(record_view(Arc::new(client), &article.slug))
            } else {
                None
            };

            let renderer = Renderer::new(config.render.render_options());
            let html = render_article(&article, &renderer, &config.render.date_format);

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, html.as_str())?;
                    println!("Article written to {:?}", path);
                }
                None => {
                    println!("{}", html);
                }
            }

            // Failures were already logged; only wait so the request is not cut off
            if let Some(pending) = pending_view {
                let _ = pending.await?;
            }
        }

        Commands::Reactions { slug } => {
            let tracker = reaction_tracker(&config, &slug)?;
            tracker.hydrate().await;
            tracker
                .refresh()
                .await
                .with_context(|| format!("Failed to fetch reactions for '{}'", slug))?;

            print_state(&slug, &tracker.state().await, json)?;
        }

        Commands::React { slug, kind } => {
            let tracker = reaction_tracker(&config, &slug)?;
            tracker.hydrate().await;
            if let Err(e) = tracker.refresh().await {
                tracing::warn!(slug = %slug, error = %e, "Reaction counts unavailable");
            }

            // The update is sent in the background; wait for it before exiting
            tracker.toggle(kind).await.await?;

            print_state(&slug, &tracker.state().await, json)?;
        }

        Commands::Watch { slug } => {
            let tracker = Arc::new(reaction_tracker(&config, &slug)?);
            let handle = tracker
                .mount()
                .await
                .context("Reaction tracking needs a flag store")?;

            let mut ticker = tokio::time::interval(Duration::from_secs(1));
            let mut last: Option<ReactionState> = None;

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Stopping");
                        break;
                    }
                    _ = ticker.tick() => {
                        let state = tracker.state().await;
                        if state.reactions.is_some() && last.as_ref() != Some(&state) {
                            print_state(&slug, &state, json)?;
                            last = Some(state);
                        }
                    }
                }
            }

            handle.stop();
        }

        Commands::View { slug } => {
            let client = HttpCounterClient::new(config.site.counter_config())?;
            record_view(Arc::new(client), &slug)
                .await?
                .with_context(|| format!("Failed to register a view for '{}'", slug))?;
            println!("View registered for {}", slug);
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("folio={}", logging.level)));

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so rendered output can be piped
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn page_loader(config: &Config) -> anyhow::Result<PageLoader> {
    let client = NotionClient::new(config.cms.notion_config())
        .context("CMS is not configured (set FOLIO_CMS_TOKEN and FOLIO_DATABASE_ID)")?;

    Ok(PageLoader::new(Arc::new(client), config.cms.filter())
        .with_nested(config.cms.fetch_nested, config.render.max_depth))
}

fn reaction_tracker(config: &Config, slug: &str) -> anyhow::Result<ReactionTracker> {
    let counter = HttpCounterClient::new(config.site.counter_config())?;
    let store = FileFlagStore::new(&config.reactions.store_path);

    Ok(ReactionTracker::new(
        slug,
        Arc::new(counter),
        Some(Arc::new(store)),
        config.reactions.tracker_config(),
    ))
}

fn print_state(slug: &str, state: &ReactionState, json: bool) -> anyhow::Result<()> {
    if json {
        let value = serde_json::json!({
            "slug": slug,
            "flags": state.flags,
            "reactions": state.reactions,
        });
        println!("{}", serde_json::to_string(&value)?);
        return Ok(());
    }

    println!("Reactions for {}:", slug);
    for kind in ReactionKind::ALL {
        let count = state
            .reactions
            .map(|r| r.get(kind).to_string())
            .unwrap_or_else(|| "?".to_string());
        let mark = if state.has_reacted(kind) { "*" } else { " " };
        println!("  {} {:<6} {}", mark, kind, count);
    }
    Ok(())
}
