use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::sync::Arc;
use tracing::{info, warn};

use embedhelp::classify::{Classifier, Decision, RuleSet, Theme};
use embedhelp::config::{Config, StorageBackend};
use embedhelp::db::Database;
use embedhelp::output::terminal;
use embedhelp::pipeline::{batch, scrape};

/// embedhelp: find beginner embedded-systems help requests on Reddit.
///
/// Scrapes new posts from hobbyist subreddits, keeps the ones asking for
/// help with microcontrollers, and files them under a theme.
#[derive(Parser)]
#[command(name = "embedhelp", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Fetch new posts from Reddit, classify them, and store the matches
    Scrape {
        /// Subreddit to scrape (repeatable; default: EMBEDHELP_SUBREDDITS)
        #[arg(long = "subreddit", short = 's')]
        subreddits: Vec<String>,

        /// Posts to request per subreddit (max 100)
        #[arg(long, default_value = "50")]
        limit: u32,

        /// Number of subreddits to fetch in parallel
        #[arg(long, default_value = "4")]
        concurrency: usize,

        /// Ignore the newest-post watermark and process everything fetched
        #[arg(long)]
        all: bool,

        /// Classify and print matches without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Classify posts from a CSV file
    Classify {
        /// CSV with columns subreddit,title,selftext,score,num_comments,url
        csv: String,

        /// Store accepted posts in the database
        #[arg(long)]
        store: bool,

        /// Print the deciding rule for every post
        #[arg(long)]
        explain: bool,
    },

    /// Compare the canonical rules against the legacy scraper rules on a CSV
    Audit {
        /// CSV with columns subreddit,title,selftext,score,num_comments,url
        csv: String,
    },

    /// List stored help posts
    Report {
        /// Only show one theme (label or name, e.g. "Communication")
        #[arg(long)]
        theme: Option<String>,

        /// Number of posts to show
        #[arg(long, default_value = "20")]
        limit: u32,
    },

    /// Show system status (storage, stored posts, last scrape)
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("embedhelp=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            info!("Initializing embedhelp storage...");
            let config = Config::load()?;
            let db = init_database(&config).await?;
            let table_count = db.table_count().await?;
            println!("Storage initialized at: {}", backend_label(&config));
            println!("Tables ready: {table_count}");
            println!("\nNext step: add your Reddit app credentials to .env");
            println!("  (see .env.example for required variables)");
            println!("\nThen run: embedhelp scrape");
        }

        Commands::Scrape {
            subreddits,
            limit,
            concurrency,
            all,
            dry_run,
        } => {
            let config = Config::load()?;
            config.require_reddit()?;
            let db = open_database(&config).await?;

            let subreddits = if subreddits.is_empty() {
                config.subreddits.clone()
            } else {
                embedhelp::config::parse_subreddit_list(&subreddits.join(","))
            };

            let reddit = embedhelp::reddit::RedditClient::new(config.reddit_credentials())?;
            let options = scrape::ScrapeOptions {
                limit,
                concurrency,
                all,
                dry_run,
            };
            let summary = scrape::run(
                &reddit,
                &Classifier::canonical(),
                db.as_ref(),
                &subreddits,
                &options,
            )
            .await?;
            terminal::display_scrape_summary(&summary, dry_run);

            if !subreddits.is_empty() && summary.failed_subreddits.len() == subreddits.len() {
                anyhow::bail!("Every subreddit failed to fetch. Check your Reddit credentials.");
            }
        }

        Commands::Classify {
            csv,
            store,
            explain,
        } => {
            let posts = embedhelp::ingest::csv::load_posts_from_csv(&csv)?;
            let classifier = Classifier::canonical();

            if explain {
                let decisions: Vec<Decision> =
                    posts.iter().map(|p| classifier.evaluate(p)).collect();
                terminal::display_decisions(&posts, &decisions);
            }

            let outcome = batch::classify_posts(&classifier, posts);
            terminal::display_batch_summary(&outcome);

            if store {
                let config = Config::load()?;
                let db = open_database(&config).await?;
                let mut saved = 0;
                for themed in &outcome.accepted {
                    match db.upsert_post(themed).await {
                        Ok(()) => saved += 1,
                        Err(e) => {
                            warn!(url = %themed.post.url, error = %e, "Database error, post not saved");
                        }
                    }
                }
                println!(
                    "{} Stored {saved} of {} accepted posts",
                    "✓".green(),
                    outcome.accepted.len()
                );
            } else {
                terminal::display_themed_posts(&outcome.accepted);
            }
        }

        Commands::Audit { csv } => {
            let posts = embedhelp::ingest::csv::load_posts_from_csv(&csv)?;
            let canonical = Classifier::canonical();
            let legacy = Classifier::new(RuleSet::LEGACY_SCRAPER);
            let divergences = batch::find_divergences(&posts, &canonical, &legacy);
            terminal::display_divergences(
                &divergences,
                posts.len(),
                canonical.rules().name,
                legacy.rules().name,
            );
        }

        Commands::Report { theme, limit } => {
            let config = Config::load()?;
            let db = open_database(&config).await?;
            let theme = theme.as_deref().map(str::parse::<Theme>).transpose()?;

            if theme.is_none() {
                terminal::display_theme_counts(&db.theme_counts().await?);
            }
            let posts = db.get_recent_posts(theme, limit).await?;
            terminal::display_themed_posts(&posts);
        }

        Commands::Status => {
            let config = Config::load()?;
            let db = match open_database(&config).await {
                Ok(db) => db,
                Err(e) => {
                    println!("Storage: not initialized ({e})");
                    println!("\nRun `embedhelp init` to set up the database.");
                    return Ok(());
                }
            };
            embedhelp::status::show(&db, &backend_label(&config)).await?;
        }
    }

    Ok(())
}

/// Where data lives, for display.
fn backend_label(config: &Config) -> String {
    match config.storage_backend() {
        StorageBackend::Sqlite { path } => format!("{path} (SQLite)"),
        StorageBackend::Supabase { url, table, .. } => format!("{url} (Supabase, table {table})"),
    }
}

/// Select the storage backend based on configuration.
///
/// Supabase when SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY are both set,
/// otherwise the SQLite file at EMBEDHELP_DB_PATH (requires the `sqlite`
/// feature and a prior `embedhelp init`).
async fn open_database(config: &Config) -> Result<Arc<dyn Database>> {
    connect(config, false).await
}

/// Initialize storage (create the SQLite file if needed).
async fn init_database(config: &Config) -> Result<Arc<dyn Database>> {
    connect(config, true).await
}

async fn connect(config: &Config, create: bool) -> Result<Arc<dyn Database>> {
    if config.supabase_partially_configured() {
        warn!("Only one of SUPABASE_URL / SUPABASE_SERVICE_ROLE_KEY is set; using SQLite");
    }
    match config.storage_backend() {
        StorageBackend::Supabase { url, key, table } => {
            info!("Using Supabase backend");
            embedhelp::db::connect_supabase(&url, &key, &table)
        }
        StorageBackend::Sqlite { path } => sqlite_database(&path, create),
    }
}

#[cfg(feature = "sqlite")]
fn sqlite_database(path: &str, create: bool) -> Result<Arc<dyn Database>> {
    if create {
        embedhelp::db::initialize_sqlite(path)
    } else {
        embedhelp::db::open_sqlite(path)
    }
}

#[cfg(not(feature = "sqlite"))]
fn sqlite_database(path: &str, _create: bool) -> Result<Arc<dyn Database>> {
    anyhow::bail!(
        "No Supabase configured and the 'sqlite' feature is not compiled in (wanted {path}).\n\
         Set SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY, or rebuild with: cargo build --features sqlite"
    )
}
