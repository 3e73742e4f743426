//! # Building Health X CLI (`bhx`)
//!
//! Inspect the blog index and run the HTTP API.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `bhx posts list` | One listing page, optionally filtered by tag |
//! | `bhx posts recent` | Most recent posts |
//! | `bhx posts get <slug>` | One post with its body |
//! | `bhx posts related <slug>` | Related posts by shared tags |
//! | `bhx tags [--distinct]` | Tag table with post counts, or tag names only |
//! | `bhx sitemap` | Print `sitemap.xml` |
//! | `bhx serve` | Start the HTTP server |
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`
//! (default `info`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

use bhx_content::{config, index::ContentIndex, posts, server, sitemap};

/// Building Health X content CLI.
#[derive(Parser)]
#[command(
    name = "bhx",
    about = "Building Health X blog index, review intake, and HTTP API",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/bhx.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect blog posts.
    Posts {
        #[command(subcommand)]
        action: PostsAction,
    },

    /// List tags with post counts, most used first.
    Tags {
        /// Print only the sorted tag names.
        #[arg(long)]
        distinct: bool,
    },

    /// Print the sitemap XML.
    Sitemap,

    /// Start the HTTP server on `[server].bind`.
    Serve,
}

#[derive(Subcommand)]
enum PostsAction {
    /// List one page of posts, newest first.
    List {
        /// Only posts carrying this exact tag.
        #[arg(long)]
        tag: Option<String>,

        /// 1-based page number; out-of-range pages are clamped.
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Show the most recent posts.
    Recent {
        #[arg(long, default_value_t = 5)]
        count: usize,
    },

    /// Print one post with its body.
    Get {
        /// Post slug.
        slug: String,
    },

    /// Show posts related to a post by shared tags.
    Related {
        /// Post slug.
        slug: String,

        #[arg(long, default_value_t = 6)]
        count: usize,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Posts { action } => match action {
            PostsAction::List { tag, page } => {
                posts::run_list(&cfg, tag.as_deref(), page)?;
            }
            PostsAction::Recent { count } => {
                posts::run_recent(&cfg, count)?;
            }
            PostsAction::Get { slug } => {
                posts::run_get(&cfg, &slug)?;
            }
            PostsAction::Related { slug, count } => {
                posts::run_related(&cfg, &slug, count)?;
            }
        },
        Commands::Tags { distinct } => {
            posts::run_tags(&cfg, distinct)?;
        }
        Commands::Sitemap => {
            let index = ContentIndex::new(cfg.content.clone());
            let entries = sitemap::entries(&cfg.site, &index, chrono::Utc::now())?;
            print!("{}", sitemap::render_xml(&entries)?);
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
