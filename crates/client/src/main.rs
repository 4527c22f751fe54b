use std::error::Error;

use clap::{Args, Parser, Subcommand};
use review_client::config::load_client_config;
use review_client::view::{render_filter_options, render_session};
use review_client::{HttpCatalogApi, ReviewSession};
use review_common::{CatalogFilter, RemarkTag, DEFAULT_PAGE};
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(version, about = "Terminal front end for the product review service")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<String>,

    /// Overrides `api_base_url` from the config.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Overrides `page_size` from the config.
    #[arg(long, global = true)]
    page_size: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    #[arg(long)]
    gender: Option<String>,
    #[arg(long)]
    category: Option<i32>,
    #[arg(long)]
    brand: Option<i32>,
}

impl From<FilterArgs> for CatalogFilter {
    fn from(args: FilterArgs) -> Self {
        CatalogFilter {
            category_id: args.category,
            brand_id: args.brand,
            gender: args.gender.filter(|g| !g.is_empty()),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show one page of products awaiting review.
    List {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, default_value_t = DEFAULT_PAGE)]
        page: u64,
    },
    /// Show the values the catalog can be filtered by.
    Filters,
    /// Attach remarks to a product on the selected page and save them.
    Flag {
        #[command(flatten)]
        filter: FilterArgs,
        /// Page of the filtered catalog that shows the product.
        #[arg(long, default_value_t = DEFAULT_PAGE)]
        page: u64,
        product_id: i64,
        /// One or more of: pose_issue, hands_visibility, quality_issue, nsfw.
        #[arg(required = true)]
        remarks: Vec<RemarkTag>,
    },
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    init_logging();
    let cli = Cli::parse();

    let mut config = load_client_config(cli.config.as_deref())?;
    if let Some(api_url) = cli.api_url {
        config.api_base_url = api_url;
    }
    if let Some(page_size) = cli.page_size.filter(|size| *size > 0) {
        config.page_size = page_size;
    }
    info!(api_base_url = %config.api_base_url, "Using review API.");
    let mut session = ReviewSession::new(HttpCatalogApi::new(&config.api_base_url), config.page_size);

    match cli.command {
        Command::List { filter, page } => {
            session = session.starting_at(CatalogFilter::from(filter), page);
            // Failures are rendered by the view.
            session.mount().await.ok();
            print!("{}", render_session(&session));
        }
        Command::Filters => {
            session.mount().await.ok();
            print!("{}", render_filter_options(session.filter_options()));
        }
        Command::Flag {
            filter,
            page,
            product_id,
            remarks,
        } => {
            session = session.starting_at(CatalogFilter::from(filter), page);
            session.mount().await?;
            for tag in remarks {
                session.toggle_remark(product_id, tag, true)?;
            }
            let outcome = session.commit().await.map_err(|e| {
                error!(error = %e, product_id, "Commit failed.");
                e
            })?;
            println!("{}", outcome.message());
        }
    }
    Ok(())
}
