use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use pricelens::config::{DEFAULT_DENY_LIST, PipelineConfig};
use pricelens::core::db::{
    AuctionDb, BidRepository, NewBid, NewUser, UserRepository, minimum_next_bid,
};
use pricelens::detection::RekognitionSource;
use pricelens::pricing::SerpApiSource;
use pricelens::pricing::serpapi::DEFAULT_ENDPOINT;
use pricelens::{Outcome, Pipeline, PriceFilter, PriceStrategy, QueryTemplate, SelectionPolicy};

#[derive(Parser)]
#[command(name = "pricelens")]
#[command(about = "Label the main object in a photo, price it and draw the result")]
struct Cli {
    /// SQLite database for the auction commands (created if missing)
    #[arg(long, global = true, env = "PRICELENS_DB", default_value = "auction.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect, price and annotate the best object in an image
    Detect(DetectArgs),
    /// Register an auction user
    Register(RegisterArgs),
    /// Place a bid on an auction
    Bid(BidArgs),
    /// List the bids on an auction, highest first
    Bids(BidsArgs),
}

#[derive(Args)]
struct DetectArgs {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Where to write the annotated image (overwritten)
    #[arg(short, long, default_value = "output_image.jpg")]
    output: PathBuf,

    /// How to pick the label to price
    #[arg(long, value_enum, default_value_t = SelectionPolicy::SpecificFirst)]
    policy: SelectionPolicy,

    /// Additional generic label to skip (repeatable)
    #[arg(long = "deny", value_name = "LABEL")]
    deny: Vec<String>,

    /// Do not use the built-in list of generic labels
    #[arg(long)]
    no_default_deny: bool,

    /// Search query; {label} is replaced by the label name
    #[arg(long, default_value = "{label} price")]
    query_template: String,

    /// Ignore prices below this many dollars
    #[arg(long, default_value_t = 6.0)]
    min_price: f64,

    /// Ignore prices above this many dollars
    #[arg(long)]
    max_price: Option<f64>,

    /// Which in-range price to report
    #[arg(long, value_enum, default_value_t = PriceStrategy::FirstAboveFloor)]
    price_strategy: PriceStrategy,

    /// Maximum number of labels requested from the labelling service
    #[arg(long, default_value_t = 10)]
    max_labels: i32,

    /// Minimum label confidence (percent)
    #[arg(long, default_value_t = 50.0)]
    min_confidence: f32,

    /// TrueType font for the text overlay
    #[arg(long, value_name = "TTF")]
    font: Option<PathBuf>,

    /// AWS region of the labelling service
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    region: String,

    /// SerpApi key for the shopping search
    #[arg(long, env = "SERPAPI_API_KEY", hide_env_values = true)]
    serpapi_key: String,

    #[arg(long, default_value = DEFAULT_ENDPOINT, hide = true)]
    serpapi_endpoint: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Args)]
struct RegisterArgs {
    #[arg(long)]
    email: String,

    /// Password hash produced by the front end
    #[arg(long)]
    password_hash: String,
}

#[derive(Args)]
struct BidArgs {
    /// Email of a registered user
    #[arg(long)]
    email: String,

    #[arg(long, default_value_t = 1)]
    auction: i64,

    #[arg(long)]
    amount: f64,
}

#[derive(Args)]
struct BidsArgs {
    #[arg(long, default_value_t = 1)]
    auction: i64,
}

impl DetectArgs {
    fn to_config(&self) -> anyhow::Result<PipelineConfig> {
        let mut deny_list: Vec<String> = if self.no_default_deny {
            Vec::new()
        } else {
            DEFAULT_DENY_LIST.iter().map(|s| s.to_string()).collect()
        };
        deny_list.extend(self.deny.iter().cloned());

        if let Some(max_price) = self.max_price {
            if max_price < self.min_price {
                anyhow::bail!("--max-price {} is below --min-price {}", max_price, self.min_price);
            }
        }

        Ok(PipelineConfig {
            max_labels: self.max_labels,
            min_confidence: self.min_confidence,
            policy: self.policy,
            deny_list,
            query_template: QueryTemplate::new(self.query_template.clone())?,
            price_filter: PriceFilter {
                floor: self.min_price,
                ceiling: self.max_price,
                strategy: self.price_strategy,
            },
            output_path: self.output.clone(),
            font_path: self.font.clone(),
            verbose: self.verbose,
        })
    }
}

async fn detect(args: DetectArgs) -> anyhow::Result<()> {
    let config = args.to_config()?;

    let labels = RekognitionSource::from_env(args.region.clone())
        .await
        .with_max_labels(config.max_labels)
        .with_min_confidence(config.min_confidence);
    let prices = SerpApiSource::new(args.serpapi_key.clone()).with_endpoint(args.serpapi_endpoint.clone());

    let pipeline = Pipeline::new(labels, prices, &config)
        .with_context(|| format!("Failed to load font {:?}", config.font_path))?;
    let outcome = pipeline
        .run_file(&args.image_path)
        .await
        .with_context(|| format!("Failed to process {:?}", args.image_path))?;

    if let Outcome::Annotated { label, price, .. } = outcome {
        if config.verbose {
            println!(
                "\n{}: {} ({} bounding box(es))",
                label.name,
                price,
                label.instances.len()
            );
        }
    }
    Ok(())
}

async fn register(db_file: PathBuf, args: RegisterArgs) -> anyhow::Result<()> {
    let db = AuctionDb::new(&db_file).await?;
    let result = db
        .create_user(&NewUser {
            email: args.email,
            password_hash: args.password_hash,
        })
        .await;
    db.close().await;

    let user = result?;
    println!("Registered user {} ({})", user.id, user.email);
    Ok(())
}

async fn bid(db_file: PathBuf, args: BidArgs) -> anyhow::Result<()> {
    let db = AuctionDb::new(&db_file).await?;
    let result = place_bid(&db, &args).await;
    db.close().await;
    result
}

async fn place_bid(db: &AuctionDb, args: &BidArgs) -> anyhow::Result<()> {
    let user = db
        .get_user_by_email(&args.email)
        .await?
        .with_context(|| format!("User not found: {}", args.email))?;

    let bid = db
        .place_bid(&NewBid {
            user_id: user.id,
            auction_id: args.auction,
            amount: args.amount,
        })
        .await?;
    println!(
        "Bid {} placed: {:.2} on auction {}",
        bid.id, bid.amount, bid.auction_id
    );
    if let Some(next) = minimum_next_bid(Some(bid.amount)) {
        println!("Next bid must be at least {:.2}", next);
    }
    Ok(())
}

async fn list_bids(db_file: PathBuf, args: BidsArgs) -> anyhow::Result<()> {
    let db = AuctionDb::new(&db_file).await?;
    let result = db.get_auction_bids(args.auction).await;
    db.close().await;

    let bids = result?;
    if bids.is_empty() {
        println!("No bids on auction {}.", args.auction);
    } else {
        println!("Bids on auction {}:", args.auction);
        for bid in &bids {
            println!("  {:>10.2}  {}", bid.amount, bid.user_email);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Detect(args) => detect(args).await,
        Command::Register(args) => register(cli.db, args).await,
        Command::Bid(args) => bid(cli.db, args).await,
        Command::Bids(args) => list_bids(cli.db, args).await,
    }
}
