// ============================================================================
// stylesync — CLI demo driver for the Style Sync try-on engine
// ============================================================================
// Usage:
//   stylesync catalog [--category eyewear]        List catalog items
//   stylesync try-on [--category makeup]          Drive a simulated session
//   stylesync recommend --palette "#FF6B6B"       Filter a category by palette
// ============================================================================

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use stylesync_core::{
    recommend::filter_by_palette, Catalog, Category, Item, Rgb, SimulatedAnalysis, TryOnSession,
    VirtualCamera,
};

/// Style Sync virtual try-on demo
#[derive(Parser)]
#[command(name = "stylesync", version, about = "Drive the Style Sync try-on engine from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog items, optionally for a single category
    Catalog {
        /// clothing, accessories, eyewear, or makeup
        #[arg(long)]
        category: Option<String>,
    },

    /// Run a full simulated session: camera, analysis, recommendations
    TryOn {
        /// Category tab to finish on
        #[arg(long, default_value = "clothing")]
        category: String,

        /// Analysis delay in milliseconds
        #[arg(long, default_value = "2000")]
        delay_ms: u64,

        /// Skip camera acquisition (analysis still runs)
        #[arg(long)]
        skip_camera: bool,
    },

    /// Show which items in a category match a palette
    Recommend {
        #[arg(long, default_value = "clothing")]
        category: String,

        /// Comma-separated #RRGGBB palette colors
        #[arg(long)]
        palette: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Catalog { category } => cmd_catalog(category),
        Commands::TryOn {
            category,
            delay_ms,
            skip_camera,
        } => cmd_try_on(category, delay_ms, skip_camera).await,
        Commands::Recommend { category, palette } => cmd_recommend(category, palette),
    }
}

fn cmd_catalog(category: Option<String>) -> Result<()> {
    let catalog = Catalog::sample();
    let categories: Vec<Category> = match category {
        Some(name) => vec![Category::from_str(&name)?],
        None => Category::ALL.to_vec(),
    };

    for category in categories {
        println!("=== {} ===", category.label());
        for item in catalog.get(category) {
            print_item(item);
        }
    }
    Ok(())
}

async fn cmd_try_on(category: String, delay_ms: u64, skip_camera: bool) -> Result<()> {
    let category = Category::from_str(&category)?;
    let camera = Arc::new(VirtualCamera::new());
    let session = TryOnSession::new(
        Catalog::sample(),
        Arc::clone(&camera) as Arc<dyn stylesync_core::MediaCapture>,
        Arc::new(SimulatedAnalysis::with_delay(Duration::from_millis(
            delay_ms,
        ))),
    );

    if !skip_camera {
        session.start_capture().await?;
        println!("Camera on ({} live track(s))", camera.live_tracks());
    }

    println!("Analyzing your look...");
    session.run_analysis().await;
    let mut updates = session.subscribe();
    while updates.borrow_and_update().analyzing {
        if updates.changed().await.is_err() {
            break;
        }
    }

    let snapshot = session.snapshot().await;
    if let Some(profile) = &snapshot.profile {
        println!();
        println!("=== Your Style Profile ===");
        println!("Skin tone:  {}", profile.skin_tone);
        println!("Face shape: {}", profile.face_shape);
        println!("Body type:  {}", profile.body_type);
        let palette: Vec<String> = profile.color_palette.iter().map(Rgb::hex).collect();
        println!("Palette:    {}", palette.join(" "));
        if let Some(tip) = profile.recommendation_for(category) {
            println!("Tip:        {}", tip);
        }
    }

    session.set_category(category).await;
    let items = session.recommended_items().await;
    println!();
    println!("Recommended for {} ({} item(s)):", category.label(), items.len());
    for item in &items {
        print_item(item);
    }

    session.close().await;
    println!();
    println!("Session closed ({} live track(s))", camera.live_tracks());
    Ok(())
}

fn cmd_recommend(category: String, palette: String) -> Result<()> {
    let category = Category::from_str(&category)?;
    let palette = parse_palette(&palette)?;

    let catalog = Catalog::sample();
    let matched = filter_by_palette(catalog.get(category), &palette);

    if matched.is_empty() {
        println!("No {} items match that palette", category);
    } else {
        for item in &matched {
            print_item(item);
        }
    }
    Ok(())
}

fn parse_palette(raw: &str) -> Result<Vec<Rgb>> {
    let mut palette = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        palette.push(Rgb::from_str(part)?);
    }
    if palette.is_empty() {
        anyhow::bail!("Palette must contain at least one #RRGGBB color");
    }
    Ok(palette)
}

fn print_item(item: &Item) {
    println!(
        "  [{:2}] {:20} {}  {:12} {}",
        item.id,
        item.name,
        item.color,
        item.kind,
        item.price_display()
    );
}
