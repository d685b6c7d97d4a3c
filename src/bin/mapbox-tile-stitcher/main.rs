mod args;
mod validators;

use anyhow::Result;
use args::Args;
use mapbox_tile_stitcher::{composite_existing, compute_tile_range, run, Config, DataLayout};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Rough size of a 512px tile, used for the dry-run estimate.
const APPROX_TILE_BYTES: f64 = 50_000f64;

fn init_tracing(level: &str) -> Result<()> {
    let level = match level {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse()?;
    init_tracing(&args.log_level)?;

    let range = compute_tile_range(&args.bounding_box, args.zoom)?;

    if args.dry_run {
        let tile_count = range.tile_count() * args.kinds.len();

        eprintln!(
            "would download {} tiles ({}x{} per kind, approx {}, assuming 50 kb per tile)",
            tile_count,
            range.columns(),
            range.rows(),
            pretty_bytes::converter::convert((tile_count as f64) * APPROX_TILE_BYTES)
        );

        return Ok(());
    }

    let composites = if args.composite_only {
        info!(output = %args.output_dir.display(), "Compositing existing tiles");
        composite_existing(&DataLayout::new(&args.output_dir), &range, &args.kinds)?
    } else {
        let config = Config::try_from(args)?;
        run(&config).await?
    };

    for composite in composites {
        println!("{}", composite.path.display());
    }

    Ok(())
}
