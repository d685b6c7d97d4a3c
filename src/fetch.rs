use anyhow::Context;
use clap::crate_version;
use futures::{prelude::*, stream};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::kind::ImageryKind;
use crate::layout::DataLayout;
use crate::manifest::{TileManifest, TileOutcome};
use crate::tile::TileRange;

const ZERO_DURATION: Duration = Duration::from_secs(0);

/// Builds the HTTP client used for all tile requests.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(format!("mapbox-tile-stitcher_rs_{}", crate_version!()));
    if timeout > ZERO_DURATION {
        builder = builder.timeout(timeout);
    }

    Ok(builder.build()?)
}

pub(crate) fn progress_bar(len: u64, prefix: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("{prefix:>12} [{elapsed_precise}] {bar:60.cyan/blue} {pos:>7}/{len:7} ETA: {eta} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_prefix(prefix.to_owned());
    pb
}

/// Fetches every tile of `range` for one imagery kind, one request at a
/// time, into the kind's tile directory.
///
/// Failures do not stop the loop. Each tile ends up as a record in the
/// returned manifest, so callers see every gap at once.
pub async fn fetch_kind(
    cfg: &Config,
    client: &reqwest::Client,
    layout: &DataLayout,
    range: &TileRange,
    kind: ImageryKind,
) -> Result<TileManifest> {
    // a broken template fails the whole kind, not each tile
    if let Some((_, tile)) = range.tiles().next() {
        cfg.url.tile_url(&tile, kind, &cfg.access_token)?;
    }

    let pb = progress_bar(range.tile_count() as u64, &format!("{}", kind));
    let mut manifest = TileManifest::new(kind, *range);

    let tiles = stream::iter(pb.wrap_iter(range.tiles())).then(|(local, tile)| {
        let output_file = layout.tile_path(kind, local);

        async move {
            let outcome = match cfg.url.tile_url(&tile, kind, &cfg.access_token) {
                Ok(url) => tile
                    .fetch_from(client, &url, &output_file, cfg.resume)
                    .await
                    .with_context(|| format!("{} tile {}", kind, local))
                    .unwrap_or_else(|e| TileOutcome::Failed(format!("{:#}", e))),
                Err(e) => TileOutcome::Failed(e.to_string()),
            };
            (local, tile, outcome)
        }
    });
    futures::pin_mut!(tiles);

    while let Some((local, tile, outcome)) = tiles.next().await {
        match &outcome {
            TileOutcome::Failed(reason) => {
                warn!(%kind, %tile, col = local.col, row = local.row, %reason, "Tile fetch failed")
            }
            TileOutcome::Cached => debug!(%kind, %tile, "Tile already on disk"),
            TileOutcome::Fetched { bytes } => debug!(%kind, %tile, bytes, "Fetched tile"),
        }
        manifest.record(local, tile, outcome);
    }

    pb.finish_and_clear();

    info!(
        %kind,
        tiles = manifest.records().len(),
        failed = manifest.failures().count(),
        bytes = manifest.fetched_bytes(),
        "Finished fetching"
    );

    Ok(manifest)
}

/// Fetch the tiles specified in `cfg` for every configured kind and save
/// them to the file system.
///
/// Creates the output tree, wiping it first unless `cfg.resume` is set.
/// Every kind is fetched even when an earlier one had failures; check each
/// manifest with [`TileManifest::ensure_complete`].
pub async fn fetch(cfg: &Config) -> Result<Vec<TileManifest>> {
    let range = cfg.tile_range()?;
    let layout = cfg.layout();
    layout.prepare(!cfg.resume).await?;

    let client = build_client(cfg.timeout)?;

    info!(
        zoom = range.zoom,
        columns = range.columns(),
        rows = range.rows(),
        root = %layout.root().display(),
        "Fetching tiles"
    );

    let mut manifests = Vec::with_capacity(cfg.kinds.len());
    for kind in &cfg.kinds {
        manifests.push(fetch_kind(cfg, &client, &layout, &range, *kind).await?);
    }

    Ok(manifests)
}
