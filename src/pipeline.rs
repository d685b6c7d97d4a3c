use std::path::Path;
use tracing::warn;

use crate::composite::{composite_with_progress, CompositeImage};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetch::{fetch, progress_bar};
use crate::kind::ImageryKind;
use crate::layout::DataLayout;
use crate::tile::TileRange;

/// Fetches all configured kinds, then writes one composite per kind.
///
/// A kind with failed tiles gets no composite. The other kinds are still
/// composited, after which [`Error::IncompleteKinds`] names the skipped ones.
pub async fn run(cfg: &Config) -> Result<Vec<CompositeImage>> {
    let manifests = fetch(cfg).await?;
    let layout = cfg.layout();

    let mut composites = Vec::with_capacity(manifests.len());
    let mut incomplete = Vec::new();
    for manifest in &manifests {
        if let Err(e) = manifest.ensure_complete() {
            warn!(kind = %manifest.kind, error = %e, "Skipping composite");
            incomplete.push(manifest.kind);
            continue;
        }

        composites.push(composite_kind(
            &manifest.range,
            &layout.tile_dir(manifest.kind),
            &layout.composite_path(manifest.kind),
            &format!("{}", manifest.kind),
        )?);
    }

    if incomplete.is_empty() {
        Ok(composites)
    } else {
        Err(Error::IncompleteKinds { kinds: incomplete })
    }
}

/// Composites tiles already on disk under `layout` without fetching
/// anything.
pub fn composite_existing(
    layout: &DataLayout,
    range: &TileRange,
    kinds: &[ImageryKind],
) -> Result<Vec<CompositeImage>> {
    std::fs::create_dir_all(layout.composite_dir())?;

    kinds
        .iter()
        .map(|kind| {
            composite_kind(
                range,
                &layout.tile_dir(*kind),
                &layout.composite_path(*kind),
                &format!("{}", kind),
            )
        })
        .collect()
}

fn composite_kind(
    range: &TileRange,
    tile_dir: &Path,
    output: &Path,
    label: &str,
) -> Result<CompositeImage> {
    let pb = progress_bar(range.tile_count() as u64, label);
    let result = composite_with_progress(range, tile_dir, output, &pb);
    pb.finish_and_clear();

    result
}
