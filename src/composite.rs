//! Stitching of a tile directory into one raster.

use image::{imageops, ImageFormat, RgbImage};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::manifest::TileManifest;
use crate::tile::{LocalIndex, TileRange};

/// Summary of a written composite.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompositeImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub columns: u32,
    pub rows: u32,
    pub tile_width: u32,
    pub tile_height: u32,
}

/// Pastes the tiles `{col}.{row}.png` found in `tile_dir` into a single RGB
/// image and writes it to `output` as PNG.
///
/// The tile size is read from `0.0.png` and assumed for every tile. Each
/// tile is placed at `(col * tile_width, row * tile_height)`. A missing
/// tile aborts before anything is written.
pub fn composite(range: &TileRange, tile_dir: &Path, output: &Path) -> Result<CompositeImage> {
    composite_with_progress(range, tile_dir, output, &ProgressBar::hidden())
}

/// Like [`composite`], but refuses to run unless every tile of the manifest
/// was fetched.
pub fn composite_manifest(
    manifest: &TileManifest,
    tile_dir: &Path,
    output: &Path,
) -> Result<CompositeImage> {
    manifest.ensure_complete()?;
    composite(&manifest.range, tile_dir, output)
}

pub(crate) fn composite_with_progress(
    range: &TileRange,
    tile_dir: &Path,
    output: &Path,
    pb: &ProgressBar,
) -> Result<CompositeImage> {
    range.validate()?;

    let columns = range.columns();
    let rows = range.rows();

    let (tile_width, tile_height) =
        image::image_dimensions(existing_tile(tile_dir, LocalIndex::new(0, 0))?)?;

    let too_large = || Error::CompositeTooLarge {
        columns,
        rows,
        tile_width,
        tile_height,
    };
    let width = tile_width.checked_mul(columns).ok_or_else(too_large)?;
    let height = tile_height.checked_mul(rows).ok_or_else(too_large)?;

    debug!(
        columns,
        rows,
        tile_width,
        tile_height,
        dir = %tile_dir.display(),
        "Allocating composite"
    );

    let mut canvas = RgbImage::new(width, height);

    pb.set_length(u64::from(columns) * u64::from(rows));
    for col in 0..columns {
        for row in 0..rows {
            let path = existing_tile(tile_dir, LocalIndex::new(col, row))?;
            let tile = image::open(&path)?.into_rgb8();

            imageops::replace(
                &mut canvas,
                &tile,
                i64::from(col) * i64::from(tile_width),
                i64::from(row) * i64::from(tile_height),
            );
            pb.inc(1);
        }
    }

    canvas.save_with_format(output, ImageFormat::Png)?;
    info!(path = %output.display(), width, height, "Wrote composite");

    Ok(CompositeImage {
        path: output.to_path_buf(),
        width,
        height,
        columns,
        rows,
        tile_width,
        tile_height,
    })
}

fn existing_tile(tile_dir: &Path, local: LocalIndex) -> Result<PathBuf> {
    let path = tile_dir.join(local.file_name());
    if path.is_file() {
        Ok(path)
    } else {
        Err(Error::MissingTile {
            col: local.col,
            row: local.row,
            path,
        })
    }
}
