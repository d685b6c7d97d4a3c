use std::path::PathBuf;

use thiserror::Error;

use crate::kind::ImageryKind;

/// Errors produced while computing tile ranges, fetching tiles and
/// compositing them.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    #[error("invalid zoom level {zoom} (must be at most {max})")]
    InvalidZoom { zoom: u8, max: u8 },

    #[error("unknown imagery kind `{0}` (expected `satellite` or `elevation`)")]
    UnknownKind(String),

    #[error("unknown bounding box fixture `{0}`")]
    UnknownFixture(String),

    #[error("failed formatting tile URL: {0}")]
    UrlTemplate(String),

    /// A tile the range calls for is not on disk.
    #[error("missing tile {col}.{row} at {}", path.display())]
    MissingTile { col: u32, row: u32, path: PathBuf },

    #[error("{failed} of {total} {kind} tiles failed to download")]
    FetchFailed {
        kind: ImageryKind,
        failed: usize,
        total: usize,
    },

    /// Some kinds had failed tiles. Composites of the other kinds were
    /// still written.
    #[error("no composite for {} (tiles failed to download)", kind_list(.kinds))]
    IncompleteKinds { kinds: Vec<ImageryKind> },

    #[error("composite of {columns}x{rows} tiles at {tile_width}x{tile_height} px exceeds the maximum image size")]
    CompositeTooLarge {
        columns: u32,
        rows: u32,
        tile_width: u32,
        tile_height: u32,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;

fn kind_list(kinds: &[ImageryKind]) -> String {
    kinds
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tile_names_the_cell() {
        let err = Error::MissingTile {
            col: 1,
            row: 0,
            path: PathBuf::from("data/satellite/1.0.png"),
        };
        assert_eq!(
            err.to_string(),
            "missing tile 1.0 at data/satellite/1.0.png"
        );
    }

    #[test]
    fn fetch_failed_display() {
        let err = Error::FetchFailed {
            kind: ImageryKind::Elevation,
            failed: 2,
            total: 81,
        };
        assert_eq!(err.to_string(), "2 of 81 elevation tiles failed to download");
    }

    #[test]
    fn incomplete_kinds_are_listed() {
        let err = Error::IncompleteKinds {
            kinds: vec![ImageryKind::Satellite, ImageryKind::Elevation],
        };
        assert_eq!(
            err.to_string(),
            "no composite for satellite, elevation (tiles failed to download)"
        );
    }
}
