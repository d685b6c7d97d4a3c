use anyhow::{bail, Context};
use futures::prelude::*;
use reqwest::StatusCode;
use std::{f64::consts::PI, fmt, path::Path};
use tokio::{fs, io::AsyncWriteExt};
use tokio_util::io::StreamReader;

use crate::bounding_box::BoundingBox;
use crate::error::{Error, Result};
use crate::manifest::TileOutcome;

/// Highest zoom level the tile servers serve.
pub const MAX_ZOOM: u8 = 22;

/// Latitude bound of the web-Mercator projection, `atan(sinh(π))` in degrees.
const MERCATOR_LAT_LIMIT: f64 = 85.051_128_779_8;

/// A slippy-map tile with x, y and z-coordinate.
/// ref: https://wiki.openstreetmap.org/wiki/Slippy_map_tilenames
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl Tile {
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Computes the tile containing the given point (in degrees).
    ///
    /// Latitudes beyond the Mercator limit are clamped to it and the result
    /// is clamped into the grid, so longitude 180° lands in the last column.
    pub fn from_coords_and_zoom(lat_deg: f64, lon_deg: f64, zoom: u8) -> Result<Self> {
        if zoom > MAX_ZOOM {
            return Err(Error::InvalidZoom {
                zoom,
                max: MAX_ZOOM,
            });
        }

        // scale factor
        let n = f64::from(1u32 << zoom);
        let last = (1u32 << zoom) - 1;

        let lat_rad = lat_deg
            .clamp(-MERCATOR_LAT_LIMIT, MERCATOR_LAT_LIMIT)
            .to_radians();

        let x = ((lon_deg + 180_f64) / 360_f64 * n).floor();
        let y = ((1_f64 - (lat_rad.tan() + 1_f64 / lat_rad.cos()).ln() / PI) / 2_f64 * n)
            .floor();

        Ok(Self::new(
            (x.max(0_f64) as u32).min(last),
            (y.max(0_f64) as u32).min(last),
            zoom,
        ))
    }

    /// Fetches the tile from `url` and streams the body to `output_file`.
    ///
    /// Only a `200 OK` response is written; any other status is an error.
    /// When `skip_existing` is set and the file is already present, nothing
    /// is requested.
    pub async fn fetch_from(
        &self,
        client: &reqwest::Client,
        url: &str,
        output_file: &Path,
        skip_existing: bool,
    ) -> anyhow::Result<TileOutcome> {
        if skip_existing && output_file.exists() {
            return Ok(TileOutcome::Cached);
        }

        let response = client
            .get(url)
            .send()
            .await
            .with_context(|| format!("failed fetching tile {}", self))?;

        if response.status() != StatusCode::OK {
            bail!(
                "received status {} fetching tile {}",
                response.status(),
                self
            );
        }

        let body = response
            .bytes_stream()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));
        let reader = StreamReader::new(body);
        tokio::pin!(reader);

        let mut file = fs::File::create(output_file)
            .await
            .with_context(|| format!("failed creating {}", output_file.display()))?;

        let copied = tokio::io::copy(&mut reader, &mut file).await;
        let bytes = match copied {
            Ok(bytes) => bytes,
            Err(e) => {
                drop(file);
                // a truncated tile must not be picked up by a resumed run
                let _ = fs::remove_file(output_file).await;
                return Err(e)
                    .with_context(|| format!("failed streaming tile {} to disk", self));
            }
        };
        file.flush().await?;

        Ok(TileOutcome::Fetched { bytes })
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Position of a tile inside a [`TileRange`], counted from its north-west
/// corner. Tiles are stored on disk under this index, not under their
/// global coordinates.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct LocalIndex {
    pub col: u32,
    pub row: u32,
}

impl LocalIndex {
    pub fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}.png", self.col, self.row)
    }
}

impl fmt::Display for LocalIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// An inclusive rectangle of tiles at a single zoom level.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TileRange {
    pub x_min: u32,
    pub x_max: u32,
    pub y_min: u32,
    pub y_max: u32,
    pub zoom: u8,
}

impl TileRange {
    /// Builds a range from inclusive tile bounds, rejecting bounds that are
    /// reversed or outside the grid of `zoom`.
    pub fn new(x_min: u32, x_max: u32, y_min: u32, y_max: u32, zoom: u8) -> Result<Self> {
        let range = Self {
            x_min,
            x_max,
            y_min,
            y_max,
            zoom,
        };
        range.validate()?;

        Ok(range)
    }

    /// Checks that min <= max on both axes and that every tile lies on the
    /// grid of the range's zoom level.
    pub fn validate(&self) -> Result<()> {
        if self.zoom > MAX_ZOOM {
            return Err(Error::InvalidZoom {
                zoom: self.zoom,
                max: MAX_ZOOM,
            });
        }
        if self.x_min > self.x_max || self.y_min > self.y_max {
            return Err(Error::InvalidBoundingBox(format!(
                "tile range x {}..={}, y {}..={} is reversed",
                self.x_min, self.x_max, self.y_min, self.y_max
            )));
        }

        let last = (1u32 << self.zoom) - 1;
        if self.x_max > last || self.y_max > last {
            return Err(Error::InvalidBoundingBox(format!(
                "tile range x {}..={}, y {}..={} exceeds the zoom {} grid",
                self.x_min, self.x_max, self.y_min, self.y_max, self.zoom
            )));
        }

        Ok(())
    }

    /// Number of tile columns. At least one for any range that passes
    /// [`validate`](Self::validate).
    pub fn columns(&self) -> u32 {
        self.x_max.saturating_sub(self.x_min) + 1
    }

    /// Number of tile rows. At least one for any range that passes
    /// [`validate`](Self::validate).
    pub fn rows(&self) -> u32 {
        self.y_max.saturating_sub(self.y_min) + 1
    }

    pub fn tile_count(&self) -> usize {
        self.columns() as usize * self.rows() as usize
    }

    pub fn local_index(&self, tile: &Tile) -> LocalIndex {
        LocalIndex::new(tile.x - self.x_min, tile.y - self.y_min)
    }

    /// Iterates over all tiles in the range, column by column from the west.
    pub fn tiles(&self) -> impl Iterator<Item = (LocalIndex, Tile)> + fmt::Debug {
        let range = *self;

        (range.x_min..=range.x_max).flat_map(move |x| {
            (range.y_min..=range.y_max).map(move |y| {
                let tile = Tile::new(x, y, range.zoom);
                (range.local_index(&tile), tile)
            })
        })
    }
}

/// Computes the inclusive tile range covering `bbox` at `zoom`.
///
/// The top-left corner must map to a tile that is not east of the
/// bottom-right corner's tile; reversed corners are rejected rather than
/// swapped.
///
/// # Example
/// ```rust
/// # use mapbox_tile_stitcher::{compute_tile_range, BoundingBox};
/// let bbox = BoundingBox::from_edges(25.93, -80.40, 25.62, -80.04).unwrap();
/// let range = compute_tile_range(&bbox, 13).unwrap();
/// assert_eq!((range.x_min, range.y_min), (2266, 3484));
/// ```
pub fn compute_tile_range(bbox: &BoundingBox, zoom: u8) -> Result<TileRange> {
    let tl = Tile::from_coords_and_zoom(bbox.top_left.latitude, bbox.top_left.longitude, zoom)?;
    let br = Tile::from_coords_and_zoom(
        bbox.bottom_right.latitude,
        bbox.bottom_right.longitude,
        zoom,
    )?;

    if tl.x > br.x {
        return Err(Error::InvalidBoundingBox(format!(
            "west edge {} lies east of east edge {}",
            bbox.top_left.longitude, bbox.bottom_right.longitude
        )));
    }

    TileRange::new(
        tl.x.min(br.x),
        tl.x.max(br.x),
        tl.y.min(br.y),
        tl.y.max(br.y),
        zoom,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounding_box::GeoPoint;

    #[test]
    fn tile_index() {
        let tile = Tile::from_coords_and_zoom(50.7929, 6.0402, 18).unwrap();
        assert_eq!((tile.x, tile.y), (135470, 87999));
    }

    #[test]
    fn clamps_to_grid() {
        assert_eq!(Tile::from_coords_and_zoom(0.0, 180.0, 2).unwrap(), Tile::new(3, 2, 2));
        assert_eq!(Tile::from_coords_and_zoom(89.0, 0.0, 3).unwrap(), Tile::new(4, 0, 3));
        assert_eq!(Tile::from_coords_and_zoom(-89.0, 179.99, 3).unwrap(), Tile::new(7, 7, 3));
        assert_eq!(Tile::from_coords_and_zoom(-90.0, -180.0, 0).unwrap(), Tile::new(0, 0, 0));
    }

    #[test]
    fn rejects_excessive_zoom() {
        assert!(matches!(
            Tile::from_coords_and_zoom(0.0, 0.0, 23),
            Err(Error::InvalidZoom { zoom: 23, max: 22 })
        ));
    }

    #[test]
    fn rejects_reversed_longitudes() {
        let bbox = BoundingBox::from_edges(25.93, -80.04, 25.62, -80.40).unwrap();
        assert!(matches!(
            compute_tile_range(&bbox, 13),
            Err(Error::InvalidBoundingBox(_))
        ));
    }

    #[test]
    fn tiles_are_column_major() {
        let range = TileRange {
            x_min: 10,
            x_max: 11,
            y_min: 20,
            y_max: 22,
            zoom: 5,
        };
        let tiles = range.tiles().collect::<Vec<_>>();

        assert_eq!(tiles.len(), range.tile_count());
        assert_eq!(tiles[0], (LocalIndex::new(0, 0), Tile::new(10, 20, 5)));
        assert_eq!(tiles[2], (LocalIndex::new(0, 2), Tile::new(10, 22, 5)));
        assert_eq!(tiles[3], (LocalIndex::new(1, 0), Tile::new(11, 20, 5)));
        assert_eq!(tiles[5].0.file_name(), "1.2.png");
    }

    #[test]
    fn reversed_range_is_rejected() {
        assert!(matches!(
            TileRange::new(5, 4, 0, 0, 3),
            Err(Error::InvalidBoundingBox(_))
        ));
        assert!(matches!(
            TileRange::new(0, 0, 2, 1, 3),
            Err(Error::InvalidBoundingBox(_))
        ));
    }

    #[test]
    fn range_must_fit_the_grid() {
        assert!(TileRange::new(0, 7, 0, 7, 3).is_ok());
        assert!(matches!(
            TileRange::new(0, 8, 0, 7, 3),
            Err(Error::InvalidBoundingBox(_))
        ));
        assert!(matches!(
            TileRange::new(0, 0, 0, 0, 23),
            Err(Error::InvalidZoom { zoom: 23, .. })
        ));
    }

    #[test]
    fn reversed_range_counts_do_not_underflow() {
        let range = TileRange {
            x_min: 5,
            x_max: 4,
            y_min: 0,
            y_max: 0,
            zoom: 3,
        };
        assert_eq!((range.columns(), range.rows()), (1, 1));
        assert_eq!(range.tiles().count(), 0);
        assert!(range.validate().is_err());
    }

    #[test]
    fn single_point_collapses() {
        let p = GeoPoint::new(25.93, -80.40).unwrap();
        let range = compute_tile_range(&BoundingBox::new(p, p).unwrap(), 13).unwrap();
        assert_eq!(range.x_min, range.x_max);
        assert_eq!(range.y_min, range.y_max);
        assert_eq!((range.columns(), range.rows()), (1, 1));
    }
}
