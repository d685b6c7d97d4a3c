//! Download satellite and elevation tiles for a bounding box and stitch
//! them into one composite image per imagery kind.
//!
//! Tiles are requested one at a time from a Mapbox-style raster API, stored
//! as `{col}.{row}.png` relative to the north-west tile of the range, and
//! pasted into `composite/{kind}.png`.
//!
//! # CLI Example
//!
//! ```bash
//! mapbox-tile-stitcher \
//!   --north 25.93 \
//!   --west -80.40 \
//!   --south 25.62 \
//!   --east -80.04 \
//!   --zoom 13 \
//!   --token-file ./token \
//!   --output ./data
//! ```
//!
//! # Library Example
//! ```rust,no_run
//! use mapbox_tile_stitcher::{run, AccessToken, BoundingBox, Config, ImageryKind, UrlFormat};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let config = Config {
//!     bounding_box: BoundingBox::from_edges(25.93, -80.40, 25.62, -80.04).unwrap(),
//!     zoom: 13,
//!     access_token: AccessToken::new("pk.my-token"),
//!     output_folder: "./data".into(),
//!     url: UrlFormat::default(),
//!     timeout: Duration::from_secs(30),
//!     kinds: ImageryKind::ALL.to_vec(),
//!     resume: false,
//! };
//!
//! run(&config).await.expect("failed building composites");
//! # }
//! ```

mod bounding_box;
mod composite;
mod config;
mod error;
mod fetch;
mod kind;
mod layout;
mod manifest;
mod pipeline;
mod tile;
mod url;

pub use bounding_box::{BoundingBox, Fixture, GeoPoint};
pub use composite::{composite, composite_manifest, CompositeImage};
pub use config::{AccessToken, Config};
pub use error::{Error, Result};
pub use fetch::{build_client, fetch, fetch_kind};
pub use kind::ImageryKind;
pub use layout::DataLayout;
pub use manifest::{TileManifest, TileOutcome, TileRecord};
pub use pipeline::{composite_existing, run};
pub use tile::{compute_tile_range, LocalIndex, Tile, TileRange, MAX_ZOOM};
pub use url::{UrlFormat, DEFAULT_BASE_URL, DEFAULT_TEMPLATE};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn golden_tile_index() {
        let tile = Tile::from_coords_and_zoom(25.93, -80.40, 13).unwrap();
        assert_eq!((tile.x, tile.y), (2266, 3484));
    }

    #[test]
    fn miami_range() {
        let bbox = Fixture::Miami.bounding_box().unwrap();
        let range = compute_tile_range(&bbox, 13).unwrap();

        assert_eq!(
            range,
            TileRange {
                x_min: 2266,
                x_max: 2274,
                y_min: 3484,
                y_max: 3492,
                zoom: 13,
            }
        );
        assert_eq!(range.tile_count(), 81);
    }

    #[test]
    fn config_range_follows_box() {
        let config = Config {
            bounding_box: Fixture::MiamiCenter.bounding_box().unwrap(),
            zoom: 13,
            access_token: AccessToken::new("t"),
            output_folder: "data".into(),
            url: UrlFormat::default(),
            timeout: std::time::Duration::from_secs(0),
            kinds: vec![ImageryKind::Satellite],
            resume: false,
        };
        let range = config.tile_range().unwrap();

        assert_eq!((range.x_min, range.x_max), (2267, 2273));
        assert_eq!((range.y_min, range.y_max), (3483, 3490));
    }

    #[test]
    fn zoom_zero_is_one_tile() {
        let bbox = BoundingBox::from_edges(80.0, -170.0, -80.0, 170.0).unwrap();
        let range = compute_tile_range(&bbox, 0).unwrap();
        assert_eq!((range.columns(), range.rows()), (1, 1));
    }
}
