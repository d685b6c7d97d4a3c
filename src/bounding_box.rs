use std::str::FromStr;

use crate::error::{Error, Result};

/// A latitude/longitude pair given in degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new point, checking that latitude lies in [-90, 90] and
    /// longitude in [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::InvalidCoordinate(format!(
                "latitude {} is outside [-90, 90]",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::InvalidCoordinate(format!(
                "longitude {} is outside [-180, 180]",
                longitude
            )));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// A bounding box spanned by its north-west and south-east corners.
///
/// # Example
/// ```rust
/// # use mapbox_tile_stitcher::{BoundingBox, GeoPoint};
/// let miami = BoundingBox::new(
///     GeoPoint::new(25.93, -80.40).unwrap(),
///     GeoPoint::new(25.62, -80.04).unwrap(),
/// )
/// .unwrap();
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingBox {
    pub top_left: GeoPoint,
    pub bottom_right: GeoPoint,
}

impl BoundingBox {
    /// Create a new bounding box.
    ///
    /// The top-left corner must not lie south of the bottom-right one.
    /// Longitude order is checked later, when the box is turned into a
    /// tile range.
    pub fn new(top_left: GeoPoint, bottom_right: GeoPoint) -> Result<Self> {
        if top_left.latitude < bottom_right.latitude {
            return Err(Error::InvalidBoundingBox(format!(
                "top latitude {} is south of bottom latitude {}",
                top_left.latitude, bottom_right.latitude
            )));
        }

        Ok(Self {
            top_left,
            bottom_right,
        })
    }

    /// Create a box from its four edges, in degrees.
    pub fn from_edges(north: f64, west: f64, south: f64, east: f64) -> Result<Self> {
        Self::new(GeoPoint::new(north, west)?, GeoPoint::new(south, east)?)
    }

    /// Create a square box (in degrees) extending `delta` from `center` in
    /// every direction.
    pub fn around(center: GeoPoint, delta: f64) -> Result<Self> {
        if !delta.is_finite() || delta < 0.0 {
            return Err(Error::InvalidBoundingBox(format!(
                "delta {} must be a non-negative number of degrees",
                delta
            )));
        }

        Self::from_edges(
            center.latitude + delta,
            center.longitude - delta,
            center.latitude - delta,
            center.longitude + delta,
        )
    }
}

/// A bounding box fixture containing preset coordinates for a known
/// geographic region.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Fixture {
    /// Miami and Biscayne Bay.
    Miami,
    /// A 0.13° box around downtown Miami.
    MiamiCenter,
}

impl FromStr for Fixture {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "miami" => Ok(Fixture::Miami),
            "miami-center" | "miami_center" => Ok(Fixture::MiamiCenter),
            _ => Err(Error::UnknownFixture(s.to_owned())),
        }
    }
}

impl Fixture {
    pub fn bounding_box(self) -> Result<BoundingBox> {
        match self {
            Fixture::Miami => BoundingBox::from_edges(25.93, -80.40, 25.62, -80.04),
            Fixture::MiamiCenter => {
                BoundingBox::around(GeoPoint::new(25.828782, -80.217522)?, 0.13)
            }
        }
    }
}
