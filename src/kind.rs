use std::{fmt, str::FromStr};

use crate::error::Error;

/// The imagery processed by a run. Each kind is fetched and composited
/// independently of the others.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ImageryKind {
    /// Colour satellite imagery.
    Satellite,
    /// Terrain-RGB encoded elevation.
    Elevation,
}

impl ImageryKind {
    pub const ALL: [ImageryKind; 2] = [ImageryKind::Satellite, ImageryKind::Elevation];

    /// Tileset id on the tile server.
    pub fn tileset(&self) -> &'static str {
        match self {
            ImageryKind::Satellite => "mapbox.satellite",
            ImageryKind::Elevation => "mapbox.terrain-rgb",
        }
    }

    /// Format suffix requested from the server. Elevation must be fetched
    /// as `pngraw` so the encoded heights are not altered by compression.
    pub fn format(&self) -> &'static str {
        match self {
            ImageryKind::Satellite => "png",
            ImageryKind::Elevation => "pngraw",
        }
    }

    /// Name of the per-kind tile directory and of the composite file.
    pub fn dir_name(&self) -> &'static str {
        match self {
            ImageryKind::Satellite => "satellite",
            ImageryKind::Elevation => "elevation",
        }
    }
}

impl fmt::Display for ImageryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for ImageryKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "satellite" | "sat" => Ok(ImageryKind::Satellite),
            "elevation" | "terrain" | "terrain-rgb" => Ok(ImageryKind::Elevation),
            _ => Err(Error::UnknownKind(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases() {
        assert_eq!("Satellite".parse::<ImageryKind>().unwrap(), ImageryKind::Satellite);
        assert_eq!("terrain".parse::<ImageryKind>().unwrap(), ImageryKind::Elevation);
        assert!("hillshade".parse::<ImageryKind>().is_err());
    }

    #[test]
    fn elevation_uses_raw_png() {
        assert_eq!(ImageryKind::Elevation.format(), "pngraw");
        assert_eq!(ImageryKind::Elevation.tileset(), "mapbox.terrain-rgb");
        assert_eq!(ImageryKind::Satellite.format(), "png");
    }
}
