use maplit::hashmap;
use strfmt::strfmt;

use crate::config::AccessToken;
use crate::error::{Error, Result};
use crate::kind::ImageryKind;
use crate::tile::Tile;

pub const DEFAULT_BASE_URL: &str = "https://api.mapbox.com/v4";
pub const DEFAULT_TEMPLATE: &str =
    "{base}/{tileset}/{z}/{x}/{y}{scale}.{format}?access_token={token}";

/// Suffix requesting 512px tiles.
const HIGH_DPI_SCALE: &str = "@2x";

/// A tile URL template with the replacement specifiers `{base}`, `{tileset}`,
/// `{z}`, `{x}`, `{y}`, `{scale}`, `{format}` and `{token}`.
#[derive(Clone, Debug, PartialEq)]
pub struct UrlFormat {
    format_str: String,
    base: String,
    scale: String,
}

impl UrlFormat {
    pub fn from_string(format_str: String) -> Self {
        Self {
            format_str,
            base: DEFAULT_BASE_URL.to_owned(),
            scale: HIGH_DPI_SCALE.to_owned(),
        }
    }

    /// Replaces the value substituted for `{base}`.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into().trim_end_matches('/').to_owned();
        self
    }

    /// Replaces the value substituted for `{scale}`. Pass an empty string
    /// to request standard resolution tiles.
    pub fn with_scale(mut self, scale: impl Into<String>) -> Self {
        self.scale = scale.into();
        self
    }

    pub fn tile_url(&self, tile: &Tile, kind: ImageryKind, token: &AccessToken) -> Result<String> {
        let vars = hashmap! {
            "base".to_owned() => self.base.clone(),
            "tileset".to_owned() => kind.tileset().to_owned(),
            "z".to_owned() => tile.z.to_string(),
            "x".to_owned() => tile.x.to_string(),
            "y".to_owned() => tile.y.to_string(),
            "scale".to_owned() => self.scale.clone(),
            "format".to_owned() => kind.format().to_owned(),
            "token".to_owned() => token.expose().to_owned(),
        };

        strfmt(&self.format_str, &vars).map_err(|e| Error::UrlTemplate(e.to_string()))
    }
}

impl Default for UrlFormat {
    fn default() -> Self {
        Self::from_string(DEFAULT_TEMPLATE.to_owned())
    }
}
