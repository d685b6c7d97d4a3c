use std::{fmt, path::Path, path::PathBuf, time::Duration};

use crate::bounding_box::BoundingBox;
use crate::error::{Error, Result};
use crate::kind::ImageryKind;
use crate::layout::DataLayout;
use crate::tile::{compute_tile_range, TileRange};
use crate::url::UrlFormat;

/// A tile server access token. Never printed by `Debug`.
#[derive(Clone, PartialEq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into().trim().to_owned())
    }

    /// Reads the token from the first line of `path`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let token = contents.lines().next().unwrap_or_default().trim();

        if token.is_empty() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("token file {} is empty", path.display()),
            )));
        }

        Ok(Self::new(token))
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Tile fetching and compositing configuration.
#[derive(Debug, PartialEq)]
pub struct Config {
    /// Area to download, north-west and south-east corners.
    pub bounding_box: BoundingBox,

    /// The zoom level to download.
    pub zoom: u8,

    /// Access token substituted for `{token}` in the URL.
    pub access_token: AccessToken,

    /// The folder to output the tiles and composites to.
    pub output_folder: PathBuf,

    /// The URL template to download individual tiles from.
    pub url: UrlFormat,

    /// Timeout for fetching a single tile.
    ///
    /// Pass the zero duration to disable the timeout.
    pub timeout: Duration,

    /// Imagery kinds to process, in order.
    pub kinds: Vec<ImageryKind>,

    /// Keep tiles from an earlier run instead of wiping the output folder.
    pub resume: bool,
}

impl Config {
    /// The tile range covering the configured bounding box.
    pub fn tile_range(&self) -> Result<TileRange> {
        compute_tile_range(&self.bounding_box, self.zoom)
    }

    pub fn layout(&self) -> DataLayout {
        DataLayout::new(&self.output_folder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn token_is_redacted() {
        let token = AccessToken::new("pk.secret");
        assert_eq!(format!("{:?}", token), "AccessToken(***)");
        assert_eq!(token.expose(), "pk.secret");
    }

    #[test]
    fn token_file_first_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "pk.first  ").unwrap();
        writeln!(file, "pk.second").unwrap();

        let token = AccessToken::from_file(file.path()).unwrap();
        assert_eq!(token.expose(), "pk.first");
    }

    #[test]
    fn empty_token_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(AccessToken::from_file(file.path()).is_err());
    }
}
