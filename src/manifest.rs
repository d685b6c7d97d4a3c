use crate::error::{Error, Result};
use crate::kind::ImageryKind;
use crate::tile::{LocalIndex, Tile, TileRange};

/// What happened to a single tile during a fetch.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TileOutcome {
    /// Downloaded and written to disk.
    Fetched { bytes: u64 },
    /// Already on disk from an earlier run.
    Cached,
    /// Not on disk. Carries the reason.
    Failed(String),
}

impl TileOutcome {
    pub fn is_ok(&self) -> bool {
        !matches!(self, TileOutcome::Failed(_))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TileRecord {
    pub local: LocalIndex,
    pub tile: Tile,
    pub outcome: TileOutcome,
}

/// Per-kind account of every tile a fetch attempted. The compositor only
/// accepts complete manifests.
#[derive(Clone, Debug, PartialEq)]
pub struct TileManifest {
    pub kind: ImageryKind,
    pub range: TileRange,
    records: Vec<TileRecord>,
}

impl TileManifest {
    pub fn new(kind: ImageryKind, range: TileRange) -> Self {
        Self {
            kind,
            range,
            records: Vec::with_capacity(range.tile_count()),
        }
    }

    pub fn record(&mut self, local: LocalIndex, tile: Tile, outcome: TileOutcome) {
        self.records.push(TileRecord {
            local,
            tile,
            outcome,
        });
    }

    pub fn records(&self) -> &[TileRecord] {
        &self.records
    }

    pub fn failures(&self) -> impl Iterator<Item = &TileRecord> {
        self.records.iter().filter(|r| !r.outcome.is_ok())
    }

    pub fn fetched_bytes(&self) -> u64 {
        self.records
            .iter()
            .map(|r| match r.outcome {
                TileOutcome::Fetched { bytes } => bytes,
                _ => 0,
            })
            .sum()
    }

    /// True when every tile of the range has a successful record.
    pub fn is_complete(&self) -> bool {
        self.records.len() == self.range.tile_count() && self.failures().next().is_none()
    }

    pub fn ensure_complete(&self) -> Result<()> {
        if self.is_complete() {
            return Ok(());
        }

        let total = self.range.tile_count();
        let recorded_ok = self.records.iter().filter(|r| r.outcome.is_ok()).count();

        Err(Error::FetchFailed {
            kind: self.kind,
            failed: total.saturating_sub(recorded_ok),
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range() -> TileRange {
        TileRange {
            x_min: 4,
            x_max: 5,
            y_min: 7,
            y_max: 7,
            zoom: 4,
        }
    }

    #[test]
    fn complete_when_all_tiles_succeed() {
        let mut manifest = TileManifest::new(ImageryKind::Satellite, range());
        let mut tiles = range().tiles();

        let (local, tile) = tiles.next().unwrap();
        manifest.record(local, tile, TileOutcome::Fetched { bytes: 10 });
        assert!(!manifest.is_complete());

        let (local, tile) = tiles.next().unwrap();
        manifest.record(local, tile, TileOutcome::Cached);
        assert!(manifest.is_complete());
        assert!(manifest.ensure_complete().is_ok());
        assert_eq!(manifest.fetched_bytes(), 10);
    }

    #[test]
    fn failures_are_counted() {
        let mut manifest = TileManifest::new(ImageryKind::Elevation, range());
        for (local, tile) in range().tiles() {
            manifest.record(local, tile, TileOutcome::Failed("404 Not Found".into()));
        }

        assert_eq!(manifest.failures().count(), 2);
        match manifest.ensure_complete() {
            Err(Error::FetchFailed {
                kind,
                failed,
                total,
            }) => {
                assert_eq!(kind, ImageryKind::Elevation);
                assert_eq!((failed, total), (2, 2));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
