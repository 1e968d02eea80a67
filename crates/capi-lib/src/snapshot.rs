//! Best-effort JSON snapshots for offline debugging
//!
//! Files are named `<stem>_<unix ts>.json` and accumulate without rotation.
//! A failed write is reported to the caller as a [`SnapshotOutcome`], never
//! propagated; logging it is up to the caller.

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Default snapshot directory
pub const DEFAULT_SNAPSHOT_DIR: &str = "/var/tmp";

/// Stem of the raw state dump
pub const CLUSTER_STATE_STEM: &str = "cluster_state";

/// Stem of the aggregated result dump
pub const RESULT_STEM: &str = "result";

/// Outcome of one snapshot write
#[derive(Debug)]
pub enum SnapshotOutcome {
    Written(PathBuf),
    Failed { path: PathBuf, error: String },
}

impl SnapshotOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, SnapshotOutcome::Written(_))
    }

    pub fn path(&self) -> &Path {
        match self {
            SnapshotOutcome::Written(path) | SnapshotOutcome::Failed { path, .. } => path.as_path(),
        }
    }
}

/// Writes timestamped JSON dumps into one directory
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    dir: PathBuf,
}

impl Default for SnapshotWriter {
    fn default() -> Self {
        Self::new(DEFAULT_SNAPSHOT_DIR)
    }
}

impl SnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a snapshot with this stem and timestamp would be written to
    pub fn path_for(&self, stem: &str, timestamp: i64) -> PathBuf {
        self.dir.join(format!("{}_{}.json", stem, timestamp))
    }

    /// Dump `value` stamped with the current time
    pub fn persist<T: Serialize + ?Sized>(&self, stem: &str, value: &T) -> SnapshotOutcome {
        self.persist_at(stem, value, chrono::Utc::now().timestamp())
    }

    /// Dump `value` stamped with `timestamp`
    pub fn persist_at<T: Serialize + ?Sized>(
        &self,
        stem: &str,
        value: &T,
        timestamp: i64,
    ) -> SnapshotOutcome {
        let path = self.path_for(stem, timestamp);
        match write_pretty(&path, value) {
            Ok(()) => SnapshotOutcome::Written(path),
            Err(e) => SnapshotOutcome::Failed {
                path,
                error: e.to_string(),
            },
        }
    }
}

/// Serialize with a 4-space indent; the file is closed when the writer drops
fn write_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
    value.serialize(&mut ser).map_err(std::io::Error::from)?;
    writer.flush()
}
