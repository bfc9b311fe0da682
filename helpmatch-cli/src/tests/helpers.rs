//! Test helpers for writing snapshots and stubbing the similarity scorer.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use helpmatch_core::Similarity;
use helpmatch_ranker::test_support::StubSimilarity;
use tempfile::TempDir;

use crate::CliError;
use crate::rank::{RankConfig, SimilarityBuilder};

pub(super) const SNAPSHOT: &str = r#"{
    "requesters": [
        { "id": "vol-1", "skills": ["cooking"] }
    ],
    "tasks": [
        { "id": "t1", "title": "Walk dogs", "description": "Twice a day",
          "deadline": "2099-01-01T00:00:00Z", "priority": "Low",
          "skills": ["dog walking"] },
        { "id": "t2", "title": "Cook meals", "description": "For the shelter",
          "deadline": "2099-01-01T00:00:00Z", "priority": "High",
          "skills": ["cooking"] },
        { "id": "t3", "title": "Sort donations", "description": "Warehouse",
          "deadline": "2099-01-01T00:00:00Z", "status": "Completed" }
    ]
}"#;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write test file");
}

/// Temporary directory holding a snapshot document.
pub(super) struct SnapshotDir {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl SnapshotDir {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn with_snapshot() -> Self {
        let dir = Self::new();
        write_utf8(&dir.snapshot(), SNAPSHOT.as_bytes());
        dir
    }

    pub(super) fn snapshot(&self) -> Utf8PathBuf {
        self.root.join("snapshot.json")
    }
}

/// Hands a [`StubSimilarity`] to the rank command.
pub(super) struct StubSimilarityBuilder(pub(super) StubSimilarity);

impl SimilarityBuilder for StubSimilarityBuilder {
    fn build(&self, _config: &RankConfig) -> Result<Arc<dyn Similarity>, CliError> {
        Ok(Arc::new(self.0.clone()))
    }
}
