use crate::error::TransformError;
use crate::models::{DuplicatePolicy, SanctionRecord};
use crate::normalize::normalize;
use crate::snapshot::{persist_records, SnapshotStore};
use crate::xml::{parse_document, XmlElement};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

const ENTRY_TAG: &str = "sdnEntry";

#[derive(Debug, Clone, PartialEq)]
pub struct TransformReport {
    pub records: Vec<SanctionRecord>,
    pub entity_count: usize,
    pub dropped: usize,
    pub duplicate_ids: Vec<String>,
}

/// Turns a raw SDN document into records and persists them as the new snapshot.
///
/// Record ids are expected to be unique in the feed. Repeats are reported in
/// [`TransformReport::duplicate_ids`] and handled per [`DuplicatePolicy`].
pub struct FeedTransformer<S: SnapshotStore> {
    store: Arc<S>,
    duplicate_policy: DuplicatePolicy,
}

impl<S: SnapshotStore> FeedTransformer<S> {
    pub fn new(store: Arc<S>, duplicate_policy: DuplicatePolicy) -> Self {
        Self {
            store,
            duplicate_policy,
        }
    }

    pub fn transform(&self, document: &[u8]) -> Result<TransformReport, TransformError> {
        let root = parse_document(document)?;
        Ok(self.transform_document(&root))
    }

    pub fn transform_document(&self, root: &XmlElement) -> TransformReport {
        let ns = root.document_namespace();
        let entries = root.descendants(ns, ENTRY_TAG);

        let entity_count = entries.len();
        let mut records = Vec::with_capacity(entity_count);
        let mut dropped = 0usize;
        let mut seen = HashSet::new();
        let mut duplicate_ids = Vec::new();

        for (position, entry) in entries.into_iter().enumerate() {
            let Some(record) = normalize(entry, ns) else {
                dropped += 1;
                debug!(position, "dropping sdn entry without uid or name");
                continue;
            };

            if !seen.insert(record.id.clone()) {
                if !duplicate_ids.contains(&record.id) {
                    duplicate_ids.push(record.id.clone());
                }
                if self.duplicate_policy == DuplicatePolicy::FirstWins {
                    continue;
                }
            }

            records.push(record);
        }

        if !duplicate_ids.is_empty() {
            warn!(
                duplicates = duplicate_ids.len(),
                policy = ?self.duplicate_policy,
                "sdn feed contains repeated uids"
            );
        }

        if let Err(error) = persist_records(&*self.store, &records) {
            warn!(%error, "failed to write sdn snapshot, serving transformed records uncached");
        }

        info!(
            entity_count,
            record_count = records.len(),
            dropped,
            namespace = ns.0.unwrap_or(""),
            "sdn feed transformed"
        );

        TransformReport {
            records,
            entity_count,
            dropped,
            duplicate_ids,
        }
    }

    pub fn transform_file(&self, path: &Path) -> Result<TransformReport, TransformError> {
        let bytes = fs::read(path).map_err(|error| match error.kind() {
            ErrorKind::NotFound => TransformError::DocumentMissing(path.to_path_buf()),
            _ => TransformError::Io(error),
        })?;
        self.transform(&bytes)
    }

    /// Like [`Self::transform_file`], but any document-level failure yields no records.
    ///
    /// The failure is only visible in the logs; use `transform_file` when an
    /// empty feed must be told apart from an unreadable one.
    pub fn transform_best_effort(&self, path: &Path) -> Vec<SanctionRecord> {
        match self.transform_file(path) {
            Ok(report) => report.records,
            Err(error) => {
                warn!(path = %path.display(), %error, "sdn feed transform failed");
                Vec::new()
            }
        }
    }
}
