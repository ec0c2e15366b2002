use crate::error::{FetchError, ServiceError, SnapshotError};
use crate::models::{NameCheck, RecordFilter, SanctionRecord, ScoredRecord, ServiceOptions, UpdateReport};
use crate::query::{best_match, filter, search_with};
use crate::similarity::{Similarity, TokenSetJaccard};
use crate::snapshot::{FileSnapshotStore, SnapshotCache, SnapshotStore};
use crate::source::{DocumentSource, FeedArchive, HttpFeedSource};
use crate::transform::FeedTransformer;
use crate::xml::parse_document;
use std::sync::Arc;
use tracing::{info, warn};

pub struct SanctionsService<D, S, M = TokenSetJaccard>
where
    D: DocumentSource,
    S: SnapshotStore,
    M: Similarity,
{
    source: D,
    archive: FeedArchive,
    transformer: FeedTransformer<S>,
    cache: SnapshotCache<S>,
    scorer: M,
    match_threshold: f64,
}

impl SanctionsService<HttpFeedSource, FileSnapshotStore> {
    pub fn from_options(options: &ServiceOptions) -> Result<Self, ServiceError> {
        let source = HttpFeedSource::new(&options.feed_url, options.fetch_timeout)?;
        let store = Arc::new(FileSnapshotStore::new(&options.snapshot_path));
        Ok(Self::new(source, store, options))
    }
}

impl<D, S> SanctionsService<D, S>
where
    D: DocumentSource + Send + Sync,
    S: SnapshotStore,
{
    pub fn new(source: D, store: Arc<S>, options: &ServiceOptions) -> Self {
        Self::with_scorer(source, store, options, TokenSetJaccard)
    }
}

impl<D, S, M> SanctionsService<D, S, M>
where
    D: DocumentSource + Send + Sync,
    S: SnapshotStore,
    M: Similarity,
{
    pub fn with_scorer(source: D, store: Arc<S>, options: &ServiceOptions, scorer: M) -> Self {
        Self {
            source,
            archive: FeedArchive::new(&options.document_path),
            transformer: FeedTransformer::new(Arc::clone(&store), options.duplicate_policy),
            cache: SnapshotCache::new(store, options.freshness_window),
            scorer,
            match_threshold: options.match_threshold,
        }
    }

    pub fn cache(&self) -> &SnapshotCache<S> {
        &self.cache
    }

    pub fn records(&self) -> Result<Vec<SanctionRecord>, ServiceError> {
        if self.cache.is_valid() {
            match self.cache.load() {
                Ok(records) => return Ok(records),
                Err(SnapshotError::Missing) => {}
                Err(error) => {
                    warn!(%error, "sdn snapshot unreadable, re-transforming feed");
                }
            }
        }

        let report = self.transformer.transform_file(self.archive.path())?;
        Ok(report.records)
    }

    pub fn list(&self, criteria: &RecordFilter) -> Result<Vec<SanctionRecord>, ServiceError> {
        let records = self.records()?;
        if criteria.is_empty() {
            return Ok(records);
        }

        Ok(filter(&records, criteria).into_iter().cloned().collect())
    }

    pub fn search(&self, query: &str) -> Result<Vec<ScoredRecord>, ServiceError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let records = self.records()?;
        Ok(search_with(&records, query, &self.scorer, self.match_threshold))
    }

    pub fn check_name(&self, name: &str) -> Result<NameCheck, ServiceError> {
        let records = self.records()?;
        Ok(best_match(&records, name, &self.scorer, self.match_threshold))
    }

    pub async fn update(&self) -> Result<UpdateReport, ServiceError> {
        let bytes = self.source.fetch().await?;
        let root = parse_document(&bytes).map_err(FetchError::Malformed)?;

        // The snapshot must not outlive the document it was built from.
        self.cache.clear().map_err(ServiceError::CacheReset)?;

        let checksum = self.archive.save(&bytes)?;
        info!(path = %self.archive.path().display(), %checksum, "sdn document stored");

        let report = self.transformer.transform_document(&root);
        Ok(UpdateReport {
            status: "success".to_string(),
            message: "SDN list updated successfully".to_string(),
            entries_count: report.records.len(),
            checksum,
        })
    }
}
