pub mod error;
pub mod models;
pub mod normalize;
pub mod query;
pub mod service;
pub mod similarity;
pub mod snapshot;
pub mod source;
pub mod transform;
pub mod xml;

pub use error::{ErrorBody, FetchError, ServiceError, SnapshotError, TransformError};
pub use models::{
    Address, DuplicatePolicy, Identifier, MatchDetails, NameCheck, RecordFilter, SanctionRecord,
    ScoredRecord, ServiceOptions, UpdateReport, DEFAULT_FEED_URL, DEFAULT_FETCH_TIMEOUT_SECS,
    DEFAULT_FRESHNESS_HOURS, MATCH_THRESHOLD,
};
pub use normalize::{extract, normalize, Extracted, Field, FieldDescriptor, FieldShape, OPTIONAL_FIELDS};
pub use query::{best_match, filter, search, search_with};
pub use service::SanctionsService;
pub use similarity::{Similarity, TokenSetJaccard};
pub use snapshot::{FileSnapshotStore, MemorySnapshotStore, SnapshotCache, SnapshotStore};
pub use source::{digest, ensure_xml_declaration, DocumentSource, FeedArchive, HttpFeedSource};
pub use transform::{FeedTransformer, TransformReport};
pub use xml::{parse_document, Namespace, XmlElement};
