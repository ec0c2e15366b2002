use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_FEED_URL: &str =
    "https://sanctionslistservice.ofac.treas.gov/api/PublicationPreview/exports/SDN.XML";
pub const DEFAULT_FRESHNESS_HOURS: u64 = 24;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
pub const MATCH_THRESHOLD: f64 = 0.85;

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SanctionRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aka_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<Address>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifiers: Vec<Identifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub programs: Vec<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identifier {
    pub id_type: String,
    pub id_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub record: SanctionRecord,
    pub similarity_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct RecordFilter {
    pub query: Option<String>,
    pub id_number: Option<String>,
    pub program: Option<String>,
}

impl RecordFilter {
    pub fn is_empty(&self) -> bool {
        [&self.query, &self.id_number, &self.program]
            .iter()
            .all(|criterion| criterion.as_deref().map_or(true, |value| value.is_empty()))
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NameCheck {
    pub name: String,
    pub is_match: bool,
    pub match_score: f64,
    pub matched_name: Option<String>,
    pub details: Option<MatchDetails>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchDetails {
    #[serde(rename = "type")]
    pub entity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub programs: Vec<String>,
    pub remarks: Option<String>,
}

impl From<&SanctionRecord> for MatchDetails {
    fn from(record: &SanctionRecord) -> Self {
        Self {
            entity_type: record.entity_type.clone(),
            programs: record.programs.clone(),
            remarks: record.remarks.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateReport {
    pub status: String,
    pub message: String,
    pub entries_count: usize,
    pub checksum: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    #[default]
    KeepAll,
    FirstWins,
}

#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub feed_url: String,
    pub document_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub freshness_window: Duration,
    pub fetch_timeout: Duration,
    pub match_threshold: f64,
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            document_path: PathBuf::from("./public/data/sdn.xml"),
            snapshot_path: PathBuf::from("./public/data/sdn_cache.json"),
            freshness_window: Duration::from_secs(DEFAULT_FRESHNESS_HOURS * 3600),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            match_threshold: MATCH_THRESHOLD,
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}
