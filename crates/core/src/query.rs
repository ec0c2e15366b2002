use crate::models::{MatchDetails, NameCheck, RecordFilter, SanctionRecord, ScoredRecord, MATCH_THRESHOLD};
use crate::similarity::{Similarity, TokenSetJaccard};

pub fn filter<'r>(records: &'r [SanctionRecord], criteria: &RecordFilter) -> Vec<&'r SanctionRecord> {
    let query = lowered(&criteria.query);
    let id_number = lowered(&criteria.id_number);
    let program = lowered(&criteria.program);

    records
        .iter()
        .filter(|record| {
            query
                .as_deref()
                .map_or(true, |term| contains_term(&record.name, term))
        })
        .filter(|record| {
            id_number.as_deref().map_or(true, |term| {
                record
                    .identifiers
                    .iter()
                    .any(|identifier| contains_term(&identifier.id_number, term))
            })
        })
        .filter(|record| {
            program.as_deref().map_or(true, |term| {
                record
                    .programs
                    .iter()
                    .any(|listed| contains_term(listed, term))
            })
        })
        .collect()
}

pub fn search(records: &[SanctionRecord], query: &str) -> Vec<ScoredRecord> {
    search_with(records, query, &TokenSetJaccard, MATCH_THRESHOLD)
}

pub fn search_with<S: Similarity>(
    records: &[SanctionRecord],
    query: &str,
    scorer: &S,
    threshold: f64,
) -> Vec<ScoredRecord> {
    if query.trim().is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<ScoredRecord> = records
        .iter()
        .filter_map(|record| {
            let score = scorer.score(query, &record.name);
            (score >= threshold).then(|| ScoredRecord {
                record: record.clone(),
                similarity_score: score,
            })
        })
        .collect();

    hits.sort_by(|left, right| right.similarity_score.total_cmp(&left.similarity_score));
    hits
}

pub fn best_match<S: Similarity>(
    records: &[SanctionRecord],
    name: &str,
    scorer: &S,
    threshold: f64,
) -> NameCheck {
    let mut best: Option<(&SanctionRecord, f64)> = None;

    for record in records {
        let candidates = std::iter::once(&record.name).chain(record.aka_names.iter());
        for candidate in candidates {
            let score = scorer.score(name, candidate);
            if score > best.map_or(0.0, |(_, current)| current) {
                best = Some((record, score));
            }
        }
    }

    let match_score = best.map_or(0.0, |(_, score)| score);
    NameCheck {
        name: name.to_string(),
        is_match: best.is_some() && match_score >= threshold,
        match_score,
        matched_name: best.map(|(record, _)| record.name.clone()),
        details: best.map(|(record, _)| MatchDetails::from(record)),
    }
}

fn lowered(criterion: &Option<String>) -> Option<String> {
    criterion
        .as_deref()
        .filter(|value| !value.is_empty())
        .map(str::to_lowercase)
}

fn contains_term(text: &str, lowered_term: &str) -> bool {
    text.to_lowercase().contains(lowered_term)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Identifier;

    fn record(id: &str, name: &str) -> SanctionRecord {
        SanctionRecord {
            id: id.to_string(),
            name: name.to_string(),
            entity_type: None,
            aka_names: Vec::new(),
            addresses: Vec::new(),
            identifiers: Vec::new(),
            programs: Vec::new(),
            remarks: None,
        }
    }

    fn fixtures() -> Vec<SanctionRecord> {
        let mut first = record("1", "John Doe");
        first.identifiers.push(Identifier {
            id_type: "Passport".to_string(),
            id_number: "XAB1234".to_string(),
        });
        first.programs.push("SDGT".to_string());

        let mut second = record("2", "Banco Nacional de Cuba");
        second.programs.push("CUBA".to_string());
        second.aka_names.push("BNC".to_string());

        let mut third = record("3", "Doe John");
        third.identifiers.push(Identifier {
            id_type: "Tax ID".to_string(),
            id_number: "99-1".to_string(),
        });

        vec![first, second, third]
    }

    fn ids<'a>(records: impl IntoIterator<Item = &'a SanctionRecord>) -> Vec<&'a str> {
        records.into_iter().map(|record| record.id.as_str()).collect()
    }

    #[test]
    fn empty_filter_passes_everything_through() {
        let records = fixtures();
        let result = filter(&records, &RecordFilter::default());
        assert_eq!(ids(result), vec!["1", "2", "3"]);

        let blank = RecordFilter {
            query: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(filter(&records, &blank).len(), 3);
    }

    #[test]
    fn id_number_filter_is_case_insensitive_substring() {
        let records = fixtures();
        let criteria = RecordFilter {
            id_number: Some("AB123".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(filter(&records, &criteria)), vec!["1"]);
    }

    #[test]
    fn criteria_combine_with_and() {
        let records = fixtures();
        let criteria = RecordFilter {
            query: Some("doe".to_string()),
            program: Some("sdgt".to_string()),
            id_number: None,
        };
        assert_eq!(ids(filter(&records, &criteria)), vec!["1"]);

        let by_name = RecordFilter {
            query: Some("DOE".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(filter(&records, &by_name)), vec!["1", "3"]);
    }

    #[test]
    fn search_keeps_threshold_and_stable_order() {
        let records = fixtures();
        let hits = search(&records, "john doe");
        assert_eq!(ids(hits.iter().map(|hit| &hit.record)), vec!["1", "3"]);
        assert!(hits.iter().all(|hit| hit.similarity_score >= MATCH_THRESHOLD));
        assert!(hits
            .windows(2)
            .all(|pair| pair[0].similarity_score >= pair[1].similarity_score));
    }

    #[test]
    fn search_sorts_best_first() {
        let records = vec![record("a", "alpha beta gamma delta epsilon f g"), record("b", "alpha beta")];
        let hits = search_with(&records, "alpha beta", &TokenSetJaccard, 0.1);
        assert_eq!(ids(hits.iter().map(|hit| &hit.record)), vec!["b", "a"]);
    }

    #[test]
    fn blank_query_matches_nothing() {
        let records = fixtures();
        assert!(search(&records, "").is_empty());
        assert!(search(&records, "   ").is_empty());
    }

    #[test]
    fn best_match_considers_aka_names() {
        let records = fixtures();
        let check = best_match(&records, "bnc", &TokenSetJaccard, MATCH_THRESHOLD);
        assert!(check.is_match);
        assert_eq!(check.match_score, 1.0);
        assert_eq!(check.matched_name.as_deref(), Some("Banco Nacional de Cuba"));
        assert_eq!(
            check.details.map(|details| details.programs),
            Some(vec!["CUBA".to_string()])
        );
    }

    #[test]
    fn best_match_without_overlap_reports_no_entry() {
        let records = fixtures();
        let check = best_match(&records, "nobody here", &TokenSetJaccard, MATCH_THRESHOLD);
        assert!(!check.is_match);
        assert_eq!(check.match_score, 0.0);
        assert!(check.matched_name.is_none());
        assert!(check.details.is_none());
    }

    #[test]
    fn best_match_prefers_first_record_on_ties() {
        let records = fixtures();
        let check = best_match(&records, "doe john", &TokenSetJaccard, MATCH_THRESHOLD);
        assert_eq!(check.matched_name.as_deref(), Some("John Doe"));
    }
}
