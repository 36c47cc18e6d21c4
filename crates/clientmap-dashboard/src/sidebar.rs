//! Sidebar list filtering

use clientmap_core::ClientRecord;

/// Records whose name or stage label contains `filter`, ignoring case.
///
/// The filter is matched as typed, whitespace included. An empty filter
/// matches every record. Order is preserved.
pub fn filter_records(records: &[ClientRecord], filter: &str) -> Vec<ClientRecord> {
    if filter.is_empty() {
        return records.to_vec();
    }
    let needle = filter.to_lowercase();
    records
        .iter()
        .filter(|record| {
            record.name.to_lowercase().contains(&needle)
                || record.stage.label().to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use clientmap_core::{Coordinate, RecordId, Stage};

    fn record(name: &str, stage: Stage) -> ClientRecord {
        ClientRecord {
            id: RecordId::from_string(name),
            name: name.to_string(),
            description: String::new(),
            salesperson: "jane@example.com".to_string(),
            stage,
            coordinate: Coordinate::new(0.0, 0.0),
            created_at: Utc::now(),
        }
    }

    fn names(records: &[ClientRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    fn sample() -> Vec<ClientRecord> {
        vec![
            record("Acme Corp", Stage::Pipeline),
            record("Globex", Stage::CurrentClient),
            record("Initech", Stage::PocStage),
            record("Pied Piper", Stage::InProposal),
        ]
    }

    #[test]
    fn test_empty_filter_matches_all() {
        assert_eq!(filter_records(&sample(), "").len(), 4);
    }

    #[test]
    fn test_whitespace_is_part_of_the_filter() {
        assert!(filter_records(&sample(), "corp ").is_empty());
        assert_eq!(names(&filter_records(&sample(), " corp")), vec!["Acme Corp"]);
        assert!(filter_records(&sample(), "  ").is_empty());
    }

    #[test]
    fn test_matches_name_case_insensitively() {
        assert_eq!(names(&filter_records(&sample(), "ACME")), vec!["Acme Corp"]);
        assert_eq!(names(&filter_records(&sample(), "PIED")), vec!["Pied Piper"]);
    }

    #[test]
    fn test_matches_stage_label() {
        assert_eq!(names(&filter_records(&sample(), "client")), vec!["Globex"]);
        assert_eq!(
            names(&filter_records(&sample(), "poc stage")),
            vec!["Initech"]
        );
    }

    #[test]
    fn test_result_is_exactly_the_matching_records() {
        let records = sample();
        for filter in ["e", "in", "stage", "zzz", "Proposal", "corp ", " client", "  "] {
            let needle = filter.to_lowercase();
            let expected: Vec<_> = records
                .iter()
                .filter(|r| {
                    r.name.to_lowercase().contains(&needle)
                        || r.stage.label().to_lowercase().contains(&needle)
                })
                .cloned()
                .collect();
            assert_eq!(filter_records(&records, filter), expected, "filter {filter}");
        }
    }
}
