use std::collections::HashSet;

use crate::domain::wine_record::{Vintage, WineRecord};

/// Merge-time identity of a record.
pub type RecordKey = (Option<u64>, Option<Vintage>);

/// Keep the first record for every `(id, vintage)` key, preserving first-occurrence order.
pub fn dedupe_records(records: Vec<WineRecord>) -> Vec<WineRecord> {
    let mut seen: HashSet<RecordKey> = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert((record.id, record.vintage.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, vintage: i64, name: &str) -> WineRecord {
        WineRecord {
            id: Some(id),
            vintage: Some(vintage.into()),
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_occurrence_wins_per_id_and_vintage() {
        let records = vec![
            record(1, 2020, "first"),
            record(1, 2020, "second"),
            record(1, 2021, "other vintage"),
        ];

        let unique = dedupe_records(records);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].name.as_deref(), Some("first"));
        assert_eq!(unique[1].vintage, Some(Vintage::Year(2021)));
    }

    #[test]
    fn test_order_of_first_occurrence_is_preserved() {
        let records = vec![
            record(3, 2018, "c"),
            record(1, 2018, "a"),
            record(3, 2018, "c again"),
            record(2, 2018, "b"),
        ];
        let names: Vec<_> = dedupe_records(records)
            .into_iter()
            .filter_map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_null_keys_are_grouped_together() {
        let records = vec![WineRecord::default(), WineRecord::default()];
        assert_eq!(dedupe_records(records).len(), 1);
    }
}
