use crate::models::{Category, CategoryCounts, Record};

/// Counts how many records sit in each moment category. States outside the
/// closed label set are ignored. Pure function of the record sequence.
pub fn aggregate(records: &[Record]) -> CategoryCounts {
    let mut counts = CategoryCounts::default();
    for record in records {
        if let Some(category) = Category::from_state(&record.state) {
            counts.bump(category);
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(state: &str) -> Record {
        Record {
            entity_id: "sensor.current_moment".to_string(),
            state: state.to_string(),
            last_changed: "2022-11-07T09:00:00.000000+00:00".to_string(),
            last_updated: "2022-11-07T09:00:00.000000+00:00".to_string(),
        }
    }

    #[test]
    fn counts_known_states_and_ignores_the_rest() {
        let records = vec![
            record("Meal"),
            record("Work"),
            record("Meal"),
            record("Other"),
        ];

        let counts = aggregate(&records);
        assert_eq!(counts.get(Category::Meal), 2);
        assert_eq!(counts.get(Category::Work), 1);
        assert_eq!(counts.get(Category::Media), 0);
        assert_eq!(counts.get(Category::Sleep), 0);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let records = vec![record("Sleep"), record("Sleep"), record("Media")];
        assert_eq!(aggregate(&records), aggregate(&records));
    }

    #[test]
    fn empty_sequence_aggregates_to_all_zeros() {
        let counts = aggregate(&[]);
        for (_, count) in counts.iter() {
            assert_eq!(count, 0);
        }
        assert_eq!(counts.total(), 0);
    }
}
