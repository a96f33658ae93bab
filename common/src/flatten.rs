use crate::error::DecodeError;
use crate::models::Record;
use serde_json::Value;
use tracing::warn;

/// Flattens the hub's two-level history payload (an outer array of buckets,
/// each an array of entity-history objects) into one ordered record
/// sequence: outer-index-major, inner-index-minor.
///
/// An entry missing a required field, or carrying a non-string value for
/// one, is skipped and logged; the rest of the payload still decodes. Only
/// a payload that is not an array-of-arrays fails the decode as a whole.
pub fn flatten_history(payload: &Value) -> Result<Vec<Record>, DecodeError> {
    let buckets = payload.as_array().ok_or(DecodeError::PayloadNotArray)?;

    let mut records = Vec::new();
    for (i, bucket) in buckets.iter().enumerate() {
        let entries = bucket
            .as_array()
            .ok_or(DecodeError::BucketNotArray { index: i })?;

        for (k, entry) in entries.iter().enumerate() {
            match serde_json::from_value::<Record>(entry.clone()) {
                Ok(record) => records.push(record),
                Err(e) => warn!("skipping malformed history entry [{}][{}]: {}", i, k, e),
            }
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(entity_id: &str, state: &str) -> Value {
        json!({
            "entity_id": entity_id,
            "state": state,
            "last_changed": "2022-11-07T09:00:00.000000+00:00",
            "last_updated": "2022-11-07T09:00:00.000000+00:00",
        })
    }

    #[test]
    fn flattens_buckets_in_outer_then_inner_order() {
        let payload = json!([
            [entry("sensor.current_moment", "Meal"), entry("sensor.current_moment", "Work")],
            [entry("sensor.previous_moment", "Sleep")],
        ]);

        let records = flatten_history(&payload).unwrap();
        let states: Vec<_> = records.iter().map(|r| r.state.as_str()).collect();
        assert_eq!(states, vec!["Meal", "Work", "Sleep"]);
        assert_eq!(records[2].entity_id, "sensor.previous_moment");
    }

    #[test]
    fn skips_entry_missing_a_required_field() {
        let payload = json!([[
            entry("sensor.current_moment", "Meal"),
            json!({
                "entity_id": "sensor.current_moment",
                "last_changed": "2022-11-07T09:00:00.000000+00:00",
                "last_updated": "2022-11-07T09:00:00.000000+00:00",
            }),
            entry("sensor.current_moment", "Work"),
        ]]);

        let records = flatten_history(&payload).unwrap();
        let states: Vec<_> = records.iter().map(|r| r.state.as_str()).collect();
        assert_eq!(states, vec!["Meal", "Work"]);
    }

    #[test]
    fn skips_entry_with_wrong_field_type() {
        let payload = json!([[
            json!({
                "entity_id": "sensor.current_moment",
                "state": 42,
                "last_changed": "2022-11-07T09:00:00.000000+00:00",
                "last_updated": "2022-11-07T09:00:00.000000+00:00",
            }),
            entry("sensor.current_moment", "Media"),
        ]]);

        let records = flatten_history(&payload).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].state, "Media");
    }

    #[test]
    fn extra_fields_on_an_entry_are_ignored() {
        let payload = json!([[{
            "entity_id": "sensor.current_moment",
            "state": "Sleep",
            "last_changed": "2022-11-07T09:00:00.000000+00:00",
            "last_updated": "2022-11-07T09:00:00.000000+00:00",
            "attributes": {"friendly_name": "현재 상황"},
        }]]);

        let records = flatten_history(&payload).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn empty_payload_flattens_to_no_records() {
        assert!(flatten_history(&json!([])).unwrap().is_empty());
        assert!(flatten_history(&json!([[]])).unwrap().is_empty());
    }

    #[test]
    fn non_array_payload_fails_the_decode() {
        let err = flatten_history(&json!({"message": "API running."})).unwrap_err();
        assert!(matches!(err, DecodeError::PayloadNotArray));
    }

    #[test]
    fn non_array_bucket_fails_the_decode() {
        let err = flatten_history(&json!([[], "not a bucket"])).unwrap_err();
        assert!(matches!(err, DecodeError::BucketNotArray { index: 1 }));
    }
}
