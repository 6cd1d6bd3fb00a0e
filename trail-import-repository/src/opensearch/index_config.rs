//! OpenSearch index settings and mappings.
//!
//! Both indexes only type the one date field each needs; everything else is
//! left to dynamic mapping.

use serde_json::{json, Value};

/// Settings and mappings for the work-log index.
///
/// One document per imported archive, keyed by fingerprint.
pub fn work_index_settings() -> Value {
    json!({
        "mappings": {
            "properties": {
                "key": {
                    "type": "keyword"
                },
                "processedAt": {
                    "type": "date"
                }
            }
        }
    })
}

/// Settings and mappings for the event index.
///
/// CloudTrail writes `eventTime` as `2014-03-06T21:22:54Z`; the fallback
/// format keeps records carrying fractional seconds indexable.
pub fn event_index_settings() -> Value {
    json!({
        "mappings": {
            "properties": {
                "eventTime": {
                    "type": "date",
                    "format": "date_time_no_millis||strict_date_optional_time"
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_index_settings_structure() {
        let settings = work_index_settings();

        assert_eq!(
            settings["mappings"]["properties"]["processedAt"]["type"],
            "date"
        );
        assert_eq!(settings["mappings"]["properties"]["key"]["type"], "keyword");
    }

    #[test]
    fn test_event_index_settings_structure() {
        let settings = event_index_settings();
        let event_time = &settings["mappings"]["properties"]["eventTime"];

        assert_eq!(event_time["type"], "date");
        assert!(event_time["format"]
            .as_str()
            .unwrap()
            .starts_with("date_time_no_millis"));
    }
}
