//! Object-created notifications.
//!
//! Parses the S3 event notification JSON delivered when an original lands in
//! the gallery bucket. Keys arrive form-encoded (`+` for space).

use serde::Deserialize;

use crate::error::{PipelineError, PipelineResult};

/// One created object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedObject {
    pub bucket: String,
    /// Decoded object key
    pub key: String,
}

/// A notification carrying one or more created objects, in delivery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectCreatedEvent {
    pub objects: Vec<CreatedObject>,
}

#[derive(Deserialize)]
struct Notification {
    #[serde(rename = "Records", default)]
    records: Vec<NotificationRecord>,
}

#[derive(Deserialize)]
struct NotificationRecord {
    s3: S3Entity,
}

#[derive(Deserialize)]
struct S3Entity {
    bucket: S3Bucket,
    object: S3Object,
}

#[derive(Deserialize)]
struct S3Bucket {
    name: String,
}

#[derive(Deserialize)]
struct S3Object {
    key: String,
}

impl ObjectCreatedEvent {
    /// Event for a single object, already decoded.
    pub fn single(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            objects: vec![CreatedObject {
                bucket: bucket.into(),
                key: key.into(),
            }],
        }
    }

    /// Parse an S3 notification document.
    pub fn from_json(raw: &str) -> PipelineResult<Self> {
        let notification: Notification = serde_json::from_str(raw)?;
        if notification.records.is_empty() {
            return Err(PipelineError::invalid_input("notification has no records"));
        }

        let objects = notification
            .records
            .into_iter()
            .map(|record| {
                Ok(CreatedObject {
                    bucket: record.s3.bucket.name,
                    key: decode_key(&record.s3.object.key)?,
                })
            })
            .collect::<PipelineResult<Vec<_>>>()?;

        Ok(Self { objects })
    }
}

/// Undo S3's form encoding of object keys.
pub fn decode_key(raw: &str) -> PipelineResult<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|k| k.into_owned())
        .map_err(|e| PipelineError::invalid_input(format!("object key '{}' is not valid UTF-8: {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_reads_records_in_order() {
        let raw = r#"{
            "Records": [
                {
                    "eventName": "ObjectCreated:Put",
                    "s3": {
                        "bucket": {"name": "gallery"},
                        "object": {"key": "shutterstock/u1/shutterstock_42", "size": 1024}
                    }
                },
                {
                    "eventName": "ObjectCreated:Put",
                    "s3": {
                        "bucket": {"name": "gallery"},
                        "object": {"key": "shutterstock/u2/shutterstock_43"}
                    }
                }
            ]
        }"#;

        let event = ObjectCreatedEvent::from_json(raw).unwrap();
        assert_eq!(event.objects.len(), 2);
        assert_eq!(event.objects[0].bucket, "gallery");
        assert_eq!(event.objects[0].key, "shutterstock/u1/shutterstock_42");
        assert_eq!(event.objects[1].key, "shutterstock/u2/shutterstock_43");
    }

    #[test]
    fn test_decode_key() {
        assert_eq!(decode_key("shutterstock/jane+doe/shutterstock_1").unwrap(), "shutterstock/jane doe/shutterstock_1");
        assert_eq!(decode_key("a%2Fb").unwrap(), "a/b");
        assert_eq!(decode_key("p/u%40mail.com/p_1").unwrap(), "p/u@mail.com/p_1");
    }

    #[test]
    fn test_empty_notification_is_invalid() {
        let err = ObjectCreatedEvent::from_json(r#"{"Records": []}"#).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = ObjectCreatedEvent::from_json("not json").unwrap_err();
        assert!(matches!(err, PipelineError::Json(_)));
    }
}
