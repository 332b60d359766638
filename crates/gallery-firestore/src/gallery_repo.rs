//! Firestore-backed gallery records.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::info;

use gallery_models::record::fields;
use gallery_models::{GalleryRecord, ImageId, ImageStatus, RecordField};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::store::MetadataStore;
use crate::types::{Document, FromFirestoreValue, ToFirestoreValue, Value};

/// Repository for gallery documents under `users/{owner}/gallery`.
#[derive(Clone)]
pub struct GalleryRepository {
    client: FirestoreClient,
}

impl GalleryRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Collection path for an owner's gallery.
    fn collection(owner_id: &str) -> String {
        format!("users/{}/gallery", owner_id)
    }
}

#[async_trait]
impl MetadataStore for GalleryRepository {
    async fn create(&self, record: &GalleryRecord) -> FirestoreResult<()> {
        let record = record.as_initial();
        let fields = record_to_fields(&record);
        self.client
            .set_document(&Self::collection(&record.owner_id), &record.record_key(), fields)
            .await?;
        info!("Created gallery record: {}/{}", record.owner_id, record.image_id);
        Ok(())
    }

    async fn update_field(
        &self,
        owner_id: &str,
        image_id: &ImageId,
        field: RecordField,
    ) -> FirestoreResult<()> {
        let mut values = HashMap::new();
        values.insert(field.name().to_string(), field_value(field));

        self.client
            .update_document(
                &Self::collection(owner_id),
                &image_id.record_key(),
                values,
                &[field.name()],
                true,
            )
            .await?;
        Ok(())
    }

    async fn get(&self, owner_id: &str, image_id: &ImageId) -> FirestoreResult<GalleryRecord> {
        let collection = Self::collection(owner_id);
        let doc_id = image_id.record_key();

        match self.client.get_document(&collection, &doc_id).await? {
            Some(doc) => document_to_record(&doc, owner_id, image_id),
            None => Err(FirestoreError::not_found(format!("{}/{}", collection, doc_id))),
        }
    }
}

fn field_value(field: RecordField) -> Value {
    match field {
        RecordField::Status(status) => status.as_str().to_firestore_value(),
        RecordField::SubclipCreated(created) => created.to_firestore_value(),
    }
}

pub(crate) fn record_to_fields(record: &GalleryRecord) -> HashMap<String, Value> {
    let mut map = HashMap::new();
    map.insert(fields::OWNER.to_string(), record.owner_id.to_firestore_value());
    map.insert(fields::RECORD_KEY.to_string(), record.record_key().to_firestore_value());
    map.insert(fields::STATUS.to_string(), record.status.as_str().to_firestore_value());
    map.insert(fields::STORAGE_LINK.to_string(), record.storage_link.to_firestore_value());
    map.insert(fields::CONTRIBUTOR_ID.to_string(), record.contributor_id.to_firestore_value());
    map.insert(fields::DESCRIPTION.to_string(), record.description.to_firestore_value());
    map.insert(fields::IMAGE_TYPE.to_string(), record.image_type.to_firestore_value());
    map.insert(fields::MEDIA_TYPE.to_string(), record.media_type.to_firestore_value());
    map.insert(fields::SUBCLIP_CREATED.to_string(), record.subclip_created.to_firestore_value());
    map
}

pub(crate) fn document_to_record(
    doc: &Document,
    owner_id: &str,
    image_id: &ImageId,
) -> FirestoreResult<GalleryRecord> {
    let doc_fields = doc.fields.as_ref().ok_or_else(|| {
        FirestoreError::InvalidResponse("Document has no fields".to_string())
    })?;

    let get_string = |key: &str| -> String {
        doc_fields
            .get(key)
            .and_then(String::from_firestore_value)
            .unwrap_or_default()
    };

    let status = match doc_fields.get(fields::STATUS).and_then(String::from_firestore_value) {
        Some(s) => s
            .parse::<ImageStatus>()
            .map_err(|e| FirestoreError::invalid_response(e.to_string()))?,
        None => ImageStatus::Open,
    };

    let owner = get_string(fields::OWNER);

    Ok(GalleryRecord {
        owner_id: if owner.is_empty() { owner_id.to_string() } else { owner },
        image_id: image_id.clone(),
        status,
        storage_link: get_string(fields::STORAGE_LINK),
        contributor_id: get_string(fields::CONTRIBUTOR_ID),
        description: get_string(fields::DESCRIPTION),
        image_type: get_string(fields::IMAGE_TYPE),
        media_type: get_string(fields::MEDIA_TYPE),
        subclip_created: doc_fields
            .get(fields::SUBCLIP_CREATED)
            .and_then(bool::from_firestore_value)
            .unwrap_or(false),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_models::ImageAsset;

    fn record() -> GalleryRecord {
        let asset = ImageAsset::from_provider("42", "https://img/42.jpg", "c1", "sunset", "photo", "image");
        GalleryRecord::open(&asset, "u1", "https://signed/42")
    }

    #[test]
    fn test_record_to_fields_uses_stored_names() {
        let map = record_to_fields(&record());

        let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "contributor_id",
                "description",
                "email",
                "image_type",
                "media_type",
                "s3link",
                "status",
                "subclipCreated",
                "user_data",
            ]
        );
        assert_eq!(map["user_data"], Value::StringValue("image_42".into()));
        assert_eq!(map["status"], Value::StringValue("open".into()));
        assert_eq!(map["subclipCreated"], Value::BooleanValue(false));
    }

    #[test]
    fn test_fields_round_trip() {
        let mut original = record();
        original.status = ImageStatus::Closed;
        original.subclip_created = true;

        let doc = Document::new(record_to_fields(&original));
        let decoded = document_to_record(&doc, "u1", &ImageId::from("42")).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_unknown_status_is_invalid_response() {
        let mut map = record_to_fields(&record());
        map.insert("status".into(), Value::StringValue("archived".into()));

        let err = document_to_record(&Document::new(map), "u1", &ImageId::from("42")).unwrap_err();
        assert!(matches!(err, FirestoreError::InvalidResponse(_)));
    }

    #[test]
    fn test_document_without_fields_is_invalid() {
        let doc = Document {
            name: None,
            fields: None,
            create_time: None,
            update_time: None,
        };
        assert!(document_to_record(&doc, "u1", &ImageId::from("42")).is_err());
    }

    #[test]
    fn test_field_values() {
        assert_eq!(
            field_value(RecordField::Status(ImageStatus::Closed)),
            Value::StringValue("closed".into())
        );
        assert_eq!(field_value(RecordField::SubclipCreated(true)), Value::BooleanValue(true));
    }
}
