//! Address domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use address_api_core::RecordId;

/// A postal address record.
///
/// A record starts out *new* and becomes persisted after its first save.
/// The id of a persisted record never changes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    id: Option<RecordId>,
    created: Option<DateTime<Utc>>,
    updated: Option<DateTime<Utc>>,
    /// Street line.
    pub street: String,
    /// City name.
    pub city: String,
    /// State, province or region.
    pub state: String,
    /// Postal code.
    pub zip_code: String,
    /// Country code or short name.
    pub country: String,
    #[serde(skip)]
    persisted: bool,
}

impl Address {
    /// Create a new, unsaved address with empty fields.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a persisted address from stored values.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub const fn from_stored(
        id: RecordId,
        created: DateTime<Utc>,
        updated: DateTime<Utc>,
        street: String,
        city: String,
        state: String,
        zip_code: String,
        country: String,
    ) -> Self {
        Self {
            id: Some(id),
            created: Some(created),
            updated: Some(updated),
            street,
            city,
            state,
            zip_code,
            country,
            persisted: true,
        }
    }

    /// The record id, if one has been assigned.
    #[must_use]
    pub const fn id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    /// When the record was first saved.
    #[must_use]
    pub const fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }

    /// When the record was last saved.
    #[must_use]
    pub const fn updated(&self) -> Option<DateTime<Utc>> {
        self.updated
    }

    /// Whether the record has never been saved.
    #[must_use]
    pub const fn is_new(&self) -> bool {
        !self.persisted
    }

    /// Assign a client-chosen id to a new record.
    ///
    /// Returns `false` and leaves the id untouched if the record is already
    /// persisted.
    pub fn set_id(&mut self, id: RecordId) -> bool {
        if self.persisted {
            return false;
        }
        self.id = Some(id);
        true
    }

    /// Mark the record as saved with the given id and timestamps.
    ///
    /// Called by stores after a successful insert or update.
    pub fn mark_persisted(&mut self, id: RecordId, created: DateTime<Utc>, updated: DateTime<Utc>) {
        self.id = Some(id);
        self.created = Some(created);
        self.updated = Some(updated);
        self.persisted = true;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_address_is_new() {
        let address = Address::new();
        assert!(address.is_new());
        assert!(address.id().is_none());
    }

    #[test]
    fn test_set_id_only_when_new() {
        let mut address = Address::new();
        let id = RecordId::parse("abcdefghijklmno").unwrap();
        assert!(address.set_id(id.clone()));
        assert_eq!(address.id(), Some(&id));

        let now = Utc::now();
        address.mark_persisted(id.clone(), now, now);
        assert!(!address.is_new());
        assert!(!address.set_id(RecordId::parse("zzzzzzzzzzzzzzz").unwrap()));
        assert_eq!(address.id(), Some(&id));
    }

    #[test]
    fn test_serialize_camel_case() {
        let now = Utc::now();
        let address = Address::from_stored(
            RecordId::parse("abcdefghijklmno").unwrap(),
            now,
            now,
            "1 Main St".to_string(),
            "Springfield".to_string(),
            "IL".to_string(),
            "62701".to_string(),
            "US".to_string(),
        );
        let json = serde_json::to_value(&address).unwrap();
        assert_eq!(json["id"], "abcdefghijklmno");
        assert_eq!(json["zipCode"], "62701");
        assert!(json.get("persisted").is_none());
        assert!(json.get("created").is_some());
    }
}
