use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::PlaceError;
use models::place as place_model;

/// Trusted identity produced by the credential gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
}

/// Store-assigned reference to an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

/// Domain place (business view)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub address: String,
    pub image: MediaRef,
    pub location: Location,
    pub creator_id: Uuid,
}

/// Domain user. `place_ids` mirrors `Place::creator_id` for every place the
/// user owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub image: Option<MediaRef>,
    pub place_ids: Vec<Uuid>,
}

/// User row to insert; the id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub image: Option<MediaRef>,
}

/// Raw image payload as received from the client or fetched from lookup.
#[derive(Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("len", &self.bytes.len())
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Create-place input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceDraft {
    pub title: String,
    pub description: String,
    pub address: String,
}

impl PlaceDraft {
    pub fn validate(&self) -> Result<(), PlaceError> {
        place_model::validate_title(&self.title)?;
        place_model::validate_description(&self.description)?;
        place_model::validate_address(&self.address)?;
        Ok(())
    }
}

/// Update-place input; only these two fields are mutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceChanges {
    pub title: String,
    pub description: String,
}

impl PlaceChanges {
    pub fn validate(&self) -> Result<(), PlaceError> {
        place_model::validate_title(&self.title)?;
        place_model::validate_description(&self.description)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_validation() {
        let ok = PlaceDraft { title: "Park".into(), description: "A nice park".into(), address: "1 Main St".into() };
        assert!(ok.validate().is_ok());
        let short = PlaceDraft { description: "abc".into(), ..ok.clone() };
        assert!(matches!(short.validate(), Err(PlaceError::Validation(_))));
        let no_addr = PlaceDraft { address: " ".into(), ..ok };
        assert!(matches!(no_addr.validate(), Err(PlaceError::Validation(_))));
    }

    #[test]
    fn user_serialization_hides_password_hash() {
        let u = User {
            id: Uuid::new_v4(),
            name: "Ann".into(),
            email: "ann@example.com".into(),
            password_hash: "secret-hash".into(),
            image: None,
            place_ids: vec![],
        };
        let json = serde_json::to_string(&u).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(!json.contains("password_hash"));
    }
}
