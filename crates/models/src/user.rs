use sea_orm::{entity::prelude::*, ConnectionTrait, FromJsonQueryResult, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::place;

/// Ids of the places a user created. Kept in step with `places.creator_id`
/// inside the transaction that inserts or deletes a place.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct PlaceIds(pub Vec<Uuid>);

impl PlaceIds {
    pub fn contains(&self, id: &Uuid) -> bool { self.0.contains(id) }

    /// Add `id` unless already present.
    pub fn insert(&mut self, id: Uuid) {
        if !self.0.contains(&id) {
            self.0.push(id);
        }
    }

    /// Remove `id`; returns whether it was present.
    pub fn remove(&mut self, id: &Uuid) -> bool {
        let before = self.0.len();
        self.0.retain(|p| p != id);
        before != self.0.len()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub schema_version: i16,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub image_id: Option<String>,
    pub image_url: Option<String>,
    #[sea_orm(column_type = "JsonBinary")]
    pub place_ids: PlaceIds,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Places,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Places => Entity::has_many(place::Entity).into() }
    }
}

impl Related<place::Entity> for Entity {
    fn to() -> RelationDef { Relation::Places.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_email(email: &str) -> Result<(), errors::ModelError> {
    let email = email.trim();
    let valid = email.len() <= 255
        && email.split_once('@').map(|(local, domain)| !local.is_empty() && domain.contains('.')).unwrap_or(false);
    if !valid { return Err(errors::ModelError::Validation("invalid email".into())); }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() { return Err(errors::ModelError::Validation("name required".into())); }
    if name.len() > 128 { return Err(errors::ModelError::Validation("name too long (<=128)".into())); }
    Ok(())
}

/// Lower-cased, trimmed form used for storage and uniqueness.
pub fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }

pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub image_id: Option<&'a str>,
    pub image_url: Option<&'a str>,
}

pub async fn create<C: ConnectionTrait>(db: &C, new: NewUser<'_>) -> Result<Model, errors::ModelError> {
    validate_name(new.name)?;
    validate_email(new.email)?;
    if new.password_hash.trim().is_empty() { return Err(errors::ModelError::Validation("password hash required".into())); }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        schema_version: Set(crate::SCHEMA_VERSION),
        name: Set(new.name.trim().to_string()),
        email: Set(normalize_email(new.email)),
        password_hash: Set(new.password_hash.to_string()),
        image_id: Set(new.image_id.map(str::to_string)),
        image_url: Set(new.image_url.map(str::to_string)),
        place_ids: Set(PlaceIds::default()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(errors::ModelError::from_db)
}

pub async fn find_by_email<C: ConnectionTrait>(db: &C, email: &str) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::Email.eq(normalize_email(email)))
        .one(db)
        .await
        .map_err(errors::ModelError::from_db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_ids_insert_is_set_like() {
        let id = Uuid::new_v4();
        let mut ids = PlaceIds::default();
        ids.insert(id);
        ids.insert(id);
        assert_eq!(ids.0, vec![id]);
        assert!(ids.remove(&id));
        assert!(!ids.remove(&id));
        assert!(ids.0.is_empty());
    }

    #[test]
    fn email_validation() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("  a@b.com ").is_ok());
        assert!(validate_email("nope").is_err());
        assert!(validate_email("@b.com").is_err());
        assert!(validate_email("a@localhost").is_err());
        assert_eq!(normalize_email(" Bob@Example.COM "), "bob@example.com");
    }
}
