use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::user;

pub const DESCRIPTION_MIN_LEN: usize = 4;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "places")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub schema_version: i16,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Text")]
    pub address: String,
    pub image_id: String,
    #[sea_orm(column_type = "Text")]
    pub image_url: String,
    pub lat: f64,
    pub lng: f64,
    pub creator_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Creator,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Creator => Entity::belongs_to(user::Entity)
                .from(Column::CreatorId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef { Relation::Creator.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_title(title: &str) -> Result<(), errors::ModelError> {
    if title.trim().is_empty() { return Err(errors::ModelError::Validation("title required".into())); }
    if title.len() > 255 { return Err(errors::ModelError::Validation("title too long (<=255)".into())); }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), errors::ModelError> {
    if description.trim().chars().count() < DESCRIPTION_MIN_LEN {
        return Err(errors::ModelError::Validation(format!("description too short (>={DESCRIPTION_MIN_LEN})")));
    }
    Ok(())
}

pub fn validate_address(address: &str) -> Result<(), errors::ModelError> {
    if address.trim().is_empty() { return Err(errors::ModelError::Validation("address required".into())); }
    Ok(())
}

pub fn validate_location(lat: f64, lng: f64) -> Result<(), errors::ModelError> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(errors::ModelError::Validation("coordinates out of range".into()));
    }
    Ok(())
}

pub struct NewPlace<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub address: &'a str,
    pub image_id: &'a str,
    pub image_url: &'a str,
    pub lat: f64,
    pub lng: f64,
    pub creator_id: Uuid,
}

/// Insert a place row. Does not touch `users.place_ids`; callers pair it with
/// the back-reference update inside one transaction.
pub async fn create<C: ConnectionTrait>(db: &C, new: NewPlace<'_>) -> Result<Model, errors::ModelError> {
    validate_title(new.title)?;
    validate_description(new.description)?;
    validate_address(new.address)?;
    validate_location(new.lat, new.lng)?;
    if new.image_id.trim().is_empty() { return Err(errors::ModelError::Validation("image id required".into())); }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(new.id),
        schema_version: Set(crate::SCHEMA_VERSION),
        title: Set(new.title.trim().to_string()),
        description: Set(new.description.trim().to_string()),
        address: Set(new.address.trim().to_string()),
        image_id: Set(new.image_id.to_string()),
        image_url: Set(new.image_url.to_string()),
        lat: Set(new.lat),
        lng: Set(new.lng),
        creator_id: Set(new.creator_id),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(errors::ModelError::from_db)
}

pub async fn find_by_creator<C: ConnectionTrait>(db: &C, creator_id: Uuid) -> Result<Vec<Model>, errors::ModelError> {
    use sea_orm::QueryOrder;
    Entity::find()
        .filter(Column::CreatorId.eq(creator_id))
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await
        .map_err(errors::ModelError::from_db)
}
