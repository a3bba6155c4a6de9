use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use crate::domain::{Location, MediaRef, NewUserRecord, Place, PlaceChanges, User};
use crate::errors::StoreError;
use crate::store::RecordStore;
use models::errors::ModelError;
use models::{place, user};

/// PostgreSQL-backed record store.
pub struct SeaOrmRecordStore {
    pub db: DatabaseConnection,
}

impl From<DbErr> for StoreError {
    fn from(e: DbErr) -> Self { ModelError::from_db(e).into() }
}

fn place_from_model(m: place::Model) -> Place {
    Place {
        id: m.id,
        title: m.title,
        description: m.description,
        address: m.address,
        image: MediaRef { id: m.image_id, url: m.image_url },
        location: Location { lat: m.lat, lng: m.lng },
        creator_id: m.creator_id,
    }
}

fn user_from_model(m: user::Model) -> User {
    let image = match (m.image_id, m.image_url) {
        (Some(id), Some(url)) => Some(MediaRef { id, url }),
        _ => None,
    };
    User {
        id: m.id,
        name: m.name,
        email: m.email,
        password_hash: m.password_hash,
        image,
        place_ids: m.place_ids.0,
    }
}

#[async_trait]
impl RecordStore for SeaOrmRecordStore {
    async fn find_place(&self, id: Uuid) -> Result<Option<Place>, StoreError> {
        let found = place::Entity::find_by_id(id).one(&self.db).await?;
        Ok(found.map(place_from_model))
    }

    async fn find_places_by_creator(&self, creator_id: Uuid) -> Result<Vec<Place>, StoreError> {
        let rows = place::find_by_creator(&self.db, creator_id).await?;
        Ok(rows.into_iter().map(place_from_model).collect())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let found = user::Entity::find_by_id(id).one(&self.db).await?;
        Ok(found.map(user_from_model))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let found = user::find_by_email(&self.db, email).await?;
        Ok(found.map(user_from_model))
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let rows = user::Entity::find().order_by_asc(user::Column::CreatedAt).all(&self.db).await?;
        Ok(rows.into_iter().map(user_from_model).collect())
    }

    async fn insert_user(&self, new: NewUserRecord) -> Result<User, StoreError> {
        let created = user::create(&self.db, user::NewUser {
            name: &new.name,
            email: &new.email,
            password_hash: &new.password_hash,
            image_id: new.image.as_ref().map(|m| m.id.as_str()),
            image_url: new.image.as_ref().map(|m| m.url.as_str()),
        })
        .await?;
        Ok(user_from_model(created))
    }

    async fn update_place_details(&self, id: Uuid, changes: &PlaceChanges) -> Result<Place, StoreError> {
        let mut am: place::ActiveModel = place::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("place {id}")))?
            .into();
        am.title = Set(changes.title.trim().to_string());
        am.description = Set(changes.description.trim().to_string());
        am.updated_at = Set(Utc::now().into());
        let updated = am.update(&self.db).await?;
        Ok(place_from_model(updated))
    }

    async fn insert_place_linked(&self, p: &Place) -> Result<Place, StoreError> {
        // Dropping `txn` on any early return rolls back.
        let txn = self.db.begin().await?;

        // Row lock serializes concurrent place_ids rewrites for one creator
        let creator = user::Entity::find_by_id(p.creator_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("user {}", p.creator_id)))?;

        let inserted = place::create(&txn, place::NewPlace {
            id: p.id,
            title: &p.title,
            description: &p.description,
            address: &p.address,
            image_id: &p.image.id,
            image_url: &p.image.url,
            lat: p.location.lat,
            lng: p.location.lng,
            creator_id: p.creator_id,
        })
        .await?;

        let mut ids = creator.place_ids.clone();
        ids.insert(inserted.id);
        let mut am: user::ActiveModel = creator.into();
        am.place_ids = Set(ids);
        am.updated_at = Set(Utc::now().into());
        am.update(&txn).await?;

        txn.commit().await?;
        debug!(place_id = %inserted.id, creator_id = %inserted.creator_id, "place insert committed");
        Ok(place_from_model(inserted))
    }

    async fn delete_place_linked(&self, place_id: Uuid, creator_id: Uuid) -> Result<(), StoreError> {
        let txn = self.db.begin().await?;

        let creator = user::Entity::find_by_id(creator_id).lock_exclusive().one(&txn).await?;
        if let Some(creator) = creator {
            let mut ids = creator.place_ids.clone();
            if ids.remove(&place_id) {
                let mut am: user::ActiveModel = creator.into();
                am.place_ids = Set(ids);
                am.updated_at = Set(Utc::now().into());
                am.update(&txn).await?;
            }
        }

        let res = place::Entity::delete_many()
            .filter(place::Column::Id.eq(place_id))
            .filter(place::Column::CreatorId.eq(creator_id))
            .exec(&txn)
            .await?;
        if res.rows_affected == 0 {
            return Err(StoreError::NotFound(format!("place {place_id}")));
        }

        txn.commit().await?;
        debug!(%place_id, %creator_id, "place delete committed");
        Ok(())
    }
}
