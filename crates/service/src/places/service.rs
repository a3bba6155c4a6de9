use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{Identity, ImageUpload, MediaRef, Place, PlaceChanges, PlaceDraft};
use crate::errors::{PlaceError, StoreError};
use crate::lookup::{AddressLookup, LookupError, ResolvedAddress};
use crate::media::{release_orphan, MediaStore};
use crate::store::RecordStore;
use common::metrics::{MEDIA_ORPHANED_TOTAL, PLACES_CREATED_TOTAL, PLACES_DELETED_TOTAL};

/// Orchestrates place writes across the record store and the media store.
#[derive(Clone)]
pub struct PlaceService {
    pub(super) store: Arc<dyn RecordStore>,
    media: Arc<dyn MediaStore>,
    lookup: Arc<dyn AddressLookup>,
}

impl PlaceService {
    pub fn new(store: Arc<dyn RecordStore>, media: Arc<dyn MediaStore>, lookup: Arc<dyn AddressLookup>) -> Self {
        Self { store, media, lookup }
    }

    /// Create a place owned by `who`.
    ///
    /// Steps: validate, resolve the address, upload the supplied image (or
    /// the lookup's photo when none is supplied), load the creator, then
    /// insert the place and link it to the creator in one transaction. Any
    /// failure after the upload releases the image before returning.
    ///
    /// # Examples
    /// ```
    /// use service::places::PlaceService;
    /// use service::domain::{Identity, PlaceDraft};
    /// use service::store::mock::MockRecordStore;
    /// use service::media::mock::MockMediaStore;
    /// use service::lookup::mock::MockLookup;
    /// use std::sync::Arc;
    /// let store = Arc::new(MockRecordStore::default());
    /// let owner = store.seed_user("Ann", "ann@example.com");
    /// let svc = PlaceService::new(store.clone(), Arc::new(MockMediaStore::default()), Arc::new(MockLookup::default()));
    /// let who = Identity { user_id: owner.id, email: owner.email.clone() };
    /// let draft = PlaceDraft { title: "Park".into(), description: "A nice park".into(), address: "1 Main St".into() };
    /// let place = tokio_test::block_on(svc.create_place(&who, draft, None)).unwrap();
    /// assert_eq!(store.user(owner.id).unwrap().place_ids, vec![place.id]);
    /// ```
    #[instrument(skip(self, draft, image), fields(user_id = %who.user_id, title = %draft.title))]
    pub async fn create_place(&self, who: &Identity, draft: PlaceDraft, image: Option<ImageUpload>) -> Result<Place, PlaceError> {
        draft.validate()?;

        let resolved = self.lookup.resolve(&draft.address).await?;
        let media = self.upload_image(image, &resolved).await?;

        let creator = match self.store.find_user(who.user_id).await {
            Ok(Some(u)) => u,
            Ok(None) => {
                release_orphan(self.media.as_ref(), &media.id, "creator_not_found").await;
                return Err(PlaceError::CreatorNotFound);
            }
            Err(e) => {
                release_orphan(self.media.as_ref(), &media.id, "creator_lookup_failed").await;
                return Err(PlaceError::Persistence(e.to_string()));
            }
        };

        let place = Place {
            id: Uuid::new_v4(),
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            address: resolved.formatted_address,
            image: media,
            location: resolved.location,
            creator_id: creator.id,
        };

        match self.store.insert_place_linked(&place).await {
            Ok(saved) => {
                PLACES_CREATED_TOTAL.inc();
                info!(place_id = %saved.id, media_id = %saved.image.id, "place_created");
                Ok(saved)
            }
            Err(e) => {
                // The image must not outlive the failed transaction.
                release_orphan(self.media.as_ref(), &place.image.id, "create_rolled_back").await;
                Err(match e {
                    StoreError::NotFound(_) => PlaceError::CreatorNotFound,
                    StoreError::Validation(m) => PlaceError::Validation(m),
                    other => PlaceError::Persistence(other.to_string()),
                })
            }
        }
    }

    async fn upload_image(&self, image: Option<ImageUpload>, resolved: &ResolvedAddress) -> Result<MediaRef, PlaceError> {
        let payload = match image {
            Some(img) => img,
            None => {
                let reference = resolved.photo_reference.as_deref().ok_or(LookupError::NoPhoto)?;
                debug!("no image supplied, using lookup photo");
                self.lookup.fetch_photo(reference).await?
            }
        };
        Ok(self.media.upload(&payload).await?)
    }

    /// Change title and description. Only the creator may update; no media
    /// is touched.
    #[instrument(skip(self, changes), fields(user_id = %who.user_id, %place_id))]
    pub async fn update_place(&self, who: &Identity, place_id: Uuid, changes: PlaceChanges) -> Result<Place, PlaceError> {
        changes.validate()?;
        let place = self
            .store
            .find_place(place_id)
            .await
            .map_err(|e| PlaceError::Persistence(e.to_string()))?
            .ok_or(PlaceError::PlaceNotFound)?;
        if place.creator_id != who.user_id {
            warn!(owner = %place.creator_id, "update by non-creator rejected");
            return Err(PlaceError::Forbidden);
        }
        let updated = self.store.update_place_details(place_id, &changes).await.map_err(|e| match e {
            StoreError::NotFound(_) => PlaceError::PlaceNotFound,
            StoreError::Validation(m) => PlaceError::Validation(m),
            other => PlaceError::Persistence(other.to_string()),
        })?;
        info!(place_id = %updated.id, "place_updated");
        Ok(updated)
    }

    /// Delete a place owned by `who`.
    ///
    /// The place row and the creator's back-reference go in one transaction;
    /// the image is deleted only after that commit. If the image delete
    /// fails the blob is orphaned (logged and counted) and the delete still
    /// succeeds.
    #[instrument(skip(self), fields(user_id = %who.user_id, %place_id))]
    pub async fn delete_place(&self, who: &Identity, place_id: Uuid) -> Result<(), PlaceError> {
        let place = self
            .store
            .find_place(place_id)
            .await
            .map_err(|e| PlaceError::Persistence(e.to_string()))?
            .ok_or(PlaceError::PlaceNotFound)?;
        if place.creator_id != who.user_id {
            warn!(owner = %place.creator_id, "delete by non-creator rejected");
            return Err(PlaceError::Forbidden);
        }

        self.store.delete_place_linked(place.id, place.creator_id).await.map_err(|e| match e {
            StoreError::NotFound(_) => PlaceError::PlaceNotFound,
            other => PlaceError::Persistence(other.to_string()),
        })?;
        PLACES_DELETED_TOTAL.inc();
        info!(place_id = %place.id, "place_deleted");

        if let Err(e) = self.media.delete(&place.image.id).await {
            MEDIA_ORPHANED_TOTAL.inc();
            warn!(place_id = %place.id, media_id = %place.image.id, error = %e, "media_orphaned");
        }
        Ok(())
    }
}
