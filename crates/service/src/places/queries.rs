use tracing::instrument;
use uuid::Uuid;

use super::service::PlaceService;
use crate::domain::Place;
use crate::errors::PlaceError;

impl PlaceService {
    pub async fn get_place(&self, place_id: Uuid) -> Result<Place, PlaceError> {
        self.store
            .find_place(place_id)
            .await
            .map_err(|e| PlaceError::Persistence(e.to_string()))?
            .ok_or(PlaceError::PlaceNotFound)
    }

    /// Places created by `user_id`. An unknown user is `UserNotFound`; a
    /// known user with no places yields an empty list.
    #[instrument(skip(self))]
    pub async fn places_by_user(&self, user_id: Uuid) -> Result<Vec<Place>, PlaceError> {
        let exists = self
            .store
            .find_user(user_id)
            .await
            .map_err(|e| PlaceError::Persistence(e.to_string()))?
            .is_some();
        if !exists {
            return Err(PlaceError::UserNotFound);
        }
        self.store
            .find_places_by_creator(user_id)
            .await
            .map_err(|e| PlaceError::Persistence(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::lookup::mock::MockLookup;
    use crate::media::mock::MockMediaStore;
    use crate::store::mock::MockRecordStore;
    use crate::test_support::sample_place;

    fn svc(store: Arc<MockRecordStore>) -> PlaceService {
        PlaceService::new(store, Arc::new(MockMediaStore::default()), Arc::new(MockLookup::default()))
    }

    #[tokio::test]
    async fn get_place_found_and_missing() {
        let store = Arc::new(MockRecordStore::default());
        let u = store.seed_user("Ann", "ann@example.com");
        let p = sample_place(u.id);
        store.seed_place(p.clone());
        let s = svc(store);
        assert_eq!(s.get_place(p.id).await.unwrap(), p);
        assert!(matches!(s.get_place(Uuid::new_v4()).await, Err(PlaceError::PlaceNotFound)));
    }

    #[tokio::test]
    async fn places_by_user_distinguishes_unknown_user_from_empty() {
        let store = Arc::new(MockRecordStore::default());
        let ann = store.seed_user("Ann", "ann@example.com");
        let bob = store.seed_user("Bob", "bob@example.com");
        let p = sample_place(ann.id);
        store.seed_place(p.clone());
        let s = svc(store);

        assert_eq!(s.places_by_user(ann.id).await.unwrap(), vec![p]);
        assert!(s.places_by_user(bob.id).await.unwrap().is_empty());
        assert!(matches!(s.places_by_user(Uuid::new_v4()).await, Err(PlaceError::UserNotFound)));
    }
}
