//! Record store: the `users` and `places` collections.
//!
//! Point lookups and single-document writes are plain calls. The two writes
//! that touch both collections (`insert_place_linked`, `delete_place_linked`)
//! run inside one transaction each: either both the place row and the
//! creator's `place_ids` change, or neither does.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{NewUserRecord, Place, PlaceChanges, User};
use crate::errors::StoreError;

pub mod seaorm;

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_place(&self, id: Uuid) -> Result<Option<Place>, StoreError>;
    async fn find_places_by_creator(&self, creator_id: Uuid) -> Result<Vec<Place>, StoreError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    async fn insert_user(&self, new: NewUserRecord) -> Result<User, StoreError>;

    /// Single-document write of the mutable place fields.
    async fn update_place_details(&self, id: Uuid, changes: &PlaceChanges) -> Result<Place, StoreError>;

    /// Insert `place` and append its id to the creator's `place_ids`, atomically.
    /// `NotFound` when the creator does not exist.
    async fn insert_place_linked(&self, place: &Place) -> Result<Place, StoreError>;

    /// Remove `place_id` from the creator's `place_ids` and delete the place, atomically.
    /// `NotFound` when no such place is owned by `creator_id`.
    async fn delete_place_linked(&self, place_id: Uuid, creator_id: Uuid) -> Result<(), StoreError>;
}

/// Simple in-memory mock store for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default, Clone)]
    struct Collections {
        users: HashMap<Uuid, User>,
        places: HashMap<Uuid, Place>,
    }

    /// Transactions run against a copy of the collections that is swapped in
    /// only on success, so an injected failure leaves no partial write.
    #[derive(Default)]
    pub struct MockRecordStore {
        data: Mutex<Collections>,
        fail_transactions: AtomicBool,
        fail_writes: AtomicBool,
    }

    impl MockRecordStore {
        /// Make every subsequent transactional write abort at commit time.
        pub fn fail_transactions(&self, on: bool) { self.fail_transactions.store(on, Ordering::SeqCst); }

        /// Make every subsequent single-document write fail.
        pub fn fail_writes(&self, on: bool) { self.fail_writes.store(on, Ordering::SeqCst); }

        pub fn seed_user(&self, name: &str, email: &str) -> User {
            let user = User {
                id: Uuid::new_v4(),
                name: name.to_string(),
                email: models::user::normalize_email(email),
                password_hash: String::new(),
                image: None,
                place_ids: vec![],
            };
            self.data.lock().unwrap().users.insert(user.id, user.clone());
            user
        }

        /// Insert a place bypassing the transactional path (for fixtures).
        pub fn seed_place(&self, place: Place) {
            let mut data = self.data.lock().unwrap();
            if let Some(u) = data.users.get_mut(&place.creator_id) {
                u.place_ids.push(place.id);
            }
            data.places.insert(place.id, place);
        }

        pub fn user(&self, id: Uuid) -> Option<User> { self.data.lock().unwrap().users.get(&id).cloned() }

        pub fn place(&self, id: Uuid) -> Option<Place> { self.data.lock().unwrap().places.get(&id).cloned() }

        pub fn place_count(&self) -> usize { self.data.lock().unwrap().places.len() }

        /// Check the bidirectional place/user reference in both directions.
        pub fn check_backrefs(&self) -> Result<(), String> {
            let data = self.data.lock().unwrap();
            for p in data.places.values() {
                let owner = data.users.get(&p.creator_id).ok_or_else(|| format!("place {} has no creator", p.id))?;
                if !owner.place_ids.contains(&p.id) {
                    return Err(format!("user {} does not list place {}", owner.id, p.id));
                }
            }
            for u in data.users.values() {
                for pid in &u.place_ids {
                    match data.places.get(pid) {
                        Some(p) if p.creator_id == u.id => {}
                        _ => return Err(format!("user {} lists dangling place {}", u.id, pid)),
                    }
                }
            }
            Ok(())
        }

        fn transact<T>(&self, f: impl FnOnce(&mut Collections) -> Result<T, StoreError>) -> Result<T, StoreError> {
            let mut data = self.data.lock().unwrap();
            let mut draft = data.clone();
            let out = f(&mut draft)?;
            if self.fail_transactions.load(Ordering::SeqCst) {
                return Err(StoreError::Db("transaction aborted".into()));
            }
            *data = draft;
            Ok(out)
        }
    }

    #[async_trait]
    impl RecordStore for MockRecordStore {
        async fn find_place(&self, id: Uuid) -> Result<Option<Place>, StoreError> {
            Ok(self.place(id))
        }

        async fn find_places_by_creator(&self, creator_id: Uuid) -> Result<Vec<Place>, StoreError> {
            let data = self.data.lock().unwrap();
            Ok(data.places.values().filter(|p| p.creator_id == creator_id).cloned().collect())
        }

        async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
            Ok(self.user(id))
        }

        async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
            let email = models::user::normalize_email(email);
            let data = self.data.lock().unwrap();
            Ok(data.users.values().find(|u| u.email == email).cloned())
        }

        async fn list_users(&self) -> Result<Vec<User>, StoreError> {
            Ok(self.data.lock().unwrap().users.values().cloned().collect())
        }

        async fn insert_user(&self, new: NewUserRecord) -> Result<User, StoreError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Db("write failed".into()));
            }
            let mut data = self.data.lock().unwrap();
            let email = models::user::normalize_email(&new.email);
            if data.users.values().any(|u| u.email == email) {
                return Err(StoreError::Conflict(format!("email {email} already registered")));
            }
            let user = User {
                id: Uuid::new_v4(),
                name: new.name,
                email,
                password_hash: new.password_hash,
                image: new.image,
                place_ids: vec![],
            };
            data.users.insert(user.id, user.clone());
            Ok(user)
        }

        async fn update_place_details(&self, id: Uuid, changes: &PlaceChanges) -> Result<Place, StoreError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Db("write failed".into()));
            }
            let mut data = self.data.lock().unwrap();
            let place = data.places.get_mut(&id).ok_or_else(|| StoreError::NotFound(format!("place {id}")))?;
            place.title = changes.title.trim().to_string();
            place.description = changes.description.trim().to_string();
            Ok(place.clone())
        }

        async fn insert_place_linked(&self, place: &Place) -> Result<Place, StoreError> {
            self.transact(|data| {
                let creator = data
                    .users
                    .get_mut(&place.creator_id)
                    .ok_or_else(|| StoreError::NotFound(format!("user {}", place.creator_id)))?;
                if !creator.place_ids.contains(&place.id) {
                    creator.place_ids.push(place.id);
                }
                data.places.insert(place.id, place.clone());
                Ok(place.clone())
            })
        }

        async fn delete_place_linked(&self, place_id: Uuid, creator_id: Uuid) -> Result<(), StoreError> {
            self.transact(|data| {
                if let Some(creator) = data.users.get_mut(&creator_id) {
                    creator.place_ids.retain(|p| *p != place_id);
                }
                match data.places.get(&place_id) {
                    Some(p) if p.creator_id == creator_id => {
                        data.places.remove(&place_id);
                        Ok(())
                    }
                    _ => Err(StoreError::NotFound(format!("place {place_id}"))),
                }
            })
        }
    }
}
