//! Service layer for placeshare.
//! - `auth`: credential gate (bearer token verification/issuing) and user signup/login.
//! - `store`: the record store over the `users` and `places` collections.
//! - `media`: image upload/delete against the media store, plus compensation.
//! - `lookup`: address resolution collaborator.
//! - `places`: the write coordinator and the read path for places.

pub mod errors;
pub mod domain;
pub mod auth;
pub mod store;
pub mod media;
pub mod lookup;
pub mod places;
#[cfg(test)]
pub mod test_support;
