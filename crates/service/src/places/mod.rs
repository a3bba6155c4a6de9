//! Place write coordinator and read path.
//!
//! Three resources fail independently here: the record store, the media
//! store, and the caller's token. The token is checked by the gate before
//! anything runs. The other two are kept consistent with a two-phase
//! protocol:
//!
//! - **create**: upload first, then commit the place and the creator's
//!   back-reference in one transaction. If the transaction fails, the upload
//!   is released before the error is returned (eager compensation).
//! - **delete**: commit the removal of the place and the back-reference in
//!   one transaction, and only then delete the image. A failed image delete
//!   leaves an orphaned blob that is logged and counted; the operation still
//!   succeeds (best-effort cleanup).
//!
//! A record therefore never references an image that was not uploaded, and
//! an image is never deleted while a committed record references it.

mod queries;
pub mod service;

pub use service::PlaceService;
