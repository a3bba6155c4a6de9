//! Auth module: credential gate plus signup/login/list-users workflows.
//!
//! The gate is stateless and framework-independent; the HTTP layer wraps it
//! in a middleware.

pub mod domain;
pub mod errors;
pub mod gate;
pub mod service;

pub use gate::CredentialGate;
pub use service::AuthService;
