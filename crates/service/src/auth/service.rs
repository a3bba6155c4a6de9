use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use rand::rngs::OsRng;
use tracing::{info, debug, instrument};

use super::domain::{AuthSession, LoginInput, SignupInput};
use super::errors::AuthError;
use super::gate::CredentialGate;
use crate::domain::{NewUserRecord, User};
use crate::media::{release_orphan, MediaStore};
use crate::store::RecordStore;

pub const PASSWORD_MIN_LEN: usize = 6;

/// Signup/login/listing, independent of web framework
pub struct AuthService<R: RecordStore + ?Sized> {
    repo: Arc<R>,
    media: Arc<dyn MediaStore>,
    gate: CredentialGate,
}

impl<R: RecordStore + ?Sized> AuthService<R> {
    pub fn new(repo: Arc<R>, media: Arc<dyn MediaStore>, gate: CredentialGate) -> Self { Self { repo, media, gate } }

    pub fn gate(&self) -> &CredentialGate { &self.gate }

    /// Register a new user with a hashed password and an optional avatar.
    ///
    /// The avatar is uploaded before the user row is written; if the write
    /// fails the avatar is released again.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthService, CredentialGate, domain::SignupInput};
    /// use service::store::mock::MockRecordStore;
    /// use service::media::mock::MockMediaStore;
    /// use std::sync::Arc;
    /// let svc = AuthService::new(Arc::new(MockRecordStore::default()), Arc::new(MockMediaStore::default()), CredentialGate::new("secret", 3600));
    /// let input = SignupInput { name: "Test".into(), email: "User@Example.com".into(), password: "Secret1".into(), image: None };
    /// let session = tokio_test::block_on(svc.signup(input)).unwrap();
    /// assert_eq!(session.user.email, "user@example.com");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn signup(&self, input: SignupInput) -> Result<AuthSession, AuthError> {
        models::user::validate_name(&input.name).map_err(|e| AuthError::Validation(e.to_string()))?;
        models::user::validate_email(&input.email).map_err(|e| AuthError::Validation(e.to_string()))?;
        if input.password.chars().count() < PASSWORD_MIN_LEN {
            return Err(AuthError::Validation(format!("password too short (>={PASSWORD_MIN_LEN})")));
        }
        let email = models::user::normalize_email(&input.email);
        if let Some(existing) = self.repo.find_user_by_email(&email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let image = match &input.image {
            Some(img) => Some(self.media.upload(img).await?),
            None => None,
        };

        let record = NewUserRecord { name: input.name.trim().to_string(), email, password_hash: hash, image: image.clone() };
        let user = match self.repo.insert_user(record).await {
            Ok(u) => u,
            Err(e) => {
                if let Some(img) = &image {
                    release_orphan(self.media.as_ref(), &img.id, "signup_failed").await;
                }
                return Err(e.into());
            }
        };

        let token = self.gate.issue(user.id, &user.email)?;
        info!(user_id = %user.id, email = %user.email, "user_registered");
        Ok(AuthSession { user, token })
    }

    /// Authenticate by email and password and issue a token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthService, CredentialGate, domain::{SignupInput, LoginInput}};
    /// use service::store::mock::MockRecordStore;
    /// use service::media::mock::MockMediaStore;
    /// use std::sync::Arc;
    /// let svc = AuthService::new(Arc::new(MockRecordStore::default()), Arc::new(MockMediaStore::default()), CredentialGate::new("secret", 3600));
    /// let _ = tokio_test::block_on(svc.signup(SignupInput { name: "N".into(), email: "u@e.com".into(), password: "Passw0rd".into(), image: None }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self.repo
            .find_user_by_email(&input.email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&user.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }

        let token = self.gate.issue(user.id, &user.email)?;
        info!(user_id = %user.id, "user_logged_in");
        Ok(AuthSession { user, token })
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AuthError> {
        Ok(self.repo.list_users().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::mock::MockMediaStore;
    use crate::store::mock::MockRecordStore;
    use crate::test_support::png_upload;

    fn svc(store: Arc<MockRecordStore>, media: Arc<MockMediaStore>) -> AuthService<MockRecordStore> {
        AuthService::new(store, media, CredentialGate::new("svc-secret", 3600))
    }

    fn input(email: &str) -> SignupInput {
        SignupInput { name: "Ann".into(), email: email.into(), password: "hunter22".into(), image: None }
    }

    #[tokio::test]
    async fn signup_then_login_issues_verifiable_tokens() {
        let (store, media) = (Arc::new(MockRecordStore::default()), Arc::new(MockMediaStore::default()));
        let s = svc(store.clone(), media);
        let session = s.signup(input("ann@example.com")).await.unwrap();
        assert!(session.user.password_hash.starts_with("$argon2"));
        let who = s.gate().verify_token(&session.token).unwrap();
        assert_eq!(who.user_id, session.user.id);

        let again = s.login(LoginInput { email: " ANN@example.com ".into(), password: "hunter22".into() }).await.unwrap();
        assert_eq!(again.user.id, session.user.id);
        assert!(matches!(
            s.login(LoginInput { email: "ann@example.com".into(), password: "wrong-pass".into() }).await,
            Err(AuthError::Unauthorized)
        ));
        assert!(matches!(
            s.login(LoginInput { email: "nobody@example.com".into(), password: "hunter22".into() }).await,
            Err(AuthError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn signup_validates_and_rejects_duplicates() {
        let (store, media) = (Arc::new(MockRecordStore::default()), Arc::new(MockMediaStore::default()));
        let s = svc(store, media.clone());
        assert!(matches!(s.signup(SignupInput { password: "12345".into(), ..input("a@example.com") }).await, Err(AuthError::Validation(_))));
        assert!(matches!(s.signup(input("not-an-email")).await, Err(AuthError::Validation(_))));
        assert!(matches!(s.signup(SignupInput { name: " ".into(), ..input("a@example.com") }).await, Err(AuthError::Validation(_))));

        s.signup(input("a@example.com")).await.unwrap();
        let dup = SignupInput { image: Some(png_upload()), ..input("A@Example.com") };
        assert!(matches!(s.signup(dup).await, Err(AuthError::Conflict)));
        assert_eq!(media.calls(), 0);
    }

    #[tokio::test]
    async fn failed_insert_releases_uploaded_avatar() {
        let (store, media) = (Arc::new(MockRecordStore::default()), Arc::new(MockMediaStore::default()));
        store.fail_writes(true);
        let s = svc(store.clone(), media.clone());
        let err = s.signup(SignupInput { image: Some(png_upload()), ..input("b@example.com") }).await.unwrap_err();
        assert!(matches!(err, AuthError::Persistence(_)));
        assert_eq!(media.deletes(), vec!["m1".to_string()]);
        assert_eq!(media.stored_count(), 0);
    }

    #[tokio::test]
    async fn listed_users_serialize_without_password_hash() {
        let (store, media) = (Arc::new(MockRecordStore::default()), Arc::new(MockMediaStore::default()));
        let s = svc(store, media);
        s.signup(input("c@example.com")).await.unwrap();
        let users = s.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        let json = serde_json::to_string(&users).unwrap();
        assert!(!json.contains("argon2"));
    }
}
