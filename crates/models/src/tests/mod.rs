

use crate::db::connect;
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;

/// Connect and make sure the schema is current.
pub(crate) async fn setup_test_db() -> anyhow::Result<DatabaseConnection> {
    let db = connect().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub(crate) async fn create_test_user(db: &DatabaseConnection) -> anyhow::Result<crate::user::Model> {
    let email = format!("user_{}@example.com", uuid::Uuid::new_v4());
    let u = crate::user::create(db, crate::user::NewUser {
        name: "Test User",
        email: &email,
        password_hash: "$argon2id$dummy",
        image_id: None,
        image_url: None,
    }).await?;
    Ok(u)
}
