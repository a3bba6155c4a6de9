#![cfg(test)]
use tokio::sync::OnceCell;
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use uuid::Uuid;

use crate::domain::{ImageUpload, Location, MediaRef, Place};

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    MIGRATED
        .get_or_init(|| async {
            let db = models::db::connect().await.expect("connect db for migration");
            migration::Migrator::up(&db, None).await.expect("migrate up");
            drop(db);
        })
        .await;

    // Return a fresh connection for the current test's runtime
    models::db::connect().await
}

pub fn sample_place(creator_id: Uuid) -> Place {
    let id = Uuid::new_v4();
    Place {
        id,
        title: "Park".into(),
        description: "A nice park".into(),
        address: "1 Main St".into(),
        image: MediaRef { id: format!("img-{id}"), url: format!("https://media.example.com/img-{id}") },
        location: Location { lat: 40.7484, lng: -73.9857 },
        creator_id,
    }
}

/// Smallest payload that passes the MIME/size checks.
pub fn png_upload() -> ImageUpload {
    ImageUpload { bytes: b"\x89PNG\r\n\x1a\nfake".to_vec(), content_type: "image/png".into() }
}
