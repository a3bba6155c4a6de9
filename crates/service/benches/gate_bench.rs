use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use service::auth::CredentialGate;
use service::domain::{Identity, PlaceDraft, ImageUpload};
use service::lookup::mock::MockLookup;
use service::media::mock::MockMediaStore;
use service::places::PlaceService;
use service::store::mock::MockRecordStore;

fn bench_authenticate(c: &mut Criterion) {
    let gate = CredentialGate::new("secret", 3600);
    let token = gate.issue(uuid::Uuid::new_v4(), "bench@example.com").unwrap();
    let header = format!("Bearer {token}");

    c.bench_function("gate_authenticate", |b| {
        b.iter(|| {
            let _ = gate.authenticate("POST", Some(&header)).unwrap();
        });
    });
}

fn bench_create_delete(c: &mut Criterion) {
    let store = Arc::new(MockRecordStore::default());
    let owner = store.seed_user("Bench", "bench@example.com");
    let svc = PlaceService::new(store, Arc::new(MockMediaStore::default()), Arc::new(MockLookup::default()));
    let who = Identity { user_id: owner.id, email: owner.email.clone() };
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("place_create_delete_mock", |b| {
        b.iter(|| {
            rt.block_on(async {
                let draft = PlaceDraft { title: "Park".into(), description: "A nice park".into(), address: "1 Main St".into() };
                let img = ImageUpload { bytes: vec![0x89, b'P', b'N', b'G'], content_type: "image/png".into() };
                let p = svc.create_place(&who, draft, Some(img)).await.unwrap();
                svc.delete_place(&who, p.id).await.unwrap();
            })
        });
    });
}

criterion_group!(benches, bench_authenticate, bench_create_delete);
criterion_main!(benches);
