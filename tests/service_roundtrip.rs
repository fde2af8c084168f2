//! End-to-end tests driving both services and the real client workflows

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;
use veristore::client::{self, ClientContext, FileTransferClient, VerifierApiClient};
use veristore::core::error::{ErrorKind, VeristoreError};
use veristore::core::types::Hash;
use veristore::proofstore::ProofStore;
use veristore::proofstore::MemoryProofStore;
use veristore::storage::{BucketStore, StorageState};
use veristore::verifier::{StorageApiClient, VerifierState};
use veristore::wire::{STATUS_INTERNAL, STATUS_MATCH, STATUS_MISMATCH};

const TENANT: &str = "t1";

struct Harness {
    _storage_dir: TempDir,
    storage_root: PathBuf,
    download_dir: TempDir,
    verifier_url: String,
    ctx: ClientContext,
}

async fn spawn(app: axum::Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn harness() -> Harness {
    let storage_dir = TempDir::new().unwrap();
    let storage_root = storage_dir.path().to_path_buf();

    let storage_state = Arc::new(StorageState::new(BucketStore::new(storage_root.clone())));
    let storage_url = spawn(veristore::storage::router(storage_state)).await;

    let store: Arc<dyn ProofStore> = Arc::new(MemoryProofStore::new());
    let verifier_state = VerifierState::new(store, StorageApiClient::new(&storage_url));
    let verifier_url = spawn(veristore::verifier::router(Arc::new(verifier_state))).await;

    let ctx = ClientContext::new(
        VerifierApiClient::new(&verifier_url),
        FileTransferClient::new(&storage_url, 64 * 1024).unwrap(),
        TENANT,
    );

    Harness {
        _storage_dir: storage_dir,
        storage_root,
        download_dir: TempDir::new().unwrap(),
        verifier_url,
        ctx,
    }
}

/// A well-formed fileset id that no attested fileset answers to
fn unattested_fileset_id() -> String {
    format!("fs-{}", "00".repeat(32))
}

#[tokio::test]
async fn two_file_upload_then_verified_downloads() {
    let h = harness().await;
    let scratch = TempDir::new().unwrap();
    let src = scratch.path().join("fileset");
    fs::create_dir(&src).unwrap();
    fs::write(src.join("a.txt"), b"hello").unwrap();
    fs::write(src.join("b.txt"), b"world").unwrap();

    let summary = client::upload_fileset(&h.ctx, &src, 4, false).await.unwrap();
    assert_eq!(summary.file_count, 2);
    assert!(summary.fileset_id.starts_with("fs-"));
    assert_eq!(summary.fileset_id.len(), 3 + 64);
    assert!(!src.exists(), "local source must be erased after attestation");

    let first = client::download_file(&h.ctx, &summary.fileset_id, 0, h.download_dir.path())
        .await
        .unwrap();
    assert_eq!(first.file_name, "a.txt");
    assert_eq!(fs::read(&first.path).unwrap(), b"hello");
    assert!(first
        .path
        .starts_with(h.download_dir.path().join(&summary.fileset_id)));

    let second = client::download_file(&h.ctx, &summary.fileset_id, 1, h.download_dir.path())
        .await
        .unwrap();
    assert_eq!(second.file_name, "b.txt");
    assert_eq!(fs::read(&second.path).unwrap(), b"world");
}

#[tokio::test]
async fn single_file_fileset_is_rejected_client_side() {
    let h = harness().await;
    let scratch = TempDir::new().unwrap();
    let src = scratch.path().join("fileset");
    fs::create_dir(&src).unwrap();
    fs::write(src.join("only.txt"), b"alone").unwrap();

    let err = client::upload_fileset(&h.ctx, &src, 4, false)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(src.exists(), "failed upload must not erase the source");
}

#[tokio::test]
async fn single_file_attestation_fails_internally() {
    // Driving the protocol by hand around the client-side N >= 2 check:
    // the engine on the verifier rejects the one-leaf tree.
    let h = harness().await;
    let fileset_id = unattested_fileset_id();
    let bucket_id = h
        .ctx
        .verifier
        .allocate_bucket(TENANT, &fileset_id)
        .await
        .unwrap();
    assert_eq!(bucket_id, format!("{TENANT}_{fileset_id}"));

    let scratch = TempDir::new().unwrap();
    let file = scratch.path().join("only.txt");
    fs::write(&file, b"alone").unwrap();
    h.ctx.transfer.upload_file(&bucket_id, &file).await.unwrap();

    let resp = h
        .ctx
        .verifier
        .attest_upload(TENANT, &fileset_id, Hash::zero())
        .await
        .unwrap();
    assert_eq!(resp.status, STATUS_INTERNAL);
}

#[tokio::test]
async fn tampered_file_fails_verification_on_download() {
    let h = harness().await;
    let scratch = TempDir::new().unwrap();
    let src = scratch.path().join("fileset");
    fs::create_dir(&src).unwrap();
    fs::write(src.join("a.txt"), b"hello").unwrap();
    fs::write(src.join("b.txt"), b"world").unwrap();

    let summary = client::upload_fileset(&h.ctx, &src, 2, false).await.unwrap();

    // Corrupt the stored copy behind the service's back.
    let stored = h
        .storage_root
        .join(format!("{TENANT}_{}", summary.fileset_id))
        .join("b.txt");
    fs::write(&stored, b"WORLD").unwrap();

    let err = client::download_file(&h.ctx, &summary.fileset_id, 1, h.download_dir.path())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Integrity);
    assert!(matches!(err, VeristoreError::VerificationFailed { .. }));

    // The untouched file still verifies.
    let ok = client::download_file(&h.ctx, &summary.fileset_id, 0, h.download_dir.path())
        .await
        .unwrap();
    assert_eq!(fs::read(&ok.path).unwrap(), b"hello");
}

#[tokio::test]
async fn wrong_root_attestation_leaves_no_proofs() {
    let h = harness().await;
    let fileset_id = unattested_fileset_id();
    let bucket_id = h
        .ctx
        .verifier
        .allocate_bucket(TENANT, &fileset_id)
        .await
        .unwrap();

    let scratch = TempDir::new().unwrap();
    for (name, content) in [("a.txt", "one"), ("b.txt", "two")] {
        let path = scratch.path().join(name);
        fs::write(&path, content).unwrap();
        h.ctx.transfer.upload_file(&bucket_id, &path).await.unwrap();
    }

    // The zero root matches nothing the storage side can compute.
    let resp = h
        .ctx
        .verifier
        .attest_upload(TENANT, &fileset_id, Hash::zero())
        .await
        .unwrap();
    assert_eq!(resp.status, STATUS_MISMATCH);

    let err = h
        .ctx
        .verifier
        .download_info(TENANT, &fileset_id, 0)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FailedPrecondition);
    match err {
        VeristoreError::RemoteRejected { status, .. } => assert_eq!(status, 412),
        other => panic!("expected RemoteRejected, got {other:?}"),
    }
}

#[tokio::test]
async fn reattestation_is_idempotent() {
    let h = harness().await;
    let scratch = TempDir::new().unwrap();
    let src = scratch.path().join("fileset");
    fs::create_dir(&src).unwrap();
    fs::write(src.join("a.txt"), b"one").unwrap();
    fs::write(src.join("b.txt"), b"two").unwrap();
    fs::write(src.join("c.txt"), b"three").unwrap();

    let summary = client::upload_fileset(&h.ctx, &src, 2, false).await.unwrap();
    let before = h
        .ctx
        .verifier
        .download_info(TENANT, &summary.fileset_id, 1)
        .await
        .unwrap();

    let resp = h
        .ctx
        .verifier
        .attest_upload(TENANT, &summary.fileset_id, summary.root)
        .await
        .unwrap();
    assert_eq!(resp.status, STATUS_MATCH);

    let after = h
        .ctx
        .verifier
        .download_info(TENANT, &summary.fileset_id, 1)
        .await
        .unwrap();
    assert_eq!(before.bucket_id, after.bucket_id);
    assert_eq!(before.proof, after.proof);
}

#[tokio::test]
async fn fifty_concurrent_uploads_roundtrip() {
    let h = harness().await;
    let scratch = TempDir::new().unwrap();
    let src = scratch.path().join("fileset");
    fs::create_dir(&src).unwrap();

    let mut expected: Vec<(String, Vec<u8>)> = (0..50)
        .map(|i| {
            let name = format!("f{i:02}.txt");
            let content = format!("payload #{i}").into_bytes();
            (name, content)
        })
        .collect();
    expected.sort_by(|a, b| a.0.cmp(&b.0));
    for (name, content) in &expected {
        fs::write(src.join(name), content).unwrap();
    }

    let summary = client::upload_fileset(&h.ctx, &src, 8, false).await.unwrap();
    assert_eq!(summary.file_count, 50);

    for (index, (name, content)) in expected.iter().enumerate() {
        let downloaded =
            client::download_file(&h.ctx, &summary.fileset_id, index, h.download_dir.path())
                .await
                .unwrap();
        assert_eq!(&downloaded.file_name, name, "index {index}");
        assert_eq!(&fs::read(&downloaded.path).unwrap(), content);
    }
}

#[tokio::test]
async fn out_of_range_download_index_is_not_found() {
    let h = harness().await;
    let scratch = TempDir::new().unwrap();
    let src = scratch.path().join("fileset");
    fs::create_dir(&src).unwrap();
    fs::write(src.join("a.txt"), b"one").unwrap();
    fs::write(src.join("b.txt"), b"two").unwrap();

    let summary = client::upload_fileset(&h.ctx, &src, 2, false).await.unwrap();
    let bucket_id = format!("{TENANT}_{}", summary.fileset_id);

    let err = h
        .ctx
        .transfer
        .download_file(&bucket_id, 99, h.download_dir.path())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn negative_file_index_is_invalid_argument() {
    let h = harness().await;
    let url = format!(
        "{}/v1/download-info?tenant_id={TENANT}&fileset_id={}&file_index=-1",
        h.verifier_url,
        unattested_fileset_id()
    );
    let resp = reqwest::get(&url).await.unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn ping_roundtrip() {
    let h = harness().await;
    let message = h.ctx.verifier.ping("integration test").await.unwrap();
    assert!(message.contains("Hello"));
}
