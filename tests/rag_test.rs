mod common;

use std::{fs, sync::Arc};

use axum::http::StatusCode;
use brainops_api::rag::{embedding::DisabledProvider, IngestOptions, Ingestor};
use common::TestApp;
use serde_json::json;

fn options() -> IngestOptions {
    IngestOptions {
        chunk_size: 200,
        chunk_overlap: 40,
        extensions: vec!["md".into(), "txt".into()],
        max_file_bytes: 64 * 1024,
        batch_size: 8,
    }
}

#[tokio::test]
async fn ingested_documents_are_searchable_per_tenant() {
    let app = TestApp::new().await;
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("flashing.md"),
        "Step flashing is installed where a roof plane meets a sidewall. \
         Each piece of step flashing overlaps the one below it.",
    )
    .unwrap();
    fs::write(
        dir.path().join("warranty.txt"),
        "The manufacturer warranty covers shingles for thirty years when \
         installed with the full accessory system.",
    )
    .unwrap();
    fs::write(dir.path().join("photo.jpg"), [0xFF, 0xD8, 0xFF]).unwrap();

    let ingestor = Ingestor::new(app.state.db.clone(), app.state.embedder.clone(), options())
        .expect("valid options");
    let report = ingestor
        .ingest_path(app.tenant, dir.path())
        .await
        .expect("ingest succeeds");
    assert_eq!(report.files_seen, 3);
    assert_eq!(report.files_ingested, 2);
    assert_eq!(report.files_skipped, 1);
    assert!(report.chunks_written >= 2);
    assert!(report.errors.is_empty(), "{:?}", report.errors);

    let (status, body) = app
        .post(
            "/api/v1/rag/search",
            json!({ "query": "step flashing sidewall", "top_k": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let hits = body["data"]["hits"].as_array().expect("hits");
    assert_eq!(hits.len(), 1);
    assert!(hits[0]["path"].as_str().unwrap().ends_with("flashing.md"));
    assert!(hits[0]["content"].as_str().unwrap().contains("Step flashing"));

    let (status, body) = app.get("/api/v1/rag/documents").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);

    // Another tenant sees nothing
    let (status, body) = app
        .request_as(
            uuid::Uuid::new_v4(),
            axum::http::Method::POST,
            "/api/v1/rag/search",
            Some(json!({ "query": "step flashing" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["hits"], json!([]));

    // Unchanged files are skipped on the next run
    let again = ingestor.ingest_path(app.tenant, dir.path()).await.unwrap();
    assert_eq!(again.files_unchanged, 2);
    assert_eq!(again.chunks_written, 0);
}

#[tokio::test]
async fn documents_ingested_before_embeddings_become_searchable() {
    let app = TestApp::new().await;
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("ventilation.md"),
        "Balanced attic ventilation pairs soffit intake with ridge exhaust.",
    )
    .unwrap();

    let text_only = Ingestor::new(
        app.state.db.clone(),
        Arc::new(DisabledProvider),
        options(),
    )
    .expect("valid options");
    text_only.ingest_path(app.tenant, dir.path()).await.unwrap();

    let (_, body) = app
        .post("/api/v1/rag/search", json!({ "query": "ridge exhaust" }))
        .await;
    assert_eq!(body["data"]["hits"], json!([]));

    let ingestor = Ingestor::new(app.state.db.clone(), app.state.embedder.clone(), options())
        .expect("valid options");
    let report = ingestor.ingest_path(app.tenant, dir.path()).await.unwrap();
    assert_eq!(report.files_ingested, 1);

    let (status, body) = app
        .post("/api/v1/rag/search", json!({ "query": "ridge exhaust" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["hits"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn search_validates_its_request() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post("/api/v1/rag/search", json!({ "query": "   " }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/api/v1/rag/search", json!({ "query": "vents", "top_k": 0 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post("/api/v1/rag/search", json!({ "query": "vents", "top_k": 51 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_unavailable_without_provider() {
    let app = TestApp::with_config(|cfg| cfg.rag.embedding_provider = "disabled".into()).await;
    let (status, body) = app
        .post("/api/v1/rag/search", json!({ "query": "ridge vent" }))
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("APP__RAG__EMBEDDING_PROVIDER"));
}
