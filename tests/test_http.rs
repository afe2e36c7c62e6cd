//! End-to-end HTTP tests against a server bound to an ephemeral port.

#![cfg(feature = "server")]

mod common;

use prices_api::{server, AsyncPricesService, PricesService};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::Value;

/// Serve `service` on 127.0.0.1 and return its base URL plus a handle that
/// shares the same store.
async fn spawn_server(service: PricesService) -> (String, AsyncPricesService) {
    let service = AsyncPricesService::new(service);
    let app = server::router(service.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), service)
}

fn upload_form(archive: Vec<u8>) -> Form {
    let part = Part::bytes(archive)
        .file_name("upload.zip")
        .mime_str("application/zip")
        .unwrap();
    Form::new().part("file", part)
}

#[tokio::test]
async fn post_then_get_round_trips_through_http() {
    let (base, _service) = spawn_server(common::setup_service()).await;
    let client = reqwest::Client::new();
    let url = format!("{base}/api/v0/prices");

    let resp = client
        .post(&url)
        .multipart(upload_form(common::upload_archive(&[
            "1,Milk,Dairy,2.50,2024-01-01",
        ])))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({"total_items": 1, "total_categories": 1, "total_price": 2.5})
    );

    let resp = client.get(&url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "application/zip");
    assert_eq!(
        resp.headers()["content-disposition"],
        "attachment; filename=response.zip"
    );
    let archive = resp.bytes().await.unwrap();
    assert_eq!(
        common::read_table(&archive),
        "id,created_date,name,category,price\n1,2024-01-01,Milk,Dairy,2.50\n"
    );
}

#[tokio::test]
async fn other_methods_are_refused_without_side_effects() {
    let (base, service) = spawn_server(common::setup_service()).await;
    let client = reqwest::Client::new();
    let url = format!("{base}/api/v0/prices");

    for method in [
        reqwest::Method::PUT,
        reqwest::Method::DELETE,
        reqwest::Method::PATCH,
    ] {
        let resp = client
            .request(method.clone(), &url)
            .multipart(upload_form(common::upload_archive(&[
                "1,Milk,Dairy,2.50,2024-01-01",
            ])))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
        let body: Value = resp.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains(method.as_str()));
    }

    assert_eq!(common::store_count(service.service()), 0);
}

#[tokio::test]
async fn invalid_uploads_are_bad_requests() {
    let (base, service) = spawn_server(common::setup_service()).await;
    let client = reqwest::Client::new();
    let url = format!("{base}/api/v0/prices");

    // not an archive
    let resp = client
        .post(&url)
        .multipart(upload_form(b"hello".to_vec()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // bad price on the last row
    let resp = client
        .post(&url)
        .multipart(upload_form(common::upload_archive(&[
            "1,Milk,Dairy,2.50,2024-01-01",
            "2,Bread,Bakery,cheap,2024-01-02",
        ])))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("cheap"));

    // wrong form field
    let form = Form::new().part(
        "upload",
        Part::bytes(common::upload_archive(&["1,Milk,Dairy,2.50,2024-01-01"])),
    );
    let resp = client.post(&url).multipart(form).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // not multipart at all
    let resp = client.post(&url).body("raw").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert_eq!(common::store_count(service.service()), 0);
}

#[tokio::test]
async fn duplicate_ids_are_server_errors() {
    let (base, service) = spawn_server(common::setup_service()).await;
    let client = reqwest::Client::new();
    let url = format!("{base}/api/v0/prices");

    let resp = client
        .post(&url)
        .multipart(upload_form(common::upload_archive(&[
            "1,Milk,Dairy,2.50,2024-01-01",
            "1,Milk again,Dairy,2.50,2024-01-01",
        ])))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(common::store_count(service.service()), 0);
}

#[tokio::test]
async fn missing_entry_is_an_empty_import() {
    let (base, _service) = spawn_server(common::setup_service()).await;
    let client = reqwest::Client::new();

    let upload = common::zip_with_entries(&[("notes.txt", b"nothing here".as_slice())]);
    let resp = client
        .post(format!("{base}/api/v0/prices"))
        .multipart(upload_form(upload))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["total_items"], 0);
}

#[tokio::test]
async fn oversized_upload_is_payload_too_large() {
    let service = PricesService::builder()
        .in_memory()
        .max_archive_size(Some(32))
        .connect_attempts(1)
        .build()
        .unwrap();
    let (base, _service) = spawn_server(service).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/api/v0/prices"))
        .multipart(upload_form(common::upload_archive(&[
            "1,Milk,Dairy,2.50,2024-01-01",
        ])))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn health_reports_ok() {
    let (base, _service) = spawn_server(common::setup_service()).await;
    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "OK");
}
