//! End-to-end tests for the quotes site.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`rolodex-cli migrate quotes`)
//! - The quotes site running (`cargo run -p rolodex-quotes`)
//!
//! Run with: `cargo test -p rolodex-integration-tests -- --ignored`

#![allow(clippy::unwrap_used, clippy::expect_used)]

use reqwest::{Client, StatusCode, header};

use rolodex_integration_tests::{client, quotes_base_url};

fn unique_name(prefix: &str) -> String {
    format!("{prefix} {}", uuid::Uuid::new_v4().simple())
}

async fn add_author(client: &Client, name: &str) -> reqwest::Response {
    client
        .post(format!("{}/author/", quotes_base_url()))
        .form(&[("name", name)])
        .send()
        .await
        .expect("Failed to post author")
}

async fn page(client: &Client, path: &str) -> (StatusCode, String) {
    let resp = client
        .get(format!("{}{path}", quotes_base_url()))
        .send()
        .await
        .expect("Failed to fetch page");
    let status = resp.status();
    (status, resp.text().await.unwrap())
}

#[tokio::test]
#[ignore = "Requires running quotes site and database"]
async fn test_author_create_redirects_home() {
    let client = client();
    let name = unique_name("Mary Shelley");

    let resp = add_author(&client, &name).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/");

    let (status, body) = page(&client, "/author/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(&name));
}

#[tokio::test]
#[ignore = "Requires running quotes site and database"]
async fn test_author_form_errors_rerender() {
    let client = client();

    let resp = add_author(&client, "   ").await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.text().await.unwrap().contains("Name is required"));

    let long = "x".repeat(101);
    let resp = add_author(&client, &long).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.text().await.unwrap().contains("at most 100 characters"));

    let name = unique_name("Duplicate");
    add_author(&client, &name).await;
    let resp = add_author(&client, &name).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = resp.text().await.unwrap();
    assert!(body.contains("already exists"));
    assert!(body.contains(&name), "submitted name is echoed back");
}

#[tokio::test]
#[ignore = "Requires running quotes site and database"]
async fn test_quote_with_authors_listed_on_index() {
    let client = client();
    let first = unique_name("Brian Kernighan");
    let second = unique_name("Rob Pike");
    add_author(&client, &first).await;
    add_author(&client, &second).await;

    let text = unique_name("Debugging is twice as hard as writing the code.");
    let resp = client
        .post(format!("{}/quote/", quotes_base_url()))
        .form(&[
            ("text", text.as_str()),
            ("author", first.as_str()),
            ("author", second.as_str()),
            ("author", "Nobody"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let (status, body) = page(&client, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(&text));
    assert!(body.contains(&format!("{first}, {second}")));
}

#[tokio::test]
#[ignore = "Requires running quotes site and database"]
async fn test_quote_requires_text() {
    let resp = client()
        .post(format!("{}/quote/", quotes_base_url()))
        .form(&[("text", " ")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(resp.text().await.unwrap().contains("Quote text is required"));
}

#[tokio::test]
#[ignore = "Requires running quotes site and database"]
async fn test_missing_quote_detail_is_not_found() {
    let (status, body) = page(&client(), "/detail/2147483647").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Quote not found"));
}
