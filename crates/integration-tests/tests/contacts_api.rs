//! End-to-end tests for the contacts API.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`rolodex-cli migrate contacts`)
//! - The contacts API running (`cargo run -p rolodex-contacts`)
//!
//! Run with: `cargo test -p rolodex-integration-tests -- --ignored`

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use chrono::{Duration, Utc};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use rolodex_integration_tests::{client, contacts_base_url, contacts_pool, unique_email};

const PASSWORD: &str = "correct horse battery";

async fn register(client: &Client, email: &str, password: &str) -> reqwest::Response {
    client
        .post(format!("{}/api/register/", contacts_base_url()))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to register")
}

async fn login(client: &Client, email: &str, password: &str) -> reqwest::Response {
    client
        .post(format!("{}/api/auth/token", contacts_base_url()))
        .form(&[("username", email), ("password", password)])
        .send()
        .await
        .expect("Failed to log in")
}

/// Register a fresh account and return a bearer token for it.
async fn signed_in(client: &Client) -> String {
    let email = unique_email("owner");
    assert_eq!(register(client, &email, PASSWORD).await.status(), StatusCode::CREATED);

    let body: Value = login(client, &email, PASSWORD).await.json().await.unwrap();
    body["access_token"].as_str().unwrap().to_string()
}

fn contact(first_name: &str, email: &str, birthday: Option<String>) -> Value {
    json!({
        "first_name": first_name,
        "last_name": "Tester",
        "email": email,
        "phone_number": "+1 555 0100",
        "birthday": birthday,
        "additional_data": "met at a conference",
    })
}

async fn create_contact(client: &Client, token: &str, body: &Value) -> Value {
    let resp = client
        .post(format!("{}/api/contacts/", contacts_base_url()))
        .bearer_auth(token)
        .json(body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.unwrap()
}

// ============================================================================
// Accounts
// ============================================================================

#[tokio::test]
#[ignore = "Requires running contacts API and database"]
async fn test_register_returns_public_user() {
    let client = client();
    let email = unique_email("Ada");

    let started = std::time::Instant::now();
    let resp = register(&client, &email, PASSWORD).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    // Mail goes out in the background; SMTP timeouts never stall the response
    assert!(started.elapsed() < std::time::Duration::from_secs(10));

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["email"], email.to_lowercase());
    assert_eq!(body["verified"], false);
    assert!(body.get("password_hash").is_none());
    assert!(body.get("verification_code").is_none());
}

#[tokio::test]
#[ignore = "Requires running contacts API and database"]
async fn test_duplicate_registration_conflicts() {
    let client = client();
    let email = unique_email("dup");

    assert_eq!(register(&client, &email, PASSWORD).await.status(), StatusCode::CREATED);

    let resp = register(&client, &email.to_uppercase(), PASSWORD).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running contacts API and database"]
async fn test_login_rejects_wrong_password() {
    let client = client();
    let email = unique_email("login");
    register(&client, &email, PASSWORD).await;

    let resp = login(&client, &email, "not the password").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Incorrect username or password");

    let resp = login(&client, &email, PASSWORD).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["token_type"], "bearer");
}

#[tokio::test]
#[ignore = "Requires running contacts API and database"]
async fn test_email_verification_code() {
    let client = client();
    let pool = contacts_pool().await;
    let email = unique_email("verify");
    register(&client, &email, PASSWORD).await;

    let code: String = sqlx::query_scalar(
        r#"SELECT verification_code FROM contacts."user" WHERE email = $1"#,
    )
    .bind(email.to_lowercase())
    .fetch_one(&pool)
    .await
    .unwrap();

    let resp = client
        .post(format!("{}/verify/", contacts_base_url()))
        .query(&[("token", code.as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // The code is cleared once used
    let resp = client
        .post(format!("{}/verify/", contacts_base_url()))
        .query(&[("token", code.as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running contacts API and database"]
async fn test_pending_verification_codes_are_unique() {
    let client = client();
    let pool = contacts_pool().await;
    let first = unique_email("pending-a");
    let second = unique_email("pending-b");
    register(&client, &first, PASSWORD).await;
    register(&client, &second, PASSWORD).await;

    let code: String = sqlx::query_scalar(
        r#"SELECT verification_code FROM contacts."user" WHERE email = $1"#,
    )
    .bind(first.to_lowercase())
    .fetch_one(&pool)
    .await
    .unwrap();

    // A second pending account cannot hold the same code
    let err = sqlx::query(r#"UPDATE contacts."user" SET verification_code = $1 WHERE email = $2"#)
        .bind(&code)
        .bind(second.to_lowercase())
        .execute(&pool)
        .await
        .unwrap_err();
    let db_err = err.as_database_error().unwrap();
    assert!(db_err.is_unique_violation());
    assert_eq!(db_err.constraint(), Some("idx_user_verification_code"));

    let resp = client
        .post(format!("{}/verify/", contacts_base_url()))
        .query(&[("token", code.as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let verified: Vec<(String, bool)> = sqlx::query_as(
        r#"SELECT email, verified FROM contacts."user" WHERE email = ANY($1) ORDER BY email"#,
    )
    .bind(vec![first.to_lowercase(), second.to_lowercase()])
    .fetch_all(&pool)
    .await
    .unwrap();
    for (email, is_verified) in verified {
        assert_eq!(is_verified, email == first.to_lowercase(), "{email}");
    }
}

#[tokio::test]
#[ignore = "Requires running contacts API and database"]
async fn test_expired_verification_code_rejected() {
    let client = client();
    let pool = contacts_pool().await;
    let email = unique_email("stale");
    register(&client, &email, PASSWORD).await;

    let code: String = sqlx::query_scalar(
        r#"
        UPDATE contacts."user"
        SET verification_expires_at = $2
        WHERE email = $1
        RETURNING verification_code
        "#,
    )
    .bind(email.to_lowercase())
    .bind(Utc::now() - Duration::hours(1))
    .fetch_one(&pool)
    .await
    .unwrap();

    let resp = client
        .post(format!("{}/verify/", contacts_base_url()))
        .query(&[("token", code.as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running contacts API and database"]
async fn test_password_reset_token_works_once() {
    let client = client();
    let pool = contacts_pool().await;
    let email = unique_email("reset");
    register(&client, &email, PASSWORD).await;

    let resp = client
        .post(format!("{}/api/password-reset/", contacts_base_url()))
        .json(&json!({ "email": email }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::ACCEPTED);

    let reset_token: String = sqlx::query_scalar(
        r#"
        SELECT t.token
        FROM contacts.password_reset_token t
        JOIN contacts."user" u ON u.id = t.user_id
        WHERE u.email = $1
        "#,
    )
    .bind(email.to_lowercase())
    .fetch_one(&pool)
    .await
    .unwrap();

    let confirm = json!({ "token": reset_token, "new_password": "a brand new secret" });
    let url = format!("{}/api/password-reset/confirm", contacts_base_url());

    let resp = client.post(&url).json(&confirm).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client.post(&url).json(&confirm).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert_eq!(login(&client, &email, PASSWORD).await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        login(&client, &email, "a brand new secret").await.status(),
        StatusCode::OK
    );
}

#[tokio::test]
#[ignore = "Requires running contacts API and database"]
async fn test_unknown_reset_email_is_accepted() {
    let resp = client()
        .post(format!("{}/api/password-reset/", contacts_base_url()))
        .json(&json!({ "email": unique_email("nobody") }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
}

// ============================================================================
// Contacts
// ============================================================================

#[tokio::test]
#[ignore = "Requires running contacts API and database"]
async fn test_contact_crud() {
    let client = client();
    let token = signed_in(&client).await;
    let base = contacts_base_url();

    let input = contact("Grace", &unique_email("grace"), Some("1906-12-09".to_string()));
    let created = create_contact(&client, &token, &input).await;
    let id = created["id"].as_i64().unwrap();

    // Fetch returns the stored fields
    let fetched: Value = client
        .get(format!("{base}/api/contacts/{id}"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    for field in ["first_name", "last_name", "email", "phone_number", "birthday", "additional_data"] {
        assert_eq!(fetched[field], input[field], "{field}");
    }

    // Update
    let mut changed = input.clone();
    changed["phone_number"] = json!("+1 555 0199");
    let resp = client
        .put(format!("{base}/api/contacts/{id}"))
        .bearer_auth(&token)
        .json(&changed)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["phone_number"], "+1 555 0199");

    // Delete, then it is gone
    let resp = client
        .delete(format!("{base}/api/contacts/{id}"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base}/api/contacts/{id}"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Contact not found");
}

#[tokio::test]
#[ignore = "Requires running contacts API and database"]
async fn test_contacts_are_private_to_owner() {
    let owner = client();
    let other = client();
    let owner_token = signed_in(&owner).await;
    let other_token = signed_in(&other).await;

    let created = create_contact(&owner, &owner_token, &contact("Alan", &unique_email("alan"), None)).await;
    let id = created["id"].as_i64().unwrap();

    let resp = other
        .get(format!("{}/api/contacts/{id}", contacts_base_url()))
        .bearer_auth(&other_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let listed: Vec<Value> = other
        .get(format!("{}/api/contacts/", contacts_base_url()))
        .bearer_auth(&other_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
#[ignore = "Requires running contacts API and database"]
async fn test_duplicate_contact_email_conflicts() {
    let client = client();
    let token = signed_in(&client).await;
    let body = contact("Edsger", &unique_email("edsger"), None);

    create_contact(&client, &token, &body).await;
    let resp = client
        .post(format!("{}/api/contacts/", contacts_base_url()))
        .bearer_auth(&token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running contacts API and database"]
async fn test_list_pagination() {
    let client = client();
    let token = signed_in(&client).await;
    for name in ["One", "Two", "Three"] {
        create_contact(&client, &token, &contact(name, &unique_email(name), None)).await;
    }

    let page: Vec<Value> = client
        .get(format!("{}/api/contacts/", contacts_base_url()))
        .query(&[("skip", "1"), ("limit", "1")])
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0]["first_name"], "Two");
}

#[tokio::test]
#[ignore = "Requires running contacts API and database"]
async fn test_search_by_name_or_email() {
    let client = client();
    let token = signed_in(&client).await;
    create_contact(&client, &token, &contact("Barbara", &unique_email("liskov"), None)).await;
    create_contact(&client, &token, &contact("Ken", &unique_email("thompson"), None)).await;

    let search = |query: Option<&'static str>| {
        let client = client.clone();
        let token = token.clone();
        async move {
            let mut req = client
                .get(format!("{}/api/contacts/search/", contacts_base_url()))
                .bearer_auth(&token);
            if let Some(q) = query {
                req = req.query(&[("query", q)]);
            }
            req.send().await.unwrap().json::<Vec<Value>>().await.unwrap()
        }
    };

    assert_eq!(search(None).await.len(), 2);

    let by_name = search(Some("barb")).await;
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0]["first_name"], "Barbara");

    let by_email = search(Some("THOMPSON")).await;
    assert_eq!(by_email.len(), 1);
    assert_eq!(by_email[0]["first_name"], "Ken");

    assert!(search(Some("%")).await.is_empty());
}

#[tokio::test]
#[ignore = "Requires running contacts API and database"]
async fn test_upcoming_birthdays_window() {
    let client = client();
    let token = signed_in(&client).await;
    let today = Utc::now().date_naive();

    let birthday = |days: i64| {
        let date = today + Duration::days(days);
        Some(date.format("1990-%m-%d").to_string())
    };

    // Feb 29 anniversaries shift, so skip birthdays that would land on it
    let cases = [("Today", 0), ("Week", 7), ("Later", 8)];
    if cases
        .iter()
        .any(|(_, d)| (today + Duration::days(*d)).format("%m-%d").to_string() == "02-29")
    {
        return;
    }

    for (name, days) in cases {
        create_contact(&client, &token, &contact(name, &unique_email(name), birthday(days))).await;
    }
    create_contact(&client, &token, &contact("None", &unique_email("none"), None)).await;

    let upcoming: Vec<Value> = client
        .get(format!("{}/api/contacts/birthday/", contacts_base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = upcoming
        .iter()
        .map(|c| c["first_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Today", "Week"]);
}
