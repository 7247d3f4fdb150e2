use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{json, Value};

use accountsys_api::app::{build_app, services::AppServices};

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory stores, ephemeral port.
        let app = build_app(Arc::new(AppServices::in_memory()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn create_user(&self, name: &str, email: &str) -> Value {
        let res = self
            .client
            .post(self.url("/users"))
            .json(&json!({ "name": name, "email": email }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        res.json().await.unwrap()
    }

    async fn add_account(&self, user_id: i64, name: &str, currency: &str) -> reqwest::Response {
        self.client
            .post(self.url("/addAccount"))
            .json(&json!({
                "userId": user_id,
                "accountName": name,
                "accountCurrency": currency,
            }))
            .send()
            .await
            .unwrap()
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    async fn delete(&self, path: &str) -> reqwest::Response {
        self.client.delete(self.url(path)).send().await.unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn health_is_ok_and_tagged_with_request_id() {
    let srv = TestServer::spawn().await;

    let res = srv.get("/health").await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn create_then_get_user_round_trips() {
    let srv = TestServer::spawn().await;

    let created = srv.create_user("Ada", "ada@example.com").await;
    assert_eq!(created["name"], "Ada");
    assert_eq!(created["email"], "ada@example.com");
    assert_eq!(created["accounts"], json!([]));
    let id = created["id"].as_i64().unwrap();

    let res = srv.get(&format!("/users/{id}")).await;
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: Value = res.json().await.unwrap();
    assert_eq!(fetched, created);

    let res = srv.get("/users").await;
    assert_eq!(res.status(), StatusCode::OK);
    let all: Value = res.json().await.unwrap();
    assert_eq!(all, json!([created]));
}

#[tokio::test]
async fn invalid_user_payload_returns_field_map() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .post(srv.url("/users"))
        .json(&json!({ "name": "  ", "email": "not-an-email" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "name": "must not be blank",
            "email": "must be a well-formed email address",
        })
    );

    // Nothing was stored.
    let all: Value = srv.get("/users").await.json().await.unwrap();
    assert_eq!(all, json!([]));
}

#[tokio::test]
async fn malformed_json_falls_back_to_500() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .post(srv.url("/users"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.text().await.unwrap().starts_with("Error occurred: "));
}

#[tokio::test]
async fn unknown_user_is_404_with_message() {
    let srv = TestServer::spawn().await;

    let res = srv.get("/users/99").await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.text().await.unwrap(), "User not found with id: 99");
}

#[tokio::test]
async fn non_numeric_id_falls_back_to_500() {
    let srv = TestServer::spawn().await;

    let res = srv.get("/users/abc").await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.text().await.unwrap().starts_with("Error occurred: "));
}

#[tokio::test]
async fn id_beyond_i32_range_falls_back_to_500() {
    let srv = TestServer::spawn().await;

    let res = srv.get("/users/2147483648").await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res.text().await.unwrap().starts_with("Error occurred: "));
}

#[tokio::test]
async fn add_account_links_to_owner() {
    let srv = TestServer::spawn().await;
    let user = srv.create_user("Ada", "ada@example.com").await;
    let user_id = user["id"].as_i64().unwrap();

    let res = srv.add_account(user_id, "Savings", "USD").await;
    assert_eq!(res.status(), StatusCode::OK);
    let account: Value = res.json().await.unwrap();
    assert_eq!(account["accountName"], "Savings");
    assert_eq!(account["accountCurrency"], "USD");
    assert_eq!(account["userId"], user_id);
    let account_id = account["id"].as_i64().unwrap();

    let fetched: Value = srv
        .get(&format!("/account/{account_id}"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, account);

    let owner: Value = srv
        .get(&format!("/users/{user_id}"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(owner["accounts"], json!([account_id]));
}

#[tokio::test]
async fn add_account_for_unknown_user_is_404_and_stores_nothing() {
    let srv = TestServer::spawn().await;

    let res = srv.add_account(7, "Savings", "USD").await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.text().await.unwrap(), "User not found with id: 7");

    let all: Value = srv.get("/accounts").await.json().await.unwrap();
    assert_eq!(all, json!([]));
}

#[tokio::test]
async fn add_account_without_user_id_looks_up_user_zero() {
    let srv = TestServer::spawn().await;
    srv.create_user("Ada", "ada@example.com").await;

    let res = srv
        .client
        .post(srv.url("/addAccount"))
        .json(&json!({ "accountName": "S", "accountCurrency": "USD" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.text().await.unwrap(), "User not found with id: 0");
}

#[tokio::test]
async fn add_account_without_name_or_currency_echoes_null() {
    let srv = TestServer::spawn().await;
    let user_id = srv.create_user("Ada", "ada@example.com").await["id"]
        .as_i64()
        .unwrap();

    let res = srv
        .client
        .post(srv.url("/addAccount"))
        .json(&json!({ "userId": user_id }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let account: Value = res.json().await.unwrap();
    assert_eq!(account["accountName"], Value::Null);
    assert_eq!(account["accountCurrency"], Value::Null);
    assert_eq!(account["userId"], user_id);
}

#[tokio::test]
async fn unknown_account_is_empty_404() {
    let srv = TestServer::spawn().await;

    let res = srv.get("/account/5").await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert!(res.text().await.unwrap().is_empty());
}

#[tokio::test]
async fn removing_owned_account_deletes_it() {
    let srv = TestServer::spawn().await;
    let user_id = srv.create_user("Ada", "ada@example.com").await["id"]
        .as_i64()
        .unwrap();
    let account: Value = srv
        .add_account(user_id, "Savings", "USD")
        .await
        .json()
        .await
        .unwrap();
    let account_id = account["id"].as_i64().unwrap();

    let res = srv
        .delete(&format!("/users/{user_id}/accounts/{account_id}"))
        .await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().is_empty());

    assert_eq!(
        srv.get(&format!("/account/{account_id}")).await.status(),
        StatusCode::NOT_FOUND
    );
    let all: Value = srv.get("/accounts").await.json().await.unwrap();
    assert_eq!(all, json!([]));

    // Second attempt: the account no longer exists.
    let res = srv
        .delete(&format!("/users/{user_id}/accounts/{account_id}"))
        .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        res.text().await.unwrap(),
        format!("Account not found with id: {account_id}")
    );
}

#[tokio::test]
async fn removing_someone_elses_account_is_refused() {
    let srv = TestServer::spawn().await;
    let ada = srv.create_user("Ada", "ada@example.com").await["id"]
        .as_i64()
        .unwrap();
    let bob = srv.create_user("Bob", "bob@example.com").await["id"]
        .as_i64()
        .unwrap();
    let bobs: Value = srv
        .add_account(bob, "Checking", "EUR")
        .await
        .json()
        .await
        .unwrap();
    let bobs_id = bobs["id"].as_i64().unwrap();

    let res = srv.delete(&format!("/users/{ada}/accounts/{bobs_id}")).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        res.text().await.unwrap(),
        format!("Account not associated with the user with id: {ada}")
    );
    let all: Value = srv.get("/accounts").await.json().await.unwrap();
    assert_eq!(all, json!([bobs]));
}

#[tokio::test]
async fn removing_for_unknown_user_reports_user_first() {
    let srv = TestServer::spawn().await;

    let res = srv.delete("/users/3/accounts/4").await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.text().await.unwrap(), "User not found with id: 3");
}

#[tokio::test]
async fn documented_example_flow() {
    let srv = TestServer::spawn().await;
    let user_id = srv.create_user("Ada", "ada@example.com").await["id"]
        .as_i64()
        .unwrap();
    assert_eq!(user_id, 1);

    // Burn ids so the savings account lands on 5.
    for _ in 0..4 {
        srv.add_account(user_id, "Scratch", "USD").await;
    }
    let savings: Value = srv
        .add_account(user_id, "Savings", "USD")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(savings["id"], 5);

    assert_eq!(srv.delete("/users/1/accounts/5").await.status(), StatusCode::OK);
    assert_eq!(srv.get("/account/5").await.status(), StatusCode::NOT_FOUND);
}
