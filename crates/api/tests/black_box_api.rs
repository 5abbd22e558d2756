use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{Value, json};

use taskflow_auth::HashingCost;
use taskflow_infra::Settings;

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let mut settings = Settings::default();
        settings.jwt.secret = Some(JWT_SECRET.to_string());
        settings.password = HashingCost {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        };

        // Same router as prod, bound to an ephemeral port.
        let app = taskflow_api::app::build_app(&settings)
            .await
            .expect("failed to build app");
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

    async fn register(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/auth/register"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap()
    }

    async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap()
    }

    /// Register + login, returning the bearer token.
    async fn sign_up(&self, email: &str) -> String {
        assert_eq!(self.register(email, "secret1").await.status(), StatusCode::CREATED);
        let res = self.login(email, "secret1").await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    async fn create_project(&self, token: &str, name: &str) -> Value {
        let res = self
            .client
            .post(self.url("/api/projects"))
            .bearer_auth(token)
            .json(&json!({ "name": name }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        res.json().await.unwrap()
    }

    async fn create_task(&self, token: &str, project_id: &str, title: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/tasks"))
            .bearer_auth(token)
            .json(&json!({ "title": title, "projectId": project_id }))
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(secret: &str, sub: &str, iat: i64, exp: i64) -> String {
    let claims = json!({
        "sub": sub,
        "jti": uuid::Uuid::new_v4(),
        "iat": iat,
        "exp": exp,
        "iss": "taskflow",
        "aud": "taskflow-clients",
    });

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

async fn error_code(res: reqwest::Response) -> String {
    let body: Value = res.json().await.unwrap();
    body["error"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn().await;

    for path in ["/api/whoami", "/api/projects"] {
        let res = srv.client.get(srv.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(res).await, "unauthenticated");
    }

    let res = srv
        .client
        .get(srv.url("/api/projects"))
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn registration_conflicts_and_validates() {
    let srv = TestServer::spawn().await;

    let res = srv.register("alice@example.com", "secret1").await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert!(body["message"].is_string());

    let res = srv.register("alice@example.com", "another1").await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(error_code(res).await, "conflict");

    let res = srv.register("not-an-email", "secret1").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(res).await, "validation_error");

    let res = srv.register("carol@example.com", "short").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let srv = TestServer::spawn().await;
    let res = srv
        .client
        .post(srv.url("/api/auth/register"))
        .json(&json!({ "email": "alice@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(res).await, "validation_error");
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let srv = TestServer::spawn().await;
    srv.register("alice@example.com", "secret1").await;

    let wrong_password = srv.login("alice@example.com", "nope").await;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let wrong_password: Value = wrong_password.json().await.unwrap();

    let unknown = srv.login("nobody@example.com", "secret1").await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown: Value = unknown.json().await.unwrap();

    assert_eq!(wrong_password, unknown);
}

#[tokio::test]
async fn whoami_reflects_the_token_subject() {
    let srv = TestServer::spawn().await;
    let token = srv.sign_up("alice@example.com").await;

    let res = srv
        .client
        .get(srv.url("/api/whoami"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert!(body["user_id"].as_str().unwrap().parse::<uuid::Uuid>().is_ok());
}

#[tokio::test]
async fn alice_project_and_task_lifecycle() {
    let srv = TestServer::spawn().await;
    let token = srv.sign_up("alice@example.com").await;

    let project = srv.create_project(&token, "P1").await;
    let project_id = project["id"].as_str().unwrap().to_string();
    assert_eq!(project["name"], "P1");
    assert!(project["ownerId"].is_string());
    assert!(project["createdAt"].is_string());

    let res = srv
        .client
        .get(srv.url("/api/projects"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let list: Value = res.json().await.unwrap();
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"], project_id.as_str());

    let res = srv.create_task(&token, &project_id, "T1").await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let task: Value = res.json().await.unwrap();
    assert_eq!(task["completed"], false);
    assert_eq!(task["projectId"], project_id.as_str());
    let task_id = task["id"].as_str().unwrap().to_string();

    for expected in [true, false] {
        let res = srv
            .client
            .put(srv.url(&format!("/api/tasks/{task_id}")))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let toggled: Value = res.json().await.unwrap();
        assert_eq!(toggled["completed"], expected);
    }

    let res = srv
        .client
        .put(srv.url(&format!("/api/projects/{project_id}")))
        .bearer_auth(&token)
        .json(&json!({ "name": "Renamed", "description": "now with text" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["name"], "Renamed");
    assert_eq!(updated["description"], "now with text");

    let res = srv
        .client
        .get(srv.url(&format!("/api/projects/{project_id}/tasks")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let tasks: Value = res.json().await.unwrap();
    assert_eq!(tasks.as_array().unwrap().len(), 1);

    let res = srv
        .client
        .delete(srv.url(&format!("/api/projects/{project_id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = srv
        .client
        .get(srv.url(&format!("/api/projects/{project_id}/tasks")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = srv
        .client
        .put(srv.url(&format!("/api/tasks/{task_id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bob_cannot_reach_alices_resources() {
    let srv = TestServer::spawn().await;
    let alice = srv.sign_up("alice@example.com").await;
    let bob = srv.sign_up("bob@example.com").await;

    let project = srv.create_project(&alice, "P1").await;
    let project_id = project["id"].as_str().unwrap().to_string();
    let task: Value = srv.create_task(&alice, &project_id, "T1").await.json().await.unwrap();
    let task_id = task["id"].as_str().unwrap().to_string();

    let res = srv
        .client
        .get(srv.url("/api/projects"))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    let list: Value = res.json().await.unwrap();
    assert!(list.as_array().unwrap().is_empty());

    let attempts = [
        srv.client
            .get(srv.url(&format!("/api/projects/{project_id}/tasks")))
            .bearer_auth(&bob),
        srv.client
            .put(srv.url(&format!("/api/projects/{project_id}")))
            .bearer_auth(&bob)
            .json(&json!({ "name": "mine now" })),
        srv.client
            .delete(srv.url(&format!("/api/projects/{project_id}")))
            .bearer_auth(&bob),
        srv.client
            .put(srv.url(&format!("/api/tasks/{task_id}")))
            .bearer_auth(&bob),
        srv.client
            .post(srv.url("/api/tasks"))
            .bearer_auth(&bob)
            .json(&json!({ "title": "sneaky", "projectId": project_id })),
    ];
    for request in attempts {
        let res = request.send().await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(error_code(res).await, "not_found");
    }

    // Alice's data is untouched.
    let res = srv
        .client
        .get(srv.url(&format!("/api/projects/{project_id}/tasks")))
        .bearer_auth(&alice)
        .send()
        .await
        .unwrap();
    let tasks: Value = res.json().await.unwrap();
    assert_eq!(tasks.as_array().unwrap().len(), 1);
    assert_eq!(tasks[0]["completed"], false);
}

#[tokio::test]
async fn owner_id_in_body_is_ignored() {
    let srv = TestServer::spawn().await;
    let alice = srv.sign_up("alice@example.com").await;
    let bob = srv.sign_up("bob@example.com").await;

    let res = srv
        .client
        .get(srv.url("/api/whoami"))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    let bob_id = res.json::<Value>().await.unwrap()["user_id"].clone();

    let res = srv
        .client
        .post(srv.url("/api/projects"))
        .bearer_auth(&alice)
        .json(&json!({ "name": "P1", "ownerId": bob_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let project: Value = res.json().await.unwrap();
    assert_ne!(project["ownerId"], bob_id);

    let res = srv
        .client
        .get(srv.url("/api/projects"))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    let list: Value = res.json().await.unwrap();
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn invalid_project_and_task_input_is_rejected() {
    let srv = TestServer::spawn().await;
    let token = srv.sign_up("alice@example.com").await;

    let res = srv
        .client
        .post(srv.url("/api/projects"))
        .bearer_auth(&token)
        .json(&json!({ "name": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(res).await, "validation_error");

    let res = srv
        .client
        .post(srv.url("/api/projects"))
        .bearer_auth(&token)
        .json(&json!({ "name": "x".repeat(151) }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let project = srv.create_project(&token, "P1").await;
    let project_id = project["id"].as_str().unwrap();
    let res = srv.create_task(&token, project_id, "").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_ids_are_not_found() {
    let srv = TestServer::spawn().await;
    let token = srv.sign_up("alice@example.com").await;

    let res = srv
        .client
        .get(srv.url("/api/projects/not-a-uuid/tasks"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = srv
        .client
        .put(srv.url("/api/tasks/42"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = srv.create_task(&token, "garbage", "T1").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn forged_and_expired_tokens_are_rejected() {
    let srv = TestServer::spawn().await;
    let real = srv.sign_up("alice@example.com").await;
    let now = Utc::now().timestamp();
    let sub = uuid::Uuid::now_v7().to_string();

    let forged = mint_jwt("some-other-secret", &sub, now, now + 600);
    let expired = mint_jwt(
        JWT_SECRET,
        &sub,
        now - 7200,
        (Utc::now() - ChronoDuration::minutes(5)).timestamp(),
    );
    let valid_foreign_mint = mint_jwt(JWT_SECRET, &sub, now, now + 600);

    for token in [forged, expired, "not.a.jwt".to_string()] {
        let res = srv
            .client
            .get(srv.url("/api/whoami"))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    // Correctly signed with the server secret: accepted, subject taken as-is.
    let res = srv
        .client
        .get(srv.url("/api/whoami"))
        .bearer_auth(&valid_foreign_mint)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["user_id"], sub.as_str());

    let res = srv
        .client
        .get(srv.url("/api/whoami"))
        .bearer_auth(&real)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
