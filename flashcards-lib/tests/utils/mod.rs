use std::sync::Arc;

use actix_web::http::header::{self, HeaderName};
use flashcards_lib::auth::{password, token};
use flashcards_lib::user::UserId;
use flashcards_repo::user_repo::{User, UserRepo};
use flashcards_repo::Repos;
use rstest::*;
use serde_json::{json, Value};
use tracing::info;
use tracing::Level;
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "correct horse";

macro_rules! build_app {
    ($repos:expr, $signups_enabled:expr) => {{
        let repos = $repos.clone();
        let app = App::new()
            .wrap(flashcards_lib::tracing::create_middleware())
            .configure(move |cfg| flashcards_lib::configure_app(cfg, &repos, $signups_enabled));
        tracing::info!("Built app");
        test::init_service(app).await
    }};
    ($repos:expr) => {
        build_app!($repos, true)
    };
}

macro_rules! create_resource {
    (&$service:ident, $test_user:expr, $uri:expr, $body:expr) => {{
        let request = TestRequest::post()
            .uri($uri)
            .insert_header($test_user.auth())
            .set_json(&$body)
            .to_request();
        let response = test::call_service(&$service, request).await;
        assert_eq!(
            StatusCode::CREATED,
            response.status(),
            "Got {} response when creating {}",
            response.status(),
            $uri
        );
        let document: serde_json::Value = test::read_body_json(response).await;
        document
    }};
}

pub struct TestUser {
    pub user: User,
    repo: Arc<dyn UserRepo>,
}

impl TestUser {
    pub async fn new(user_repo: &Arc<dyn UserRepo>) -> TestUser {
        let email = format!("test-user-{}@example.com", Uuid::new_v4());
        let password_hash = password::encode_password(TEST_PASSWORD.to_owned()).unwrap();
        let user = token::register_user(user_repo.as_ref(), email, password_hash)
            .await
            .unwrap();
        info!(user_id = user.id, "Created user");
        TestUser {
            user,
            repo: user_repo.clone(),
        }
    }

    pub fn id(&self) -> UserId {
        self.user.id
    }

    pub fn auth(&self) -> (HeaderName, String) {
        bearer(&self.user.auth_token_for_web)
    }

    pub async fn delete(&self) {
        self.repo.delete_user(self.user.id).await.unwrap()
    }
}

pub fn bearer(token: &str) -> (HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

pub fn label_payload(name: &str) -> Value {
    json!({ "data": { "type": "labels", "attributes": { "name": name } } })
}

pub fn card_payload(side_a: &str, side_b: &str, proficiency_level: i32, label_ids: &[&str]) -> Value {
    let labels: Vec<Value> = label_ids
        .iter()
        .map(|id| json!({ "type": "labels", "id": id }))
        .collect();
    json!({
        "data": {
            "type": "cards",
            "attributes": {
                "side-a": side_a,
                "side-b": side_b,
                "proficiency-level": proficiency_level
            },
            "relationships": { "labels": { "data": labels } }
        }
    })
}

pub fn resource_id(document: &Value) -> String {
    document["data"]["id"].as_str().unwrap().to_owned()
}

pub fn resource_ids(document: &Value) -> Vec<String> {
    document["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|resource| resource["id"].as_str().unwrap().to_owned())
        .collect()
}

const BOUNDARY: &str = "flashcards-test-boundary";

/// Builds a `multipart/form-data` body. Returns the content type header value and the body.
pub fn multipart(fields: &[(&str, &[u8])]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, content) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        if *name == "file" {
            body.extend_from_slice(
                b"Content-Disposition: form-data; name=\"file\"; filename=\"cards.csv\"\r\n\
                  Content-Type: text/csv\r\n\r\n",
            );
        } else {
            body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            );
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

#[fixture]
#[once]
pub fn tracing_setup() -> () {
    tracing_subscriber::fmt()
        .pretty()
        .with_max_level(Level::DEBUG)
        .init();
    info!("tracing initialized");
}

#[fixture]
pub fn repos() -> Repos {
    flashcards_repo::mem_repo::create_repos()
}
