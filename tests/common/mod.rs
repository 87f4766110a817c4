#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use recipe_backend::db::entities::user;
use recipe_backend::db::schema;
use recipe_backend::db::services::UserService;
use recipe_backend::server::{self, config::ServerConfig};
use recipe_backend::web::{self, models::Claims};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-jwt-secret";

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    // Keeps the SQLite file alive for the duration of the test.
    _dir: TempDir,
}

pub async fn spawn_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let database_url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());

    let config = ServerConfig {
        database_url,
        jwt_secret: TEST_SECRET.to_string(),
        listen_address: "127.0.0.1:0".to_string(),
        log_dir: dir.path().join("logs").display().to_string(),
        max_db_connections: 4,
    };

    let db = server::connect_database(&config).await.unwrap();
    schema::create_tables(&db).await.unwrap();
    let router = web::create_axum_router(db.clone(), Arc::new(config));

    TestApp {
        router,
        db,
        _dir: dir,
    }
}

pub fn token_for(user: &user::Model) -> String {
    token_with(user.id, &user.email, TEST_SECRET, Utc::now() + Duration::hours(1))
}

pub fn token_with(
    user_id: i32,
    email: &str,
    secret: &str,
    expires_at: chrono::DateTime<Utc>,
) -> String {
    let claims = Claims {
        sub: email.to_string(),
        user_id,
        exp: expires_at.timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .unwrap()
}

impl TestApp {
    /// Inserts a user and returns it with a valid bearer token.
    pub async fn create_user(&self, email: &str) -> (user::Model, String) {
        let user = UserService::create_user(&self.db, email, "Test Cook", "not-a-real-hash")
            .await
            .unwrap();
        let token = token_for(&user);
        (user, token)
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }
}

/// The `name` fields of a JSON array of `{id, name}` objects, in order.
pub fn names(list: &Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap().to_string())
        .collect()
}
