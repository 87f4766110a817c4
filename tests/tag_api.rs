mod common;

use axum::http::StatusCode;
use recipe_backend::db::services::TagService;
use serde_json::json;

use common::{names, spawn_app};

const TAGS_URL: &str = "/api/recipe/tags/";

fn tag_url(id: i64) -> String {
    format!("{TAGS_URL}{id}/")
}

#[tokio::test]
async fn test_retrieve_tags_ordered_by_name_desc() {
    let app = spawn_app().await;
    let (_, token) = app.create_user("admin@admin.com").await;

    for name in ["Vegan", "Dessert", "Breakfast"] {
        let (status, _) = app.post(TAGS_URL, &token, json!({ "name": name })).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app.get(TAGS_URL, &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Vegan", "Dessert", "Breakfast"]);
    for tag in body.as_array().unwrap() {
        let keys: Vec<&String> = tag.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["id", "name"]);
    }
}

#[tokio::test]
async fn test_tags_limited_to_user() {
    let app = spawn_app().await;
    let (_, token_a) = app.create_user("a@example.com").await;
    let (_, token_b) = app.create_user("b@example.com").await;

    app.post(TAGS_URL, &token_b, json!({ "name": "Random Tag" })).await;
    app.post(TAGS_URL, &token_a, json!({ "name": "Comfort Food" })).await;

    let (status, body) = app.get(TAGS_URL, &token_a).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Comfort Food"]);

    let (_, body) = app.get(TAGS_URL, &token_b).await;
    assert_eq!(names(&body), vec!["Random Tag"]);
}

#[tokio::test]
async fn test_vegan_visible_only_to_creator() {
    let app = spawn_app().await;
    let (_, token_a) = app.create_user("a@example.com").await;
    let (_, token_b) = app.create_user("b@example.com").await;

    app.post(TAGS_URL, &token_a, json!({ "name": "Vegan" })).await;

    let (_, body_a) = app.get(TAGS_URL, &token_a).await;
    let (_, body_b) = app.get(TAGS_URL, &token_b).await;
    assert!(names(&body_a).contains(&"Vegan".to_string()));
    assert!(!names(&body_b).contains(&"Vegan".to_string()));
}

#[tokio::test]
async fn test_create_tag_successful() {
    let app = spawn_app().await;
    let (user, token) = app.create_user("admin@admin.com").await;

    let (status, body) = app.post(TAGS_URL, &token, json!({ "name": "  Fruity " })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Fruity");

    let stored = TagService::list_tags(&app.db, user.id, false).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Fruity");
    assert_eq!(stored[0].user_id, user.id);

    let (status, fetched) = app.get(&tag_url(body["id"].as_i64().unwrap()), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, body);
}

#[tokio::test]
async fn test_create_tag_invalid() {
    let app = spawn_app().await;
    let (user, token) = app.create_user("admin@admin.com").await;

    let (status, body) = app.post(TAGS_URL, &token, json!({ "name": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "name": ["This field may not be blank."] }));

    let (status, body) = app.post(TAGS_URL, &token, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "name": ["This field is required."] }));

    let stored = TagService::list_tags(&app.db, user.id, false).await.unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = spawn_app().await;
    let (_, token) = app.create_user("admin@admin.com").await;

    let (status, body) = app.post(TAGS_URL, &token, json!({ "name": 12 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_update_and_patch_tag() {
    let app = spawn_app().await;
    let (_, token) = app.create_user("admin@admin.com").await;
    let (_, tag) = app.post(TAGS_URL, &token, json!({ "name": "Spicy" })).await;
    let url = tag_url(tag["id"].as_i64().unwrap());

    let (status, body) = app.put(&url, &token, json!({ "name": "Very Spicy" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Very Spicy");

    let (status, _) = app.put(&url, &token, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.patch(&url, &token, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Very Spicy");

    let (status, _) = app.patch(&url, &token, json!({ "name": " " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_other_users_tag_is_not_found() {
    let app = spawn_app().await;
    let (_, token_a) = app.create_user("a@example.com").await;
    let (_, token_b) = app.create_user("b@example.com").await;
    let (_, tag) = app.post(TAGS_URL, &token_a, json!({ "name": "Private" })).await;
    let url = tag_url(tag["id"].as_i64().unwrap());

    assert_eq!(app.get(&url, &token_b).await.0, StatusCode::NOT_FOUND);
    assert_eq!(
        app.put(&url, &token_b, json!({ "name": "Stolen" })).await.0,
        StatusCode::NOT_FOUND
    );
    assert_eq!(app.delete(&url, &token_b).await.0, StatusCode::NOT_FOUND);

    let (_, body) = app.get(&url, &token_a).await;
    assert_eq!(body["name"], "Private");
}

#[tokio::test]
async fn test_delete_tag() {
    let app = spawn_app().await;
    let (_, token) = app.create_user("admin@admin.com").await;
    let (_, tag) = app.post(TAGS_URL, &token, json!({ "name": "Gone" })).await;
    let url = tag_url(tag["id"].as_i64().unwrap());

    let (status, body) = app.delete(&url, &token).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    assert_eq!(app.get(&url, &token).await.0, StatusCode::NOT_FOUND);
    assert_eq!(app.delete(&url, &token).await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_assigned_only_filter() {
    let app = spawn_app().await;
    let (_, token) = app.create_user("admin@admin.com").await;
    let (_, breakfast) = app.post(TAGS_URL, &token, json!({ "name": "Breakfast" })).await;
    app.post(TAGS_URL, &token, json!({ "name": "Lunch" })).await;

    for title in ["Porridge", "Pancakes"] {
        let (status, _) = app
            .post(
                "/api/recipe/recipes/",
                &token,
                json!({ "title": title, "time_minutes": 5, "price": 2.0, "tags": [breakfast["id"]] }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app.get(&format!("{TAGS_URL}?assigned_only=1"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Breakfast"]);

    let (_, body) = app.get(&format!("{TAGS_URL}?assigned_only=0"), &token).await;
    assert_eq!(names(&body), vec!["Lunch", "Breakfast"]);

    let (status, _) = app.get(&format!("{TAGS_URL}?assigned_only=maybe"), &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_null_name_rejected() {
    let app = spawn_app().await;
    let (_, token) = app.create_user("admin@admin.com").await;
    let (_, tag) = app.post(TAGS_URL, &token, json!({ "name": "X" })).await;
    let url = tag_url(tag["id"].as_i64().unwrap());

    let (status, body) = app.patch(&url, &token, json!({ "name": null })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "name": ["This field may not be null."] }));

    let (status, body) = app.post(TAGS_URL, &token, json!({ "name": null })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "name": ["This field may not be null."] }));

    let (_, body) = app.get(&url, &token).await;
    assert_eq!(body["name"], "X");
}

#[tokio::test]
async fn test_unparsable_tag_id_is_not_found() {
    let app = spawn_app().await;
    let (_, token) = app.create_user("admin@admin.com").await;

    let (status, body) = app.get(&format!("{TAGS_URL}abc/"), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _) = app.delete(&format!("{TAGS_URL}-/"), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
