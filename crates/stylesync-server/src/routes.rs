use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use stylesync_core::{Category, Item};

use super::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: String,
    pub username: String,
    pub email: String,
}

pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "message": "Style Sync Backend Server is running!",
    }))
}

pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::MalformedPayload("username is required".into()));
    }
    if payload.email.trim().is_empty() || !payload.email.contains('@') {
        return Err(AppError::MalformedPayload("a valid email is required".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::MalformedPayload("password is required".into()));
    }

    if state.users.find_by_email(&payload.email)?.is_some() {
        return Err(AppError::EmailTaken);
    }

    let user = state
        .users
        .register(&payload.username, &payload.email, &payload.password)?;
    info!("Registered user {}", user.email);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id,
            username: user.username,
            email: user.email,
        }),
    ))
}

/// Every catalog item, grouped in category display order.
pub async fn list_products_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Item>> {
    let items: Vec<Item> = Category::ALL
        .iter()
        .flat_map(|category| state.catalog.get(*category).to_vec())
        .collect();
    Json(items)
}

pub async fn products_by_category_handler(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Result<Json<Vec<Item>>, AppError> {
    let parsed: Category = category
        .parse()
        .map_err(|_| AppError::UnknownCategory(category))?;
    Ok(Json(state.catalog.get(parsed).to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::UserStore;
    use stylesync_core::Catalog;
    use uuid::Uuid;

    fn test_state() -> (Arc<AppState>, std::path::PathBuf) {
        let path = std::env::temp_dir().join(format!("stylesync-routes-{}.redb", Uuid::new_v4()));
        let state = Arc::new(AppState {
            catalog: Catalog::sample(),
            users: UserStore::open(Some(path.to_str().unwrap())).unwrap(),
            config: Config {
                port: 0,
                db_path: None,
            },
        });
        (state, path)
    }

    fn register_payload(email: &str) -> RegisterRequest {
        RegisterRequest {
            username: "ada".into(),
            email: email.into(),
            password: "hunter2".into(),
        }
    }

    #[tokio::test]
    async fn test_register_creates_user_once() {
        let (state, path) = test_state();

        let (status, body) = register_handler(
            State(Arc::clone(&state)),
            Json(register_payload("ada@example.com")),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body.email, "ada@example.com");

        let duplicate = register_handler(
            State(Arc::clone(&state)),
            Json(register_payload("ada@example.com")),
        )
        .await;
        assert!(matches!(duplicate, Err(AppError::EmailTaken)));

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_register_rejects_malformed_payloads() {
        let (state, path) = test_state();

        let bad_email = register_handler(
            State(Arc::clone(&state)),
            Json(RegisterRequest {
                username: "ada".into(),
                email: "not-an-email".into(),
                password: "pw".into(),
            }),
        )
        .await;
        assert!(matches!(bad_email, Err(AppError::MalformedPayload(_))));

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_products_by_category() {
        let (state, path) = test_state();

        let Json(items) = products_by_category_handler(
            State(Arc::clone(&state)),
            Path("eyewear".to_string()),
        )
        .await
        .unwrap();
        let ids: Vec<u32> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![7, 8, 9]);

        let unknown =
            products_by_category_handler(State(Arc::clone(&state)), Path("sneakers".to_string()))
                .await;
        assert!(matches!(unknown, Err(AppError::UnknownCategory(_))));

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_list_products_covers_full_catalog() {
        let (state, path) = test_state();

        let Json(items) = list_products_handler(State(Arc::clone(&state))).await;
        assert_eq!(items.len(), 12);
        assert_eq!(items[0].id, 1);

        let _ = std::fs::remove_file(path);
    }
}
