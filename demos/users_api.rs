//! Small users API demonstrating validated handlers
//!
//! ```text
//! curl -X POST localhost:3000/users -d '{"name":"Ada","email":"ada@example.com"}'
//! curl localhost:3000/users/<id>
//! curl 'localhost:3000/users?page=1&limit=10'
//! ```

use anyhow::Result;
use axum::Json;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use this_validation::prelude::*;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
struct NewUser {
    #[validate(length(min = 1, max = 50))]
    name: String,
    #[validate(email)]
    email: String,
}

#[derive(Debug, Deserialize)]
struct UserPath {
    id: Uuid,
}

type Store = Arc<RwLock<HashMap<Uuid, NewUser>>>;

fn paging() -> ObjectSchema {
    ObjectSchema::new()
        .field(
            "page",
            FieldSchema::new()
                .filter(filters::default_value(json!("1")))
                .filter(filters::to_number())
                .rule(validators::min_value(1.0)),
        )
        .field(
            "limit",
            FieldSchema::new()
                .filter(filters::default_value(json!("20")))
                .filter(filters::to_number())
                .rule(validators::min_value(1.0))
                .rule(validators::max_value(100.0)),
        )
}

/// Number of users to skip for a 1-based page
fn page_offset(page: usize, limit: usize) -> usize {
    page.saturating_sub(1).saturating_mul(limit)
}

fn app(store: Store) -> Router {
    let create_store = store.clone();
    let create = with_validation(
        SchemaSet::new()
            .body(validated::<NewUser>())
            .body_message("Invalid user"),
        move |Validated { body, .. }: Validated<NewUser>| {
            let store = create_store.clone();
            async move {
                let id = Uuid::new_v4();
                if let Ok(mut users) = store.write() {
                    users.insert(id, body.clone());
                }
                (StatusCode::CREATED, Json(json!({ "id": id, "user": body })))
            }
        },
    );

    let show_store = store.clone();
    let show = with_validation(
        SchemaSet::new()
            .params(deserialize::<UserPath>())
            .params_message("Invalid user id"),
        move |Validated { params, .. }: Validated<(), UserPath>| {
            let store = show_store.clone();
            async move {
                let user = params.and_then(|p| store.read().ok()?.get(&p.id).cloned());
                match user {
                    Some(user) => (StatusCode::OK, Json(json!(user))),
                    None => (StatusCode::NOT_FOUND, Json(json!({ "message": "Not Found" }))),
                }
            }
        },
    );

    let list = with_validation(
        SchemaSet::new().query(paging()).query_message("Invalid paging"),
        move |Validated { query, .. }: Validated<(), (), Map<String, Value>>| {
            let store = store.clone();
            async move {
                let page = query["page"].as_u64().unwrap_or(1) as usize;
                let limit = query["limit"].as_u64().unwrap_or(20) as usize;
                let users: Vec<NewUser> = store
                    .read()
                    .map(|users| {
                        users
                            .values()
                            .skip(page_offset(page, limit))
                            .take(limit)
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();
                Json(json!({ "page": page, "limit": limit, "users": users }))
            }
        },
    );

    Router::new()
        .route("/users", post(create).get(list))
        .route("/users/{id}", get(show))
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("users_api=info,this_validation=debug,tower_http=info")),
        )
        .init();

    let store: Store = Arc::new(RwLock::new(HashMap::new()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app(store)).await?;
    Ok(())
}
