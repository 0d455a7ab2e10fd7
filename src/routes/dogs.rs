// SPDX-License-Identifier: MIT

//! Dog profile routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::dog::CreateDogRequest;
use crate::models::Dog;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/dogs", get(list_dogs).post(create_dog))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DogResponse {
    pub id: String,
    pub name: String,
    pub breed: Option<String>,
    pub created_at: String,
}

impl From<Dog> for DogResponse {
    fn from(dog: Dog) -> Self {
        Self {
            id: dog.id,
            name: dog.name,
            breed: dog.breed,
            created_at: format_utc_rfc3339(dog.created_at),
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DogsResponse {
    pub dogs: Vec<DogResponse>,
}

/// Dogs owned by the caller's account.
async fn list_dogs(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<DogsResponse>> {
    let dogs = match user.email.as_deref() {
        Some(email) => state
            .db
            .list_dogs_for_owner(email)
            .into_iter()
            .map(DogResponse::from)
            .collect(),
        None => vec![],
    };

    Ok(Json(DogsResponse { dogs }))
}

/// Create a dog profile owned by the caller's account.
async fn create_dog(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: std::result::Result<Json<CreateDogRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DogResponse>)> {
    let Json(req) = payload?;
    req.validate()?;

    // Ownership is keyed by email, so an account without one cannot own dogs.
    let email = user.email.ok_or_else(|| {
        AppError::BadRequest("Account has no email to own a dog profile".to_string())
    })?;

    let dog = Dog {
        id: Uuid::new_v4().to_string(),
        name: req.name.trim().to_string(),
        breed: req.breed.map(|b| b.trim().to_string()).filter(|b| !b.is_empty()),
        owner_email: Some(email),
        created_at: chrono::Utc::now(),
    };
    state.db.insert_dog(dog.clone());

    tracing::info!(user_id = %user.user_id, dog_id = %dog.id, "Dog profile created");

    Ok((StatusCode::CREATED, Json(DogResponse::from(dog))))
}
