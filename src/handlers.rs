use crate::config::Config;
use crate::dashboard::to_dashboard_shape;
use crate::errors::AppError;
use crate::models::{DashboardApplication, TimelineRow};
use crate::store::ApplicationStore;
use crate::validation;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Application configuration.
    pub config: Config,
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

/// GET /api/applications
///
/// Lists every application in dashboard shape, newest-created-first, each
/// with its full timeline.
pub async fn list_applications(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DashboardApplication>>, AppError> {
    let store = ApplicationStore::new(state.db.clone());
    let now = Utc::now();

    let rows = store.fetch_all().await?;
    let mut result = Vec::with_capacity(rows.len());
    for row in rows {
        let timeline = store.fetch_timeline(&row.id).await?;
        result.push(to_dashboard_shape(&row, &timeline, now));
    }

    tracing::info!("Listed {} applications", result.len());
    Ok(Json(result))
}

/// GET /api/applications/:app_id
pub async fn get_application(
    State(state): State<Arc<AppState>>,
    Path(app_id): Path<String>,
) -> Result<Json<DashboardApplication>, AppError> {
    tracing::info!("GET /api/applications/{}", app_id);

    let store = ApplicationStore::new(state.db.clone());
    let row = store
        .fetch(&app_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;
    let timeline = store.fetch_timeline(&app_id).await?;

    Ok(Json(to_dashboard_shape(&row, &timeline, Utc::now())))
}

/// POST /api/applications
///
/// Validates the submitted form, then creates the aggregate and its two
/// bootstrap timeline entries in one transaction.
pub async fn create_application(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    validation::validate_create(&body)?;

    let store = ApplicationStore::new(state.db.clone());
    let app_id = store.create(&body).await?;

    tracing::info!("POST /api/applications -> {}", app_id);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": app_id,
            "message": "Application submitted successfully",
        })),
    ))
}

/// PATCH /api/applications/:app_id
///
/// Narrow field-level update over the allow-list. Unknown keys are ignored;
/// a missing row and a payload with no updatable fields both surface as 404.
pub async fn update_application(
    State(state): State<Arc<AppState>>,
    Path(app_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    validation::validate_update(&body)?;

    let updates = body.as_object().ok_or_else(|| {
        AppError::BadRequest("Request body must be a JSON object".to_string())
    })?;

    let store = ApplicationStore::new(state.db.clone());
    let affected = store.update_fields(&app_id, updates).await?;
    if affected == 0 {
        return Err(AppError::NotFound(
            "Application not found or no valid fields".to_string(),
        ));
    }

    tracing::info!("PATCH /api/applications/{} updated", app_id);
    Ok(Json(json!({"message": "Application updated"})))
}

/// DELETE /api/applications/:app_id
///
/// Permanent delete; timeline entries cascade.
pub async fn delete_application(
    State(state): State<Arc<AppState>>,
    Path(app_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let store = ApplicationStore::new(state.db.clone());
    let affected = store.delete(&app_id).await?;
    if affected == 0 {
        return Err(AppError::NotFound("Application not found".to_string()));
    }

    tracing::info!("DELETE /api/applications/{} removed", app_id);
    Ok(Json(json!({"message": "Application deleted"})))
}

/// POST /api/applications/:app_id/timeline
pub async fn add_timeline_event(
    State(state): State<Arc<AppState>>,
    Path(app_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<TimelineRow>), AppError> {
    let (event, event_type) = validation::validate_timeline_event(&body)?;

    let store = ApplicationStore::new(state.db.clone());
    let entry = store.add_timeline_event(&app_id, event, event_type).await?;

    tracing::info!("Timeline event added to {}", app_id);
    Ok((StatusCode::CREATED, Json(entry)))
}
