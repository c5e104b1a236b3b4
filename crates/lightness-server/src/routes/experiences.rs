use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use lightness_core::lifecycle::{DesignInput, LogInput, Screen, ScreenGuard, TransitionPayload};
use lightness_core::LightnessError;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateExperienceBody {
    #[serde(default)]
    pub title: String,
}

/// GET /api/experiences: the cached home-screen lists.
pub async fn list_experiences(State(app): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!(app.experiences.snapshot()))
}

/// POST /api/experiences: record a new obligation.
pub async fn create_experience(
    State(app): State<AppState>,
    Json(body): Json<CreateExperienceBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let experiences = app.experiences.clone();
    let record = tokio::task::spawn_blocking(move || {
        let id = experiences.add_task(&body.title)?;
        experiences.db().get_required(id)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok((StatusCode::CREATED, Json(serde_json::json!(record))))
}

/// POST /api/experiences/refresh: re-read the lists from the store.
pub async fn refresh_experiences(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let experiences = app.experiences.clone();
    let lists = tokio::task::spawn_blocking(move || {
        experiences.refresh_tasks()?;
        Ok::<_, LightnessError>(experiences.snapshot())
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::json!(lists)))
}

/// GET /api/experiences/{id}
pub async fn get_experience(
    State(app): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let experiences = app.experiences.clone();
    let record = tokio::task::spawn_blocking(move || experiences.db().get_required(id))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::json!(record)))
}

/// GET /api/experiences/{id}/screens/{screen}: may this screen be shown?
///
/// A record in the wrong status redirects home instead of failing.
pub async fn open_screen(
    State(app): State<AppState>,
    Path((id, screen)): Path<(u64, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let screen: Screen = screen.parse()?;
    let experiences = app.experiences.clone();
    let record = tokio::task::spawn_blocking(move || experiences.db().get_required(id))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    let body = match screen.guard(&record) {
        ScreenGuard::Proceed => serde_json::json!({
            "screen": screen,
            "proceed": true,
            "experience": record,
        }),
        ScreenGuard::RedirectHome => serde_json::json!({
            "screen": screen,
            "proceed": false,
            "redirect": "/",
            "experience": record,
        }),
    };
    Ok(Json(body))
}

/// POST /api/experiences/{id}/design: finish the design wizard.
pub async fn complete_design(
    State(app): State<AppState>,
    Path(id): Path<u64>,
    Json(input): Json<DesignInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    complete_screen(app, id, Screen::Design, TransitionPayload::Design(input)).await
}

/// POST /api/experiences/{id}/play
pub async fn complete_play(
    State(app): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<serde_json::Value>, AppError> {
    complete_screen(app, id, Screen::Play, TransitionPayload::Play).await
}

/// POST /api/experiences/{id}/log: record the reflection.
pub async fn complete_log(
    State(app): State<AppState>,
    Path(id): Path<u64>,
    Json(input): Json<LogInput>,
) -> Result<Json<serde_json::Value>, AppError> {
    complete_screen(app, id, Screen::Log, TransitionPayload::Log(input)).await
}

async fn complete_screen(
    app: AppState,
    id: u64,
    screen: Screen,
    payload: TransitionPayload,
) -> Result<Json<serde_json::Value>, AppError> {
    let experiences = app.experiences.clone();
    let record = tokio::task::spawn_blocking(move || {
        experiences.db().transition(
            id,
            screen.expected_status(),
            screen.target_status(),
            payload,
        )
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::json!({
        "experience": record,
        "next": screen.next_route(id),
    })))
}
