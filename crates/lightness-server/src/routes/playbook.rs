use axum::extract::{Query, State};
use axum::Json;
use lightness_core::playbook::{Playbook, PlaybookFilter};
use lightness_core::LightnessError;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct PlaybookParams {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub filter: String,
}

/// GET /api/playbook?q=&filter=all|positive|negative
pub async fn get_playbook(
    State(app): State<AppState>,
    Query(params): Query<PlaybookParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let filter: PlaybookFilter = params.filter.parse()?;
    let experiences = app.experiences.clone();
    let book = tokio::task::spawn_blocking(move || {
        experiences.refresh_logged_experiences()?;
        let logged = experiences.snapshot().logged_experiences;
        Ok::<_, LightnessError>(Playbook::build(&logged, &params.q, filter))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(serde_json::json!(book)))
}
