use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use suggestion_agent::{fallback_suggestions, SuggestionSource};

use crate::state::AppState;

pub const MISSING_PARAMS: &str = "缺少必要参数";
pub const FALLBACK_NOTICE: &str = "AI服务暂时不可用，这里是一些通用建议";

const METADATA_TASK_CHARS: usize = 50;

/// POST /api/ai/suggestions: three side quests for `{task, persona}`.
///
/// Always answers with three suggestions unless a parameter is missing.
/// `success` is false whenever they came from the fallback tables.
pub async fn suggest(State(app): State<AppState>, body: Bytes) -> Response {
    // Only an unreadable or `null` body falls back. Any other JSON value is
    // read as an object, so arrays and scalars simply lack the fields.
    let fields = match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(value) if !value.is_null() => value,
        _ => {
            tracing::warn!("suggestion request body is not readable JSON");
            return Json(serde_json::json!({
                "success": false,
                "suggestions": fallback_suggestions("", ""),
                "error": FALLBACK_NOTICE,
            }))
            .into_response();
        }
    };

    let text = |key: &str| {
        fields
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    };
    let (Some(task), Some(persona)) = (text("task"), text("persona")) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": MISSING_PARAMS })),
        )
            .into_response();
    };

    let outcome = app.suggestions.generate(&task, &persona).await;
    let body = match outcome.source {
        SuggestionSource::Model => serde_json::json!({
            "success": true,
            "suggestions": outcome.suggestions,
            "metadata": {
                "task": metadata_task(&task),
                "persona": persona,
                "generatedAt": chrono::Utc::now(),
            },
        }),
        SuggestionSource::Fallback { .. } => serde_json::json!({
            "success": false,
            "suggestions": outcome.suggestions,
            "error": FALLBACK_NOTICE,
        }),
    };
    Json(body).into_response()
}

fn metadata_task(task: &str) -> String {
    if task.chars().count() > METADATA_TASK_CHARS {
        let head: String = task.chars().take(METADATA_TASK_CHARS).collect();
        format!("{head}...")
    } else {
        task.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_task_is_kept_whole() {
        assert_eq!(metadata_task("洗碗"), "洗碗");
    }

    #[test]
    fn long_task_is_cut_at_fifty_chars() {
        let task = "很".repeat(60);
        let cut = metadata_task(&task);
        assert_eq!(cut.chars().count(), 53);
        assert!(cut.ends_with("..."));
    }
}
