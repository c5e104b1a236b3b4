use axum::Json;
use lightness_core::types::{Emotion, Persona, Polarity};

/// GET /api/catalog: the fixed persona and emotion choices.
pub async fn get_catalog() -> Json<serde_json::Value> {
    let personas: Vec<serde_json::Value> = Persona::all()
        .iter()
        .map(|p| {
            serde_json::json!({
                "id": p.as_str(),
                "name": p.display_name(),
                "description": p.description(),
            })
        })
        .collect();

    let emotions: Vec<serde_json::Value> = Emotion::all()
        .iter()
        .map(|e| {
            serde_json::json!({
                "id": e.as_str(),
                "label": e.label(),
                "emoji": e.emoji(),
                "polarity": e.polarity(),
            })
        })
        .collect();

    let polarities: Vec<serde_json::Value> = [Polarity::Positive, Polarity::Negative, Polarity::Neutral]
        .iter()
        .map(|p| {
            serde_json::json!({
                "id": p.as_str(),
                "followUpQuestion": p.follow_up_question(),
                "keywords": p.keywords(),
            })
        })
        .collect();

    Json(serde_json::json!({
        "personas": personas,
        "emotions": emotions,
        "polarities": polarities,
    }))
}
