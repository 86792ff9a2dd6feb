//! GET /health — liveness plus prompt-store validation.
//!
//! The skills pipeline degrades without the (IT, "other") and
//! (non IT, "other") prompt rows, so their absence flips the service to
//! "degraded" even while everything else is up.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use tracing::warn;

use crate::repo::prompt::PromptRepository;
use crate::state::AppState;

pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let prompts = PromptRepository::new(state.db.clone());

    let (status, prompt_check, validation) = match prompts.missing_required_prompts().await {
        Ok(missing) if missing.is_empty() => (
            "healthy",
            "ok",
            json!({
                "status": "valid",
                "message": "All required 'other' prompts exist in database"
            }),
        ),
        Ok(missing) => {
            warn!(?missing, "health check: missing required prompts");
            (
                "degraded",
                "missing",
                json!({
                    "status": "invalid",
                    "message": format!("Missing required prompts: {}", missing.join(", ")),
                    "missing_prompts": missing,
                    "action_required": "Please add the missing prompts to the prompts table"
                }),
            )
        }
        Err(e) => {
            warn!(error = %e, "health check: prompt validation failed");
            (
                "degraded",
                "error",
                json!({
                    "status": "error",
                    "message": format!("Failed to validate prompts: {e}")
                }),
            )
        }
    };

    Json(json!({
        "status": status,
        "service": "ATS Backend",
        "checks": {
            "database": if prompt_check == "error" { "unknown" } else { "ok" },
            "prompts": prompt_check
        },
        "prompt_validation": validation
    }))
}
