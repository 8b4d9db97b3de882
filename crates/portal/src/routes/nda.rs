//! NDA route handlers.

use axum::{Json, extract::State, http::HeaderMap};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use ridgeline_core::{AcceptanceId, NdaAcceptance, NdaContent, NdaStatus};

use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::state::AppState;

/// Request body for `POST /api/nda/accept`.
///
/// `ip_address` is the client's best-effort self-reported address; the SDK
/// sends the literal `"unknown"` when its IP lookup fails rather than
/// blocking acceptance.
#[derive(Debug, Deserialize)]
pub struct AcceptNdaForm {
    pub digital_signature: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// Current NDA text.
///
/// GET /api/nda/content (unauthenticated-safe)
pub async fn content(State(state): State<AppState>) -> Result<Json<NdaContent>> {
    Ok(Json(state.store().nda()?))
}

/// Record the caller's acceptance of the current NDA version.
///
/// POST /api/nda/accept
#[instrument(skip(state, headers, form), fields(user_id = %user.id))]
pub async fn accept(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    headers: HeaderMap,
    Json(form): Json<AcceptNdaForm>,
) -> Result<Json<NdaAcceptance>> {
    let signature = form.digital_signature.trim();
    if signature.is_empty() {
        return Err(AppError::Validation(
            "Full legal name is required".to_string(),
        ));
    }

    let ip_address = form
        .ip_address
        .filter(|ip| !ip.trim().is_empty())
        .unwrap_or_else(|| "unknown".to_string());
    let user_agent = form
        .user_agent
        .filter(|ua| !ua.trim().is_empty())
        .or_else(|| {
            headers
                .get(axum::http::header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        })
        .unwrap_or_else(|| "unknown".to_string());

    let nda = state.store().nda()?;
    let acceptance = state.store().insert_acceptance(NdaAcceptance {
        id: AcceptanceId::generate(),
        user_id: user.id,
        nda_id: nda.nda_id,
        version: nda.version,
        digital_signature: signature.to_string(),
        ip_address,
        user_agent,
        accepted_at: Utc::now(),
    })?;

    tracing::info!(version = %acceptance.version, "NDA accepted");
    Ok(Json(acceptance))
}

/// The caller's acceptance status for the current NDA version.
///
/// GET /api/nda/status
pub async fn status(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<NdaStatus>> {
    let nda = state.store().nda()?;
    let status = state.store().acceptance(user.id, &nda.version)?.map_or_else(
        NdaStatus::default,
        |acceptance| NdaStatus {
            accepted: true,
            accepted_at: Some(acceptance.accepted_at),
            version: Some(acceptance.version),
            nda_id: Some(acceptance.nda_id),
        },
    );
    Ok(Json(status))
}
