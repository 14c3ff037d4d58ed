// src/handlers/admin.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::{common::error::AppError, config::AppState};

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SemearPayload {
    // Com `forcar`, semeia mesmo com a coleção populada.
    #[serde(default)]
    pub forcar: bool,
}

// POST /api/admin/semear
#[utoipa::path(
    post,
    path = "/api/admin/semear",
    tag = "Admin",
    request_body = SemearPayload,
    responses(
        (status = 200, description = "Catálogo padrão semeado em lotes"),
        (status = 400, description = "Catálogo padrão sem produtos válidos")
    )
)]
pub async fn semear(
    State(app_state): State<AppState>,
    payload: Option<Json<SemearPayload>>,
) -> Result<impl IntoResponse, AppError> {
    let forcar = payload.map(|Json(p)| p.forcar).unwrap_or(false);
    let criadas = app_state.sync_service.semear_catalogo(forcar).await?;
    Ok((StatusCode::OK, Json(json!({ "criadas": criadas }))))
}
