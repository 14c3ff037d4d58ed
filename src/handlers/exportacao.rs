// src/handlers/exportacao.rs

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{common::error::AppError, config::AppState};

// POST /api/exportacao/download
#[utoipa::path(
    post,
    path = "/api/exportacao/download",
    tag = "Exportação",
    responses(
        (status = 200, description = "Páginas A4 gravadas no diretório de saída"),
        (status = 400, description = "Nenhuma oferta selecionada")
    )
)]
pub async fn baixar(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let selecionadas = app_state.oferta_service.ofertas_selecionadas().await;
    let arquivos = app_state.export_service.baixar(selecionadas).await?;
    Ok((StatusCode::OK, Json(json!({ "arquivos": arquivos }))))
}

// POST /api/exportacao/imprimir
#[utoipa::path(
    post,
    path = "/api/exportacao/imprimir",
    tag = "Exportação",
    responses(
        (status = 200, description = "PDF de impressão com uma página A4 por folha", body = Vec<u8>, content_type = "application/pdf"),
        (status = 400, description = "Nenhuma oferta selecionada"),
        (status = 504, description = "Preparação da impressão expirou")
    )
)]
pub async fn imprimir(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let selecionadas = app_state.oferta_service.ofertas_selecionadas().await;
    let pdf = app_state.export_service.imprimir(selecionadas).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"ofertas-a4.pdf\"".to_string(),
            ),
        ],
        pdf,
    ))
}

// POST /api/exportacao/badge/{id}
#[utoipa::path(
    post,
    path = "/api/exportacao/badge/{id}",
    tag = "Exportação",
    params(("id" = String, Path, description = "ID da oferta")),
    responses(
        (status = 200, description = "PNG do cartaz individual", body = Vec<u8>, content_type = "image/png"),
        (status = 404, description = "Oferta ou cartaz não encontrado")
    )
)]
pub async fn baixar_badge(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let oferta = app_state.oferta_service.buscar(&id).await?;
    let arquivo = app_state.export_service.baixar_badge(oferta).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", arquivo.nome),
            ),
        ],
        arquivo.dados,
    ))
}
