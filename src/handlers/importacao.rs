// src/handlers/importacao.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::{error::AppError, moeda},
    config::AppState,
    models::oferta::Unidade,
    services::importacao_service::{MudancaProduto, MudancaRascunho},
};

// ---
// Payload: AtualizarRascunho (patch parcial)
// ---
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AtualizarRascunhoPayload {
    pub import_mode: Option<bool>,
    pub import_text: Option<String>,
}

// ---
// Payload: ProcessarLista
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessarListaPayload {
    #[validate(length(min = 1, message = "Cole ou digite a lista de produtos."))]
    #[schema(example = "BEATS GT — R$ 135,90\nArroz Tipo 1; 24,99; UND")]
    pub text: String,
}

// ---
// Payload: EditarProduto (patch parcial de um candidato)
// ---
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditarProdutoPayload {
    pub product_name: Option<String>,
    pub price: Option<String>,
    pub unit: Option<Unidade>,
    pub selected: Option<bool>,
}

// GET /api/importacao/rascunho
#[utoipa::path(
    get,
    path = "/api/importacao/rascunho",
    tag = "Importação",
    responses(
        (status = 200, description = "Rascunho atual da importação", body = crate::models::oferta::RascunhoImportacao)
    )
)]
pub async fn obter_rascunho(State(app_state): State<AppState>) -> impl IntoResponse {
    let rascunho = app_state.importacao_service.rascunho().await;
    (StatusCode::OK, Json(rascunho))
}

// PUT /api/importacao/rascunho
#[utoipa::path(
    put,
    path = "/api/importacao/rascunho",
    tag = "Importação",
    request_body = AtualizarRascunhoPayload,
    responses(
        (status = 200, description = "Rascunho atualizado", body = crate::models::oferta::RascunhoImportacao)
    )
)]
pub async fn atualizar_rascunho(
    State(app_state): State<AppState>,
    Json(payload): Json<AtualizarRascunhoPayload>,
) -> Result<impl IntoResponse, AppError> {
    let rascunho = app_state
        .importacao_service
        .atualizar_rascunho(MudancaRascunho {
            import_mode: payload.import_mode,
            import_text: payload.import_text,
        })
        .await?;
    Ok((StatusCode::OK, Json(rascunho)))
}

// POST /api/importacao/processar
#[utoipa::path(
    post,
    path = "/api/importacao/processar",
    tag = "Importação",
    request_body = ProcessarListaPayload,
    responses(
        (status = 200, description = "Lista processada", body = crate::services::importacao_service::ResumoProcessamento),
        (status = 400, description = "Lista vazia ou sem produtos válidos")
    )
)]
pub async fn processar(
    State(app_state): State<AppState>,
    Json(payload): Json<ProcessarListaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let resumo = app_state.importacao_service.processar(payload.text).await?;
    Ok((StatusCode::OK, Json(resumo)))
}

// PUT /api/importacao/produtos/{indice}
#[utoipa::path(
    put,
    path = "/api/importacao/produtos/{indice}",
    tag = "Importação",
    request_body = EditarProdutoPayload,
    params(("indice" = usize, Path, description = "Posição do produto no rascunho")),
    responses(
        (status = 200, description = "Produto editado", body = crate::models::oferta::RascunhoImportacao),
        (status = 404, description = "Produto importado não encontrado")
    )
)]
pub async fn editar_produto(
    State(app_state): State<AppState>,
    Path(indice): Path<usize>,
    Json(payload): Json<EditarProdutoPayload>,
) -> Result<impl IntoResponse, AppError> {
    let rascunho = app_state
        .importacao_service
        .editar_produto(
            indice,
            MudancaProduto {
                product_name: payload.product_name,
                price: payload.price.map(|p| moeda::formatar_entrada_preco(&p)),
                unit: payload.unit,
                selected: payload.selected,
            },
        )
        .await?;
    Ok((StatusCode::OK, Json(rascunho)))
}

// POST /api/importacao/produtos/{indice}/selecao
#[utoipa::path(
    post,
    path = "/api/importacao/produtos/{indice}/selecao",
    tag = "Importação",
    params(("indice" = usize, Path, description = "Posição do produto no rascunho")),
    responses(
        (status = 200, description = "Seleção alternada", body = crate::models::oferta::RascunhoImportacao),
        (status = 404, description = "Produto importado não encontrado")
    )
)]
pub async fn alternar_selecao(
    State(app_state): State<AppState>,
    Path(indice): Path<usize>,
) -> Result<impl IntoResponse, AppError> {
    let rascunho = app_state.importacao_service.alternar_selecao(indice).await?;
    Ok((StatusCode::OK, Json(rascunho)))
}

// POST /api/importacao/produtos/selecao/todas
#[utoipa::path(
    post,
    path = "/api/importacao/produtos/selecao/todas",
    tag = "Importação",
    responses((status = 200, description = "Seleção geral alternada", body = crate::models::oferta::RascunhoImportacao))
)]
pub async fn alternar_todos(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let rascunho = app_state.importacao_service.alternar_todos().await?;
    Ok((StatusCode::OK, Json(rascunho)))
}

// POST /api/importacao/confirmar
#[utoipa::path(
    post,
    path = "/api/importacao/confirmar",
    tag = "Importação",
    responses(
        (status = 201, description = "Ofertas criadas a partir dos selecionados", body = crate::services::importacao_service::ResumoConfirmacao),
        (status = 400, description = "Nenhum produto selecionado")
    )
)]
pub async fn confirmar(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let resumo = app_state.importacao_service.confirmar().await?;
    Ok((StatusCode::CREATED, Json(resumo)))
}

// POST /api/importacao/cancelar
#[utoipa::path(
    post,
    path = "/api/importacao/cancelar",
    tag = "Importação",
    responses((status = 204, description = "Rascunho descartado"))
)]
pub async fn cancelar(State(app_state): State<AppState>) -> impl IntoResponse {
    app_state.importacao_service.cancelar().await;
    StatusCode::NO_CONTENT
}
