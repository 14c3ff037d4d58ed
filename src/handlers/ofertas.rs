// src/handlers/ofertas.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::{error::AppError, moeda},
    config::AppState,
    models::oferta::Unidade,
    services::oferta_service::AtualizacaoOferta,
};

// ---
// Payload: CriarOferta / AtualizarOferta
// ---
// `price` chega como o usuário digitou; o handler normaliza para o
// formato pt-BR antes de entregar ao serviço.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfertaPayload {
    #[validate(length(min = 1, message = "O nome do produto é obrigatório."))]
    #[schema(example = "REFRIGERANTE COCA-COLA 2L")]
    pub product_name: String,

    #[validate(length(min = 1, message = "O preço é obrigatório."))]
    #[schema(example = "9,99")]
    pub price: String,

    // Ausente no JSON vira a unidade padrão (UND).
    pub unit: Option<Unidade>,

    #[schema(example = "LEVE 3 PAGUE 2")]
    pub extra_text: Option<String>,
}

// GET /api/ofertas
#[utoipa::path(
    get,
    path = "/api/ofertas",
    tag = "Ofertas",
    responses(
        (status = 200, description = "Lista de ofertas, mais recentes primeiro", body = Vec<crate::models::oferta::Oferta>)
    )
)]
pub async fn listar_ofertas(State(app_state): State<AppState>) -> impl IntoResponse {
    let ofertas = app_state.oferta_service.listar().await;
    (StatusCode::OK, Json(ofertas))
}

// POST /api/ofertas
#[utoipa::path(
    post,
    path = "/api/ofertas",
    tag = "Ofertas",
    request_body = OfertaPayload,
    responses(
        (status = 201, description = "Oferta criada (com o estado de sincronização)", body = crate::models::oferta::OfertaSincronizada),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn criar_oferta(
    State(app_state): State<AppState>,
    Json(payload): Json<OfertaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let preco = moeda::formatar_entrada_preco(&payload.price);
    let criada = app_state
        .oferta_service
        .criar(&payload.product_name, &preco, payload.unit, payload.extra_text)
        .await?;

    Ok((StatusCode::CREATED, Json(criada)))
}

// PUT /api/ofertas/{id}
#[utoipa::path(
    put,
    path = "/api/ofertas/{id}",
    tag = "Ofertas",
    request_body = OfertaPayload,
    params(("id" = String, Path, description = "ID da oferta")),
    responses(
        (status = 200, description = "Oferta atualizada", body = crate::models::oferta::OfertaSincronizada),
        (status = 404, description = "Oferta não encontrada")
    )
)]
pub async fn atualizar_oferta(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<OfertaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let atualizada = app_state
        .oferta_service
        .atualizar(
            &id,
            AtualizacaoOferta {
                product_name: payload.product_name,
                price: moeda::formatar_entrada_preco(&payload.price),
                unit: payload.unit.unwrap_or_default(),
                extra_text: payload.extra_text,
            },
        )
        .await?;

    Ok((StatusCode::OK, Json(atualizada)))
}

// DELETE /api/ofertas/{id}
#[utoipa::path(
    delete,
    path = "/api/ofertas/{id}",
    tag = "Ofertas",
    params(("id" = String, Path, description = "ID da oferta")),
    responses(
        (status = 200, description = "Oferta excluída", body = crate::models::oferta::ResultadoSync),
        (status = 404, description = "Oferta não encontrada")
    )
)]
pub async fn excluir_oferta(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let resultado = app_state.oferta_service.excluir(&id).await?;
    Ok((StatusCode::OK, Json(resultado)))
}

// POST /api/ofertas/{id}/selecao
#[utoipa::path(
    post,
    path = "/api/ofertas/{id}/selecao",
    tag = "Ofertas",
    params(("id" = String, Path, description = "ID da oferta")),
    responses(
        (status = 200, description = "Seleção alternada"),
        (status = 404, description = "Oferta não encontrada")
    )
)]
pub async fn alternar_selecao(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let selecionada = app_state.oferta_service.alternar_selecao(&id).await?;
    Ok((StatusCode::OK, Json(json!({ "selecionada": selecionada }))))
}

// POST /api/ofertas/selecao/todas
#[utoipa::path(
    post,
    path = "/api/ofertas/selecao/todas",
    tag = "Ofertas",
    responses((status = 200, description = "Todas as ofertas selecionadas"))
)]
pub async fn selecionar_todas(State(app_state): State<AppState>) -> impl IntoResponse {
    let total = app_state.oferta_service.selecionar_todas().await;
    (StatusCode::OK, Json(json!({ "selecionadas": total })))
}

// DELETE /api/ofertas/selecao
#[utoipa::path(
    delete,
    path = "/api/ofertas/selecao",
    tag = "Ofertas",
    responses((status = 204, description = "Seleção limpa"))
)]
pub async fn limpar_selecao(State(app_state): State<AppState>) -> impl IntoResponse {
    app_state.oferta_service.limpar_selecao().await;
    StatusCode::NO_CONTENT
}
