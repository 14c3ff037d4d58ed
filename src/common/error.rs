use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Campos obrigatórios ausentes: {0}")]
    CamposObrigatorios(String),

    #[error("Oferta não encontrada")]
    OfertaNaoEncontrada,

    #[error("Produto importado não encontrado")]
    ProdutoImportadoNaoEncontrado,

    #[error("Lista de importação vazia")]
    ListaVazia,

    #[error("Nenhum produto válido foi encontrado")]
    NenhumProdutoValido,

    #[error("Nenhum produto selecionado")]
    NenhumProdutoSelecionado,

    #[error("Nenhuma oferta selecionada")]
    NenhumaOfertaSelecionada,

    #[error("Badge não encontrado para a oferta {0}")]
    BadgeNaoEncontrado(String),

    #[error("Fonte não encontrada: {0}")]
    FonteNaoEncontrada(String),

    #[error("Falha na rasterização: {0}")]
    RasterizacaoFalhou(String),

    #[error("Tempo de impressão esgotado")]
    ImpressaoExpirada,

    #[error("Erro no armazenamento local: {0}")]
    ArmazenamentoLocal(String),

    // Variante para erros vindos da coleção remota (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado.
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::CamposObrigatorios(campos) => {
                let body = Json(json!({
                    "error": "Preencha o nome do produto e o preço.",
                    "details": campos,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::OfertaNaoEncontrada => (StatusCode::NOT_FOUND, "Oferta não encontrada."),
            AppError::ProdutoImportadoNaoEncontrado => {
                (StatusCode::NOT_FOUND, "Produto importado não encontrado.")
            }
            AppError::ListaVazia => (
                StatusCode::BAD_REQUEST,
                "Cole ou digite a lista de produtos para importar.",
            ),
            AppError::NenhumProdutoValido => (
                StatusCode::BAD_REQUEST,
                "Nenhum produto válido foi encontrado.",
            ),
            AppError::NenhumProdutoSelecionado => (
                StatusCode::BAD_REQUEST,
                "Selecione pelo menos um produto para criar ofertas.",
            ),
            AppError::NenhumaOfertaSelecionada => (
                StatusCode::BAD_REQUEST,
                "Selecione pelo menos uma oferta para baixar.",
            ),
            AppError::BadgeNaoEncontrado(_) => (
                StatusCode::NOT_FOUND,
                "O cartaz de referência não foi encontrado.",
            ),
            AppError::ImpressaoExpirada => (
                StatusCode::GATEWAY_TIMEOUT,
                "A preparação da impressão demorou demais e foi descartada.",
            ),
            AppError::RasterizacaoFalhou(ref detalhe) => {
                tracing::error!("Falha na rasterização: {}", detalhe);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Não foi possível gerar as imagens das páginas.",
                )
            }

            // Todos os outros erros (DatabaseError, InternalServerError...) viram 500.
            // O `tracing` vai logar a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
