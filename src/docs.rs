// src/docs.rs

use crate::handlers;
use crate::models;
use crate::services;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Ofertas ---
        handlers::ofertas::listar_ofertas,
        handlers::ofertas::criar_oferta,
        handlers::ofertas::atualizar_oferta,
        handlers::ofertas::excluir_oferta,
        handlers::ofertas::alternar_selecao,
        handlers::ofertas::selecionar_todas,
        handlers::ofertas::limpar_selecao,

        // --- Importação ---
        handlers::importacao::obter_rascunho,
        handlers::importacao::atualizar_rascunho,
        handlers::importacao::processar,
        handlers::importacao::editar_produto,
        handlers::importacao::alternar_selecao,
        handlers::importacao::alternar_todos,
        handlers::importacao::confirmar,
        handlers::importacao::cancelar,

        // --- Exportação ---
        handlers::exportacao::baixar,
        handlers::exportacao::imprimir,
        handlers::exportacao::baixar_badge,

        // --- Admin ---
        handlers::admin::semear,
    ),
    components(
        schemas(
            // --- Modelos ---
            models::oferta::Unidade,
            models::oferta::Oferta,
            models::oferta::ProdutoImportado,
            models::oferta::RascunhoImportacao,
            models::oferta::ResultadoSync,
            models::oferta::OfertaSincronizada,

            // --- Resumos ---
            services::importacao_service::ResumoProcessamento,
            services::importacao_service::ResumoConfirmacao,

            // --- Payloads ---
            handlers::ofertas::OfertaPayload,
            handlers::importacao::AtualizarRascunhoPayload,
            handlers::importacao::ProcessarListaPayload,
            handlers::importacao::EditarProdutoPayload,
            handlers::admin::SemearPayload,
        )
    ),
    tags(
        (name = "Ofertas", description = "Gestão dos cartazes promocionais"),
        (name = "Importação", description = "Importação em massa de listas de produtos"),
        (name = "Exportação", description = "Download e impressão das páginas A4"),
        (name = "Admin", description = "Comandos administrativos")
    )
)]
pub struct ApiDoc;
