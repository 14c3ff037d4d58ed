//src/main.rs

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod parser;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;

#[tokio::main]
async fn main() {
    // Inicializa o logger, que movemos para o main.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotina de inicialização em segundo plano: migração da sub-coleção
    // legada e semeadura do catálogo padrão. Falha aqui não derruba o
    // servidor; a próxima inicialização tenta de novo.
    {
        let sync = app_state.sync_service.clone();
        tokio::spawn(async move {
            match sync.migrar_legado().await {
                Ok(0) => {}
                Ok(n) => tracing::info!("✅ {} ofertas migradas da coleção legada!", n),
                Err(e) => tracing::warn!("Migração da coleção legada falhou: {}", e),
            }
            match sync.semear_catalogo(false).await {
                Ok(0) => {}
                Ok(n) => tracing::info!("✅ Catálogo padrão semeado com {} ofertas!", n),
                Err(e) => tracing::warn!("Semeadura do catálogo padrão falhou: {}", e),
            }
        });
    }

    // Assinatura contínua da coleção compartilhada, pela vida do processo.
    {
        let sync = app_state.sync_service.clone();
        tokio::spawn(async move { sync.executar_assinatura().await });
    }

    let ofertas_routes = Router::new()
        .route(
            "/",
            get(handlers::ofertas::listar_ofertas).post(handlers::ofertas::criar_oferta),
        )
        .route(
            "/{id}",
            put(handlers::ofertas::atualizar_oferta).delete(handlers::ofertas::excluir_oferta),
        )
        .route("/{id}/selecao", post(handlers::ofertas::alternar_selecao))
        .route("/selecao/todas", post(handlers::ofertas::selecionar_todas))
        .route("/selecao", delete(handlers::ofertas::limpar_selecao));

    let importacao_routes = Router::new()
        .route(
            "/rascunho",
            get(handlers::importacao::obter_rascunho).put(handlers::importacao::atualizar_rascunho),
        )
        .route("/processar", post(handlers::importacao::processar))
        .route("/produtos/{indice}", put(handlers::importacao::editar_produto))
        .route(
            "/produtos/{indice}/selecao",
            post(handlers::importacao::alternar_selecao),
        )
        .route(
            "/produtos/selecao/todas",
            post(handlers::importacao::alternar_todos),
        )
        .route("/confirmar", post(handlers::importacao::confirmar))
        .route("/cancelar", post(handlers::importacao::cancelar));

    let exportacao_routes = Router::new()
        .route("/download", post(handlers::exportacao::baixar))
        .route("/imprimir", post(handlers::exportacao::imprimir))
        .route("/badge/{id}", post(handlers::exportacao::baixar_badge));

    let admin_routes = Router::new().route("/semear", post(handlers::admin::semear));

    // Combina tudo no router principal
    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/ofertas", ofertas_routes)
        .nest("/api/importacao", importacao_routes)
        .nest("/api/exportacao", exportacao_routes)
        .nest("/api/admin", admin_routes)
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
