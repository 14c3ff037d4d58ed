// src/config.rs

use crate::{
    db::{ArquivoLocal, PgColecaoOfertas},
    services::{
        export_service::{BadgesEmDisco, ExportService, MontadorGenpdf, RasterizadorImagem},
        importacao_service::ImportacaoService,
        oferta_service::OfertaService,
        sync_service::SyncService,
    },
};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, sync::Arc, time::Duration};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub oferta_service: Arc<OfertaService>,
    pub importacao_service: Arc<ImportacaoService>,
    pub export_service: Arc<ExportService>,
    pub sync_service: Arc<SyncService>,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let local_store_path =
            env::var("LOCAL_STORE_PATH").unwrap_or_else(|_| "./dados/local-store.json".into());
        let badges_dir = env::var("BADGES_DIR").unwrap_or_else(|_| "./badges".into());
        let export_dir = env::var("EXPORT_DIR").unwrap_or_else(|_| "./exportacoes".into());

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let colecao = Arc::new(PgColecaoOfertas::new(db_pool.clone()));
        let local = Arc::new(ArquivoLocal::abrir(&local_store_path)?);

        let oferta_service = Arc::new(OfertaService::new(colecao.clone(), local.clone()));
        let importacao_service = Arc::new(ImportacaoService::new(
            local.clone(),
            oferta_service.clone(),
        ));
        let export_service = Arc::new(ExportService::new(
            Arc::new(RasterizadorImagem),
            Arc::new(BadgesEmDisco::novo(&badges_dir)),
            Arc::new(MontadorGenpdf),
            &export_dir,
        ));
        let sync_service = Arc::new(SyncService::new(
            colecao.clone(),
            colecao,
            local,
            oferta_service.clone(),
        ));

        Ok(Self {
            db_pool,
            oferta_service,
            importacao_service,
            export_service,
            sync_service,
        })
    }
}
