// src/services/sync_service.rs
//
// A camada de sincronização com a coleção remota compartilhada:
// assinatura contínua (todo evento substitui o cache por inteiro),
// migração única da sub-coleção legada por instalação e semeadura do
// catálogo padrão quando a coleção está vazia.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;

use crate::{
    common::error::AppError,
    db::{ArmazenamentoLocal, ColecaoLegada, ColecaoOfertas},
    models::oferta::Oferta,
    parser,
    services::oferta_service::OfertaService,
};

const CHAVE_DEVICE: &str = "device-id";
const CHAVE_MIGRACAO: &str = "legacy-migration-done";

// Semeadura em lotes pequenos com pausa fixa, para não esbarrar nos
// limites de escrita da coleção remota.
pub const TAMANHO_LOTE_SEMEADURA: usize = 10;
pub const PAUSA_ENTRE_LOTES: Duration = Duration::from_millis(750);

const CATALOGO_PADRAO: &str = include_str!("../catalogo_padrao.txt");

pub struct SyncService {
    colecao: Arc<dyn ColecaoOfertas>,
    legada: Arc<dyn ColecaoLegada>,
    local: Arc<dyn ArmazenamentoLocal>,
    ofertas: Arc<OfertaService>,
}

impl SyncService {
    pub fn new(
        colecao: Arc<dyn ColecaoOfertas>,
        legada: Arc<dyn ColecaoLegada>,
        local: Arc<dyn ArmazenamentoLocal>,
        ofertas: Arc<OfertaService>,
    ) -> Self {
        Self {
            colecao,
            legada,
            local,
            ofertas,
        }
    }

    /// Carrega o estado inicial e fica escutando a coleção. Cada
    /// notificação (de qualquer cliente) substitui o cache por inteiro.
    /// Só retorna quando o canal de mudanças fecha.
    pub async fn executar_assinatura(&self) {
        let mut rx = self.colecao.assinar();

        match self.colecao.obter_todas().await {
            Ok(snapshot) => self.ofertas.aplicar_snapshot(snapshot).await,
            Err(e) => tracing::warn!("Falha na carga inicial da coleção: {}", e),
        }

        loop {
            match rx.recv().await {
                Ok(snapshot) => self.ofertas.aplicar_snapshot(snapshot).await,
                Err(RecvError::Lagged(perdidos)) => {
                    // Snapshots são completos: basta esperar o próximo.
                    tracing::debug!("Assinatura atrasada, {} snapshots pulados", perdidos);
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    /// Migração única por instalação: copia a sub-coleção legada deste
    /// identificador para a coleção compartilhada, num único lote atômico
    /// chaveado pelos ids originais. A trava local garante que rode no
    /// máximo uma vez, mesmo sem dados para migrar.
    pub async fn migrar_legado(&self) -> Result<usize, AppError> {
        if self.local.ler(CHAVE_MIGRACAO)?.is_some() {
            return Ok(0);
        }

        let device_id = self.identificador_instalacao()?;
        let legadas = self.legada.obter(&device_id).await?;

        let migradas = legadas.len();
        if !legadas.is_empty() {
            self.colecao.gravar_lote(&legadas).await?;
            tracing::info!("{} ofertas migradas da coleção legada", migradas);
        }

        self.local.gravar(CHAVE_MIGRACAO, "1")?;
        Ok(migradas)
    }

    /// Semeia o catálogo padrão quando a coleção está vazia. Com
    /// `forcar`, roda mesmo com dados presentes (recuperação manual —
    /// comando administrativo explícito, nada de gancho global).
    pub async fn semear_catalogo(&self, forcar: bool) -> Result<usize, AppError> {
        if !forcar && !self.colecao.obter_todas().await?.is_empty() {
            return Ok(0);
        }

        let resultado = parser::parse_lista(CATALOGO_PADRAO);
        let ofertas: Vec<Oferta> = resultado
            .produtos
            .into_iter()
            .map(|p| Oferta::nova(p.product_name, p.price, p.unit, None))
            .collect();

        if ofertas.is_empty() {
            return Err(AppError::NenhumProdutoValido);
        }

        let lotes = ofertas.chunks(TAMANHO_LOTE_SEMEADURA).count();
        for (i, lote) in ofertas.chunks(TAMANHO_LOTE_SEMEADURA).enumerate() {
            self.colecao.gravar_lote(lote).await?;
            tracing::info!("Catálogo padrão: lote {}/{} gravado", i + 1, lotes);
            if i + 1 < lotes {
                tokio::time::sleep(PAUSA_ENTRE_LOTES).await;
            }
        }

        Ok(ofertas.len())
    }

    // Identificador gerado por instalação, persistido localmente.
    fn identificador_instalacao(&self) -> Result<String, AppError> {
        if let Some(id) = self.local.ler(CHAVE_DEVICE)? {
            return Ok(id);
        }
        let id = uuid::Uuid::new_v4().to_string();
        self.local.gravar(CHAVE_DEVICE, &id)?;
        Ok(id)
    }
}
