// src/db/oferta_repo.rs

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tokio::sync::broadcast;

use crate::{common::error::AppError, models::oferta::Oferta};

// Capacidade folgada: cada escrita emite um snapshot completo e os
// assinantes atrasados recebem `Lagged`, nunca dados parciais.
const CAPACIDADE_CANAL: usize = 32;

/// A coleção remota compartilhada de ofertas: documentos chaveados pelo id,
/// com notificação de mudanças por assinatura. É a fonte da verdade; a
/// lista em memória dos serviços é só um cache.
#[async_trait]
pub trait ColecaoOfertas: Send + Sync {
    async fn obter_todas(&self) -> Result<Vec<Oferta>, AppError>;

    /// Upsert de um documento (semântica de merge por id).
    async fn gravar(&self, oferta: &Oferta) -> Result<(), AppError>;

    async fn remover(&self, id: &str) -> Result<(), AppError>;

    /// Escrita atômica de vários documentos, chaveados pelos ids originais.
    async fn gravar_lote(&self, ofertas: &[Oferta]) -> Result<(), AppError>;

    /// Assina a coleção: todo evento entrega o conteúdo completo atual.
    fn assinar(&self) -> broadcast::Receiver<Vec<Oferta>>;
}

/// Sub-coleção legada por instalação, consumida uma única vez pela
/// migração inicial.
#[async_trait]
pub trait ColecaoLegada: Send + Sync {
    async fn obter(&self, device_id: &str) -> Result<Vec<Oferta>, AppError>;
}

#[derive(Debug, Clone, FromRow)]
struct OfertaRow {
    id: String,
    product_name: String,
    price: String,
    unit: String,
    extra_text: Option<String>,
    created_at: Option<String>,
}

impl From<OfertaRow> for Oferta {
    fn from(row: OfertaRow) -> Self {
        Oferta {
            id: row.id,
            product_name: row.product_name,
            price: row.price,
            unit: row.unit.parse().unwrap_or_default(),
            extra_text: row.extra_text,
            created_at: row.created_at.unwrap_or_default(),
        }
    }
}

// O repositório Postgres da coleção compartilhada. As notificações de
// mudança são emitidas pelo próprio repositório após cada escrita.
#[derive(Clone)]
pub struct PgColecaoOfertas {
    pool: PgPool,
    tx_mudancas: broadcast::Sender<Vec<Oferta>>,
}

impl PgColecaoOfertas {
    pub fn new(pool: PgPool) -> Self {
        let (tx_mudancas, _) = broadcast::channel(CAPACIDADE_CANAL);
        Self { pool, tx_mudancas }
    }

    async fn notificar(&self) {
        // Falha aqui não pode derrubar a escrita que acabou de acontecer.
        match self.buscar_todas().await {
            Ok(snapshot) => {
                let _ = self.tx_mudancas.send(snapshot);
            }
            Err(e) => tracing::warn!("Falha ao emitir snapshot da coleção: {}", e),
        }
    }

    async fn buscar_todas(&self) -> Result<Vec<Oferta>, AppError> {
        let linhas = sqlx::query_as::<_, OfertaRow>("SELECT * FROM ofertas")
            .fetch_all(&self.pool)
            .await?;
        Ok(linhas.into_iter().map(Oferta::from).collect())
    }
}

#[async_trait]
impl ColecaoOfertas for PgColecaoOfertas {
    async fn obter_todas(&self) -> Result<Vec<Oferta>, AppError> {
        self.buscar_todas().await
    }

    async fn gravar(&self, oferta: &Oferta) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO ofertas (id, product_name, price, unit, extra_text, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                product_name = EXCLUDED.product_name,
                price        = EXCLUDED.price,
                unit         = EXCLUDED.unit,
                extra_text   = EXCLUDED.extra_text,
                created_at   = EXCLUDED.created_at
            "#,
        )
        .bind(&oferta.id)
        .bind(&oferta.product_name)
        .bind(&oferta.price)
        .bind(oferta.unit.codigo())
        .bind(&oferta.extra_text)
        .bind(&oferta.created_at)
        .execute(&self.pool)
        .await?;

        self.notificar().await;
        Ok(())
    }

    async fn remover(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM ofertas WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.notificar().await;
        Ok(())
    }

    async fn gravar_lote(&self, ofertas: &[Oferta]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for oferta in ofertas {
            sqlx::query(
                r#"
                INSERT INTO ofertas (id, product_name, price, unit, extra_text, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (id) DO UPDATE SET
                    product_name = EXCLUDED.product_name,
                    price        = EXCLUDED.price,
                    unit         = EXCLUDED.unit,
                    extra_text   = EXCLUDED.extra_text,
                    created_at   = EXCLUDED.created_at
                "#,
            )
            .bind(&oferta.id)
            .bind(&oferta.product_name)
            .bind(&oferta.price)
            .bind(oferta.unit.codigo())
            .bind(&oferta.extra_text)
            .bind(&oferta.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.notificar().await;
        Ok(())
    }

    fn assinar(&self) -> broadcast::Receiver<Vec<Oferta>> {
        self.tx_mudancas.subscribe()
    }
}

#[async_trait]
impl ColecaoLegada for PgColecaoOfertas {
    async fn obter(&self, device_id: &str) -> Result<Vec<Oferta>, AppError> {
        let linhas = sqlx::query_as::<_, OfertaRow>(
            "SELECT id, product_name, price, unit, extra_text, created_at \
             FROM ofertas_legadas WHERE device_id = $1",
        )
        .bind(device_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(linhas.into_iter().map(Oferta::from).collect())
    }
}

// Dublê em memória para os testes de serviço: mesma interface, com uma
// chave para simular falha de escrita remota.
#[cfg(test)]
pub mod teste {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    pub struct ColecaoMemoria {
        dados: Mutex<HashMap<String, Oferta>>,
        falhar_escritas: AtomicBool,
        legadas: Mutex<HashMap<String, Vec<Oferta>>>,
        tx_mudancas: broadcast::Sender<Vec<Oferta>>,
    }

    impl ColecaoMemoria {
        pub fn nova() -> Self {
            let (tx_mudancas, _) = broadcast::channel(CAPACIDADE_CANAL);
            Self {
                dados: Mutex::new(HashMap::new()),
                falhar_escritas: AtomicBool::new(false),
                legadas: Mutex::new(HashMap::new()),
                tx_mudancas,
            }
        }

        pub fn falhar_escritas(&self, valor: bool) {
            self.falhar_escritas.store(valor, Ordering::SeqCst);
        }

        pub fn inserir_legadas(&self, device_id: &str, ofertas: Vec<Oferta>) {
            self.legadas
                .lock()
                .unwrap()
                .insert(device_id.to_string(), ofertas);
        }

        pub fn total(&self) -> usize {
            self.dados.lock().unwrap().len()
        }

        fn checar_falha(&self) -> Result<(), AppError> {
            if self.falhar_escritas.load(Ordering::SeqCst) {
                return Err(AppError::InternalServerError(anyhow::anyhow!(
                    "escrita remota recusada"
                )));
            }
            Ok(())
        }

        fn notificar(&self) {
            let snapshot: Vec<Oferta> = self.dados.lock().unwrap().values().cloned().collect();
            let _ = self.tx_mudancas.send(snapshot);
        }
    }

    #[async_trait]
    impl ColecaoOfertas for ColecaoMemoria {
        async fn obter_todas(&self) -> Result<Vec<Oferta>, AppError> {
            Ok(self.dados.lock().unwrap().values().cloned().collect())
        }

        async fn gravar(&self, oferta: &Oferta) -> Result<(), AppError> {
            self.checar_falha()?;
            self.dados
                .lock()
                .unwrap()
                .insert(oferta.id.clone(), oferta.clone());
            self.notificar();
            Ok(())
        }

        async fn remover(&self, id: &str) -> Result<(), AppError> {
            self.checar_falha()?;
            self.dados.lock().unwrap().remove(id);
            self.notificar();
            Ok(())
        }

        async fn gravar_lote(&self, ofertas: &[Oferta]) -> Result<(), AppError> {
            self.checar_falha()?;
            {
                let mut dados = self.dados.lock().unwrap();
                for oferta in ofertas {
                    dados.insert(oferta.id.clone(), oferta.clone());
                }
            }
            self.notificar();
            Ok(())
        }

        fn assinar(&self) -> broadcast::Receiver<Vec<Oferta>> {
            self.tx_mudancas.subscribe()
        }
    }

    #[async_trait]
    impl ColecaoLegada for ColecaoMemoria {
        async fn obter(&self, device_id: &str) -> Result<Vec<Oferta>, AppError> {
            Ok(self
                .legadas
                .lock()
                .unwrap()
                .get(device_id)
                .cloned()
                .unwrap_or_default())
        }
    }
}
