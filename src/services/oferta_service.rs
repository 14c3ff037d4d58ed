// src/services/oferta_service.rs

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    common::error::AppError,
    db::{ArmazenamentoLocal, ColecaoOfertas},
    models::oferta::{Oferta, OfertaSincronizada, ResultadoSync, Unidade},
};

// Chave do espelho local da lista (mesma chave do app original).
pub const CHAVE_OFERTAS: &str = "promotional-offers";

/// Dados de uma atualização: os três campos obrigatórios sempre vêm
/// completos; `extra_text` vazio após trim limpa a legenda (a chave some
/// do documento, nunca vira string vazia).
#[derive(Debug, Clone)]
pub struct AtualizacaoOferta {
    pub product_name: String,
    pub price: String,
    pub unit: Unidade,
    pub extra_text: Option<String>,
}

/// Política de reconciliação com a coleção remota: substituição integral
/// do cache pelo snapshot, reordenado por `created_at` decrescente.
/// Documentos sem `created_at` (string vazia) ficam por último.
pub fn reconciliar(mut snapshot: Vec<Oferta>) -> Vec<Oferta> {
    snapshot.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    snapshot
}

/// Mantém a lista de ofertas em memória, o conjunto de seleção e o
/// espelho local, aplicando mutações de forma otimista: o estado local
/// muda primeiro, a escrita remota vem depois e pode falhar sem rollback.
pub struct OfertaService {
    colecao: Arc<dyn ColecaoOfertas>,
    local: Arc<dyn ArmazenamentoLocal>,
    cache: RwLock<Vec<Oferta>>,
    selecionadas: RwLock<HashSet<String>>,
}

impl OfertaService {
    pub fn new(colecao: Arc<dyn ColecaoOfertas>, local: Arc<dyn ArmazenamentoLocal>) -> Self {
        Self {
            colecao,
            local,
            cache: RwLock::new(Vec::new()),
            selecionadas: RwLock::new(HashSet::new()),
        }
    }

    // ---
    // Leitura
    // ---

    pub async fn listar(&self) -> Vec<Oferta> {
        self.cache.read().await.clone()
    }

    pub async fn selecao(&self) -> Vec<String> {
        let cache = self.cache.read().await;
        let selecionadas = self.selecionadas.read().await;
        // Na ordem da lista, não na ordem de inserção no conjunto.
        cache
            .iter()
            .filter(|o| selecionadas.contains(&o.id))
            .map(|o| o.id.clone())
            .collect()
    }

    pub async fn ofertas_selecionadas(&self) -> Vec<Oferta> {
        let cache = self.cache.read().await;
        let selecionadas = self.selecionadas.read().await;
        cache
            .iter()
            .filter(|o| selecionadas.contains(&o.id))
            .cloned()
            .collect()
    }

    pub async fn buscar(&self, id: &str) -> Result<Oferta, AppError> {
        self.cache
            .read()
            .await
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or(AppError::OfertaNaoEncontrada)
    }

    // ---
    // Mutações (otimistas)
    // ---

    pub async fn criar(
        &self,
        product_name: &str,
        price: &str,
        unit: Option<Unidade>,
        extra_text: Option<String>,
    ) -> Result<OfertaSincronizada, AppError> {
        validar_obrigatorios(product_name, price)?;

        let oferta = Oferta::nova(
            product_name,
            price,
            unit.unwrap_or_default(),
            normalizar_extra(extra_text),
        );

        {
            let mut cache = self.cache.write().await;
            cache.insert(0, oferta.clone());
            self.espelhar_local(&cache);
        }

        let sync = self.sincronizar_gravacao(&oferta).await;
        Ok(OfertaSincronizada { oferta, sync })
    }

    /// Criação em lote (confirmação da importação). Todas entram no cache
    /// de uma vez e seguem para a coleção remota numa única escrita.
    pub async fn criar_varias(&self, ofertas: Vec<Oferta>) -> Result<ResultadoSync, AppError> {
        if ofertas.is_empty() {
            return Err(AppError::NenhumProdutoSelecionado);
        }

        {
            let mut cache = self.cache.write().await;
            for (i, oferta) in ofertas.iter().enumerate() {
                cache.insert(i, oferta.clone());
            }
            self.espelhar_local(&cache);
        }

        match self.colecao.gravar_lote(&ofertas).await {
            Ok(()) => Ok(ResultadoSync::ok()),
            Err(e) => {
                tracing::warn!("Escrita remota do lote falhou: {}", e);
                Ok(ResultadoSync::nao_sincronizada())
            }
        }
    }

    pub async fn atualizar(
        &self,
        id: &str,
        mudanca: AtualizacaoOferta,
    ) -> Result<OfertaSincronizada, AppError> {
        validar_obrigatorios(&mudanca.product_name, &mudanca.price)?;

        let oferta = {
            let mut cache = self.cache.write().await;
            let existente = cache
                .iter_mut()
                .find(|o| o.id == id)
                .ok_or(AppError::OfertaNaoEncontrada)?;

            existente.product_name = mudanca.product_name;
            existente.price = mudanca.price;
            existente.unit = mudanca.unit;
            existente.extra_text = normalizar_extra(mudanca.extra_text);

            let oferta = existente.clone();
            self.espelhar_local(&cache);
            oferta
        };

        let sync = self.sincronizar_gravacao(&oferta).await;
        Ok(OfertaSincronizada { oferta, sync })
    }

    /// Remove a oferta da lista e do conjunto de seleção na mesma
    /// operação: nenhum id órfão pode sobrar na seleção.
    pub async fn excluir(&self, id: &str) -> Result<ResultadoSync, AppError> {
        {
            let mut cache = self.cache.write().await;
            let antes = cache.len();
            cache.retain(|o| o.id != id);
            if cache.len() == antes {
                return Err(AppError::OfertaNaoEncontrada);
            }
            self.selecionadas.write().await.remove(id);
            self.espelhar_local(&cache);
        }

        match self.colecao.remover(id).await {
            Ok(()) => Ok(ResultadoSync::ok()),
            Err(e) => {
                tracing::warn!("Exclusão remota da oferta {} falhou: {}", id, e);
                Ok(ResultadoSync::nao_sincronizada())
            }
        }
    }

    // ---
    // Seleção
    // ---

    pub async fn alternar_selecao(&self, id: &str) -> Result<bool, AppError> {
        self.buscar(id).await?;
        let mut selecionadas = self.selecionadas.write().await;
        if selecionadas.remove(id) {
            Ok(false)
        } else {
            selecionadas.insert(id.to_string());
            Ok(true)
        }
    }

    pub async fn selecionar_todas(&self) -> usize {
        let cache = self.cache.read().await;
        let mut selecionadas = self.selecionadas.write().await;
        *selecionadas = cache.iter().map(|o| o.id.clone()).collect();
        selecionadas.len()
    }

    pub async fn limpar_selecao(&self) {
        self.selecionadas.write().await.clear();
    }

    // ---
    // Reconciliação com a coleção remota
    // ---

    /// Aplica um snapshot vindo da assinatura: substituição integral.
    /// A seleção é podada para não apontar para ofertas que sumiram.
    pub async fn aplicar_snapshot(&self, snapshot: Vec<Oferta>) {
        let novo = reconciliar(snapshot);
        {
            let mut selecionadas = self.selecionadas.write().await;
            let existentes: HashSet<&str> = novo.iter().map(|o| o.id.as_str()).collect();
            selecionadas.retain(|id| existentes.contains(id.as_str()));
        }
        let mut cache = self.cache.write().await;
        *cache = novo;
        self.espelhar_local(&cache);
    }

    // ---
    // Internos
    // ---

    async fn sincronizar_gravacao(&self, oferta: &Oferta) -> ResultadoSync {
        match self.colecao.gravar(oferta).await {
            Ok(()) => ResultadoSync::ok(),
            Err(e) => {
                tracing::warn!("Escrita remota da oferta {} falhou: {}", oferta.id, e);
                ResultadoSync::nao_sincronizada()
            }
        }
    }

    // Espelho local da lista: gravado a cada mudança, removido quando a
    // lista esvazia. Falha aqui só gera aviso no log.
    fn espelhar_local(&self, cache: &[Oferta]) {
        let resultado = if cache.is_empty() {
            self.local.remover(CHAVE_OFERTAS)
        } else {
            match serde_json::to_string(cache) {
                Ok(json) => self.local.gravar(CHAVE_OFERTAS, &json),
                Err(e) => Err(AppError::ArmazenamentoLocal(e.to_string())),
            }
        };
        if let Err(e) = resultado {
            tracing::warn!("Falha ao espelhar ofertas no armazenamento local: {}", e);
        }
    }
}

fn validar_obrigatorios(product_name: &str, price: &str) -> Result<(), AppError> {
    let mut faltando = Vec::new();
    if product_name.trim().is_empty() {
        faltando.push("productName");
    }
    if price.trim().is_empty() {
        faltando.push("price");
    }
    if faltando.is_empty() {
        Ok(())
    } else {
        Err(AppError::CamposObrigatorios(faltando.join(", ")))
    }
}

// Legenda opcional: aparada; vazia após o trim é omitida por completo.
fn normalizar_extra(extra_text: Option<String>) -> Option<String> {
    extra_text
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::local_store::teste::MemoriaLocal;
    use crate::db::oferta_repo::teste::ColecaoMemoria;

    fn servico() -> (Arc<ColecaoMemoria>, Arc<MemoriaLocal>, OfertaService) {
        let colecao = Arc::new(ColecaoMemoria::nova());
        let local = Arc::new(MemoriaLocal::novo());
        let service = OfertaService::new(colecao.clone(), local.clone());
        (colecao, local, service)
    }

    #[tokio::test]
    async fn criar_sem_nome_falha_sem_estado_parcial() {
        let (colecao, _, service) = servico();
        let erro = service.criar("   ", "9,99", None, None).await;
        assert!(matches!(erro, Err(AppError::CamposObrigatorios(_))));
        assert!(service.listar().await.is_empty());
        assert_eq!(colecao.total(), 0);
    }

    #[tokio::test]
    async fn criar_usa_und_como_unidade_padrao() {
        let (_, _, service) = servico();
        let criada = service.criar("Coca 2L", "9,99", None, None).await.unwrap();
        assert_eq!(criada.oferta.unit, Unidade::Und);
        assert!(criada.sync.sincronizada);
        assert!(!criada.oferta.created_at.is_empty());
    }

    #[tokio::test]
    async fn extra_text_em_branco_e_omitido() {
        let (_, _, service) = servico();
        let criada = service
            .criar("Coca 2L", "9,99", None, Some("   ".to_string()))
            .await
            .unwrap();
        assert_eq!(criada.oferta.extra_text, None);

        // Limpar a legenda numa atualização também omite a chave.
        let com_texto = service
            .criar("Fanta", "7,99", None, Some("à vista".to_string()))
            .await
            .unwrap();
        let atualizada = service
            .atualizar(
                &com_texto.oferta.id,
                AtualizacaoOferta {
                    product_name: "Fanta".into(),
                    price: "7,99".into(),
                    unit: Unidade::Und,
                    extra_text: Some("  ".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(atualizada.oferta.extra_text, None);
        let json = serde_json::to_value(&atualizada.oferta).unwrap();
        assert!(json.get("extraText").is_none());
    }

    #[tokio::test]
    async fn falha_remota_mantem_oferta_local_com_aviso() {
        let (colecao, _, service) = servico();
        colecao.falhar_escritas(true);

        let criada = service.criar("Coca 2L", "9,99", None, None).await.unwrap();
        assert!(!criada.sync.sincronizada);
        assert!(criada.sync.aviso.is_some());
        assert_eq!(service.listar().await.len(), 1);
        assert_eq!(colecao.total(), 0);
    }

    #[tokio::test]
    async fn excluir_remove_da_lista_e_da_selecao() {
        let (_, _, service) = servico();
        let criada = service.criar("Coca 2L", "9,99", None, None).await.unwrap();
        let id = criada.oferta.id.clone();

        assert!(service.alternar_selecao(&id).await.unwrap());
        service.excluir(&id).await.unwrap();

        assert!(service.listar().await.is_empty());
        assert!(service.selecao().await.is_empty());
    }

    #[tokio::test]
    async fn snapshot_poda_selecao_orfa() {
        let (_, _, service) = servico();
        let a = service.criar("A", "1,00", None, None).await.unwrap().oferta;
        let b = service.criar("B", "2,00", None, None).await.unwrap().oferta;
        service.alternar_selecao(&a.id).await.unwrap();
        service.alternar_selecao(&b.id).await.unwrap();

        // Outro cliente removeu "a": o snapshot chega sem ela.
        service.aplicar_snapshot(vec![b.clone()]).await;

        assert_eq!(service.selecao().await, vec![b.id]);
    }

    #[tokio::test]
    async fn reconciliar_ordena_por_created_at_decrescente() {
        let mut antiga = Oferta::nova("Antiga", "1,00", Unidade::Und, None);
        antiga.created_at = "2024-01-01T00:00:00Z".into();
        let mut nova = Oferta::nova("Nova", "2,00", Unidade::Und, None);
        nova.created_at = "2025-06-01T00:00:00Z".into();
        let mut sem_data = Oferta::nova("Sem data", "3,00", Unidade::Und, None);
        sem_data.created_at = String::new();

        let ordenadas = reconciliar(vec![antiga.clone(), sem_data.clone(), nova.clone()]);
        assert_eq!(ordenadas[0].id, nova.id);
        assert_eq!(ordenadas[1].id, antiga.id);
        // Sem created_at ordena por último.
        assert_eq!(ordenadas[2].id, sem_data.id);
    }

    #[tokio::test]
    async fn espelho_local_some_quando_lista_esvazia() {
        let (_, local, service) = servico();
        let criada = service.criar("Coca 2L", "9,99", None, None).await.unwrap();
        assert!(local.ler(CHAVE_OFERTAS).unwrap().is_some());

        service.excluir(&criada.oferta.id).await.unwrap();
        assert_eq!(local.ler(CHAVE_OFERTAS).unwrap(), None);
    }

    #[tokio::test]
    async fn atualizar_oferta_inexistente_retorna_404() {
        let (_, _, service) = servico();
        let erro = service
            .atualizar(
                "nao-existe",
                AtualizacaoOferta {
                    product_name: "X".into(),
                    price: "1,00".into(),
                    unit: Unidade::Und,
                    extra_text: None,
                },
            )
            .await;
        assert!(matches!(erro, Err(AppError::OfertaNaoEncontrada)));
    }
}
