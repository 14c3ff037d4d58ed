// src/services/importacao_service.rs
//
// Ciclo de vida da importação em massa: o rascunho (modo, texto colado e
// candidatos) vive no armazenamento local até o usuário confirmar ou
// cancelar, sobrevivendo a recargas. Cada mudança do rascunho é anunciada
// num canal para quem quiser reagir sem ficar consultando.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, RwLock};
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    db::ArmazenamentoLocal,
    models::oferta::{Oferta, ProdutoImportado, RascunhoImportacao, ResultadoSync, Unidade},
    parser,
    services::oferta_service::OfertaService,
};

pub const CHAVE_RASCUNHO: &str = "import-draft-products";

#[derive(Debug, Clone, Default)]
pub struct MudancaRascunho {
    pub import_mode: Option<bool>,
    pub import_text: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MudancaProduto {
    pub product_name: Option<String>,
    pub price: Option<String>,
    pub unit: Option<Unidade>,
    pub selected: Option<bool>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResumoProcessamento {
    pub encontrados: usize,
    pub sem_preco: u32,
    pub invalidas: u32,
    pub mensagem: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResumoConfirmacao {
    pub criadas: usize,
    #[serde(flatten)]
    pub sync: ResultadoSync,
}

pub struct ImportacaoService {
    local: Arc<dyn ArmazenamentoLocal>,
    ofertas: Arc<OfertaService>,
    rascunho: RwLock<RascunhoImportacao>,
    tx_rascunho: broadcast::Sender<()>,
}

impl ImportacaoService {
    pub fn new(local: Arc<dyn ArmazenamentoLocal>, ofertas: Arc<OfertaService>) -> Self {
        let rascunho = carregar_rascunho(local.as_ref());
        let (tx_rascunho, _) = broadcast::channel(16);
        Self {
            local,
            ofertas,
            rascunho: RwLock::new(rascunho),
            tx_rascunho,
        }
    }

    pub async fn rascunho(&self) -> RascunhoImportacao {
        self.rascunho.read().await.clone()
    }

    /// Canal de eventos "rascunho atualizado".
    pub fn assinar_rascunho(&self) -> broadcast::Receiver<()> {
        self.tx_rascunho.subscribe()
    }

    pub async fn atualizar_rascunho(
        &self,
        mudanca: MudancaRascunho,
    ) -> Result<RascunhoImportacao, AppError> {
        let mut rascunho = self.rascunho.write().await;
        if let Some(modo) = mudanca.import_mode {
            rascunho.import_mode = modo;
        }
        if let Some(texto) = mudanca.import_text {
            rascunho.import_text = texto;
        }
        self.persistir(&rascunho);
        Ok(rascunho.clone())
    }

    /// Processa o texto colado: substitui os candidatos atuais pelo novo
    /// resultado do parser. Linha ruim nunca aborta o restante; os totais
    /// descartados voltam na mensagem para o usuário.
    pub async fn processar(&self, texto: String) -> Result<ResumoProcessamento, AppError> {
        if texto.trim().is_empty() {
            return Err(AppError::ListaVazia);
        }

        let resultado = parser::parse_lista(&texto);
        if resultado.produtos.is_empty() {
            return Err(AppError::NenhumProdutoValido);
        }

        let resumo = ResumoProcessamento {
            encontrados: resultado.produtos.len(),
            sem_preco: resultado.sem_preco,
            invalidas: resultado.invalidas,
            mensagem: mensagem_processamento(&resultado),
        };

        let mut rascunho = self.rascunho.write().await;
        rascunho.import_mode = true;
        rascunho.import_text = texto;
        rascunho.imported_products = resultado.produtos;
        self.persistir(&rascunho);

        Ok(resumo)
    }

    pub async fn editar_produto(
        &self,
        indice: usize,
        mudanca: MudancaProduto,
    ) -> Result<RascunhoImportacao, AppError> {
        let mut rascunho = self.rascunho.write().await;
        let produto = rascunho
            .imported_products
            .get_mut(indice)
            .ok_or(AppError::ProdutoImportadoNaoEncontrado)?;

        if let Some(nome) = mudanca.product_name {
            produto.product_name = nome;
        }
        if let Some(preco) = mudanca.price {
            produto.price = preco;
        }
        if let Some(unidade) = mudanca.unit {
            produto.unit = unidade;
        }
        if let Some(selecionado) = mudanca.selected {
            produto.selected = selecionado;
        }

        self.persistir(&rascunho);
        Ok(rascunho.clone())
    }

    pub async fn alternar_selecao(&self, indice: usize) -> Result<RascunhoImportacao, AppError> {
        let mut rascunho = self.rascunho.write().await;
        let produto = rascunho
            .imported_products
            .get_mut(indice)
            .ok_or(AppError::ProdutoImportadoNaoEncontrado)?;
        produto.selected = !produto.selected;
        self.persistir(&rascunho);
        Ok(rascunho.clone())
    }

    /// Marca todos quando houver algum desmarcado; senão desmarca todos.
    pub async fn alternar_todos(&self) -> Result<RascunhoImportacao, AppError> {
        let mut rascunho = self.rascunho.write().await;
        let todos_marcados = rascunho.imported_products.iter().all(|p| p.selected);
        for produto in &mut rascunho.imported_products {
            produto.selected = !todos_marcados;
        }
        self.persistir(&rascunho);
        Ok(rascunho.clone())
    }

    /// Converte cada candidato selecionado numa Oferta nova (id e
    /// created_at frescos) e descarta o rascunho.
    pub async fn confirmar(&self) -> Result<ResumoConfirmacao, AppError> {
        let selecionados: Vec<ProdutoImportado> = {
            let rascunho = self.rascunho.read().await;
            rascunho
                .imported_products
                .iter()
                .filter(|p| p.selected)
                .cloned()
                .collect()
        };

        if selecionados.is_empty() {
            return Err(AppError::NenhumProdutoSelecionado);
        }

        let ofertas: Vec<Oferta> = selecionados
            .into_iter()
            .map(|p| Oferta::nova(p.product_name, p.price, p.unit, None))
            .collect();
        let criadas = ofertas.len();

        let sync = self.ofertas.criar_varias(ofertas).await?;

        self.descartar().await;
        Ok(ResumoConfirmacao { criadas, sync })
    }

    pub async fn cancelar(&self) {
        self.descartar().await;
    }

    async fn descartar(&self) {
        let mut rascunho = self.rascunho.write().await;
        *rascunho = RascunhoImportacao::default();
        self.persistir(&rascunho);
    }

    // Persiste o rascunho e anuncia a mudança. Rascunho vazio fora do
    // modo de importação é removido em vez de gravado.
    fn persistir(&self, rascunho: &RascunhoImportacao) {
        let resultado = if !rascunho.tem_conteudo() && !rascunho.import_mode {
            self.local.remover(CHAVE_RASCUNHO)
        } else {
            match serde_json::to_string(rascunho) {
                Ok(json) => self.local.gravar(CHAVE_RASCUNHO, &json),
                Err(e) => Err(AppError::ArmazenamentoLocal(e.to_string())),
            }
        };
        if let Err(e) = resultado {
            tracing::warn!("Falha ao persistir rascunho de importação: {}", e);
        }
        let _ = self.tx_rascunho.send(());
    }
}

// Rascunho salvo de uma sessão anterior. JSON ilegível é descartado, como
// o app original fazia com o localStorage.
fn carregar_rascunho(local: &dyn ArmazenamentoLocal) -> RascunhoImportacao {
    let bruto = match local.ler(CHAVE_RASCUNHO) {
        Ok(Some(bruto)) => bruto,
        Ok(None) => return RascunhoImportacao::default(),
        Err(e) => {
            tracing::warn!("Falha ao ler rascunho de importação: {}", e);
            return RascunhoImportacao::default();
        }
    };

    match serde_json::from_str::<RascunhoImportacao>(&bruto) {
        Ok(mut rascunho) => {
            // Sessões antigas não gravavam o modo; com conteúdo presente,
            // reabre direto na importação.
            if !rascunho.import_mode && rascunho.tem_conteudo() {
                rascunho.import_mode = true;
            }
            rascunho
        }
        Err(_) => {
            let _ = local.remover(CHAVE_RASCUNHO);
            RascunhoImportacao::default()
        }
    }
}

fn mensagem_processamento(resultado: &parser::ResultadoParse) -> String {
    let mut descartes = Vec::new();
    if resultado.sem_preco > 0 {
        descartes.push(format!("{} sem preço", resultado.sem_preco));
    }
    if resultado.invalidas > 0 {
        descartes.push(format!("{} inválidas", resultado.invalidas));
    }

    if descartes.is_empty() {
        format!(
            "{} produtos encontrados. Selecione quais deseja criar.",
            resultado.produtos.len()
        )
    } else {
        format!(
            "{} produtos encontrados ({} ignoradas). Selecione quais deseja criar.",
            resultado.produtos.len(),
            descartes.join(", ")
        )
    }
}
