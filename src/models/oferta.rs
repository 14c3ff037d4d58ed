// src/models/oferta.rs

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

// --- 1. Unidade de venda ---
// Códigos fixos exibidos junto ao preço no cartaz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Unidade {
    #[default]
    Und,
    Kg,
    L,
    Pct,
    Cx,
    Fardo,
}

impl Unidade {
    pub fn codigo(&self) -> &'static str {
        match self {
            Unidade::Und => "UND",
            Unidade::Kg => "KG",
            Unidade::L => "L",
            Unidade::Pct => "PCT",
            Unidade::Cx => "CX",
            Unidade::Fardo => "FARDO",
        }
    }
}

impl fmt::Display for Unidade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.codigo())
    }
}

impl FromStr for Unidade {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "UND" => Ok(Unidade::Und),
            "KG" => Ok(Unidade::Kg),
            "L" => Ok(Unidade::L),
            "PCT" => Ok(Unidade::Pct),
            "CX" => Ok(Unidade::Cx),
            "FARDO" => Ok(Unidade::Fardo),
            _ => Err(()),
        }
    }
}

// --- 2. Oferta ---
// O cartaz promocional persistido na coleção compartilhada.
// `price` é texto no formato pt-BR ("4,99"); nunca vira número.
// `extra_text` ausente significa "sem legenda": a chave é omitida do
// documento, nunca gravada como string vazia.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Oferta {
    pub id: String,
    pub product_name: String,
    pub price: String,
    pub unit: Unidade,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_text: Option<String>,
    // Usado apenas para a ordenação padrão (mais recente primeiro).
    // Documentos antigos podem não ter o campo; ordenam por último.
    #[serde(default)]
    pub created_at: String,
}

impl Oferta {
    pub fn nova(
        product_name: impl Into<String>,
        price: impl Into<String>,
        unit: Unidade,
        extra_text: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            product_name: product_name.into(),
            price: price.into(),
            unit,
            extra_text,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    /// Separa o preço em reais e centavos para a composição do cartaz
    /// ("135,90" vira ("135", "90")). Preço sem vírgula usa "00".
    pub fn partes_preco(&self) -> (&str, &str) {
        match self.price.split_once(',') {
            Some((reais, centavos)) => (
                if reais.is_empty() { "0" } else { reais },
                if centavos.is_empty() { "00" } else { centavos },
            ),
            None => (
                if self.price.is_empty() { "0" } else { &self.price },
                "00",
            ),
        }
    }
}

// --- 3. Produto importado (transiente) ---
// Candidato produzido pelo parser de listas; só existe no rascunho local
// até o usuário confirmar a criação.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProdutoImportado {
    pub product_name: String,
    pub price: String,
    pub unit: Unidade,
    pub selected: bool,
}

// --- 4. Rascunho de importação ---
// Estado da importação em massa, persistido no armazenamento local para
// sobreviver a recargas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RascunhoImportacao {
    #[serde(default)]
    pub import_mode: bool,
    #[serde(default)]
    pub import_text: String,
    #[serde(default)]
    pub imported_products: Vec<ProdutoImportado>,
}

impl RascunhoImportacao {
    pub fn tem_conteudo(&self) -> bool {
        !self.import_text.trim().is_empty() || !self.imported_products.is_empty()
    }
}

// --- 5. Resultado de sincronização ---
// Toda mutação é aplicada localmente primeiro; a escrita remota pode
// falhar sem desfazer o estado local. O chamador recebe os dois estados.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultadoSync {
    pub sincronizada: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aviso: Option<String>,
}

impl ResultadoSync {
    pub fn ok() -> Self {
        Self {
            sincronizada: true,
            aviso: None,
        }
    }

    pub fn nao_sincronizada() -> Self {
        Self {
            sincronizada: false,
            aviso: Some(
                "A alteração foi salva localmente, mas não foi sincronizada.".to_string(),
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfertaSincronizada {
    pub oferta: Oferta,
    #[serde(flatten)]
    pub sync: ResultadoSync,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partes_preco_divide_na_virgula() {
        let oferta = Oferta::nova("BEATS GT", "135,90", Unidade::Und, None);
        assert_eq!(oferta.partes_preco(), ("135", "90"));
    }

    #[test]
    fn partes_preco_sem_virgula_usa_zeros() {
        let oferta = Oferta::nova("Produto", "135", Unidade::Und, None);
        assert_eq!(oferta.partes_preco(), ("135", "00"));

        let vazia = Oferta::nova("Produto", "", Unidade::Und, None);
        assert_eq!(vazia.partes_preco(), ("0", "00"));
    }

    #[test]
    fn extra_text_ausente_nao_aparece_no_json() {
        let oferta = Oferta::nova("Arroz", "4,99", Unidade::Kg, None);
        let json = serde_json::to_value(&oferta).unwrap();
        assert!(json.get("extraText").is_none());

        let com_texto = Oferta::nova("Arroz", "4,99", Unidade::Kg, Some("à vista".into()));
        let json = serde_json::to_value(&com_texto).unwrap();
        assert_eq!(json["extraText"], "à vista");
    }

    #[test]
    fn created_at_ausente_vira_string_vazia() {
        let json = r#"{"id":"1","productName":"X","price":"1,00","unit":"UND"}"#;
        let oferta: Oferta = serde_json::from_str(json).unwrap();
        assert_eq!(oferta.created_at, "");
    }

    #[test]
    fn unidade_ida_e_volta() {
        assert_eq!("FARDO".parse::<Unidade>(), Ok(Unidade::Fardo));
        assert_eq!("kg".parse::<Unidade>(), Ok(Unidade::Kg));
        assert!("DUZIA".parse::<Unidade>().is_err());
        assert_eq!(Unidade::Cx.to_string(), "CX");
    }
}
