// src/db/local_store.rs
//
// Persistência local chave-valor, o equivalente do localStorage do
// navegador: guarda o espelho da lista de ofertas, o rascunho de
// importação e o identificador da instalação.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::common::error::AppError;

pub trait ArmazenamentoLocal: Send + Sync {
    fn ler(&self, chave: &str) -> Result<Option<String>, AppError>;
    fn gravar(&self, chave: &str, valor: &str) -> Result<(), AppError>;
    fn remover(&self, chave: &str) -> Result<(), AppError>;
}

// Implementação em arquivo único: um mapa JSON regravado por inteiro a
// cada escrita. O volume é minúsculo (três chaves), não vale índice.
pub struct ArquivoLocal {
    caminho: PathBuf,
    dados: Mutex<HashMap<String, String>>,
}

impl ArquivoLocal {
    pub fn abrir(caminho: impl AsRef<Path>) -> Result<Self, AppError> {
        let caminho = caminho.as_ref().to_path_buf();

        let dados = match fs::read_to_string(&caminho) {
            Ok(conteudo) => serde_json::from_str(&conteudo).unwrap_or_else(|e| {
                // Arquivo corrompido: descarta e recomeça, como o navegador
                // faria com um localStorage ilegível.
                tracing::warn!("Armazenamento local ilegível, recomeçando: {}", e);
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };

        Ok(Self {
            caminho,
            dados: Mutex::new(dados),
        })
    }

    fn persistir(&self, dados: &HashMap<String, String>) -> Result<(), AppError> {
        if let Some(pai) = self.caminho.parent() {
            fs::create_dir_all(pai)
                .map_err(|e| AppError::ArmazenamentoLocal(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(dados)
            .map_err(|e| AppError::ArmazenamentoLocal(e.to_string()))?;
        fs::write(&self.caminho, json).map_err(|e| AppError::ArmazenamentoLocal(e.to_string()))
    }
}

impl ArmazenamentoLocal for ArquivoLocal {
    fn ler(&self, chave: &str) -> Result<Option<String>, AppError> {
        Ok(self.dados.lock().unwrap().get(chave).cloned())
    }

    fn gravar(&self, chave: &str, valor: &str) -> Result<(), AppError> {
        let mut dados = self.dados.lock().unwrap();
        dados.insert(chave.to_string(), valor.to_string());
        self.persistir(&dados)
    }

    fn remover(&self, chave: &str) -> Result<(), AppError> {
        let mut dados = self.dados.lock().unwrap();
        if dados.remove(chave).is_some() {
            self.persistir(&dados)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub mod teste {
    use super::*;

    /// Armazenamento local volátil para os testes de serviço.
    #[derive(Default)]
    pub struct MemoriaLocal {
        dados: Mutex<HashMap<String, String>>,
    }

    impl MemoriaLocal {
        pub fn novo() -> Self {
            Self::default()
        }
    }

    impl ArmazenamentoLocal for MemoriaLocal {
        fn ler(&self, chave: &str) -> Result<Option<String>, AppError> {
            Ok(self.dados.lock().unwrap().get(chave).cloned())
        }

        fn gravar(&self, chave: &str, valor: &str) -> Result<(), AppError> {
            self.dados
                .lock()
                .unwrap()
                .insert(chave.to_string(), valor.to_string());
            Ok(())
        }

        fn remover(&self, chave: &str) -> Result<(), AppError> {
            self.dados.lock().unwrap().remove(chave);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arquivo_sobrevive_a_reabertura() {
        let dir = std::env::temp_dir().join(format!("ofertas-teste-{}", uuid::Uuid::new_v4()));
        let caminho = dir.join("local.json");

        {
            let store = ArquivoLocal::abrir(&caminho).unwrap();
            store.gravar("promotional-offers", "[]").unwrap();
        }

        let store = ArquivoLocal::abrir(&caminho).unwrap();
        assert_eq!(
            store.ler("promotional-offers").unwrap().as_deref(),
            Some("[]")
        );

        store.remover("promotional-offers").unwrap();
        assert_eq!(store.ler("promotional-offers").unwrap(), None);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn arquivo_corrompido_recomeca_vazio() {
        let dir = std::env::temp_dir().join(format!("ofertas-teste-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let caminho = dir.join("local.json");
        fs::write(&caminho, "{{{ nada de json").unwrap();

        let store = ArquivoLocal::abrir(&caminho).unwrap();
        assert_eq!(store.ler("qualquer").unwrap(), None);

        let _ = fs::remove_dir_all(dir);
    }
}
