pub mod local_store;
pub mod oferta_repo;

pub use local_store::{ArmazenamentoLocal, ArquivoLocal};
pub use oferta_repo::{ColecaoLegada, ColecaoOfertas, PgColecaoOfertas};
