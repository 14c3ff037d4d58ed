// src/services/mod.rs
pub mod export_service;
pub mod importacao_service;
pub mod oferta_service;
pub mod sync_service;
