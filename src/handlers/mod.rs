// src/handlers/mod.rs
pub mod admin;
pub mod exportacao;
pub mod importacao;
pub mod ofertas;
