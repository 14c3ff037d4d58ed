pub mod oferta;
