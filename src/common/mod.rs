pub mod error;
pub mod moeda;
