pub mod analizar;
pub mod estado;
pub mod historial;
pub mod root;
