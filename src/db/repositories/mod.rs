pub mod identity;
pub mod settings;
pub mod turn;
