pub mod prelude;

pub mod global_config;
pub mod identities;
pub mod turns;
