pub use super::global_config::Entity as GlobalConfig;
pub use super::identities::Entity as Identities;
pub use super::turns::Entity as Turns;
