use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "global_config")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// JSON array of upstream credentials
    pub api_keys: String,

    pub current_key_index: i32,

    pub maintenance_mode: bool,

    pub image_gen_enabled: bool,

    /// JSON array of `{text, author}` objects
    pub quotes: String,

    pub custom_persona: Option<String>,

    /// Bumped on every replace.
    pub version: i64,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
