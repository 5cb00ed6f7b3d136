use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "identities")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,

    /// Argon2id password hash
    pub password_hash: String,

    pub ai_name_request: Option<String>,

    pub dev_name_request: Option<String>,

    /// Set by an admin; gates whether the requested names take effect.
    pub is_approved: bool,

    pub is_admin: bool,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
