use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "turns")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Identity that owns the conversation. Not a foreign key.
    pub identity_id: i32,

    /// `user` or `assistant`
    pub role: String,

    pub content: String,

    pub is_code: bool,

    pub code_language: Option<String>,

    /// RFC 3339 UTC with fixed nanosecond precision, so it sorts lexically.
    pub timestamp: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
