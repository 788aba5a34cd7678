//! First scan of a code by a single device.
//!
//! A pair of code identifier and device fingerprint is stored at most once,
//! which lets concurrent scans decide uniqueness through the primary key
//! instead of a separate existence check.

use sea_orm::entity::prelude::*;

/// Visitor model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "visitors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub code_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub fingerprint: String,
    pub created_at: TimeDateTime,
}

/// Visitor model relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::code::Entity",
        from = "Column::CodeId",
        to = "super::code::Column::Id"
    )]
    Code,
}

impl Related<super::code::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Code.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
