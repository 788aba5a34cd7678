//! Dynamic optical code.
//!
//! A code record is addressed by an identifier minted before the record
//! is persisted. The identifier is embedded into the printed payload and
//! never changes, while the target URL, tracking flag and style remain editable.
//!
//! Payloads are not stored, they are derived from the identifier on demand.

use sea_orm::entity::prelude::*;

/// Code model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "codes")]
pub struct Model {
    /// Minted code identifier.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Public slug used for untracked redirects.
    #[sea_orm(unique)]
    pub slug: Option<String>,

    /// Human-readable code name.
    pub name: String,

    /// Optional code description.
    pub description: Option<String>,

    /// Current redirect destination.
    #[sea_orm(column_type = "Text")]
    pub target_url: String,

    /// Whether scans of this code are recorded.
    pub tracking_enabled: bool,

    /// Serialized style snapshot.
    #[sea_orm(column_type = "Text")]
    pub settings: String,

    /// Count of recorded scans.
    pub total_scans: i64,

    /// Estimated count of distinct scanning devices.
    pub unique_scans: i64,

    /// Count of edits that changed the record.
    pub total_edits: i64,

    /// Opaque identifier of the code creator.
    pub creator_id: Option<String>,

    pub created_at: TimeDateTime,
    pub updated_at: TimeDateTime,
}

/// Code model relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::scan::Entity")]
    Scans,

    #[sea_orm(has_many = "super::visitor::Entity")]
    Visitors,
}

impl Related<super::scan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scans.def()
    }
}

impl Related<super::visitor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Visitors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
