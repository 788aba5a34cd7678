//! Recorded scan event.
//!
//! Scan events are recorded only for codes with tracking enabled.
//! A pair of code identifier and device fingerprint is considered
//! a unique visitor, which is an estimate at best, since fingerprints
//! are derived from passive device signals.

use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Scan event model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "scans")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub code_id: String,
    pub fingerprint: String,
    pub device: Device,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub country: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: TimeDateTime,
}

/// Scanning device class derived from the user agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize)]
#[sea_orm(rs_type = "i16", db_type = "Integer")]
#[serde(rename_all = "snake_case")]
pub enum Device {
    #[sea_orm(num_value = 0)]
    Unknown,
    #[sea_orm(num_value = 1)]
    Desktop,
    #[sea_orm(num_value = 2)]
    Mobile,
    #[sea_orm(num_value = 3)]
    Tablet,
    #[sea_orm(num_value = 4)]
    Bot,
}

/// Scan event model relations.
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
