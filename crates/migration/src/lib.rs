pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_codes_table;
mod m20240101_000002_create_scans_table;
mod m20240101_000003_create_visitors_table;

pub(crate) use m20240101_000001_create_codes_table::Codes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_codes_table::Migration),
            Box::new(m20240101_000002_create_scans_table::Migration),
            Box::new(m20240101_000003_create_visitors_table::Migration),
        ]
    }
}
