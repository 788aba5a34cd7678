use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Scans::Table)
                    .col(
                        ColumnDef::new(Scans::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Scans::CodeId).string_len(36).not_null())
                    .col(ColumnDef::new(Scans::Fingerprint).string().not_null())
                    .col(
                        ColumnDef::new(Scans::Device)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Scans::Browser).string())
                    .col(ColumnDef::new(Scans::Os).string())
                    .col(ColumnDef::new(Scans::Country).string())
                    .col(ColumnDef::new(Scans::IpAddress).string())
                    .col(
                        ColumnDef::new(Scans::CreatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Scans::Table, Scans::CodeId)
                            .to(crate::Codes::Table, crate::Codes::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("scans_code_id_fingerprint_idx")
                    .table(Scans::Table)
                    .col(Scans::CodeId)
                    .col(Scans::Fingerprint)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Scans::Table).to_owned())
            .await
    }
}

/// Learn more at https://docs.rs/sea-query#iden
#[derive(Iden)]
pub(crate) enum Scans {
    Table,
    Id,
    CodeId,
    Fingerprint,
    Device,
    Browser,
    Os,
    Country,
    IpAddress,
    CreatedAt,
}
