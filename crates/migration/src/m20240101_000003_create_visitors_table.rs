use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Visitors::Table)
                    .col(ColumnDef::new(Visitors::CodeId).string_len(36).not_null())
                    .col(ColumnDef::new(Visitors::Fingerprint).string().not_null())
                    .col(
                        ColumnDef::new(Visitors::CreatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .primary_key(
                        Index::create()
                            .col(Visitors::CodeId)
                            .col(Visitors::Fingerprint),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Visitors::Table, Visitors::CodeId)
                            .to(crate::Codes::Table, crate::Codes::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Visitors::Table).to_owned())
            .await
    }
}

/// Learn more at https://docs.rs/sea-query#iden
#[derive(Iden)]
enum Visitors {
    Table,
    CodeId,
    Fingerprint,
    CreatedAt,
}
