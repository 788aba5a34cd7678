use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Codes::Table)
                    .col(
                        ColumnDef::new(Codes::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Codes::Slug).string().unique_key())
                    .col(ColumnDef::new(Codes::Name).string().not_null())
                    .col(ColumnDef::new(Codes::Description).string())
                    .col(ColumnDef::new(Codes::TargetUrl).text().not_null())
                    .col(
                        ColumnDef::new(Codes::TrackingEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Codes::Settings)
                            .text()
                            .not_null()
                            .default("{}"),
                    )
                    .col(
                        ColumnDef::new(Codes::TotalScans)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Codes::UniqueScans)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Codes::TotalEdits)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Codes::CreatorId).string())
                    .col(
                        ColumnDef::new(Codes::CreatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .col(
                        ColumnDef::new(Codes::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .extra("DEFAULT CURRENT_TIMESTAMP".to_string()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("codes_creator_id_idx")
                    .table(Codes::Table)
                    .col(Codes::CreatorId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Codes::Table).to_owned())
            .await
    }
}

/// Learn more at https://docs.rs/sea-query#iden
#[derive(Iden)]
pub(crate) enum Codes {
    Table,
    Id,
    Slug,
    Name,
    Description,
    TargetUrl,
    TrackingEnabled,
    Settings,
    TotalScans,
    UniqueScans,
    TotalEdits,
    CreatorId,
    CreatedAt,
    UpdatedAt,
}
