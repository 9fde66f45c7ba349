use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SheetRow::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SheetRow::Sheet).text().not_null())
                    .col(ColumnDef::new(SheetRow::RowNumber).integer().not_null())
                    .col(ColumnDef::new(SheetRow::Data).blob().not_null())
                    .col(
                        ColumnDef::new(SheetRow::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_sheet_row")
                            .col(SheetRow::Sheet)
                            .col(SheetRow::RowNumber),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SheetRow::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SheetRow {
    Table,
    Sheet,
    RowNumber,
    Data,
    UpdatedAt,
}
