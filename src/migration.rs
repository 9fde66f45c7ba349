pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_sheet_row_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    // Keep our migration bookkeeping apart from the host application's
    fn migration_table_name() -> sea_orm::DynIden {
        Alias::new("faraja_booking_migrations").into_iden()
    }

    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240101_000001_create_sheet_row_table::Migration)]
    }
}
