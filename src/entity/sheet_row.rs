//! Sheet row entity model for Sea-ORM database interaction.
//!
//! This module defines the database schema representation for the row store.
//! Every row of every logical table (the "Sessions" catalog, the "Bookings"
//! ledger) is stored as one record of the `sheet_row` table.

use sea_orm::entity::prelude::*;

/// Sea-ORM entity model representing one spreadsheet row.
///
/// # Database Schema
///
/// | Column      | Type                    | Description                                  |
/// |-------------|-------------------------|----------------------------------------------|
/// | sheet       | TEXT (Primary Key)      | Logical table name                           |
/// | row_number  | INTEGER (Primary Key)   | 1-based row number, 1 is the header          |
/// | data        | BYTEA / BLOB            | MessagePack encoded list of cell strings     |
/// | updated_at  | TIMESTAMPTZ             | Last time any cell of the row was written    |
///
/// This entity is used internally by [`SeaOrmRowStore`](crate::store::SeaOrmRowStore);
/// callers work with [`Table`](crate::store::Table) snapshots instead.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sheet_row")]
pub struct Model {
    /// Name of the logical table this row belongs to.
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub sheet: String,

    /// Position of the row inside its table. Row 1 holds the header.
    #[sea_orm(primary_key, auto_increment = false)]
    pub row_number: i32,

    /// The cells of the row, serialized with MessagePack as `Vec<String>`.
    pub data: Vec<u8>,

    /// Timestamp of the last write.
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
