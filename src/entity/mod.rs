//! Database entity models for the booking row store.
//!
//! The store keeps a spreadsheet-shaped layout: a single `sheet_row` table in
//! which every logical table is a run of rows sharing a `sheet` name.

/// Sheet row entity model for Sea-ORM database interaction.
pub mod sheet_row;
