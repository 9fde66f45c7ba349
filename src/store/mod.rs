//! Row store abstraction.
//!
//! The booking system treats its persistence layer as a spreadsheet: every
//! table is an ordered list of rows, the first of which is a header naming the
//! columns. All cell values are strings; numeric, boolean and date semantics
//! are imposed by callers.
//!
//! Rows are addressed by a 1-based [`RowOffset`] where offset 1 is the header,
//! so the record at position `n` of [`Table::records`] lives at offset `n + 2`.
//! Offsets are positional and must be recomputed from a fresh read whenever the
//! table may have changed shape.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

mod seaorm_store;

pub use seaorm_store::SeaOrmRowStore;
pub(crate) use seaorm_store::now_utc;

/// Errors raised by a [`RowStore`] backend.
///
/// The first three variants mirror how backend, encoding and decoding failures
/// are reported by the store implementation; the rest describe addressing
/// mistakes made against an otherwise healthy store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing database call failed.
    #[error("backend error: {0}")]
    Backend(String),

    /// A row could not be serialized for storage.
    #[error("encode error: {0}")]
    Encode(String),

    /// A stored row could not be deserialized.
    #[error("decode error: {0}")]
    Decode(String),

    /// The table has no header row.
    #[error("table `{0}` does not exist")]
    MissingTable(String),

    /// The table header has no column with the given name.
    #[error("table `{table}` has no column `{column}`")]
    MissingColumn { table: String, column: String },

    /// No row exists at the given offset.
    #[error("table `{table}` has no row {row}")]
    MissingRow { table: String, row: RowOffset },
}

/// Result type for row store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// One data row, keyed by header name.
pub type Record = BTreeMap<String, String>;

/// 1-based row address inside a table. Offset 1 is the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowOffset(pub u32);

impl RowOffset {
    /// The header row.
    pub const HEADER: RowOffset = RowOffset(1);

    /// Offset of the record at `position` in [`Table::records`].
    pub fn for_position(position: usize) -> Self {
        RowOffset(position as u32 + 2)
    }
}

impl fmt::Display for RowOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Spreadsheet-style column letter (`A`, `B`, ..., `Z`, `AA`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnRef(String);

impl ColumnRef {
    /// Column letter for a 0-based column index.
    pub fn from_index(index: usize) -> Self {
        let mut n = index + 1;
        let mut letters = Vec::new();
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push(b'A' + rem as u8);
            n = (n - 1) / 26;
        }
        letters.reverse();
        ColumnRef(letters.into_iter().map(char::from).collect())
    }

    /// Parses a column letter. Returns `None` for anything but ASCII letters.
    pub fn parse(letters: &str) -> Option<Self> {
        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        Some(ColumnRef(letters.to_ascii_uppercase()))
    }

    /// 0-based column index.
    pub fn index(&self) -> usize {
        self.0
            .bytes()
            .fold(0usize, |acc, b| acc * 26 + (b - b'A') as usize + 1)
            - 1
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A cell value a conditional write expects to find before it writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellGuard {
    pub column: ColumnRef,
    pub expected: String,
}

impl CellGuard {
    pub fn new(column: ColumnRef, expected: impl Into<String>) -> Self {
        Self {
            column,
            expected: expected.into(),
        }
    }
}

/// One cell of a guarded multi-cell write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellWrite {
    pub column: ColumnRef,
    pub value: String,
}

impl CellWrite {
    pub fn new(column: ColumnRef, value: impl Into<String>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }
}

/// In-memory snapshot of a whole table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub header: Vec<String>,
    pub records: Vec<Record>,
}

impl Table {
    /// Builds a table from its raw rows, header first. Short rows are padded
    /// with empty strings; cells beyond the header are dropped.
    pub fn from_rows(name: impl Into<String>, mut rows: Vec<Vec<String>>) -> Result<Self> {
        let name = name.into();
        if rows.is_empty() {
            return Err(StoreError::MissingTable(name));
        }
        let header: Vec<String> = rows.remove(0).into_iter().map(|h| h.trim().to_string()).collect();
        let records = rows
            .into_iter()
            .map(|row| {
                header
                    .iter()
                    .enumerate()
                    .map(|(i, column)| (column.clone(), row.get(i).cloned().unwrap_or_default()))
                    .collect()
            })
            .collect();

        Ok(Self {
            name,
            header,
            records,
        })
    }

    /// Column letter for a header name.
    pub fn column(&self, name: &str) -> Result<ColumnRef> {
        self.header
            .iter()
            .position(|h| h == name)
            .map(ColumnRef::from_index)
            .ok_or_else(|| StoreError::MissingColumn {
                table: self.name.clone(),
                column: name.to_string(),
            })
    }

    /// Enumerates records together with their current row offsets.
    pub fn rows(&self) -> impl Iterator<Item = (RowOffset, &Record)> {
        self.records
            .iter()
            .enumerate()
            .map(|(position, record)| (RowOffset::for_position(position), record))
    }
}

/// Reads a cell from a record, treating a missing column as empty.
pub fn cell<'a>(record: &'a Record, column: &str) -> &'a str {
    record.get(column).map(String::as_str).unwrap_or("")
}

/// A spreadsheet-like persistence backend.
///
/// Implementations hold their own connection and are constructed once by the
/// caller, then shared by the catalog, the ledger and the lifecycle engine.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Reads every row of `table`.
    async fn read_all(&self, table: &str) -> Result<Table>;

    /// Overwrites one cell.
    async fn write_cell(
        &self,
        table: &str,
        row: RowOffset,
        column: &ColumnRef,
        value: &str,
    ) -> Result<()>;

    /// Overwrites the cells in `writes` only if every guard still holds. The
    /// check and all writes land together or not at all. Returns `false`
    /// without writing when any guard fails.
    async fn compare_and_write(
        &self,
        table: &str,
        row: RowOffset,
        guards: &[CellGuard],
        writes: &[CellWrite],
    ) -> Result<bool>;

    /// Appends a row after the last one and returns its offset.
    async fn append_row(&self, table: &str, values: Vec<String>) -> Result<RowOffset>;

    /// Creates `table` with the given header if it does not exist yet.
    async fn ensure_table(&self, table: &str, header: &[&str]) -> Result<()>;
}
