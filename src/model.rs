//! Domain types for sessions and bookings.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;

use crate::error::ValidationError;
use crate::store::{cell, Record, RowOffset};

/// Header of the "Sessions" table.
pub mod session_columns {
    pub const THERAPY: &str = "Therapy Name";
    pub const THERAPIST: &str = "Therapist Name";
    pub const LOCATION: &str = "Faraja Center Location";
    pub const FORMAT: &str = "Online or Physical";
    pub const DATE: &str = "Date Available";
    pub const START: &str = "Start Time";
    pub const END: &str = "End Time";
    pub const CAPACITY: &str = "Maximum Attendees";
    pub const OCCUPANCY: &str = "Current Attendees";
    pub const STATUS: &str = "Booking Status";

    pub const ALL: [&str; 10] = [
        THERAPY, THERAPIST, LOCATION, FORMAT, DATE, START, END, CAPACITY, OCCUPANCY, STATUS,
    ];
}

/// Header of the "Bookings" table.
pub mod booking_columns {
    pub const NAME: &str = "Name";
    pub const ATTENDEE_TYPE: &str = "Attendee Type";
    pub const GENDER: &str = "Gender";
    pub const PHONE: &str = "Phone";
    pub const ALTERNATE_PHONE: &str = "Alternate Phone";
    pub const THERAPY: &str = "Therapy Name";
    pub const THERAPIST: &str = "Therapist";
    pub const DATE: &str = "Date";
    pub const TIME: &str = "Time";
    pub const LOCATION: &str = "Faraja Center Location";
    pub const FORMAT: &str = "Online or Physical";
    pub const TIMESTAMP: &str = "Timestamp";
    pub const CANCELLED: &str = "is_cancelled";
    pub const RESCHEDULED: &str = "is_rescheduled";
    pub const REASON: &str = "reason";

    pub const ALL: [&str; 15] = [
        NAME,
        ATTENDEE_TYPE,
        GENDER,
        PHONE,
        ALTERNATE_PHONE,
        THERAPY,
        THERAPIST,
        DATE,
        TIME,
        LOCATION,
        FORMAT,
        TIMESTAMP,
        CANCELLED,
        RESCHEDULED,
        REASON,
    ];
}

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y-%m-%d %H:%M:%S"];
const TIME_FORMATS: [&str; 4] = ["%I:%M %p", "%I:%M:%S %p", "%H:%M", "%H:%M:%S"];

/// A cell value that is compared by its parsed meaning when it parses, and by
/// its trimmed text otherwise.
///
/// Parsed values order before raw ones, which puts unparseable cells last when
/// sorting.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lenient<T> {
    Parsed(T),
    Raw(String),
}

impl<T> Lenient<T> {
    pub fn parsed(&self) -> Option<&T> {
        match self {
            Lenient::Parsed(v) => Some(v),
            Lenient::Raw(_) => None,
        }
    }
}

/// Calendar date of a session.
pub type SessionDate = Lenient<NaiveDate>;

/// Start or end time of a session.
pub type SessionTime = Lenient<NaiveTime>;

impl SessionDate {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        DATE_FORMATS
            .iter()
            .find_map(|f| {
                NaiveDate::parse_from_str(input, f)
                    .ok()
                    .or_else(|| chrono::NaiveDateTime::parse_from_str(input, f).ok().map(|dt| dt.date()))
            })
            .map(Lenient::Parsed)
            .unwrap_or_else(|| Lenient::Raw(input.to_string()))
    }
}

impl From<NaiveDate> for SessionDate {
    fn from(date: NaiveDate) -> Self {
        Lenient::Parsed(date)
    }
}

impl fmt::Display for SessionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lenient::Parsed(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Lenient::Raw(s) => f.write_str(s),
        }
    }
}

impl SessionTime {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let upper = input.to_ascii_uppercase();
        TIME_FORMATS
            .iter()
            .find_map(|f| NaiveTime::parse_from_str(&upper, f).ok())
            .map(Lenient::Parsed)
            .unwrap_or_else(|| Lenient::Raw(input.to_string()))
    }
}

impl From<NaiveTime> for SessionTime {
    fn from(time: NaiveTime) -> Self {
        Lenient::Parsed(time)
    }
}

impl fmt::Display for SessionTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lenient::Parsed(t) => write!(f, "{}", t.format("%I:%M %p")),
            Lenient::Raw(s) => f.write_str(s),
        }
    }
}

/// Stable identity of a session.
///
/// Names are trimmed, dates and times are compared by value, so the same
/// session keeps its key across formatting drift in the store ("2024-01-10"
/// vs "2024-01-10 00:00:00", "10:00 AM" vs "10:00 am").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub therapy: String,
    pub therapist: String,
    pub date: SessionDate,
    pub start: SessionTime,
    pub end: SessionTime,
}

impl SessionKey {
    pub fn new(
        therapy: impl AsRef<str>,
        therapist: impl AsRef<str>,
        date: impl Into<SessionDate>,
        start: impl Into<SessionTime>,
        end: impl Into<SessionTime>,
    ) -> Self {
        Self {
            therapy: therapy.as_ref().trim().to_string(),
            therapist: therapist.as_ref().trim().to_string(),
            date: date.into(),
            start: start.into(),
            end: end.into(),
        }
    }

    /// Builds a key from the cells as they appear in the store.
    pub fn parse(therapy: &str, therapist: &str, date: &str, start: &str, end: &str) -> Self {
        Self::new(
            therapy,
            therapist,
            SessionDate::parse(date),
            SessionTime::parse(start),
            SessionTime::parse(end),
        )
    }

    /// The `"<start> - <end>"` form stored in the ledger.
    pub fn time_range(&self) -> String {
        format!("{} - {}", self.start, self.end)
    }

    /// Whether both keys occupy the same date and time slot.
    pub fn same_slot(&self, other: &SessionKey) -> bool {
        self.date == other.date && self.start == other.start && self.end == other.end
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} with {} on {} {}",
            self.therapy,
            self.therapist,
            self.date,
            self.time_range()
        )
    }
}

/// Whether a session can still take bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SessionStatus {
    Available,
    Full,
}

impl SessionStatus {
    /// Derives the status from the counts. Never read from the store.
    pub fn derive(occupancy: u32, capacity: u32) -> Self {
        if occupancy >= capacity {
            SessionStatus::Full
        } else {
            SessionStatus::Available
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Available => "Available",
            SessionStatus::Full => "Full",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(SessionStatus::Available),
            "full" => Ok(SessionStatus::Full),
            other => Err(format!("unknown booking status `{other}`")),
        }
    }
}

/// A bookable therapy session as read from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub key: SessionKey,
    pub location: String,
    pub format: String,
    pub capacity: u32,
    pub occupancy: u32,
    /// Occupancy cell exactly as read, used to detect concurrent writers.
    pub(crate) occupancy_cell: String,
    /// Position of the row at read time.
    pub(crate) row: RowOffset,
}

impl Session {
    pub(crate) fn from_record(row: RowOffset, record: &Record) -> Self {
        use session_columns::*;

        let occupancy_cell = cell(record, OCCUPANCY).to_string();
        Self {
            key: SessionKey::parse(
                cell(record, THERAPY),
                cell(record, THERAPIST),
                cell(record, DATE),
                cell(record, START),
                cell(record, END),
            ),
            location: cell(record, LOCATION).trim().to_string(),
            format: cell(record, FORMAT).trim().to_string(),
            capacity: parse_count(cell(record, CAPACITY)),
            occupancy: parse_count(&occupancy_cell),
            occupancy_cell,
            row,
        }
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus::derive(self.occupancy, self.capacity)
    }

    pub fn is_full(&self) -> bool {
        self.status() == SessionStatus::Full
    }

    pub fn remaining(&self) -> u32 {
        self.capacity.saturating_sub(self.occupancy)
    }

    /// One-line description used when presenting a session for selection.
    pub fn display_label(&self) -> String {
        format!(
            "{} - {} - {} - {} {} to {} (Status: {})",
            self.key.therapy,
            self.key.therapist,
            self.location,
            self.key.date,
            self.key.start,
            self.key.end,
            self.status()
        )
    }
}

/// Parses an attendee count, treating anything that is not a natural number
/// as zero. Spreadsheets hand back "3", "3.0" or "" for the same cell.
pub fn parse_count(input: &str) -> u32 {
    let input = input.trim();
    input
        .parse::<u32>()
        .ok()
        .or_else(|| {
            input
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0 && v.fract() == 0.0 && *v <= u32::MAX as f64)
                .map(|v| v as u32)
        })
        .unwrap_or(0)
}

static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0[17]\d{8}$").expect("phone regex is valid"));

/// A 10-digit phone number beginning with "07" or "01".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Phone(String);

impl Phone {
    /// Validates user input.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let input = input.trim();
        if PHONE_REGEX.is_match(input) {
            Ok(Phone(input.to_string()))
        } else {
            Err(ValidationError::InvalidPhone(input.to_string()))
        }
    }

    /// Reads a phone number back from the store without validating it.
    ///
    /// Spreadsheets tend to turn "0712345678" into the number 712345678, so a
    /// 9-digit value starting with 7 or 1 gets its leading zero back.
    pub fn from_stored(input: &str) -> Self {
        let input = input.trim();
        let restored = input.len() == 9
            && input.bytes().all(|b| b.is_ascii_digit())
            && (input.starts_with('7') || input.starts_with('1'));
        if restored {
            Phone(format!("0{input}"))
        } else {
            Phone(input.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who is attending a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attendee {
    pub name: String,
    pub gender: String,
    pub attendee_type: String,
    pub phone: Phone,
    pub alternate_phone: Option<String>,
}

impl Attendee {
    /// Validates the required attendee fields.
    pub fn new(
        name: &str,
        gender: &str,
        attendee_type: &str,
        phone: &str,
    ) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        Ok(Self {
            name: name.to_string(),
            gender: gender.trim().to_string(),
            attendee_type: attendee_type.trim().to_string(),
            phone: Phone::parse(phone)?,
            alternate_phone: None,
        })
    }

    /// Attaches an alternate phone. An invalid number is kept but logged.
    pub fn with_alternate_phone(mut self, phone: &str) -> Self {
        let phone = phone.trim();
        if phone.is_empty() {
            return self;
        }
        if let Err(e) = Phone::parse(phone) {
            tracing::warn!(attendee = %self.name, error = %e, "alternate phone looks invalid");
        }
        self.alternate_phone = Some(phone.to_string());
        self
    }
}

/// Sequence number of a booking in the ledger, starting at 1.
///
/// The ledger only ever appends, so a booking keeps its id for life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BookingId(pub u32);

impl BookingId {
    pub(crate) fn from_row(row: RowOffset) -> Self {
        BookingId(row.0 - 1)
    }

    pub(crate) fn row(&self) -> RowOffset {
        RowOffset(self.0 + 1)
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One ledger entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: BookingId,
    pub attendee: Attendee,
    /// Snapshot of the session identity at booking time.
    pub session: SessionKey,
    pub location: String,
    pub format: String,
    pub timestamp: String,
    pub is_cancelled: bool,
    pub is_rescheduled: bool,
    pub reason: String,
    /// Raw flag and phone cells as read, guarding later flag writes.
    pub(crate) raw_cells: RawLedgerCells,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RawLedgerCells {
    pub phone: String,
    pub cancelled: String,
    pub rescheduled: String,
}

impl Booking {
    pub(crate) fn from_record(row: RowOffset, record: &Record) -> Self {
        use booking_columns::*;

        let (start, end) = split_time_range(cell(record, TIME));
        let alternate = cell(record, ALTERNATE_PHONE).trim();
        Self {
            id: BookingId::from_row(row),
            attendee: Attendee {
                name: cell(record, NAME).trim().to_string(),
                gender: cell(record, GENDER).trim().to_string(),
                attendee_type: cell(record, ATTENDEE_TYPE).trim().to_string(),
                phone: Phone::from_stored(cell(record, PHONE)),
                alternate_phone: (!alternate.is_empty()).then(|| alternate.to_string()),
            },
            session: SessionKey::new(
                cell(record, THERAPY),
                cell(record, THERAPIST),
                SessionDate::parse(cell(record, DATE)),
                SessionTime::parse(start),
                SessionTime::parse(end),
            ),
            location: cell(record, LOCATION).trim().to_string(),
            format: cell(record, FORMAT).trim().to_string(),
            timestamp: cell(record, TIMESTAMP).to_string(),
            is_cancelled: parse_flag(cell(record, CANCELLED)),
            is_rescheduled: parse_flag(cell(record, RESCHEDULED)),
            reason: cell(record, REASON).to_string(),
            raw_cells: RawLedgerCells {
                phone: cell(record, PHONE).to_string(),
                cancelled: cell(record, CANCELLED).to_string(),
                rescheduled: cell(record, RESCHEDULED).to_string(),
            },
        }
    }

    /// Cells of a new ledger row, in [`booking_columns::ALL`] order.
    pub(crate) fn new_row(attendee: &Attendee, session: &Session, timestamp: &str) -> Vec<String> {
        vec![
            attendee.name.clone(),
            attendee.attendee_type.clone(),
            attendee.gender.clone(),
            attendee.phone.to_string(),
            attendee.alternate_phone.clone().unwrap_or_default(),
            session.key.therapy.clone(),
            session.key.therapist.clone(),
            session.key.date.to_string(),
            session.key.time_range(),
            session.location.clone(),
            session.format.clone(),
            timestamp.to_string(),
            format_flag(false),
            format_flag(false),
            String::new(),
        ]
    }

    /// Neither cancelled nor moved to another session.
    pub fn is_active(&self) -> bool {
        !self.is_cancelled && !self.is_rescheduled
    }

    /// Whether `other` refers to this ledger entry: same id, phone and session.
    pub fn same_entry(&self, other: &Booking) -> bool {
        self.id == other.id
            && self.attendee.phone == other.attendee.phone
            && self.session == other.session
    }
}

fn split_time_range(range: &str) -> (&str, &str) {
    match range.split_once(" - ").or_else(|| range.split_once('-')) {
        Some((start, end)) => (start, end),
        None => (range, ""),
    }
}

/// Ledger booleans are written `TRUE`/`FALSE` and read case-insensitively.
pub(crate) fn parse_flag(input: &str) -> bool {
    matches!(input.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

pub(crate) fn format_flag(value: bool) -> String {
    let text = if value { "TRUE" } else { "FALSE" };
    text.to_string()
}
