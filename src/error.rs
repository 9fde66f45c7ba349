//! Booking error types.

use thiserror::Error;

use crate::model::{Booking, BookingId, SessionKey};
use crate::store::StoreError;

/// Input the caller has to correct.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Phone number is not 10 digits starting with "07" or "01".
    #[error("invalid phone number `{0}`: expected 10 digits starting with 07 or 01")]
    InvalidPhone(String),

    /// Attendee name is blank.
    #[error("attendee name is required")]
    MissingName,

    /// Cancel or reschedule without a reason.
    #[error("a reason is required")]
    MissingReason,

    /// Rescheduling into the session the booking already holds.
    #[error("booking {0} is already for this session")]
    SameSession(BookingId),
}

/// Broad class of a [`BookingError`], matching how the caller should react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Capacity,
    Conflict,
    NotFound,
    Store,
}

/// Errors returned by catalog, ledger and lifecycle operations.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The session has no free seat.
    #[error("session is full: {0}")]
    Full(SessionKey),

    /// The phone already holds an active booking for this session.
    #[error("phone {} already has booking {} for this session", .existing.attendee.phone, .existing.id)]
    DuplicateBooking { existing: Box<Booking> },

    /// The phone already holds an active booking in the same slot.
    #[error("phone {} is already booked for {} at that time", .existing.attendee.phone, .existing.session)]
    OverlapConflict { existing: Box<Booking> },

    /// Another writer changed the row between our read and our write.
    #[error("{0} was modified concurrently")]
    Conflict(String),

    #[error("session not found: {0}")]
    SessionNotFound(SessionKey),

    /// No active ledger entry for the booking.
    #[error("no active booking {0}")]
    BookingNotFound(BookingId),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A multi-step operation failed and could not be fully undone.
    #[error("{source}; still applied: {}", .applied.join(", "))]
    PartiallyApplied {
        #[source]
        source: Box<BookingError>,
        applied: Vec<&'static str>,
    },
}

/// Result type for booking operations.
pub type Result<T> = std::result::Result<T, BookingError>;

impl BookingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BookingError::Validation(_) => ErrorKind::Validation,
            BookingError::Full(_) => ErrorKind::Capacity,
            BookingError::DuplicateBooking { .. }
            | BookingError::OverlapConflict { .. }
            | BookingError::Conflict(_) => ErrorKind::Conflict,
            BookingError::SessionNotFound(_) | BookingError::BookingNotFound(_) => {
                ErrorKind::NotFound
            }
            BookingError::Store(_) | BookingError::PartiallyApplied { .. } => ErrorKind::Store,
        }
    }

    /// Text suitable for showing to the person booking.
    pub fn user_message(&self) -> String {
        match self {
            BookingError::Validation(e) => e.to_string(),
            BookingError::Full(_) => {
                "This session is already full. Please choose another session.".to_string()
            }
            BookingError::DuplicateBooking { existing } => format!(
                "You already have a booking for this session: {} on {} at {} ({}, {}).",
                existing.session.therapy,
                existing.session.date,
                existing.session.time_range(),
                existing.location,
                existing.format,
            ),
            BookingError::OverlapConflict { existing } => format!(
                "You are already booked for {} on {} at {}.",
                existing.session.therapy,
                existing.session.date,
                existing.session.time_range(),
            ),
            BookingError::Conflict(_) => {
                "Someone else just updated this session. Please try again.".to_string()
            }
            BookingError::SessionNotFound(_) => "That session no longer exists.".to_string(),
            BookingError::BookingNotFound(_) => {
                "No active booking was found for those details.".to_string()
            }
            BookingError::Store(_) | BookingError::PartiallyApplied { .. } => {
                "Something went wrong while saving. Please try again later.".to_string()
            }
        }
    }
}
