use std::env;

use serde::Deserialize;
use thiserror::Error;

/// Errors from loading [`BookingConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Settings shared by the catalog, the ledger and the lifecycle engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    /// Table holding the session catalog.
    pub sessions_table: String,
    /// Table holding the booking ledger.
    pub bookings_table: String,
    /// How many alternatives to suggest when a search comes back empty.
    pub alternatives_limit: usize,
    /// Also write the derived status into the `Booking Status` cell so the
    /// sheet stays readable by people. The stored cell is never read back.
    pub mirror_status: bool,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            sessions_table: "Sessions".to_string(),
            bookings_table: "Bookings".to_string(),
            alternatives_limit: 3,
            mirror_status: true,
        }
    }
}

impl BookingConfig {
    /// Reads overrides from the environment, falling back to defaults.
    ///
    /// | Variable                     | Field                |
    /// |------------------------------|----------------------|
    /// | `BOOKING_SESSIONS_TABLE`     | `sessions_table`     |
    /// | `BOOKING_BOOKINGS_TABLE`     | `bookings_table`     |
    /// | `BOOKING_ALTERNATIVES_LIMIT` | `alternatives_limit` |
    /// | `BOOKING_MIRROR_STATUS`      | `mirror_status`      |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(table) = lookup("BOOKING_SESSIONS_TABLE") {
            config.sessions_table = table;
        }
        if let Some(table) = lookup("BOOKING_BOOKINGS_TABLE") {
            config.bookings_table = table;
        }
        if let Some(value) = lookup("BOOKING_ALTERNATIVES_LIMIT") {
            config.alternatives_limit = value.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "BOOKING_ALTERNATIVES_LIMIT",
                value: value.clone(),
            })?;
        }
        if let Some(value) = lookup("BOOKING_MIRROR_STATUS") {
            config.mirror_status = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "BOOKING_MIRROR_STATUS",
                        value,
                    })
                }
            };
        }

        Ok(config)
    }

    /// Sets the name of the sessions table.
    ///
    /// # Parameters
    ///
    /// * `table` - Table name as it appears in the row store.
    ///
    /// # Returns
    ///
    /// The modified config.
    ///
    /// # Examples
    ///
    /// ```
    /// use faraja_booking::BookingConfig;
    ///
    /// let config = BookingConfig::default()
    ///     .with_sessions_table("Sessions 2024")
    ///     .with_bookings_table("Bookings 2024");
    /// assert_eq!(config.sessions_table, "Sessions 2024");
    /// ```
    pub fn with_sessions_table(mut self, table: impl Into<String>) -> Self {
        self.sessions_table = table.into();
        self
    }

    /// Sets the name of the bookings table.
    pub fn with_bookings_table(mut self, table: impl Into<String>) -> Self {
        self.bookings_table = table.into();
        self
    }

    /// Sets how many alternatives an empty search suggests.
    pub fn with_alternatives_limit(mut self, limit: usize) -> Self {
        self.alternatives_limit = limit;
        self
    }

    /// Turns writing the derived status into the sheet on or off.
    pub fn with_mirror_status(mut self, mirror: bool) -> Self {
        self.mirror_status = mirror;
        self
    }
}
