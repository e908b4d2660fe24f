//! Engine configuration
//!
//! Everything about the sheet layout the engine relies on lives in
//! [`SheetLayout`]; the rest of [`EngineConfig`] covers identity parsing,
//! the value written for each attendee and poll defaults. Both load from
//! TOML, with absent keys falling back to the defaults below.

use crate::error::EngineError;
use rollcall_poll::MIN_OPTIONS;
use rollcall_sheet::{CellValue, ColumnRef};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Where things live in the sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetLayout {
    /// Sheet (tab) name
    pub sheet_name: String,
    /// Leftmost date column
    pub first_data_column: ColumnRef,
    /// How many header cells to scan, starting at `first_data_column`
    pub header_scan_width: u32,
    /// Row holding the column label (the date)
    pub label_row: u32,
    /// Row holding the cost
    pub cost_row: u32,
    /// Row holding the headcount
    pub headcount_row: u32,
    /// Column holding the identities
    pub identity_column: ColumnRef,
    /// First identity row
    pub first_data_row: u32,
    /// Last identity row read
    pub last_data_row: u32,
}

impl SheetLayout {
    /// Header rows in ascending order
    #[must_use]
    pub fn header_rows(&self) -> (u32, u32) {
        let rows = [self.label_row, self.cost_row, self.headcount_row];
        let min = rows.iter().copied().min().unwrap_or(1);
        let max = rows.iter().copied().max().unwrap_or(1);
        (min, max)
    }

    /// Check internal consistency
    ///
    /// # Errors
    /// `EngineError::Config` describing the first problem found
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.sheet_name.trim().is_empty() {
            return Err(EngineError::Config("sheet_name is empty".into()));
        }
        if self.header_scan_width == 0 {
            return Err(EngineError::Config("header_scan_width must be at least 1".into()));
        }
        let header = [self.label_row, self.cost_row, self.headcount_row];
        if header.contains(&0) || self.first_data_row == 0 {
            return Err(EngineError::Config("rows are 1-indexed".into()));
        }
        if self.label_row == self.cost_row
            || self.cost_row == self.headcount_row
            || self.label_row == self.headcount_row
        {
            return Err(EngineError::Config("label, cost and headcount rows must differ".into()));
        }
        let (_, last_header) = self.header_rows();
        if self.first_data_row <= last_header {
            return Err(EngineError::Config(format!(
                "first_data_row {} overlaps the header rows",
                self.first_data_row
            )));
        }
        if self.last_data_row < self.first_data_row {
            return Err(EngineError::Config("last_data_row is before first_data_row".into()));
        }
        Ok(())
    }
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet1".to_string(),
            first_data_column: ColumnRef::A.offset(5),
            header_scan_width: 200,
            label_row: 1,
            cost_row: 2,
            headcount_row: 3,
            identity_column: ColumnRef::A,
            first_data_row: 4,
            last_data_row: 500,
        }
    }
}

/// Poll issued by a bare `/poll`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollTemplate {
    /// Question text
    pub question: String,
    /// Option labels
    pub options: Vec<String>,
}

impl Default for PollTemplate {
    fn default() -> Self {
        Self {
            question: "Who is coming?".to_string(),
            options: vec!["Yes".to_string(), "No".to_string()],
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sheet layout
    pub layout: SheetLayout,
    /// Leading characters stripped from identities before comparison
    pub identity_markers: Vec<char>,
    /// Value written into each matched row
    pub mark_value: CellValue,
    /// Default poll
    pub default_poll: PollTemplate,
    /// Maximum tracked polls
    pub poll_capacity: u64,
    /// Seconds a poll may go untouched before eviction
    pub poll_idle_ttl_secs: u64,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML
    ///
    /// # Errors
    /// `EngineError::Config` on malformed TOML or an inconsistent layout
    pub fn from_toml_str(raw: &str) -> Result<Self, EngineError> {
        let config: Self = toml::from_str(raw).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file
    ///
    /// # Errors
    /// `EngineError::Config` on IO failure or invalid content
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    /// Check the whole configuration
    ///
    /// # Errors
    /// `EngineError::Config` describing the first problem found
    pub fn validate(&self) -> Result<(), EngineError> {
        self.layout.validate()?;
        if self.mark_value.is_blank() {
            return Err(EngineError::Config("mark_value must not be blank".into()));
        }
        if self.default_poll.options.len() < MIN_OPTIONS {
            return Err(EngineError::Config(format!(
                "default_poll needs at least {MIN_OPTIONS} options"
            )));
        }
        if self.poll_capacity == 0 {
            return Err(EngineError::Config("poll_capacity must be at least 1".into()));
        }
        Ok(())
    }

    /// Poll idle time as a duration
    #[inline]
    #[must_use]
    pub fn poll_idle_ttl(&self) -> Duration {
        Duration::from_secs(self.poll_idle_ttl_secs)
    }

    /// With layout
    #[inline]
    #[must_use]
    pub fn with_layout(mut self, layout: SheetLayout) -> Self {
        self.layout = layout;
        self
    }

    /// With sheet name
    #[inline]
    #[must_use]
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.layout.sheet_name = name.into();
        self
    }

    /// With first data column
    #[inline]
    #[must_use]
    pub fn with_first_data_column(mut self, column: ColumnRef) -> Self {
        self.layout.first_data_column = column;
        self
    }

    /// With written value
    #[inline]
    #[must_use]
    pub fn with_mark_value(mut self, value: impl Into<CellValue>) -> Self {
        self.mark_value = value.into();
        self
    }

    /// With identity markers
    #[inline]
    #[must_use]
    pub fn with_identity_markers(mut self, markers: Vec<char>) -> Self {
        self.identity_markers = markers;
        self
    }

    /// With poll registry bounds
    #[inline]
    #[must_use]
    pub fn with_poll_bounds(mut self, capacity: u64, idle_ttl_secs: u64) -> Self {
        self.poll_capacity = capacity;
        self.poll_idle_ttl_secs = idle_ttl_secs;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layout: SheetLayout::default(),
            identity_markers: vec!['@'],
            mark_value: CellValue::number(0.0),
            default_poll: PollTemplate::default(),
            poll_capacity: rollcall_poll::DEFAULT_CAPACITY,
            poll_idle_ttl_secs: 14 * 24 * 60 * 60,
        }
    }
}
