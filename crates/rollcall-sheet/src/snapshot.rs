//! JSON sheet snapshots
//!
//! ```json
//! { "sheet": "Sheet1", "cells": { "A4": "alice", "F1": "Sep 7", "F2": 50 } }
//! ```

use crate::error::SnapshotError;
use crate::value::CellValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Flat dump of one sheet keyed by A1 reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetSnapshot {
    /// Sheet name
    pub sheet: String,
    /// Non-blank cells
    #[serde(default)]
    pub cells: BTreeMap<String, CellValue>,
}

impl SheetSnapshot {
    /// Empty snapshot for `sheet`
    #[inline]
    pub fn new(sheet: impl Into<String>) -> Self {
        Self {
            sheet: sheet.into(),
            cells: BTreeMap::new(),
        }
    }

    /// Add a cell
    #[must_use]
    pub fn with_cell(mut self, a1: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.cells.insert(a1.into(), value.into());
        self
    }

    /// Read a snapshot file
    ///
    /// # Errors
    /// IO or JSON failure
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write a snapshot file, pretty-printed
    ///
    /// # Errors
    /// IO or JSON failure
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}
