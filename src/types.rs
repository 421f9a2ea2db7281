//! Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the `student` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRow {
    pub id: i64,
    pub age: Option<i64>,
    pub first: Option<String>,
    pub last: Option<String>,
}

impl fmt::Display for StudentRow {
    // NULL age prints as 0, NULL names as "null"
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {}, Age: {}, First: {}, Last: {}",
            self.id,
            self.age.unwrap_or(0),
            self.first.as_deref().unwrap_or("null"),
            self.last.as_deref().unwrap_or("null")
        )
    }
}
