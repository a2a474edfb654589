//! Aging buckets for overdue receivables
//!
//! Bucket assignment is a pure function of days overdue. An invoice that
//! is due today or not yet due belongs to no bucket.

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum AgeBucket {
    #[serde(rename = "0-30")]
    UpTo30,
    #[serde(rename = "31-60")]
    UpTo60,
    #[serde(rename = "61-90")]
    UpTo90,
    #[serde(rename = "90+")]
    Over90,
}

impl AgeBucket {
    pub const ALL: [AgeBucket; 4] = [
        AgeBucket::UpTo30,
        AgeBucket::UpTo60,
        AgeBucket::UpTo90,
        AgeBucket::Over90,
    ];

    /// Bucket for a number of days overdue; `None` when not overdue.
    pub fn for_days_overdue(days: i64) -> Option<Self> {
        match days {
            ..=0 => None,
            1..=30 => Some(AgeBucket::UpTo30),
            31..=60 => Some(AgeBucket::UpTo60),
            61..=90 => Some(AgeBucket::UpTo90),
            _ => Some(AgeBucket::Over90),
        }
    }

    /// Label used in query parameters and summary keys.
    pub fn label(&self) -> &'static str {
        match self {
            AgeBucket::UpTo30 => "0-30",
            AgeBucket::UpTo60 => "31-60",
            AgeBucket::UpTo90 => "61-90",
            AgeBucket::Over90 => "90+",
        }
    }

    /// Parse a `days=` filter value.
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "0-30" => Some(AgeBucket::UpTo30),
            "31-60" => Some(AgeBucket::UpTo60),
            "61-90" => Some(AgeBucket::UpTo90),
            "90+" => Some(AgeBucket::Over90),
            _ => None,
        }
    }
}
