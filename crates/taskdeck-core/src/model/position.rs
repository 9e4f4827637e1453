// ── Resume positions ──
//
// A position (parent unit) owns an ordered list of highlight lines
// (sub-units). Positions are keyed by document index + title + employer:
// re-uploading the same document keeps enrichment state, and two jobs
// with the same title never share it.

use std::fmt;

use serde::{Deserialize, Serialize};
use taskdeck_api::Position;

/// Stable identity for a [`ParentUnit`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParentKey {
    index: usize,
    title: String,
    employer: Option<String>,
}

impl ParentKey {
    pub fn new(index: usize, title: impl Into<String>, employer: Option<String>) -> Self {
        Self {
            index,
            title: title.into(),
            employer,
        }
    }

    /// Position of the unit within its document.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn employer(&self) -> Option<&str> {
        self.employer.as_deref()
    }
}

impl fmt::Display for ParentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.employer {
            Some(employer) => write!(f, "{} @ {employer}", self.title),
            None => f.write_str(&self.title),
        }
    }
}

/// A resume position with the highlight lines to enrich.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentUnit {
    /// Position within the uploaded document; assigned on upload.
    #[serde(skip)]
    pub index: usize,
    pub title: String,
    pub employer_name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Highlight lines, in document order.
    pub sub_units: Vec<String>,
}

impl ParentUnit {
    pub fn new(title: impl Into<String>, sub_units: Vec<String>) -> Self {
        Self {
            index: 0,
            title: title.into(),
            employer_name: None,
            start_date: None,
            end_date: None,
            sub_units,
        }
    }

    #[must_use]
    pub fn with_employer(mut self, employer: impl Into<String>) -> Self {
        self.employer_name = Some(employer.into());
        self
    }

    #[must_use]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn key(&self) -> ParentKey {
        ParentKey::new(self.index, self.title.clone(), self.employer_name.clone())
    }

    /// Human-readable date span, e.g. `2019 – 2022`.
    pub fn period(&self) -> Option<String> {
        match (&self.start_date, &self.end_date) {
            (Some(start), Some(end)) => Some(format!("{start} – {end}")),
            (Some(start), None) => Some(format!("{start} – present")),
            (None, Some(end)) => Some(end.clone()),
            (None, None) => None,
        }
    }
}

impl From<Position> for ParentUnit {
    fn from(p: Position) -> Self {
        let sub_units = p
            .highlights
            .into_iter()
            .map(|line| line.trim().to_owned())
            .filter(|line| !line.is_empty())
            .collect();

        Self {
            index: 0,
            title: p.title.trim().to_owned(),
            employer_name: p
                .employer_name
                .map(|e| e.trim().to_owned())
                .filter(|e| !e.is_empty()),
            start_date: p.start_date,
            end_date: p.end_date,
            sub_units,
        }
    }
}
