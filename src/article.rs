//! Normalized publication record shared across the pipeline.
//!
//! An [`Article`] is built once per parsed PubMed record, optionally gains a
//! scraped full text, and lives only for the duration of one request.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Placeholder for a record without a title
pub const NO_TITLE: &str = "NO_TITLE";
/// Placeholder for a record without any counted authors
pub const NO_AUTHORS: &str = "NO_AUTHORS";
/// Placeholder first-author display when no author is available
pub const NO_AUTHOR: &str = "NO_AUTHOR";
/// Placeholder for a record without abstract text
pub const NO_ABSTRACT: &str = "NO_ABSTRACT";
/// Placeholder for a record without a resolvable publication year
pub const NO_YEAR: &str = "NO_YEAR";
/// Placeholder journal name
pub const NO_JOURNAL: &str = "N/A";

/// Wire value for a full text that was never requested
const NOT_ATTEMPTED: &str = "NOT_ATTEMPTED";
/// Wire value when the article page has no recognizable content container
const CONTAINER_NOT_FOUND: &str = "FULL_TEXT_CONTAINER_NOT_FOUND";
/// Wire value when the content container holds no paragraph text
const FULL_TEXT_EMPTY: &str = "FULL_TEXT_EMPTY";
/// Wire prefix for a failed scrape, followed by the first line of the error
const SCRAPING_FAILED_PREFIX: &str = "SCRAPING_FAILED: ";

/// Outcome of a full-text scrape attempt.
///
/// Internal code matches on the variants; the legacy sentinel strings only
/// exist at the JSON boundary, where this type serializes to exactly the
/// values the original API emitted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FullText {
    /// Scraping was not requested for this record
    #[default]
    NotAttempted,
    /// Scraped paragraph text (may legitimately be long)
    Text(String),
    /// The article page had no `aria-label="Article content"` container
    ContainerNotFound,
    /// The container was present but yielded no paragraph text
    Empty,
    /// The fetch itself failed; holds the first line of the error message
    Failed(String),
}

impl FullText {
    /// Usable body text, if the scrape produced any.
    pub fn text(&self) -> Option<&str> {
        match self {
            FullText::Text(body) if !body.is_empty() => Some(body),
            _ => None,
        }
    }

    /// The sentinel-string encoding used on the wire.
    pub fn to_wire(&self) -> String {
        match self {
            FullText::NotAttempted => NOT_ATTEMPTED.to_string(),
            FullText::Text(body) => body.clone(),
            FullText::ContainerNotFound => CONTAINER_NOT_FOUND.to_string(),
            FullText::Empty => FULL_TEXT_EMPTY.to_string(),
            FullText::Failed(reason) => format!("{SCRAPING_FAILED_PREFIX}{reason}"),
        }
    }

    /// Decode the sentinel-string encoding back into a variant.
    ///
    /// Unrecognized values are treated as scraped text.
    pub fn from_wire(value: String) -> Self {
        if value == NOT_ATTEMPTED {
            FullText::NotAttempted
        } else if value == CONTAINER_NOT_FOUND {
            FullText::ContainerNotFound
        } else if value == FULL_TEXT_EMPTY {
            FullText::Empty
        } else if let Some(reason) = value.strip_prefix(SCRAPING_FAILED_PREFIX) {
            FullText::Failed(reason.to_string())
        } else {
            FullText::Text(value)
        }
    }
}

impl Serialize for FullText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire())
    }
}

impl<'de> Deserialize<'de> for FullText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(match value {
            None => FullText::NotAttempted,
            Some(text) => FullText::from_wire(text),
        })
    }
}

/// A single normalized publication record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// PubMed identifier (unique within a result set)
    pub pmid: String,
    /// Article title
    pub title: String,
    /// First author as "Lastname, F."
    pub first_author: String,
    /// Full author list, comma-joined
    pub authors: String,
    /// Publication year (not guaranteed numeric)
    pub year: String,
    /// Journal name
    #[serde(default = "default_journal")]
    pub journal: String,
    /// Abstract text, fragments space-joined
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// PubMed Central identifier for full-text access, empty when absent
    #[serde(default)]
    pub pmcid: String,
    /// Full-text scrape outcome
    #[serde(default)]
    pub full_text: FullText,
}

fn default_journal() -> String {
    NO_JOURNAL.to_string()
}

impl Article {
    /// Citation string used in analysis prompts: "(First Author, Year)".
    pub fn citation(&self) -> String {
        format!("({}, {})", self.first_author, self.year)
    }

    /// Best available body text: scraped full text when non-empty, else the abstract.
    pub fn best_text(&self) -> &str {
        self.full_text.text().unwrap_or(&self.abstract_text)
    }
}
