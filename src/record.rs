use serde::{Deserialize, Serialize};

/// One successfully extracted story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: u32,
    pub title: String,
    pub country: Option<String>,
    pub state: Option<String>,
    pub category: Option<String>,
    /// Story paragraphs separated by a blank line. May be empty.
    #[serde(rename = "story")]
    pub body: String,
}

impl Record {
    /// Column order of every CSV this crate writes.
    pub const HEADERS: [&'static str; 6] = ["id", "title", "country", "state", "category", "story"];
}
