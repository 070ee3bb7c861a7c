use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::{record::Record, Error, Result};

/// Turns the HTML of a page into a `Record`. `None` means the page doesn't have the
/// expected shape (missing or removed story), which is a normal outcome.
///
/// Extraction is pure and synchronous, it gets run on the blocking pool.
pub trait PageExtractor: Send + Sync + 'static {
    fn extract(&self, id: u32, html: &str) -> Option<Record>;
}

/// Labels that appear in the second info block, in the order the site prints them.
const LABELS: &str = r"\b(?:Country|State|Paranormal Category):";

/// Extracts story pages: title, the labeled info fields and the story paragraphs.
#[derive(Debug)]
pub struct StoryExtractor {
    title: Selector,
    info: Selector,
    paragraphs: Selector,
    labels: Regex,
}

impl StoryExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            title: create_selector(".storytitle")?,
            info: create_selector(".storyinfo")?,
            paragraphs: create_selector("div#story p")?,
            labels: Regex::new(LABELS)?,
        })
    }

    /// Splits the info text on the known labels. Each value runs until the next label
    /// or the end of its line.
    fn parse_info(&self, text: &str) -> InfoFields {
        let marks: Vec<_> = self.labels.find_iter(text).collect();
        let mut fields = InfoFields::default();

        for (i, mark) in marks.iter().enumerate() {
            let end = marks.get(i + 1).map_or(text.len(), |next| next.start());
            let slot = match mark.as_str() {
                "Country:" => &mut fields.country,
                "State:" => &mut fields.state,
                _ => &mut fields.category,
            };
            // First occurrence wins.
            if slot.is_none() {
                *slot = Some(field_value(&text[mark.end()..end]));
            }
        }
        fields
    }
}

impl PageExtractor for StoryExtractor {
    fn extract(&self, id: u32, html: &str) -> Option<Record> {
        let doc = Html::parse_document(html);

        let title = element_text(doc.select(&self.title).next()?).trim().to_string();

        let info_text = element_text(doc.select(&self.info).nth(1)?);
        let InfoFields {
            country,
            state,
            category,
        } = self.parse_info(&info_text);

        let body = doc
            .select(&self.paragraphs)
            .map(element_text)
            .collect::<Vec<_>>()
            .join("\n\n");

        Some(Record {
            id,
            title,
            country,
            state,
            category,
            body,
        })
    }
}

#[derive(Debug, Default, PartialEq)]
struct InfoFields {
    country: Option<String>,
    state: Option<String>,
    category: Option<String>,
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::ParseMissingSelector(sel_str.into()))
}

#[inline]
fn element_text(el: ElementRef) -> String {
    el.text().collect()
}

/// Leading whitespace may span a line break, the value itself stops at the end of its line.
fn field_value(raw: &str) -> String {
    raw.trim_start().lines().next().unwrap_or_default().trim().to_string()
}
