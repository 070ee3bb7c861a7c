//! GHOST STORY SCRAPER
//! Fetches a flat range of numbered story pages with a fixed pool of workers,
//! extracts the story fields and writes them out as CSV.

mod error;
mod macros;

pub mod config;
pub mod finalize;
pub mod output;
pub mod parse;
pub mod process;
pub mod record;
pub mod request;

pub use error::{Error, Result};

/// `{id}` is replaced with the story number.
const BASE_URL_TEMPLATE: &str = "https://www.yourghoststories.com/real-ghost-story.php?story={id}";
const FIRST_ID: u32 = 1;
const LAST_ID: u32 = 15_000;
const WORKERS: usize = 30;
const REQUEST_TIMEOUT_SECS: u64 = 10;
const CHECKPOINT_EVERY: usize = 1000;
const CHECKPOINT_PATH: &str = "ghost_stories_temp.csv";
