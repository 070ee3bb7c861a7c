use std::{ops::RangeInclusive, path::PathBuf, time::Duration};

use crate::{
    Error, Result, BASE_URL_TEMPLATE, CHECKPOINT_EVERY, CHECKPOINT_PATH, FIRST_ID, LAST_ID,
    REQUEST_TIMEOUT_SECS, WORKERS,
};

/// Everything a run needs to know. There are no flags or environment variables;
/// the defaults come from the constants in the crate root.
#[derive(Debug, Clone)]
pub struct Config {
    /// Page URL with an `{id}` placeholder.
    pub url_template: String,
    pub first_id: u32,
    pub last_id: u32,
    /// Size of the worker pool, i.e. the maximum number of requests in flight.
    pub workers: usize,
    pub request_timeout: Duration,
    /// A checkpoint is written every time the number of recovered stories
    /// reaches a multiple of this.
    pub checkpoint_every: usize,
    pub checkpoint_path: PathBuf,
    /// Final artifact. `None` means `ghost_stories_{last_id}.csv`.
    pub output_path: Option<PathBuf>,
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url_template: BASE_URL_TEMPLATE.into(),
            first_id: FIRST_ID,
            last_id: LAST_ID,
            workers: WORKERS,
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            checkpoint_every: CHECKPOINT_EVERY,
            checkpoint_path: CHECKPOINT_PATH.into(),
            output_path: None,
            show_progress: true,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.first_id > self.last_id {
            return Err(Error::Config(format!(
                "empty id range {}..={}",
                self.first_id, self.last_id
            )));
        }
        if self.workers == 0 {
            return Err(Error::Config("workers must be greater than 0".into()));
        }
        if self.checkpoint_every == 0 {
            return Err(Error::Config("checkpoint_every must be greater than 0".into()));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::Config("request_timeout must be non-zero".into()));
        }
        if !self.url_template.contains("{id}") {
            return Err(Error::Config(format!(
                "url template has no {{id}} placeholder: {}",
                self.url_template
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn ids(&self) -> RangeInclusive<u32> {
        self.first_id..=self.last_id
    }

    #[inline]
    pub fn requested(&self) -> usize {
        self.ids().count()
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| format!("ghost_stories_{}.csv", self.last_id).into())
    }
}
