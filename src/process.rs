use std::{ops::RangeInclusive, sync::Arc};

use chrono::{Local, TimeDelta};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::{
    sync::{mpsc, oneshot, Mutex},
    task::{spawn_blocking, JoinSet},
};
use tracing::{debug, warn};

use crate::{
    config::Config,
    finalize::{finalize, Summary},
    info_time,
    output::{write_csv, CheckpointSink, CsvCheckpoint},
    parse::{PageExtractor, StoryExtractor},
    record::Record,
    request::{HttpFetcher, PageFetcher},
    Error, Result, CHECKPOINT_EVERY, WORKERS,
};

const OUTCOME_CHANNEL_CAP: usize = 256;

/// What a worker reports for a single id. `record` is `None` when the page
/// couldn't be fetched or didn't have the expected shape.
#[derive(Debug)]
pub struct TaskOutcome {
    pub id: u32,
    pub record: Option<Record>,
}

/// Everything the pool recovered, in completion order.
#[derive(Debug, Default)]
pub struct ResultSet {
    pub records: Vec<Record>,
    /// Number of tasks that finished, successfully or not.
    pub attempted: usize,
    /// Number of checkpoint writes issued.
    pub checkpoints: usize,
}

/// Fixed-size worker pool that drives fetch → extract for every id in a range.
pub struct Harness<F, X> {
    fetcher: Arc<F>,
    extractor: Arc<X>,
    workers: usize,
    checkpoint_every: usize,
    show_progress: bool,
}

impl<F: PageFetcher, X: PageExtractor> Harness<F, X> {
    pub fn new(fetcher: F, extractor: X) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            extractor: Arc::new(extractor),
            workers: WORKERS,
            checkpoint_every: CHECKPOINT_EVERY,
            show_progress: false,
        }
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn checkpoint_every(mut self, every: usize) -> Self {
        self.checkpoint_every = every;
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Runs every id in `ids` through the pool exactly once and returns the survivors.
    ///
    /// At most `workers` ids are in flight at any time. Whenever the number of
    /// recovered stories hits a multiple of `checkpoint_every`, everything recovered so
    /// far is handed to `sink` on the blocking pool. If `stop` fires, no further ids are
    /// admitted; in-flight ones still finish and the partial result is returned.
    pub async fn run<S: CheckpointSink>(
        &self,
        ids: RangeInclusive<u32>,
        sink: Arc<S>,
        stop: Option<oneshot::Receiver<()>>,
    ) -> Result<ResultSet> {
        if self.workers == 0 {
            return Err(Error::Config("workers must be greater than 0".into()));
        }
        if self.checkpoint_every == 0 {
            return Err(Error::Config("checkpoint_every must be greater than 0".into()));
        }

        let total = ids.clone().count();
        let (task_tx, task_rx) = mpsc::channel::<u32>(self.workers);
        let (out_tx, out_rx) = mpsc::channel::<TaskOutcome>(OUTCOME_CHANNEL_CAP);

        let feeder = tokio::spawn(feed_tasks(ids, task_tx, stop));

        let task_rx = Arc::new(Mutex::new(task_rx));
        let mut pool = JoinSet::new();
        for _ in 0..self.workers {
            pool.spawn(worker(
                Arc::clone(&self.fetcher),
                Arc::clone(&self.extractor),
                Arc::clone(&task_rx),
                out_tx.clone(),
            ));
        }
        // Only the workers hold senders now, the outcome channel closes when they're done.
        drop(out_tx);

        let progress = self.progress_bar(total);
        let result = self.collect_outcomes(out_rx, sink, &progress).await;
        progress.finish_and_clear();

        feeder.await?;
        while let Some(task) = pool.join_next().await {
            task??;
        }

        Ok(result)
    }

    /// The single writer of the result set. Appends successes and writes checkpoints.
    async fn collect_outcomes<S: CheckpointSink>(
        &self,
        mut out_rx: mpsc::Receiver<TaskOutcome>,
        sink: Arc<S>,
        progress: &ProgressBar,
    ) -> ResultSet {
        let mut result = ResultSet::default();

        while let Some(TaskOutcome { id, record }) = out_rx.recv().await {
            result.attempted += 1;
            progress.inc(1);

            let Some(record) = record else {
                debug!(id, "no story recovered");
                continue;
            };
            result.records.push(record);
            progress.set_message(format!("{} found", result.records.len()));

            if result.records.len() % self.checkpoint_every == 0 {
                result.checkpoints += 1;
                write_checkpoint(Arc::clone(&sink), result.records.clone()).await;
            }
        }
        result
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) =
            ProgressStyle::with_template("Scraping {bar:40.cyan/blue} {pos}/{len} ({eta}) {msg}")
        {
            bar.set_style(style);
        }
        bar
    }
}

/// Hands a snapshot to the sink off the runtime threads. A failed write is only logged.
async fn write_checkpoint<S: CheckpointSink>(sink: Arc<S>, snapshot: Vec<Record>) {
    let stories = snapshot.len();
    let written = spawn_blocking(move || sink.write_checkpoint(&snapshot)).await;

    match written {
        Ok(Ok(())) => info_time!("Checkpoint saved: {} stories", stories),
        Ok(Err(err)) => warn!(%err, stories, "checkpoint failed"),
        Err(err) => warn!(%err, stories, "checkpoint panicked"),
    }
}

/// Admits ids into the task channel until the range is exhausted or a STOP signal arrives.
async fn feed_tasks(
    ids: RangeInclusive<u32>,
    task_tx: mpsc::Sender<u32>,
    mut stop: Option<oneshot::Receiver<()>>,
) {
    for id in ids {
        if let Some(stop_rx) = stop.as_mut() {
            if stop_rx.try_recv().is_ok() {
                info_time!("received STOP signal, no more pages will be requested");
                break;
            }
        }
        if task_tx.send(id).await.is_err() {
            break;
        }
    }
}

/// Pulls ids off the shared queue one at a time until it is drained.
async fn worker<F: PageFetcher, X: PageExtractor>(
    fetcher: Arc<F>,
    extractor: Arc<X>,
    task_rx: Arc<Mutex<mpsc::Receiver<u32>>>,
    out_tx: mpsc::Sender<TaskOutcome>,
) -> Result<()> {
    loop {
        let next = task_rx.lock().await.recv().await;
        let Some(id) = next else { break };

        let record = scrape_page(Arc::clone(&fetcher), Arc::clone(&extractor), id).await;
        out_tx.send(TaskOutcome { id, record }).await?;
    }
    Ok(())
}

/// Fetch and extract a single page. Every failure along the way, a panic in the
/// fetcher or the extractor included, is a dropped page.
pub async fn scrape_page<F: PageFetcher, X: PageExtractor>(
    fetcher: Arc<F>,
    extractor: Arc<X>,
    id: u32,
) -> Option<Record> {
    // Own task so a panicking fetch only costs this page, not the worker.
    let fetched = tokio::spawn(async move { fetcher.fetch(id).await }).await;
    let html = match fetched {
        Ok(html) => html?,
        Err(err) => {
            warn!(id, %err, "fetch panicked, dropping page");
            return None;
        }
    };

    let extracted = spawn_blocking(move || extractor.extract(id, &html)).await;

    match extracted {
        Ok(record) => record,
        Err(err) => {
            warn!(id, %err, "extraction panicked, dropping page");
            None
        }
    }
}

/// Runs the whole job with the production fetcher and extractor: scrape the configured
/// range, sort and clean the survivors, write the final CSV and return the report.
pub async fn process_site(
    config: &Config,
    stop: Option<oneshot::Receiver<()>>,
) -> Result<(Vec<Record>, Summary)> {
    config.validate()?;
    let start_time = Local::now();

    let fetcher = HttpFetcher::new(config.url_template.clone(), config.request_timeout)?;
    let harness = Harness::new(fetcher, StoryExtractor::new()?)
        .workers(config.workers)
        .checkpoint_every(config.checkpoint_every)
        .show_progress(config.show_progress);
    let checkpoint = Arc::new(CsvCheckpoint::new(&config.checkpoint_path));

    info_time!(
        "Started scraping {} pages with {} workers",
        config.requested(),
        config.workers
    );
    let result = harness.run(config.ids(), checkpoint, stop).await?;
    info_time!(
        start_time,
        "Finished PROCESSING: {} of {} pages",
        result.attempted,
        config.requested()
    );

    let attempted = result.attempted;
    let records = finalize(result.records);

    let output_path = config.output_path();
    let local_now = Local::now();
    let records = spawn_blocking({
        let output_path = output_path.clone();
        move || write_csv(&output_path, &records).map(|()| records)
    })
    .await??;
    info_time!(local_now, "Wrote the results to file: {}", output_path.display());

    let elapsed: TimeDelta = Local::now() - start_time;
    let summary = Summary::new(&records, config.requested(), attempted, elapsed)
        .with_output(output_path);
    Ok((records, summary))
}
