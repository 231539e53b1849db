//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop, which for every origin in order:
//! - Fetches the homepage and extracts its emails
//! - Discovers contact and about links on a 200 response
//! - Fetches each discovered page and extracts its emails
//! - Checkpoints periodically and on exit, including interruption
//!
//! The loop is strictly sequential. Per-URL failures never stop it; only
//! storage errors do.

use crate::config::Config;
use crate::crawler::aggregate::{aggregate, AggregatedEmails};
use crate::crawler::{ContactLinkDiscoverer, EmailExtractor, EmailSet, FetchResult, PageFetcher};
use crate::state::{CrawlState, ExtractionRecord, OriginState};
use crate::storage::{CheckpointStore, RunStatus};
use crate::url::Origin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// What a crawl run produced
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Records and mapping, including any resumed from a checkpoint
    pub state: CrawlState,

    /// Filtered emails per origin index
    pub aggregated: AggregatedEmails,

    /// Origins skipped because a checkpoint already covered them
    pub resumed: usize,

    /// True if the run stopped early on a shutdown request
    pub interrupted: bool,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    fetcher: PageFetcher,
    extractor: EmailExtractor,
    discoverer: ContactLinkDiscoverer,
    store: Box<dyn CheckpointStore>,
    state: CrawlState,
    config_hash: String,
    shutdown: Arc<AtomicBool>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `store` - Where checkpoints are written
    /// * `fresh` - Ignore any existing checkpoint instead of resuming from it
    pub fn new(config: Config, store: Box<dyn CheckpointStore>, fresh: bool) -> crate::Result<Self> {
        let fetcher = PageFetcher::from_config(&config)?;

        let state = if fresh {
            tracing::info!("Starting fresh crawl");
            CrawlState::new()
        } else {
            match store.load()? {
                Some(state) => {
                    tracing::info!(
                        "Loaded checkpoint covering {} origins and {} URLs",
                        state.origins_processed(),
                        state.records.len()
                    );
                    state
                }
                None => {
                    tracing::info!("No checkpoint found, starting new crawl");
                    CrawlState::new()
                }
            }
        };

        Ok(Self {
            config: Arc::new(config),
            fetcher,
            extractor: EmailExtractor::new(),
            discoverer: ContactLinkDiscoverer::new(),
            store,
            state,
            config_hash: String::new(),
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Records `hash` as the configuration of this run
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = hash.into();
        self
    }

    /// Uses `flag` to request a stop between fetches
    pub fn with_shutdown(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = flag;
        self
    }

    /// Returns the shutdown flag, e.g. to wire it to Ctrl-C
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Runs the main crawl loop over `origins`
    ///
    /// Origin indices in the mapping are positions in `origins`. On resume the
    /// same list must be passed, or mismatched entries are crawled again.
    pub async fn run(&mut self, origins: &[Origin]) -> crate::Result<CrawlOutcome> {
        self.store.begin_run(&self.config_hash)?;

        match self.crawl_all(origins).await {
            Ok(outcome) => {
                let status = if outcome.interrupted {
                    RunStatus::Interrupted
                } else {
                    RunStatus::Completed
                };
                self.store.finish_run(status)?;
                Ok(outcome)
            }
            Err(e) => {
                if let Err(finish_err) = self.store.finish_run(RunStatus::Failed) {
                    tracing::warn!("Failed to mark run as failed: {}", finish_err);
                }
                Err(e)
            }
        }
    }

    async fn crawl_all(&mut self, origins: &[Origin]) -> crate::Result<CrawlOutcome> {
        let total = origins.len();
        let interval = self.config.checkpoint.interval.max(1);
        let start_time = Instant::now();
        let mut resumed = 0;
        let mut interrupted = false;
        let mut states = Vec::with_capacity(total);

        tracing::info!("Number of websites to crawl: {}", total);

        for (index, origin) in origins.iter().enumerate() {
            if self.is_shutdown() {
                interrupted = true;
                break;
            }

            if self.is_already_crawled(index, origin) {
                resumed += 1;
                states.push((index, OriginState::ContactPagesFetched));
                continue;
            }

            match self.process_origin(index, origin).await? {
                Some(state) => states.push((index, state)),
                None => {
                    interrupted = true;
                    break;
                }
            }

            if (index + 1) % interval == 0 {
                tracing::info!(
                    "Progress: {} / {}    Elapsed time: {:.1} secs",
                    index + 1,
                    total,
                    start_time.elapsed().as_secs_f64()
                );
                self.store.persist(&self.state)?;
            }
        }

        self.store.persist(&self.state)?;

        if interrupted {
            tracing::warn!(
                "Crawl interrupted after {:.1} secs; progress saved to checkpoint",
                start_time.elapsed().as_secs_f64()
            );
        } else {
            tracing::info!(
                "Crawl complete. Elapsed time: {:.1} secs",
                start_time.elapsed().as_secs_f64()
            );
        }

        let aggregated = aggregate(&self.state, &self.config.filter.denylist);
        for (index, state) in states {
            let done = state.transition(OriginState::Aggregated)?;
            tracing::trace!("Origin {} is {}", index, done);
        }

        if resumed > 0 {
            tracing::info!("{} origins were already covered by the checkpoint", resumed);
        }

        Ok(CrawlOutcome {
            state: self.state.clone(),
            aggregated,
            resumed,
            interrupted,
        })
    }

    /// Returns true if the checkpoint already holds a crawl of this origin
    ///
    /// An entry whose first URL belongs to a different origin is stale and is
    /// dropped so the origin is crawled again.
    fn is_already_crawled(&mut self, index: usize, origin: &Origin) -> bool {
        let first = match self.state.mapping.get(index) {
            Some(urls) => urls.first().cloned(),
            None => return false,
        };

        match first {
            Some(url) if origin.matches_fetched(&url) => true,
            _ => {
                tracing::warn!(
                    "Checkpoint entry {} does not belong to {}, crawling again",
                    index,
                    origin
                );
                self.state.forget_origin(index);
                false
            }
        }
    }

    /// Fetches one origin and its contact pages
    ///
    /// Returns `None` if a shutdown request arrived part way through; the
    /// partial entry is dropped so a resumed run starts this origin over.
    async fn process_origin(
        &mut self,
        index: usize,
        origin: &Origin,
    ) -> crate::Result<Option<OriginState>> {
        tracing::debug!("Processing origin {}: {}", index, origin);

        let result = self.fetcher.fetch(origin.url()).await;
        let status = result.status_code();
        self.record(index, &result);

        let state = OriginState::Pending.transition(OriginState::OriginFetched { status })?;

        if state.should_discover() {
            let base = Url::parse(&result.url).unwrap_or_else(|_| origin.url().clone());
            let links = result
                .html()
                .map(|html| self.discoverer.discover(&base, html))
                .unwrap_or_default();

            tracing::debug!("Found {} contact links on {}", links.len(), result.url);

            for link in links {
                if self.is_shutdown() {
                    self.state.forget_origin(index);
                    return Ok(None);
                }
                let page = self.fetcher.fetch(&link).await;
                self.record(index, &page);
            }
        }

        Ok(Some(state.transition(OriginState::ContactPagesFetched)?))
    }

    /// Extracts emails from a 200 response and records the fetch
    fn record(&mut self, index: usize, result: &FetchResult) {
        let emails = match result.html() {
            Some(html) if result.is_ok() => self.extractor.extract(html),
            _ => EmailSet::new(),
        };

        if let Some(error) = result.error() {
            tracing::debug!("No response from {}: {}", result.url, error);
        }

        self.state.record(
            index,
            ExtractionRecord::new(result.url.clone(), emails, result.status_code()),
        );
    }

    /// Files the checkpoint backend writes
    pub fn artifacts(&self) -> Vec<std::path::PathBuf> {
        self.store.artifacts()
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }
}
