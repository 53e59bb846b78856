//! Bounded-concurrency retrieval of every page of a paginated GitHub listing.
//!
//! Callers fetch (or let the fetcher fetch) page `1` to learn how many pages there are; pages `2..=last`
//! are then dispatched concurrently, never more than `concurrency` at once, and merged back in page order
//! by a single consumer. The first failing page aborts the whole operation: nothing partial is ever
//! returned.
//!
//! Listings whose responses announce a `next` page but no `last` one are walked one page at a time,
//! following `next` until the server stops announcing it.
//!
//! ```rust,ignore
//! let fetcher = PaginatedFetcher::new(20, cancellation.clone())
//!     .with_progress(Arc::new(|done, total| println!("page: {}/{}", done, total)));
//!
//! let repositories = fetcher
//!     .fetch_all(query, move |request| {
//!         let gateway = Arc::clone(&gateway);
//!         async move { gateway.list_repositories(request).await }
//!     })
//!     .await?;
//! ```

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use log::{debug, trace};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::ctl_error::CtlError;

/// Ceiling of concurrent in-flight page requests, unless configured otherwise.
pub const DEFAULT_CONCURRENCY: usize = 20;

/// Receives `(pages_completed, total_pages)` after every completed page.
pub type ProgressCallback = Arc<dyn Fn(u32, u32) + Send + Sync>;

/// Request for a single page. Every worker owns its own copy of the listing options, so the page number
/// is never shared between workers.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest<O> {
    options: O,
    page: u32,
}

impl<O> PageRequest<O> {
    pub fn new(options: O, page: u32) -> Self {
        PageRequest { options, page }
    }

    pub fn options(&self) -> &O {
        &self.options
    }

    /// 1-based page number.
    pub fn page(&self) -> u32 {
        self.page
    }
}

/// One page worth of items, along with the pagination hints reported by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub last_page: u32,
    pub next_page: Option<u32>,
}

impl<T> PageResult<T> {
    pub fn new(items: Vec<T>, last_page: u32, next_page: Option<u32>) -> Self {
        PageResult {
            items,
            last_page,
            next_page,
        }
    }

    /// A result that is known to be the only page.
    pub fn single(items: Vec<T>) -> Self {
        PageResult::new(items, 1, None)
    }
}

pub struct PaginatedFetcher {
    concurrency: usize,
    cancellation: CancellationToken,
    progress: Option<ProgressCallback>,
}

impl PaginatedFetcher {
    /// `concurrency` is clamped to at least one in-flight request. Cancelling `cancellation` (e.g. on a user
    /// interrupt) aborts any fetch in progress.
    pub fn new(concurrency: usize, cancellation: CancellationToken) -> Self {
        PaginatedFetcher {
            concurrency: concurrency.max(1),
            cancellation,
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Fetches page `1` with `fetch_page` and then every remaining page.
    pub async fn fetch_all<O, T, F, Fut>(&self, template: O, fetch_page: F) -> Result<Vec<T>, CtlError>
    where
        O: Clone + Send + Sync + 'static,
        T: Send + 'static,
        F: Fn(PageRequest<O>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<PageResult<T>, CtlError>> + Send + 'static,
    {
        let first = tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => return Err(interrupted()),
            first = fetch_page(PageRequest::new(template.clone(), 1)) => first?,
        };

        self.fetch_remaining(template, first, fetch_page).await
    }

    /// Fetches pages `2..=first.last_page` (or, without a known last page, every page reachable through
    /// `next`) and returns them merged behind `first`'s items.
    pub async fn fetch_remaining<O, T, F, Fut>(
        &self, template: O, first: PageResult<T>, fetch_page: F,
    ) -> Result<Vec<T>, CtlError>
    where
        O: Clone + Send + Sync + 'static,
        T: Send + 'static,
        F: Fn(PageRequest<O>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<PageResult<T>, CtlError>> + Send + 'static,
    {
        if first.next_page.is_some_and(|next| next > first.last_page) {
            return self.follow_next_links(template, first, fetch_page).await;
        }

        let total_pages = first.last_page.max(1);
        let reporter = ProgressReporter::spawn(self.progress.clone());
        reporter.report(1, total_pages);

        if total_pages == 1 {
            reporter.finish().await;
            return Ok(first.items);
        }

        debug!(
            "Fetching [{}] remaining page(s) with up to [{}] concurrent request(s)...",
            total_pages - 1,
            self.concurrency
        );

        let cancellation = self.cancellation.child_token();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let (sender, mut receiver) = mpsc::channel(total_pages as usize);

        let dispatcher = tokio::spawn(dispatch(
            template,
            Arc::new(fetch_page),
            2..=total_pages,
            Arc::clone(&semaphore),
            cancellation.clone(),
            sender,
        ));

        let mut pages: BTreeMap<u32, Vec<T>> = BTreeMap::new();
        pages.insert(1, first.items);

        let outcome = loop {
            if pages.len() as u32 == total_pages {
                break Ok(());
            }

            match receiver.recv().await {
                Some((page, Ok(items))) => {
                    trace!("Collected page [{}/{}].", page, total_pages);
                    pages.insert(page, items);
                    reporter.report(pages.len() as u32, total_pages);
                }
                Some((page, Err(e))) => {
                    debug!("Page [{}] could not be fetched, aborting pagination. Error = {}", page, e);
                    break Err(e);
                }
                // every sender is gone before all pages arrived: dispatching was interrupted
                None => break Err(interrupted()),
            }
        };

        if outcome.is_err() {
            cancellation.cancel();
            semaphore.close();
        }
        drop(receiver);

        if let Err(e) = dispatcher.await {
            debug!("Page dispatcher ended abnormally. Error = {:?}", e);
        }
        reporter.finish().await;

        outcome.map(|_| pages.into_values().flatten().collect())
    }

    /// Sequential walk for listings that never tell how many pages there are.
    async fn follow_next_links<O, T, F, Fut>(
        &self, template: O, first: PageResult<T>, fetch_page: F,
    ) -> Result<Vec<T>, CtlError>
    where
        O: Clone + Send + Sync + 'static,
        T: Send + 'static,
        F: Fn(PageRequest<O>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<PageResult<T>, CtlError>> + Send + 'static,
    {
        debug!("No last page announced, following next links one page at a time...");

        let reporter = ProgressReporter::spawn(self.progress.clone());
        let mut items = first.items;
        let mut current = 1;
        let mut next_page = first.next_page;
        reporter.report(current, next_page.unwrap_or(current));

        let outcome = loop {
            let page = match next_page {
                Some(page) if page > current => page,
                _ => break Ok(()),
            };

            let result = tokio::select! {
                biased;
                _ = self.cancellation.cancelled() => Err(interrupted()),
                result = fetch_page(PageRequest::new(template.clone(), page)) => result,
            };

            match result {
                Ok(page_result) => {
                    trace!("Collected page [{}].", page);
                    items.extend(page_result.items);
                    current = page;
                    next_page = page_result.next_page;
                    reporter.report(current, next_page.unwrap_or(current).max(page_result.last_page));
                }
                Err(e) => {
                    debug!("Page [{}] could not be fetched, aborting pagination. Error = {}", page, e);
                    break Err(e);
                }
            }
        };

        reporter.finish().await;
        outcome.map(|_| items)
    }
}

type PageOutcome<T> = (u32, Result<Vec<T>, CtlError>);

/// Spawns one worker per page, each one only after a permit has been granted. Stops scheduling as soon as
/// the cancellation signal fires or the semaphore gets closed.
async fn dispatch<O, T, F, Fut>(
    template: O, fetch_page: Arc<F>, pages: std::ops::RangeInclusive<u32>, semaphore: Arc<Semaphore>,
    cancellation: CancellationToken, sender: mpsc::Sender<PageOutcome<T>>,
) where
    O: Clone + Send + Sync + 'static,
    T: Send + 'static,
    F: Fn(PageRequest<O>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<PageResult<T>, CtlError>> + Send + 'static,
{
    for page in pages {
        let permit = tokio::select! {
            biased;
            _ = cancellation.cancelled() => return,
            permit = Arc::clone(&semaphore).acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => return,
            },
        };

        let request = PageRequest::new(template.clone(), page);
        let fetch_page = Arc::clone(&fetch_page);
        let cancellation = cancellation.clone();
        let sender = sender.clone();

        trace!("Dispatching page [{}]...", page);
        tokio::spawn(async move {
            let _permit = permit;

            let outcome = tokio::select! {
                biased;
                _ = cancellation.cancelled() => Err(interrupted()),
                result = fetch_page(request) => result.map(|page_result| page_result.items),
            };
            let failed = outcome.is_err();

            // the error has to be queued before anyone else can observe the cancellation, so the consumer
            // always gets the root cause first
            let _ = sender.send((page, outcome)).await;
            if failed {
                cancellation.cancel();
            }
        });
    }
}

fn interrupted() -> CtlError {
    CtlError::CancelledError("pagination interrupted".to_string())
}

/// Delivers progress notifications from a dedicated task, so slow sinks never hold up the fetch.
struct ProgressReporter {
    sender: Option<mpsc::UnboundedSender<(u32, u32)>>,
    task: Option<JoinHandle<()>>,
}

impl ProgressReporter {
    fn spawn(callback: Option<ProgressCallback>) -> Self {
        match callback {
            None => ProgressReporter {
                sender: None,
                task: None,
            },
            Some(callback) => {
                let (sender, mut receiver) = mpsc::unbounded_channel::<(u32, u32)>();
                let task = tokio::spawn(async move {
                    while let Some((completed, total_pages)) = receiver.recv().await {
                        callback(completed, total_pages);
                    }
                });
                ProgressReporter {
                    sender: Some(sender),
                    task: Some(task),
                }
            }
        }
    }

    fn report(&self, completed: u32, total_pages: u32) {
        if let Some(sender) = &self.sender {
            let _ = sender.send((completed, total_pages));
        }
    }

    /// Waits until every queued notification has been delivered.
    async fn finish(mut self) {
        self.sender.take();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                debug!("Progress reporter ended abnormally. Error = {:?}", e);
            }
        }
    }
}
