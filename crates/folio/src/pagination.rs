//! Infinite-scroll pagination engine
//!
//! A [`PaginationEngine`] owns the [`ScrollState`] of one list and decides when the
//! next page is requested from its [`PageSource`]. The same engine drives both
//! page-based and token-based resources; the [`PaginationStrategy`] fixed at
//! construction decides which parameters are sent.
//!
//! ## State machine
//!
//! ```text
//! Idle ──request_more──▶ LoadingInitial / LoadingMore ──ok──▶ Idle | Complete
//!  ▲                                                  └─err─▶ Error ──retry──▶ Loading*
//!  └──────────────────────────── reset ─────────────────────────────────────────┘
//! ```
//!
//! ## Completion
//!
//! - page-based: the page came back short (fewer items than `size`, including
//!   empty), or `meta.total` is known and already reached
//! - token-based: the page was empty or carried no `nextPageToken`
//!
//! ## Stale responses
//!
//! Each fetch carries the generation it started in. `reset()` bumps the generation,
//! so a response that arrives afterwards is dropped without touching the state.

use async_trait::async_trait;
use folio_api::{ApiError, Filters, Identified, Page, PaginationParams, ScrollPhase, ScrollState};
use folio_client::EntityClient;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use crate::optimistic::ItemCollection;
use crate::scroll::{Debouncer, ScrollDecision, ScrollOptions, ScrollSample};

/// Anything that can produce one page of items for the given parameters
#[async_trait]
pub trait PageSource<T>: Send + Sync {
    async fn fetch_page(&self, params: PaginationParams) -> Result<Page<T>, ApiError>;
}

#[async_trait]
impl<T> PageSource<T> for EntityClient<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn fetch_page(&self, params: PaginationParams) -> Result<Page<T>, ApiError> {
        self.list(Some(&params)).await.map(Page::from)
    }
}

/// Which pagination protocol the resource speaks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationStrategy {
    Page {
        size: u32,
        sort_by: Option<String>,
    },
    Token {
        page_size: u32,
        order_by: Option<String>,
    },
}

impl PaginationStrategy {
    pub fn page(size: u32, sort_by: Option<&str>) -> Self {
        PaginationStrategy::Page {
            size: size.max(1),
            sort_by: sort_by.map(str::to_string),
        }
    }

    pub fn token(page_size: u32, order_by: Option<&str>) -> Self {
        PaginationStrategy::Token {
            page_size: page_size.max(1),
            order_by: order_by.map(str::to_string),
        }
    }

    fn params(&self, page: u32, token: Option<String>, filters: &Filters) -> PaginationParams {
        match self {
            PaginationStrategy::Page { size, sort_by } => PaginationParams::page(page, *size)
                .with_ordering(sort_by.clone())
                .with_filters(filters.clone()),
            PaginationStrategy::Token {
                page_size,
                order_by,
            } => PaginationParams::token(*page_size)
                .with_page_token(token)
                .with_ordering(order_by.clone())
                .with_filters(filters.clone()),
        }
    }
}

/// Result of a `request_more()` / `retry()` call
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// A fetch was already in flight, or the phase does not allow fetching
    Skipped,
    /// The page was merged; `added` excludes duplicates
    Applied { added: usize, phase: ScrollPhase },
    Failed(ApiError),
    /// The engine was reset while the fetch was in flight
    Discarded,
}

struct FetchTicket {
    generation: u64,
    page: u32,
    params: PaginationParams,
}

struct EngineState<T> {
    scroll: ScrollState<T>,
    filters: Filters,
    generation: u64,
    debouncer: Debouncer,
}

pub struct PaginationEngine<T> {
    source: Arc<dyn PageSource<T>>,
    strategy: PaginationStrategy,
    options: ScrollOptions,
    state: Arc<Mutex<EngineState<T>>>,
    snapshots: Arc<watch::Sender<ScrollState<T>>>,
}

impl<T> Clone for PaginationEngine<T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            strategy: self.strategy.clone(),
            options: self.options,
            state: Arc::clone(&self.state),
            snapshots: Arc::clone(&self.snapshots),
        }
    }
}

/// Append items whose id is not present yet. The first arrival of an id wins.
fn merge_unique<T: Identified>(items: &mut Vec<T>, incoming: Vec<T>) -> usize {
    let mut seen: HashSet<String> = items.iter().map(|item| item.id().to_string()).collect();
    let before = items.len();
    for item in incoming {
        if seen.insert(item.id().to_string()) {
            items.push(item);
        }
    }
    items.len() - before
}

fn error_message(error: &ApiError) -> String {
    if error.message().is_empty() {
        error.kind().to_string()
    } else {
        error.message().to_string()
    }
}

impl<T> PaginationEngine<T>
where
    T: Identified + Clone + Send + Sync + 'static,
{
    pub fn new(
        source: Arc<dyn PageSource<T>>,
        strategy: PaginationStrategy,
        options: ScrollOptions,
    ) -> Self {
        let (snapshots, _) = watch::channel(ScrollState::new());
        Self {
            source,
            strategy,
            options,
            state: Arc::new(Mutex::new(EngineState {
                scroll: ScrollState::new(),
                filters: Filters::new(),
                generation: 0,
                debouncer: Debouncer::new(options.debounce),
            })),
            snapshots: Arc::new(snapshots),
        }
    }

    pub fn with_filters(self, filters: Filters) -> Self {
        self.lock().filters = filters;
        self
    }

    fn lock(&self) -> MutexGuard<'_, EngineState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, scroll: &ScrollState<T>) {
        self.snapshots.send_replace(scroll.clone());
    }

    pub fn strategy(&self) -> &PaginationStrategy {
        &self.strategy
    }

    pub fn filters(&self) -> Filters {
        self.lock().filters.clone()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> ScrollState<T> {
        self.lock().scroll.clone()
    }

    pub fn phase(&self) -> ScrollPhase {
        self.lock().scroll.phase
    }

    /// Receiver that observes every state change
    pub fn subscribe(&self) -> watch::Receiver<ScrollState<T>> {
        self.snapshots.subscribe()
    }

    /// State changes as a stream, starting with the current state
    pub fn watch(&self) -> WatchStream<ScrollState<T>> {
        WatchStream::new(self.subscribe())
    }

    /// Clear the list and return to `Idle`. Responses of fetches started before
    /// the reset are discarded when they arrive.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.scroll = ScrollState::new();
        state.debouncer.reset();
        info!(
            "[PaginationEngine] Reset to generation {}",
            state.generation
        );
        self.publish(&state.scroll);
    }

    /// Replace the filters and reset
    pub fn set_filters(&self, filters: Filters) {
        self.lock().filters = filters;
        self.reset();
    }

    /// Fetch the next page if the list is `Idle` and nothing is in flight
    pub async fn request_more(&self) -> FetchOutcome {
        match self.begin(false) {
            Some(ticket) => self.run(ticket).await,
            None => FetchOutcome::Skipped,
        }
    }

    /// Re-request the page that failed. Behaves like `request_more()` when `Idle`.
    pub async fn retry(&self) -> FetchOutcome {
        match self.begin(true) {
            Some(ticket) => self.run(ticket).await,
            None => FetchOutcome::Skipped,
        }
    }

    /// Evaluate a scroll sample and fetch when the viewport nears the end of a
    /// non-empty, idle list
    pub async fn on_scroll_sample(&self, sample: ScrollSample) -> ScrollDecision {
        {
            let mut state = self.lock();
            if !state.debouncer.accept(Instant::now()) {
                return ScrollDecision::Debounced;
            }
            if !sample.is_near_end(self.options.threshold) {
                return ScrollDecision::NotNearEnd;
            }
            if state.scroll.phase != ScrollPhase::Idle || state.scroll.items.is_empty() {
                return ScrollDecision::NotReady;
            }
        }
        ScrollDecision::Fetched(self.request_more().await)
    }

    fn begin(&self, from_error: bool) -> Option<FetchTicket> {
        let mut state = self.lock();
        match state.scroll.phase {
            ScrollPhase::Idle => {}
            ScrollPhase::Error if from_error => {}
            phase => {
                debug!("[PaginationEngine] Fetch skipped in phase {:?}", phase);
                return None;
            }
        }

        state.scroll.phase = if state.scroll.items.is_empty() {
            ScrollPhase::LoadingInitial
        } else {
            ScrollPhase::LoadingMore
        };
        state.scroll.error_message = None;

        let page = state.scroll.current_page + 1;
        let params = self
            .strategy
            .params(page, state.scroll.next_token.clone(), &state.filters);
        self.publish(&state.scroll);

        Some(FetchTicket {
            generation: state.generation,
            page,
            params,
        })
    }

    #[tracing::instrument(name = "pagination.fetch", skip(self, ticket), fields(page = ticket.page, generation = ticket.generation))]
    async fn run(&self, ticket: FetchTicket) -> FetchOutcome {
        let result = self.source.fetch_page(ticket.params.clone()).await;
        self.finish(ticket, result)
    }

    fn finish(&self, ticket: FetchTicket, result: Result<Page<T>, ApiError>) -> FetchOutcome {
        let mut state = self.lock();
        if state.generation != ticket.generation {
            debug!(
                "[PaginationEngine] Discarding response for generation {} (current {})",
                ticket.generation, state.generation
            );
            return FetchOutcome::Discarded;
        }

        let outcome = match result {
            Ok(page) => self.apply_page(&mut state.scroll, ticket.page, page),
            Err(error) => {
                warn!(
                    "[PaginationEngine] Fetching page {} failed: {}",
                    ticket.page, error
                );
                state.scroll.phase = ScrollPhase::Error;
                state.scroll.error_message = Some(error_message(&error));
                FetchOutcome::Failed(error)
            }
        };
        self.publish(&state.scroll);
        outcome
    }

    fn apply_page(&self, scroll: &mut ScrollState<T>, page_number: u32, page: Page<T>) -> FetchOutcome {
        let Page {
            items,
            meta,
            next_page_token,
        } = page;
        let returned = items.len();
        let added = merge_unique(&mut scroll.items, items);

        if let Some(total) = meta.and_then(|m| m.total) {
            scroll.total_known = Some(total);
        }
        scroll.current_page = page_number;

        let complete = match &self.strategy {
            PaginationStrategy::Page { size, .. } => {
                returned < *size as usize
                    || scroll
                        .total_known
                        .is_some_and(|total| scroll.items.len() as u64 >= total)
            }
            PaginationStrategy::Token { .. } => {
                scroll.next_token = next_page_token.filter(|token| !token.is_empty());
                returned == 0 || scroll.next_token.is_none()
            }
        };
        scroll.phase = if complete {
            ScrollPhase::Complete
        } else {
            ScrollPhase::Idle
        };

        info!(
            "[PaginationEngine] Page {}: {} returned, {} new, {} total, phase {:?}",
            page_number,
            returned,
            added,
            scroll.items.len(),
            scroll.phase
        );
        FetchOutcome::Applied {
            added,
            phase: scroll.phase,
        }
    }
}

impl<T> ItemCollection<T> for PaginationEngine<T>
where
    T: Identified + Clone + Send + Sync + 'static,
{
    fn item(&self, id: &str) -> Option<T> {
        self.lock()
            .scroll
            .items
            .iter()
            .find(|item| item.id() == id)
            .cloned()
    }

    fn replace_item(&self, item: T) -> bool {
        let mut state = self.lock();
        let Some(slot) = state
            .scroll
            .items
            .iter_mut()
            .find(|existing| existing.id() == item.id())
        else {
            return false;
        };
        *slot = item;
        self.publish(&state.scroll);
        true
    }
}
