//! Folio data-access core
//!
//! Sits between list screens and a REST backend:
//!
//! - `pagination` - `PaginationEngine`, one infinite-scroll list over a `PageSource`
//! - `scroll` - viewport samples, debouncing and the near-end trigger
//! - `optimistic` - boolean toggles applied locally first, rolled back on failure
//! - `notify` - user-facing notices pushed by the core, drained by the UI
//! - `resources` - diary records and drive files wired onto the generic pieces
//! - `config` / `telemetry` - YAML configuration and logging bootstrap
//!
//! The HTTP side lives in `folio-client`; the wire types in `folio-api`.

pub mod config;
pub mod notify;
pub mod optimistic;
pub mod pagination;
pub mod resources;
pub mod scroll;
pub mod telemetry;

pub use config::{ConfigError, EngineConfig, FolioConfig};
pub use notify::{LogNotifier, Notice, NoticeLevel, NoticeQueue, Notifier};
pub use optimistic::{BoolField, ItemCollection, OptimisticToggle, ToggleOutcome};
pub use pagination::{FetchOutcome, PageSource, PaginationEngine, PaginationStrategy};
pub use scroll::{Debouncer, ScrollDecision, ScrollOptions, ScrollSample};
pub use telemetry::init_logging;

pub use folio_api::{
    ApiEnvelope, ApiError, ApiResult, ErrorKind, Filters, Identified, Page, PageMeta,
    PaginationParams, ScrollPhase, ScrollState,
};
pub use folio_client::{ClientConfig, EntityClient, ReqwestTransport, RetryPolicy, Transport};
