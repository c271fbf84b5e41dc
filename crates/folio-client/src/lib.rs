//! HTTP data-access layer for folio
//!
//! This crate provides the request path from a typed call down to the wire:
//!
//! - `transport` - single-shot `Transport` trait and the reqwest implementation
//! - `normalize` - mapping of raw failures onto `ApiError`
//! - `executor` - bounded retry with exponential backoff for GET/DELETE
//! - `entity` - `EntityClient<T>`, CRUD/search/file operations over one resource
//! - `auth` / `sink` - collaborators for bearer tokens and downloaded files
//! - `config` - `ClientConfig`

pub mod auth;
pub mod config;
pub mod entity;
pub mod executor;
pub mod normalize;
pub mod sink;
pub mod transport;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use auth::{NoToken, StaticToken, TokenProvider};
pub use config::ClientConfig;
pub use entity::EntityClient;
pub use executor::{RequestExecutor, RetryPolicy, execute};
pub use normalize::normalize;
pub use sink::{Blob, DirectorySink, DiscardSink, FileSink};
pub use transport::{
    FilePayload, HttpMethod, HttpRequest, MultipartForm, RawFailure, RawResponse, ReqwestTransport,
    RequestBody, Transport,
};
