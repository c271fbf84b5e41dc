use chrono::{DateTime, Utc};
use folio_api::{ApiError, Filters, Identified};
use folio_client::{ClientConfig, EntityClient, Transport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::notify::Notifier;
use crate::optimistic::{BoolField, OptimisticToggle, ToggleOutcome};
use crate::pagination::PaginationEngine;

pub const RECORDS_ENTITY: &str = "records";
pub const DEFAULT_SORT: &str = "datePublished";
pub const FAVORITE_FILTER: &str = "isFavorite";

/// One diary entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub date_published: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_favorite: bool,
    /// Photo file names attached to the entry
    #[serde(default)]
    pub photos: Vec<String>,
}

impl Identified for DiaryRecord {
    fn id(&self) -> &str {
        &self.id
    }
}

pub fn records_client(config: &ClientConfig, transport: Arc<dyn Transport>) -> EntityClient<DiaryRecord> {
    EntityClient::new(RECORDS_ENTITY, config, transport)
}

/// Page-based engine sorted by publication date, optionally favorites only
pub fn records_engine(
    client: EntityClient<DiaryRecord>,
    config: &EngineConfig,
    favorites_only: bool,
) -> PaginationEngine<DiaryRecord> {
    PaginationEngine::new(
        Arc::new(client),
        config.page_strategy(Some(DEFAULT_SORT)),
        config.scroll_options(),
    )
    .with_filters(favorite_filter(favorites_only))
}

pub fn favorite_filter(favorites_only: bool) -> Filters {
    let mut filters = Filters::new();
    if favorites_only {
        filters.insert(FAVORITE_FILTER.to_string(), "true".to_string());
    }
    filters
}

pub fn favorite_field() -> BoolField<DiaryRecord> {
    BoolField {
        name: FAVORITE_FILTER,
        get: |record| record.is_favorite,
        set: |record, value| record.is_favorite = value,
    }
}

/// Flip `isFavorite` locally and PATCH it to the server, rolling back on failure
pub async fn toggle_favorite(
    engine: &PaginationEngine<DiaryRecord>,
    client: &EntityClient<DiaryRecord>,
    notifier: Arc<dyn Notifier>,
    id: &str,
) -> Result<ToggleOutcome, ApiError> {
    OptimisticToggle::new(Arc::new(engine.clone()), favorite_field(), notifier)
        .toggle(id, |record| async move {
            client
                .patch(&record.id, &serde_json::json!({ "isFavorite": record.is_favorite }))
                .await
        })
        .await
}
