use chrono::{DateTime, Utc};
use folio_api::{ApiError, Identified};
use folio_client::{ClientConfig, EntityClient, TokenProvider, Transport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::notify::Notifier;
use crate::optimistic::{BoolField, OptimisticToggle, ToggleOutcome};
use crate::pagination::PaginationEngine;

pub const DRIVE_ENTITY: &str = "files";
pub const DEFAULT_ORDER: &str = "modifiedTime desc";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub modified_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub starred: bool,
}

impl Identified for DriveFile {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Drive requests always carry the user's bearer token
pub fn drive_client(
    config: &ClientConfig,
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenProvider>,
) -> EntityClient<DriveFile> {
    EntityClient::new(DRIVE_ENTITY, config, transport).with_token_provider(tokens)
}

/// Token-based engine, most recently modified first unless configured otherwise
pub fn drive_engine(client: EntityClient<DriveFile>, config: &EngineConfig) -> PaginationEngine<DriveFile> {
    PaginationEngine::new(
        Arc::new(client),
        config.token_strategy(Some(DEFAULT_ORDER)),
        config.scroll_options(),
    )
}

pub fn starred_field() -> BoolField<DriveFile> {
    BoolField {
        name: "starred",
        get: |file| file.starred,
        set: |file, value| file.starred = value,
    }
}

pub async fn toggle_starred(
    engine: &PaginationEngine<DriveFile>,
    client: &EntityClient<DriveFile>,
    notifier: Arc<dyn Notifier>,
    id: &str,
) -> Result<ToggleOutcome, ApiError> {
    OptimisticToggle::new(Arc::new(engine.clone()), starred_field(), notifier)
        .toggle(id, |file| async move {
            client
                .patch(&file.id, &serde_json::json!({ "starred": file.starred }))
                .await
        })
        .await
}
