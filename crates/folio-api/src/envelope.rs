//! Response envelope shared by every endpoint
//!
//! The backend wraps every payload in `{ data, success, message?, errors?, meta? }`.
//! Token-paginated resources additionally carry `nextPageToken`.

use serde::{Deserialize, Serialize};

/// Paging metadata returned by page-based resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Successful response envelope.
///
/// An `ApiEnvelope` only exists for responses with `success == true` and a
/// well-typed `data`; anything else is reported as a `BadData` error by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    pub data: T,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data,
            success: true,
            message: None,
            errors: None,
            meta: None,
            next_page_token: None,
        }
    }

    pub fn with_meta(mut self, meta: PageMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn with_next_page_token(mut self, token: impl Into<String>) -> Self {
        self.next_page_token = Some(token.into());
        self
    }
}

/// One page of items, independent of the pagination protocol that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: Option<PageMeta>,
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            meta: None,
            next_page_token: None,
        }
    }
}

impl<T> From<ApiEnvelope<Vec<T>>> for Page<T> {
    fn from(envelope: ApiEnvelope<Vec<T>>) -> Self {
        Self {
            items: envelope.data,
            meta: envelope.meta,
            next_page_token: envelope.next_page_token,
        }
    }
}

/// A file that the backend refused during a bulk upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedUpload {
    pub file_name: String,
    pub error: String,
}

/// Partial-success report of a bulk upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUploadResult<T> {
    #[serde(default = "Vec::new")]
    pub successful_uploads: Vec<T>,
    #[serde(default)]
    pub failed_uploads: Vec<FailedUpload>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_wire_names() {
        let raw = json!({
            "data": ["a", "b"],
            "success": true,
            "meta": { "page": 1, "limit": 10 },
            "nextPageToken": "tok-2"
        });
        let envelope: ApiEnvelope<Vec<String>> = serde_json::from_value(raw).unwrap();
        assert_eq!(envelope.data, vec!["a", "b"]);
        assert_eq!(
            envelope.meta,
            Some(PageMeta {
                total: None,
                page: Some(1),
                limit: Some(10)
            })
        );
        assert_eq!(envelope.next_page_token.as_deref(), Some("tok-2"));
    }

    #[test]
    fn test_page_from_envelope() {
        let envelope = ApiEnvelope::ok(vec![1, 2, 3]).with_next_page_token("next");
        let page: Page<i32> = envelope.into();
        assert_eq!(page.items, vec![1, 2, 3]);
        assert_eq!(page.next_page_token.as_deref(), Some("next"));
        assert!(page.meta.is_none());
    }

    #[test]
    fn test_bulk_upload_result_parses_partial_success() {
        let raw = json!({
            "successfulUploads": [{ "id": "1" }],
            "failedUploads": [{ "fileName": "b.jpg", "error": "too large" }]
        });
        let result: BulkUploadResult<serde_json::Value> = serde_json::from_value(raw).unwrap();
        assert_eq!(result.successful_uploads.len(), 1);
        assert_eq!(
            result.failed_uploads,
            vec![FailedUpload {
                file_name: "b.jpg".to_string(),
                error: "too large".to_string()
            }]
        );
    }
}
