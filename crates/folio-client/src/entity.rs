//! Generic CRUD client for one backend resource
//!
//! `EntityClient<T>` targets `base_url/<entity>` and decodes every response as an
//! [`ApiEnvelope`]. Resource-specific behaviour is layered on top with plain
//! functions that call this client.
//!
//! | Operation | Request | Retried |
//! |---|---|---|
//! | `list`, `get_by_id`, `search`, `download_file` | GET | yes |
//! | `remove`, `bulk_delete` | DELETE | yes |
//! | `create`, `upload_file`, `bulk_upload` | POST | no |
//! | `update`, `bulk_update` | PUT | no |
//! | `patch` | PATCH | no |

use folio_api::{ApiEnvelope, ApiError, BulkUploadResult, ErrorKind, Filters, PageMeta, PaginationParams};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::auth::{NoToken, TokenProvider};
use crate::config::ClientConfig;
use crate::executor::RequestExecutor;
use crate::normalize::{BAD_DATA_MESSAGE, bad_data};
use crate::sink::{Blob, DiscardSink, FileSink};
use crate::transport::{FilePayload, HttpMethod, HttpRequest, MultipartForm, RawResponse, Transport};

/// Multipart field carrying the file of a single upload
pub const UPLOAD_FIELD: &str = "file";
/// Multipart field repeated once per file in a bulk upload
pub const BULK_UPLOAD_FIELD: &str = "files";

/// Join `base` with path segments, dropping empty segments and duplicate separators
pub fn join_url(base: &str, segments: &[&str]) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    for part in segments
        .iter()
        .flat_map(|segment| segment.split('/'))
        .filter(|part| !part.is_empty())
    {
        url.push('/');
        url.push_str(part);
    }
    url
}

/// Flatten a JSON object into string form fields.
///
/// Strings are sent as-is, other scalars and nested values as JSON text, nulls are skipped.
pub fn metadata_fields(metadata: &serde_json::Value) -> Vec<(String, String)> {
    let Some(object) = metadata.as_object() else {
        return Vec::new();
    };
    object
        .iter()
        .filter_map(|(key, value)| match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some((key.clone(), s.clone())),
            other => Some((key.clone(), other.to_string())),
        })
        .collect()
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEnvelope<R> {
    data: Option<R>,
    #[serde(default)]
    success: bool,
    message: Option<String>,
    errors: Option<Vec<String>>,
    meta: Option<PageMeta>,
    next_page_token: Option<String>,
}

/// Decode a 2xx body into an envelope.
///
/// `missing_data` substitutes for an absent/null `data` (acknowledgement responses);
/// otherwise a missing payload, an undecodable body or `success: false` is `BadData`.
fn decode_envelope<R: DeserializeOwned>(
    response: &RawResponse,
    missing_data: Option<R>,
) -> Result<ApiEnvelope<R>, ApiError> {
    let wire: WireEnvelope<R> = serde_json::from_slice(&response.body)
        .map_err(|e| bad_data(response.status, e.to_string()))?;

    if !wire.success {
        let message = wire
            .message
            .filter(|m| !m.is_empty())
            .or_else(|| wire.errors.as_ref().and_then(|errors| errors.first().cloned()))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| BAD_DATA_MESSAGE.to_string());
        return Err(ApiError::new(ErrorKind::BadData, response.status, message)
            .with_cause("response reported success: false"));
    }

    let data = wire
        .data
        .or(missing_data)
        .ok_or_else(|| bad_data(response.status, "response has no data"))?;

    Ok(ApiEnvelope {
        data,
        success: true,
        message: wire.message,
        errors: wire.errors,
        meta: wire.meta,
        next_page_token: wire.next_page_token,
    })
}

pub struct EntityClient<T> {
    entity: String,
    base_url: String,
    timeout: Duration,
    executor: RequestExecutor,
    tokens: Arc<dyn TokenProvider>,
    sink: Arc<dyn FileSink>,
    _item: PhantomData<fn() -> T>,
}

impl<T> Clone for EntityClient<T> {
    fn clone(&self) -> Self {
        Self {
            entity: self.entity.clone(),
            base_url: self.base_url.clone(),
            timeout: self.timeout,
            executor: self.executor.clone(),
            tokens: Arc::clone(&self.tokens),
            sink: Arc::clone(&self.sink),
            _item: PhantomData,
        }
    }
}

impl<T> EntityClient<T> {
    pub fn new(entity: impl Into<String>, config: &ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            entity: entity.into(),
            base_url: config.base_url.clone(),
            timeout: config.timeout(),
            executor: RequestExecutor::new(transport, config.retry_policy()),
            tokens: Arc::new(NoToken),
            sink: Arc::new(DiscardSink),
            _item: PhantomData,
        }
    }

    pub fn with_token_provider(mut self, tokens: Arc<dyn TokenProvider>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn with_file_sink(mut self, sink: Arc<dyn FileSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Resource URL with `path` appended as percent-encoded segments.
    ///
    /// Ids and file names are single segments: `/`, `?` and `#` inside them are encoded.
    pub fn url(&self, path: &[&str]) -> String {
        let resource = join_url(&self.base_url, &[self.entity.as_str()]);
        let Ok(mut url) = reqwest::Url::parse(&resource) else {
            // Not an absolute URL; the transport rejects it when sending
            return join_url(&resource, path);
        };
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(path);
        }
        url.to_string()
    }

    fn request(&self, method: HttpMethod, path: &[&str]) -> HttpRequest {
        let request = HttpRequest::new(method, self.url(path), self.timeout);
        match self.tokens.bearer_token() {
            Some(token) => request.with_header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    fn json_request(
        &self,
        method: HttpMethod,
        path: &[&str],
        body: &impl Serialize,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_value(body).map_err(|e| {
            ApiError::new(ErrorKind::ClientError, 0, "request body could not be encoded")
                .with_cause(e.to_string())
        })?;
        Ok(self.request(method, path).with_json(body))
    }

    /// Send and decode, logging the terminal failure once
    async fn call<R: DeserializeOwned>(
        &self,
        operation: &str,
        request: HttpRequest,
        missing_data: Option<R>,
    ) -> Result<ApiEnvelope<R>, ApiError> {
        let result = match self.executor.send(request).await {
            Ok(response) => decode_envelope(&response, missing_data),
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            error!(
                "[EntityClient] {} on '{}' failed: {}",
                operation, self.entity, e
            );
        }
        result
    }
}

impl<T> EntityClient<T>
where
    T: Serialize + DeserializeOwned,
{
    #[tracing::instrument(name = "entity.list", skip(self, pagination), fields(entity = %self.entity))]
    pub async fn list(
        &self,
        pagination: Option<&PaginationParams>,
    ) -> Result<ApiEnvelope<Vec<T>>, ApiError> {
        let mut request = self.request(HttpMethod::Get, &[]);
        if let Some(params) = pagination {
            request = request.with_query(params.to_query_pairs());
        }
        let envelope: ApiEnvelope<Vec<T>> = self.call("list", request, None).await?;
        debug!(
            "[EntityClient] Listed {} '{}' items",
            envelope.data.len(),
            self.entity
        );
        Ok(envelope)
    }

    #[tracing::instrument(name = "entity.get", skip(self), fields(entity = %self.entity))]
    pub async fn get_by_id(&self, id: &str) -> Result<ApiEnvelope<T>, ApiError> {
        let request = self.request(HttpMethod::Get, &[id]);
        self.call("get", request, None).await
    }

    #[tracing::instrument(name = "entity.create", skip(self, data), fields(entity = %self.entity))]
    pub async fn create<D: Serialize>(&self, data: &D) -> Result<ApiEnvelope<T>, ApiError> {
        let request = self.json_request(HttpMethod::Post, &[], data)?;
        self.call("create", request, None).await
    }

    #[tracing::instrument(name = "entity.update", skip(self, data), fields(entity = %self.entity))]
    pub async fn update<D: Serialize>(&self, id: &str, data: &D) -> Result<ApiEnvelope<T>, ApiError> {
        let request = self.json_request(HttpMethod::Put, &[id], data)?;
        self.call("update", request, None).await
    }

    #[tracing::instrument(name = "entity.patch", skip(self, data), fields(entity = %self.entity))]
    pub async fn patch<D: Serialize>(&self, id: &str, data: &D) -> Result<ApiEnvelope<T>, ApiError> {
        let request = self.json_request(HttpMethod::Patch, &[id], data)?;
        self.call("patch", request, None).await
    }

    #[tracing::instrument(name = "entity.remove", skip(self), fields(entity = %self.entity))]
    pub async fn remove(&self, id: &str) -> Result<ApiEnvelope<serde_json::Value>, ApiError> {
        let request = self.request(HttpMethod::Delete, &[id]);
        self.call("remove", request, Some(serde_json::Value::Null))
            .await
    }

    /// GET `<entity>/search` with the filters as query params.
    ///
    /// Explicit `filters` take precedence over same-named filters carried by `pagination`.
    #[tracing::instrument(name = "entity.search", skip(self, filters, pagination), fields(entity = %self.entity))]
    pub async fn search(
        &self,
        filters: &Filters,
        pagination: Option<&PaginationParams>,
    ) -> Result<ApiEnvelope<Vec<T>>, ApiError> {
        let mut query: Vec<(String, String)> = pagination
            .map(PaginationParams::to_query_pairs)
            .unwrap_or_default();
        query.retain(|(key, _)| !filters.contains_key(key));
        query.extend(filters.iter().map(|(k, v)| (k.clone(), v.clone())));

        let request = self.request(HttpMethod::Get, &["search"]).with_query(query);
        self.call("search", request, None).await
    }

    #[tracing::instrument(name = "entity.upload", skip(self, file, metadata), fields(entity = %self.entity, file = %file.file_name))]
    pub async fn upload_file(
        &self,
        file: FilePayload,
        metadata: Option<&serde_json::Value>,
    ) -> Result<ApiEnvelope<T>, ApiError> {
        let form = MultipartForm {
            files: vec![(UPLOAD_FIELD.to_string(), file)],
            fields: metadata.map(metadata_fields).unwrap_or_default(),
        };
        let request = self.request(HttpMethod::Post, &["upload"]).with_multipart(form);
        self.call("upload", request, None).await
    }

    /// Download a file and hand it to the configured [`FileSink`].
    ///
    /// A failing sink is logged but does not fail the download; the blob is returned either way.
    #[tracing::instrument(name = "entity.download", skip(self), fields(entity = %self.entity))]
    pub async fn download_file(&self, file_name: &str) -> Result<Blob, ApiError> {
        let request = self.request(HttpMethod::Get, &["download", file_name]);
        let response = self.executor.send(request).await.map_err(|e| {
            error!(
                "[EntityClient] download of '{}' from '{}' failed: {}",
                file_name, self.entity, e
            );
            e
        })?;

        let blob = Blob {
            file_name: file_name.to_string(),
            content_type: response.header("content-type").map(str::to_string),
            bytes: response.body,
        };
        if let Err(e) = self.sink.save(&blob).await {
            warn!("[EntityClient] Could not save '{}': {}", file_name, e);
        }
        Ok(blob)
    }

    #[tracing::instrument(name = "entity.bulk_update", skip(self, items), fields(entity = %self.entity, count = items.len()))]
    pub async fn bulk_update(&self, items: &[T]) -> Result<ApiEnvelope<Vec<T>>, ApiError> {
        let request = self.json_request(HttpMethod::Put, &["bulk"], &items)?;
        self.call("bulk_update", request, None).await
    }

    #[tracing::instrument(name = "entity.bulk_delete", skip(self, ids), fields(entity = %self.entity, count = ids.len()))]
    pub async fn bulk_delete(&self, ids: &[String]) -> Result<ApiEnvelope<serde_json::Value>, ApiError> {
        let request = self.json_request(
            HttpMethod::Delete,
            &["bulk"],
            &serde_json::json!({ "ids": ids }),
        )?;
        self.call("bulk_delete", request, Some(serde_json::Value::Null))
            .await
    }

    /// Upload several files in one request.
    ///
    /// Partial success is reported in the body; failed files are not retried individually.
    #[tracing::instrument(name = "entity.bulk_upload", skip(self, files, metadata), fields(entity = %self.entity, count = files.len()))]
    pub async fn bulk_upload(
        &self,
        files: Vec<FilePayload>,
        metadata: Option<&serde_json::Value>,
    ) -> Result<ApiEnvelope<BulkUploadResult<T>>, ApiError> {
        let form = MultipartForm {
            files: files
                .into_iter()
                .map(|file| (BULK_UPLOAD_FIELD.to_string(), file))
                .collect(),
            fields: metadata.map(metadata_fields).unwrap_or_default(),
        };
        let request = self
            .request(HttpMethod::Post, &["bulk-upload"])
            .with_multipart(form);
        let envelope: ApiEnvelope<BulkUploadResult<T>> =
            self.call("bulk_upload", request, None).await?;

        if !envelope.data.failed_uploads.is_empty() {
            warn!(
                "[EntityClient] Bulk upload to '{}': {} succeeded, {} failed",
                self.entity,
                envelope.data.successful_uploads.len(),
                envelope.data.failed_uploads.len()
            );
        }
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticToken;
    use crate::testing::ScriptedTransport;
    use crate::transport::RequestBody;
    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Record {
        id: String,
        title: String,
        #[serde(default)]
        is_favorite: bool,
    }

    fn config() -> ClientConfig {
        ClientConfig {
            base_url: "http://api.test/v1/".to_string(),
            timeout_ms: 1_000,
            max_retries: 2,
            base_delay_ms: 0,
        }
    }

    fn client(transport: &Arc<ScriptedTransport>) -> EntityClient<Record> {
        EntityClient::new("records", &config(), transport.clone())
    }

    #[derive(Default)]
    struct RecordingSink {
        saved: Mutex<Vec<Blob>>,
    }

    #[async_trait]
    impl FileSink for RecordingSink {
        async fn save(&self, blob: &Blob) -> std::io::Result<()> {
            self.saved.lock().unwrap().push(blob.clone());
            Ok(())
        }
    }

    #[test]
    fn test_join_url_trims_separators() {
        assert_eq!(
            join_url("http://api.test/v1/", &["/records/", "42"]),
            "http://api.test/v1/records/42"
        );
        assert_eq!(
            join_url("http://api.test", &["records", "", "download//a.jpg"]),
            "http://api.test/records/download/a.jpg"
        );
    }

    #[test]
    fn test_url_encodes_caller_segments() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = client(&transport);

        assert_eq!(client.url(&[]), "http://api.test/v1/records");
        assert_eq!(client.url(&["a/b"]), "http://api.test/v1/records/a%2Fb");
        assert_eq!(
            client.url(&["download", "x?.png"]),
            "http://api.test/v1/records/download/x%3F.png"
        );
        assert_eq!(
            client.url(&["download", "my photo#1.jpg"]),
            "http://api.test/v1/records/download/my%20photo%231.jpg"
        );
    }

    #[tokio::test]
    async fn test_get_by_id_keeps_slash_inside_id() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, json!({ "data": { "id": "a/b", "title": "t" }, "success": true }));

        client(&transport).get_by_id("a/b").await.unwrap();

        let request = transport.last_request().unwrap();
        assert_eq!(request.url, "http://api.test/v1/records/a%2Fb");
        assert!(request.query.is_empty());
    }

    #[test]
    fn test_metadata_fields_flatten() {
        let fields = metadata_fields(&json!({
            "album": "summer",
            "year": 2024,
            "shared": true,
            "note": null
        }));
        assert_eq!(
            fields,
            vec![
                ("album".to_string(), "summer".to_string()),
                ("shared".to_string(), "true".to_string()),
                ("year".to_string(), "2024".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_list_sends_pagination_query() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(
            200,
            json!({
                "data": [{ "id": "1", "title": "first" }],
                "success": true,
                "meta": { "page": 1, "limit": 10, "total": 1 }
            }),
        );

        let params =
            PaginationParams::page(1, 10).with_ordering(Some("datePublished".to_string()));
        let envelope = client(&transport).list(Some(&params)).await.unwrap();

        assert_eq!(envelope.data.len(), 1);
        assert_eq!(envelope.meta.unwrap().total, Some(1));
        let request = transport.last_request().unwrap();
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url, "http://api.test/v1/records");
        assert_eq!(
            request.query,
            vec![
                ("page".to_string(), "1".to_string()),
                ("size".to_string(), "10".to_string()),
                ("sortBy".to_string(), "datePublished".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_bearer_token_attached_when_present() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, json!({ "data": { "id": "1", "title": "t" }, "success": true }));
        transport.push_json(200, json!({ "data": { "id": "1", "title": "t" }, "success": true }));

        client(&transport)
            .with_token_provider(Arc::new(StaticToken::new("secret")))
            .get_by_id("1")
            .await
            .unwrap();
        client(&transport).get_by_id("1").await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].header("Authorization"), Some("Bearer secret"));
        assert_eq!(requests[1].header("Authorization"), None);
        assert_eq!(requests[0].url, "http://api.test/v1/records/1");
    }

    #[tokio::test]
    async fn test_wrong_shape_is_bad_data_and_not_retried() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, json!({ "data": { "unexpected": 1 }, "success": true }));
        transport.push_json(200, json!({ "data": { "id": "1", "title": "t" }, "success": true }));

        let error = client(&transport).get_by_id("1").await.unwrap_err();

        assert_eq!(error.kind(), ErrorKind::BadData);
        assert_eq!(error.status(), 200);
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_success_false_is_bad_data_with_message() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, json!({ "data": null, "success": false, "message": "quota exceeded" }));

        let error = client(&transport).get_by_id("1").await.unwrap_err();

        assert_eq!(error.kind(), ErrorKind::BadData);
        assert_eq!(error.message(), "quota exceeded");
    }

    #[tokio::test]
    async fn test_create_sends_json_once() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_status(503, json!({ "message": "try later" }));

        let error = client(&transport)
            .create(&json!({ "title": "new" }))
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::ServerError);
        assert_eq!(error.message(), "try later");
        assert_eq!(transport.call_count(), 1);
        let request = transport.last_request().unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(request.body, RequestBody::Json(json!({ "title": "new" })));
    }

    #[tokio::test]
    async fn test_patch_and_update_routes() {
        let transport = Arc::new(ScriptedTransport::new());
        let record = json!({ "id": "7", "title": "t", "isFavorite": true });
        transport.push_json(200, json!({ "data": record, "success": true }));
        transport.push_json(200, json!({ "data": record, "success": true }));

        let patched = client(&transport)
            .patch("7", &json!({ "isFavorite": true }))
            .await
            .unwrap();
        assert!(patched.data.is_favorite);
        client(&transport)
            .update("7", &json!({ "title": "t" }))
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].method, HttpMethod::Patch);
        assert_eq!(requests[1].method, HttpMethod::Put);
        assert_eq!(requests[1].url, "http://api.test/v1/records/7");
    }

    #[tokio::test]
    async fn test_remove_is_retried_and_accepts_null_data() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_no_response("reset");
        transport.push_json(200, json!({ "data": null, "success": true }));

        let envelope = client(&transport).remove("9").await.unwrap();

        assert_eq!(envelope.data, serde_json::Value::Null);
        assert_eq!(transport.call_count(), 2);
        assert_eq!(transport.last_request().unwrap().method, HttpMethod::Delete);
    }

    #[tokio::test]
    async fn test_search_merges_filters() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, json!({ "data": [], "success": true }));

        let mut page_filters = Filters::new();
        page_filters.insert("isFavorite".to_string(), "false".to_string());
        let params = PaginationParams::page(1, 5).with_filters(page_filters);
        let mut filters = Filters::new();
        filters.insert("isFavorite".to_string(), "true".to_string());
        filters.insert("q".to_string(), "beach".to_string());

        client(&transport).search(&filters, Some(&params)).await.unwrap();

        let request = transport.last_request().unwrap();
        assert_eq!(request.url, "http://api.test/v1/records/search");
        assert_eq!(
            request.query,
            vec![
                ("page".to_string(), "1".to_string()),
                ("size".to_string(), "5".to_string()),
                ("isFavorite".to_string(), "true".to_string()),
                ("q".to_string(), "beach".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_upload_builds_multipart() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, json!({ "data": { "id": "u1", "title": "beach.jpg" }, "success": true }));

        let file = FilePayload::new("beach.jpg", vec![1, 2, 3]).with_content_type("image/jpeg");
        client(&transport)
            .upload_file(file.clone(), Some(&json!({ "album": "summer" })))
            .await
            .unwrap();

        let request = transport.last_request().unwrap();
        assert_eq!(request.url, "http://api.test/v1/records/upload");
        assert_eq!(
            request.body,
            RequestBody::Multipart(MultipartForm {
                files: vec![(UPLOAD_FIELD.to_string(), file)],
                fields: vec![("album".to_string(), "summer".to_string())],
            })
        );
    }

    #[tokio::test]
    async fn test_download_saves_blob() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_bytes(
            200,
            vec![("Content-Type".to_string(), "image/png".to_string())],
            vec![9, 9, 9],
        );
        let sink = Arc::new(RecordingSink::default());

        let blob = client(&transport)
            .with_file_sink(sink.clone())
            .download_file("cover.png")
            .await
            .unwrap();

        assert_eq!(blob.bytes, vec![9, 9, 9]);
        assert_eq!(blob.content_type.as_deref(), Some("image/png"));
        assert_eq!(*sink.saved.lock().unwrap(), vec![blob]);
        assert_eq!(
            transport.last_request().unwrap().url,
            "http://api.test/v1/records/download/cover.png"
        );
    }

    #[tokio::test]
    async fn test_download_not_found() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_status(404, json!({}));

        let error = client(&transport).download_file("gone.png").await.unwrap_err();

        assert_eq!(error.kind(), ErrorKind::ClientError);
        assert_eq!(error.message(), "not found");
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_bulk_upload_reports_partial_success() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(
            200,
            json!({
                "data": {
                    "successfulUploads": [{ "id": "a", "title": "a.jpg" }],
                    "failedUploads": [{ "fileName": "b.jpg", "error": "too large" }]
                },
                "success": true
            }),
        );

        let files = vec![
            FilePayload::new("a.jpg", vec![1]),
            FilePayload::new("b.jpg", vec![2]),
        ];
        let envelope = client(&transport).bulk_upload(files, None).await.unwrap();

        assert_eq!(envelope.data.successful_uploads.len(), 1);
        assert_eq!(envelope.data.failed_uploads[0].file_name, "b.jpg");
        assert_eq!(transport.call_count(), 1);
        match transport.last_request().unwrap().body {
            RequestBody::Multipart(form) => {
                assert_eq!(form.files.len(), 2);
                assert!(form.files.iter().all(|(field, _)| field == BULK_UPLOAD_FIELD));
            }
            other => panic!("expected multipart body, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bulk_delete_and_update_bodies() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push_json(200, json!({ "data": { "deleted": 2 }, "success": true }));
        transport.push_json(200, json!({ "data": [], "success": true }));

        let c = client(&transport);
        c.bulk_delete(&["1".to_string(), "2".to_string()]).await.unwrap();
        c.bulk_update(&[Record {
            id: "3".to_string(),
            title: "t".to_string(),
            is_favorite: false,
        }])
        .await
        .unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].method, HttpMethod::Delete);
        assert_eq!(requests[0].body, RequestBody::Json(json!({ "ids": ["1", "2"] })));
        assert_eq!(requests[1].method, HttpMethod::Put);
        assert_eq!(requests[1].url, "http://api.test/v1/records/bulk");
        assert_eq!(
            requests[1].body,
            RequestBody::Json(json!([{ "id": "3", "title": "t", "isFavorite": false }]))
        );
    }

}
