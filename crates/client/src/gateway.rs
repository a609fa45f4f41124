//! Section-scoped persistence.
//!
//! The gateway loads a record into an [`Editor`], submits one section at a
//! time, and reloads the authoritative record after every successful save.
//! It never retries; failures are recorded on the editor and returned.
//!
//! A save is split into [`Gateway::submit_section`], which only borrows the
//! payload, and [`Gateway::apply_outcome`], which mutates the editor. Callers
//! that want saves of several sections in flight at once call
//! `Editor::begin_save` for each, drive the submits concurrently, then apply
//! each outcome. [`Gateway::save`] composes the three for the common case.

use async_trait::async_trait;
use serde_json::Value;

use podium_core::checklist::{StageChecklist, CHECKLIST_ROOT};
use podium_core::editor::{Editor, SectionPayload};
use podium_core::field::{EditorLayout, FieldKind};
use podium_core::record::Record;
use podium_core::types::EntityId;

use crate::api::{ApiClient, UploadResponse};
use crate::error::{ApiError, FetchError, SaveError, UploadError};

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// How a section payload is encoded in the save request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PayloadShape {
    /// A partial record: `{"travel": {"hotel": {"name": ...}}}`.
    #[default]
    Nested,
    /// A flat list: `[{"path": "travel.hotel.name", "value": ...}]`.
    Entries,
}

/// Where a record is fetched from and saved to, relative to the API root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub fetch: String,
    pub save: String,
    pub shape: PayloadShape,
}

impl Endpoint {
    pub fn new(fetch: impl Into<String>, save: impl Into<String>) -> Self {
        Self {
            fetch: fetch.into(),
            save: save.into(),
            shape: PayloadShape::default(),
        }
    }

    /// `<collection>/<id>` for both fetch and save.
    pub fn entity(collection: &str, id: EntityId) -> Self {
        let path = format!("{collection}/{id}");
        Self::new(path.clone(), path)
    }

    pub fn with_shape(mut self, shape: PayloadShape) -> Self {
        self.shape = shape;
        self
    }

    fn encode(&self, payload: &SectionPayload) -> Value {
        match self.shape {
            PayloadShape::Nested => payload.to_nested(),
            PayloadShape::Entries => payload.to_entries(),
        }
    }
}

// ---------------------------------------------------------------------------
// Record source
// ---------------------------------------------------------------------------

/// Transport used by the gateway. Implemented by [`ApiClient`].
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<Value, ApiError>;

    /// Replace-style save (`PUT`).
    async fn submit(&self, path: &str, body: &Value) -> Result<Value, ApiError>;

    /// Merge-style save (`PATCH`).
    async fn patch(&self, path: &str, body: &Value) -> Result<Value, ApiError>;

    async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        folder: Option<&str>,
    ) -> Result<UploadResponse, ApiError>;
}

#[async_trait]
impl RecordSource for ApiClient {
    async fn fetch(&self, path: &str) -> Result<Value, ApiError> {
        self.fetch_json(path).await
    }

    async fn submit(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.put_json(path, body).await
    }

    async fn patch(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.patch_json(path, body).await
    }

    async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        folder: Option<&str>,
    ) -> Result<UploadResponse, ApiError> {
        ApiClient::upload(self, file_name, bytes, folder).await
    }
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Gateway<S> {
    source: S,
}

impl<S: RecordSource> Gateway<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch a record. Anything but a JSON object is rejected so a page
    /// never renders a partial record.
    pub async fn fetch_record(&self, endpoint: &Endpoint) -> Result<Record, FetchError> {
        let body = self.source.fetch(&endpoint.fetch).await.map_err(|e| {
            tracing::warn!(path = %endpoint.fetch, error = %e, "Record fetch failed");
            FetchError::from(e)
        })?;

        if !body.is_object() {
            tracing::warn!(path = %endpoint.fetch, "Record body is not an object");
            return Err(FetchError {
                message: "The server sent an unexpected response".to_string(),
                status: None,
            });
        }
        Ok(Record::from_json(body))
    }

    /// Fetch a record and open an editor on it.
    pub async fn load(&self, endpoint: &Endpoint, layout: EditorLayout) -> Result<Editor, FetchError> {
        let record = self.fetch_record(endpoint).await?;
        tracing::debug!(path = %endpoint.fetch, "Record loaded");
        Ok(Editor::new(layout, record))
    }

    /// Refetch and replace the editor's state wholesale.
    pub async fn refresh(&self, endpoint: &Endpoint, editor: &mut Editor) -> Result<(), FetchError> {
        let record = self.fetch_record(endpoint).await?;
        editor.reload(record);
        Ok(())
    }

    /// Send one section's payload. Does not touch the editor.
    pub async fn submit_section(
        &self,
        endpoint: &Endpoint,
        payload: &SectionPayload,
    ) -> Result<(), ApiError> {
        let body = endpoint.encode(payload);
        tracing::debug!(
            section_id = %payload.section_id,
            fields = payload.entries.len(),
            path = %endpoint.save,
            "Submitting section",
        );
        self.source.submit(&endpoint.save, &body).await?;
        Ok(())
    }

    /// Finish a save started with `Editor::begin_save`.
    ///
    /// On success the whole record is refetched and replaces local state. A
    /// refetch failure after a successful submit is reported as a save
    /// error with local edits kept, since the page can no longer tell what
    /// the server holds.
    pub async fn apply_outcome(
        &self,
        endpoint: &Endpoint,
        editor: &mut Editor,
        section_id: &str,
        outcome: Result<(), ApiError>,
    ) -> Result<(), SaveError> {
        if let Err(e) = outcome {
            tracing::warn!(section_id, error = %e, "Section save failed");
            return Err(self.fail(editor, section_id, e.user_message()));
        }

        match self.fetch_record(endpoint).await {
            Ok(fresh) => {
                editor.complete_save(section_id, fresh);
                tracing::info!(section_id, path = %endpoint.save, "Section saved");
                Ok(())
            }
            Err(e) => Err(self.fail(
                editor,
                section_id,
                format!("Saved, but reloading failed: {}", e.message),
            )),
        }
    }

    /// Save one section: snapshot, submit, refetch.
    pub async fn save(
        &self,
        endpoint: &Endpoint,
        editor: &mut Editor,
        section_id: &str,
    ) -> Result<(), SaveError> {
        let payload = editor.begin_save(section_id).map_err(|e| SaveError {
            section_id: section_id.to_string(),
            message: e.to_string(),
        })?;
        let outcome = self.submit_section(endpoint, &payload).await;
        self.apply_outcome(endpoint, editor, section_id, outcome).await
    }

    fn fail(&self, editor: &mut Editor, section_id: &str, message: String) -> SaveError {
        editor.fail_save(section_id, message.clone());
        SaveError {
            section_id: section_id.to_string(),
            message,
        }
    }

    /// Upload an image and commit its storage path into an `ImagePath`
    /// field. Failures are recorded on that field only.
    pub async fn upload_image(
        &self,
        editor: &mut Editor,
        path: &str,
        file_name: &str,
        bytes: Vec<u8>,
        folder: Option<&str>,
    ) -> Result<String, UploadError> {
        let upload_error = |message: String| UploadError {
            path: path.to_string(),
            message,
        };

        let is_image = editor
            .layout()
            .field(path)
            .is_some_and(|field| field.descriptor.kind == FieldKind::ImagePath);
        if !is_image {
            return Err(upload_error(format!("'{path}' is not an image field")));
        }

        let uploaded = match self.source.upload(file_name, bytes, folder).await {
            Ok(UploadResponse {
                path: Some(stored), ..
            }) => stored,
            Ok(_) => {
                let message = "Upload was not accepted".to_string();
                editor.set_field_error(path, message.clone());
                return Err(upload_error(message));
            }
            Err(e) => {
                tracing::warn!(field = path, file_name, error = %e, "Image upload failed");
                let message = e.user_message();
                editor.set_field_error(path, message.clone());
                return Err(upload_error(message));
            }
        };

        editor
            .set_image(path, &uploaded)
            .map_err(|e| upload_error(e.to_string()))?;
        tracing::info!(field = path, stored = %uploaded, "Image uploaded");
        Ok(uploaded)
    }

    /// Persist a project's checklist with a single `PATCH`.
    pub async fn save_checklist(
        &self,
        endpoint: &Endpoint,
        checklist: &StageChecklist,
    ) -> Result<(), SaveError> {
        self.source
            .patch(&endpoint.save, &checklist.to_patch())
            .await
            .map_err(|e| {
                tracing::warn!(path = %endpoint.save, error = %e, "Checklist save failed");
                SaveError {
                    section_id: CHECKLIST_ROOT.to_string(),
                    message: e.user_message(),
                }
            })?;
        tracing::info!(path = %endpoint.save, "Checklist saved");
        Ok(())
    }
}
