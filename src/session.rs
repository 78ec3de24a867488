//! Stateful adapter that tracks the last generation outcome for a UI.

use crate::client::ReveClient;
use crate::codec::{base64_to_data_url, file_to_base64};
use crate::error::ReveError;
use crate::types::{
    CreateImageRequest, EditImageRequest, EditOptions, ImageResponse, RemixImageRequest,
    RequestOptions, ResponseFormat,
};
use futures_util::future::try_join_all;
use std::future::Future;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error};

/// Loading, error and result bookkeeping for one UI surface.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub is_loading: bool,
    /// The last failure. The concrete kind is kept, so UI code can reach the
    /// vendor predicates through [`ReveError::as_api_error`].
    pub error: Option<Arc<ReveError>>,
    pub result: Option<ImageResponse>,
}

impl SessionState {
    /// A `data:` URL for the current result, or `None` when there is no image to show.
    pub fn image_url(&self) -> Option<String> {
        self.result
            .as_ref()
            .filter(|result| !result.image.is_empty())
            .map(|result| base64_to_data_url(&result.image, &result.mime_type()))
    }
}

/// Imperative front end over [`ReveClient`] that remembers the latest outcome.
///
/// Every operation returns `None` instead of an error; the error is stored in the
/// state. Overlapping calls are not serialized: whichever finishes last overwrites
/// the state.
#[derive(Debug, Default)]
pub struct ImageSession {
    client: Option<ReveClient>,
    state: Mutex<SessionState>,
}

impl ImageSession {
    /// Creates a session around `client`. With `None`, every call fails with
    /// [`ReveError::MissingApiKey`] and never touches the network.
    pub fn new(client: Option<ReveClient>) -> Self {
        Self {
            client,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn with_client(client: ReveClient) -> Self {
        Self::new(Some(client))
    }

    /// Builds the client from `REVE_API_KEY`. A missing key is not an error here; it
    /// surfaces per call as a configuration error.
    pub fn from_env() -> Result<Self, ReveError> {
        match ReveClient::new(None) {
            Ok(client) => Ok(Self::with_client(client)),
            Err(ReveError::MissingApiKey) => Ok(Self::new(None)),
            Err(err) => Err(err),
        }
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.lock().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().is_loading
    }

    pub fn image_url(&self) -> Option<String> {
        self.lock().image_url()
    }

    /// Clears loading, error and result.
    pub fn reset(&self) {
        *self.lock() = SessionState::default();
    }

    pub async fn create_image(
        &self,
        request: &CreateImageRequest,
        response_format: Option<ResponseFormat>,
    ) -> Option<ImageResponse> {
        self.run(|client| async move { client.create(request, response_format).await })
            .await
    }

    pub async fn edit_image(
        &self,
        request: &EditImageRequest,
        response_format: Option<ResponseFormat>,
    ) -> Option<ImageResponse> {
        self.run(|client| async move { client.edit(request, response_format).await })
            .await
    }

    pub async fn remix_image(
        &self,
        request: &RemixImageRequest,
        response_format: Option<ResponseFormat>,
    ) -> Option<ImageResponse> {
        self.run(|client| async move { client.remix(request, response_format).await })
            .await
    }

    /// Reads `file`, base64-encodes it and sends it as the edit's reference image.
    ///
    /// The read happens inside the request lifecycle: `is_loading` is already raised
    /// while the file is read, and a read failure is recorded like any request failure.
    pub async fn edit_image_with_file<P: AsRef<Path>>(
        &self,
        edit_instruction: &str,
        file: P,
        options: EditOptions,
        response_format: Option<ResponseFormat>,
    ) -> Option<ImageResponse> {
        self.run(|client| async move {
            let reference_image = file_to_base64(file).await?;
            let request =
                EditImageRequest::new(edit_instruction, reference_image).with_options(options);
            client.edit(&request, response_format).await
        })
        .await
    }

    /// Reads every file concurrently and remixes them under `prompt`.
    pub async fn remix_image_with_files<P: AsRef<Path>>(
        &self,
        prompt: &str,
        files: &[P],
        options: RequestOptions,
        response_format: Option<ResponseFormat>,
    ) -> Option<ImageResponse> {
        self.run(|client| async move {
            let images = try_join_all(files.iter().map(file_to_base64)).await?;
            let request = RemixImageRequest::new(prompt, images).with_options(options);
            client.remix(&request, response_format).await
        })
        .await
    }

    async fn run<'a, F, Fut>(&'a self, call: F) -> Option<ImageResponse>
    where
        F: FnOnce(&'a ReveClient) -> Fut,
        Fut: Future<Output = Result<ImageResponse, ReveError>>,
    {
        {
            let mut state = self.lock();
            state.is_loading = true;
            state.error = None;
        }

        let Some(client) = self.client.as_ref() else {
            return self.fail(ReveError::MissingApiKey);
        };

        match call(client).await {
            Ok(result) => {
                debug!(
                    request_id = ?result.metadata.request_id,
                    credits_remaining = ?result.metadata.credits_remaining,
                    "image ready"
                );
                *self.lock() = SessionState {
                    is_loading: false,
                    error: None,
                    result: Some(result.clone()),
                };
                Some(result)
            }
            Err(err) => self.fail(err),
        }
    }

    /// Records `err` and ends loading. The previous result stays visible.
    fn fail(&self, err: ReveError) -> Option<ImageResponse> {
        error!(error = %err, "image request failed");
        let mut state = self.lock();
        state.is_loading = false;
        state.error = Some(Arc::new(err));
        None
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
