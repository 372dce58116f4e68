//! HTTP multipart upload adapter

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{StatusCode, Url};
use tracing::debug;

use crate::application::ports::{UploadRequest, Uploader};
use crate::domain::duration::Duration;
use crate::domain::sync::UploadOutcome;

/// Multipart field carrying the payload
const AUDIO_FIELD: &str = "audio";

/// Multipart text field carrying the artifact id
const FILENAME_FIELD: &str = "filename";

/// Uploads one artifact per `POST` as `multipart/form-data`
pub struct HttpUploader {
    base_url: String,
    endpoint: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpUploader {
    /// Create an uploader for `base_url` + `endpoint` with a hard per-request timeout
    pub fn new(base_url: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            endpoint: endpoint.into(),
            timeout,
            client: reqwest::Client::new(),
        }
    }

    /// Join base URL and endpoint path
    fn upload_url(&self) -> Result<Url, String> {
        let base = self.base_url.trim_end_matches('/');
        let endpoint = self.endpoint.trim_start_matches('/');
        let joined = format!("{}/{}", base, endpoint);
        Url::parse(&joined).map_err(|e| format!("invalid endpoint URL \"{}\": {}", joined, e))
    }

    fn build_form(request: UploadRequest) -> Result<Form, reqwest::Error> {
        let file_name = request.artifact_id.as_str().to_string();
        let part = Part::bytes(request.payload)
            .file_name(file_name.clone())
            .mime_str(request.format.mime_type())?;

        Ok(Form::new()
            .part(AUDIO_FIELD, part)
            .text(FILENAME_FIELD, file_name))
    }

    fn is_accepted(status: StatusCode) -> bool {
        status == StatusCode::OK || status == StatusCode::CREATED
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    async fn upload(&self, request: UploadRequest) -> UploadOutcome {
        let url = match self.upload_url() {
            Ok(url) => url,
            Err(reason) => return UploadOutcome::TransportFailure(reason),
        };

        let artifact_id = request.artifact_id.clone();
        let credential = request.credential.clone();

        let form = match Self::build_form(request) {
            Ok(form) => form,
            Err(e) => return UploadOutcome::TransportFailure(e.to_string()),
        };

        let mut builder = self
            .client
            .post(url)
            .timeout(self.timeout.as_std())
            .multipart(form);

        if let Some(token) = credential.as_deref().filter(|t| !t.is_empty()) {
            builder = builder.bearer_auth(token);
        }

        debug!(artifact_id = %artifact_id, "sending upload request");

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return UploadOutcome::timeout(),
            Err(e) => return UploadOutcome::TransportFailure(e.to_string()),
        };

        let status = response.status();
        if Self::is_accepted(status) {
            return UploadOutcome::Success;
        }

        let body = response.text().await.unwrap_or_default();
        debug!(artifact_id = %artifact_id, status = status.as_u16(), body = %body, "upload rejected");

        UploadOutcome::ServerRejected {
            status: status.as_u16(),
            body,
        }
    }
}
