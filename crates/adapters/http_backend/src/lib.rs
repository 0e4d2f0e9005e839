//! # gecko-adapter-http
//!
//! [`SequenceBackend`] implementation that talks to the rig's executor over HTTP.
//!
//! ## Endpoints
//!
//! | Command | Request |
//! |---------|---------|
//! | run program | `POST /run_sequence` with the categorized program as JSON |
//! | stop | `POST /stop_sequence` |
//! | emergency stop | `POST /emergency_stop` |
//! | motor check | `POST /motor_check` |
//! | zero sensor | `POST /zero_sensor` |
//! | calibrate | `POST /calibrate` with `{"Fx", "Fy", "Fz"}` |
//! | download | `POST /download-state-json` with the program, answers a file |
//! | upload | `POST /upload-state-json`, multipart field `file`, answers `{status, data}` |
//!
//! Endpoint paths are resolved relative to the configured base URL, so an
//! executor mounted under a prefix (`http://host/rig`) is reached at
//! `http://host/rig/run_sequence`.
//!
//! Requests are sent once; failures are returned, never retried.
//!
//! ## Dependency rule
//!
//! Depends on `gecko-app` (port traits) and `gecko-domain` only.

mod config;
mod error;

pub use config::HttpBackendConfig;
pub use error::HttpBackendError;

use std::time::Duration;

use reqwest::header::CONTENT_DISPOSITION;
use serde::Deserialize;
use url::Url;

use gecko_app::ports::{ProgramFile, SequenceBackend};
use gecko_domain::error::GeckoError;
use gecko_domain::telemetry::CalibrationFactors;
use gecko_domain::time::now;
use gecko_domain::wire::CategorizedProgram;

const RUN_SEQUENCE: &str = "/run_sequence";
const STOP_SEQUENCE: &str = "/stop_sequence";
const EMERGENCY_STOP: &str = "/emergency_stop";
const MOTOR_CHECK: &str = "/motor_check";
const ZERO_SENSOR: &str = "/zero_sensor";
const CALIBRATE: &str = "/calibrate";
const DOWNLOAD: &str = "/download-state-json";
const UPLOAD: &str = "/upload-state-json";

/// HTTP client for the rig's executor.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
}

#[derive(Deserialize)]
struct UploadResponse {
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

impl HttpBackend {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HttpBackendError::InvalidUrl`] for an unparsable base URL, or
    /// [`HttpBackendError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: &HttpBackendConfig) -> Result<Self, HttpBackendError> {
        let mut base_url = Url::parse(&config.base_url).map_err(HttpBackendError::InvalidUrl)?;
        // A base without a trailing slash would lose its last segment on join.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, base_url })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, HttpBackendError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(HttpBackendError::InvalidUrl)
    }

    async fn post_command(&self, path: &'static str) -> Result<(), HttpBackendError> {
        let response = self.client.post(self.endpoint(path)?).send().await?;
        let ack = ensure_success(path, response).await?.text().await?;
        tracing::debug!(endpoint = path, %ack, "command acknowledged");
        Ok(())
    }

    async fn post_json<T: serde::Serialize + Sync>(
        &self,
        path: &'static str,
        body: &T,
    ) -> Result<reqwest::Response, HttpBackendError> {
        let response = self
            .client
            .post(self.endpoint(path)?)
            .json(body)
            .send()
            .await?;
        ensure_success(path, response).await
    }

    async fn send_program(&self, program: &CategorizedProgram) -> Result<(), HttpBackendError> {
        let ack = self.post_json(RUN_SEQUENCE, program).await?.text().await?;
        tracing::debug!(%ack, "program accepted");
        Ok(())
    }

    async fn fetch_file(
        &self,
        program: &CategorizedProgram,
    ) -> Result<ProgramFile, HttpBackendError> {
        let response = self.post_json(DOWNLOAD, program).await?;
        let name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(attachment_name)
            .unwrap_or_else(default_file_name);
        let contents = response.bytes().await?.to_vec();
        Ok(ProgramFile { name, contents })
    }

    async fn send_file(&self, file: ProgramFile) -> Result<CategorizedProgram, HttpBackendError> {
        let part = reqwest::multipart::Part::bytes(file.contents)
            .file_name(file.name)
            .mime_str("application/json")?;
        let form = reqwest::multipart::Form::new().part("file", part);
        let response = self
            .client
            .post(self.endpoint(UPLOAD)?)
            .multipart(form)
            .send()
            .await?;
        let body = ensure_success(UPLOAD, response).await?.bytes().await?;
        let parsed: UploadResponse =
            serde_json::from_slice(&body).map_err(|source| HttpBackendError::Decode {
                endpoint: UPLOAD,
                source,
            })?;
        let data = parsed.data.ok_or_else(|| HttpBackendError::Status {
            endpoint: UPLOAD,
            status: 200,
            message: parsed
                .error
                .unwrap_or_else(|| "response carries no data".to_string()),
        })?;
        serde_json::from_value(data).map_err(|source| HttpBackendError::Decode {
            endpoint: UPLOAD,
            source,
        })
    }
}

/// Turn a non-success response into [`HttpBackendError::Status`].
async fn ensure_success(
    endpoint: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, HttpBackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or(body);
    Err(HttpBackendError::Status {
        endpoint,
        status: status.as_u16(),
        message,
    })
}

/// File name from a `Content-Disposition: attachment; filename=...` header.
fn attachment_name(header: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}

fn default_file_name() -> String {
    format!("export_{}.json", now().format("%Y%m%d_%H%M%S"))
}

impl SequenceBackend for HttpBackend {
    async fn run_program(&self, program: CategorizedProgram) -> Result<(), GeckoError> {
        self.send_program(&program).await?;
        Ok(())
    }

    async fn stop_sequence(&self) -> Result<(), GeckoError> {
        Ok(self.post_command(STOP_SEQUENCE).await?)
    }

    async fn emergency_stop(&self) -> Result<(), GeckoError> {
        Ok(self.post_command(EMERGENCY_STOP).await?)
    }

    async fn motor_check(&self) -> Result<(), GeckoError> {
        Ok(self.post_command(MOTOR_CHECK).await?)
    }

    async fn zero_sensor(&self) -> Result<(), GeckoError> {
        Ok(self.post_command(ZERO_SENSOR).await?)
    }

    async fn calibrate(&self, factors: CalibrationFactors) -> Result<(), GeckoError> {
        self.post_json(CALIBRATE, &factors).await?;
        Ok(())
    }

    async fn download_program(
        &self,
        program: CategorizedProgram,
    ) -> Result<ProgramFile, GeckoError> {
        Ok(self.fetch_file(&program).await?)
    }

    async fn upload_program(&self, file: ProgramFile) -> Result<CategorizedProgram, GeckoError> {
        Ok(self.send_file(file).await?)
    }
}
