//! HTTP client for the prediction endpoints.

use std::path::Path;

use leaf_models::{LabelledPrediction, RawPrediction};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Endpoint used when neither an argument nor `LEAF_API_URL` is given.
pub const DEFAULT_PREDICT_URL: &str = "http://localhost:8000/predict/";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Full URL of the prediction endpoint
    pub url: Url,
}

impl ClientConfig {
    pub fn new(url: &str) -> ClientResult<Self> {
        Ok(Self {
            url: Url::parse(url)?,
        })
    }
}

/// Posts images to a prediction endpoint as multipart field `file`.
#[derive(Debug, Clone)]
pub struct PredictClient {
    http: Client,
    config: ClientConfig,
}

impl PredictClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("leaf-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn url(&self) -> &Url {
        &self.config.url
    }

    /// Upload an image file and return the parsed JSON response.
    pub async fn predict_file(&self, path: &Path) -> ClientResult<Value> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        self.predict_bytes(&file_name, bytes).await
    }

    /// Upload encoded image bytes and return the parsed JSON response.
    ///
    /// Works against either endpoint; non-2xx statuses become
    /// `ClientError::Status` carrying the server's `detail` and, when it is
    /// JSON, the whole body.
    pub async fn predict_bytes(&self, file_name: &str, bytes: Vec<u8>) -> ClientResult<Value> {
        let size = bytes.len();
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_for(file_name))?;
        let form = Form::new().part("file", part);

        debug!(url = %self.config.url, file_name, size, "Uploading image");

        let response = self
            .http
            .post(self.config.url.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let json = serde_json::from_slice::<Value>(&body).ok();
            return Err(ClientError::Status {
                status: status.as_u16(),
                detail: error_detail(json.as_ref(), &body),
                body: json,
            });
        }

        let value: Value = serde_json::from_slice(&body)?;
        info!(status = status.as_u16(), "Prediction received");
        Ok(value)
    }

    /// Upload and decode a `{"predicted_class", "confidence"}` response.
    pub async fn predict_labelled(&self, path: &Path) -> ClientResult<LabelledPrediction> {
        let value = self.predict_file(path).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Upload and decode a `{"prediction": [[...]]}` response.
    pub async fn predict_raw(&self, path: &Path) -> ClientResult<RawPrediction> {
        let value = self.predict_file(path).await?;
        Ok(serde_json::from_value(value)?)
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "bmp" => "image/bmp",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// `detail` from a JSON error body, or the body text.
fn error_detail(json: Option<&Value>, raw: &[u8]) -> String {
    json.and_then(|v| v.get("detail"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| String::from_utf8_lossy(raw).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_for() {
        assert_eq!(mime_for("leaf.JPG"), "image/jpeg");
        assert_eq!(mime_for("leaf.png"), "image/png");
        assert_eq!(mime_for("leaf"), "application/octet-stream");
    }

    #[test]
    fn test_error_detail() {
        let raw = br#"{"detail":"Error processing image","code":"decode_error"}"#;
        let json: Value = serde_json::from_slice(raw).unwrap();
        assert_eq!(error_detail(Some(&json), raw), "Error processing image");
        assert_eq!(error_detail(None, b"Bad Gateway\n"), "Bad Gateway");
    }

    #[test]
    fn test_config_rejects_bad_url() {
        assert!(matches!(
            ClientConfig::new("not a url"),
            Err(ClientError::InvalidUrl(_))
        ));
        assert_eq!(
            ClientConfig::new(DEFAULT_PREDICT_URL).unwrap().url.path(),
            "/predict/"
        );
    }
}
