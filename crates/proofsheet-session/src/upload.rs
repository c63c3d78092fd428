// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Client side of the upload/convert endpoint.

use std::future::Future;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use proofsheet_core::error::{ProofsheetError, Result};
use proofsheet_core::wire::UploadResponse;
use proofsheet_core::{AppConfig, Background};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use tracing::{info, instrument, warn};

/// Conversion can take a while for large multi-frame sources.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Turns an arbitrary user-selected file into normalized PNG bytes.
pub trait ConversionClient {
    fn convert(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        background: Background,
    ) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// `POST {base}/upload?bg=...` with a multipart `file` field.
#[derive(Clone)]
pub struct HttpConversionClient {
    client: Client,
    base_url: String,
}

impl HttpConversionClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("proofsheet/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProofsheetError::Upload(format!("HTTP client unavailable: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(&config.conversion_base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl ConversionClient for HttpConversionClient {
    #[instrument(
        skip(self, bytes),
        fields(bytes_len = bytes.len(), bg = background.query_value())
    )]
    async fn convert(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        background: Background,
    ) -> Result<Vec<u8>> {
        let url = format!("{}/upload", self.base_url);
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .query(&[("bg", background.query_value())])
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Conversion endpoint unreachable");
                ProofsheetError::Upload(format!(
                    "could not connect to the conversion endpoint: {e}"
                ))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProofsheetError::Upload(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<UploadResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or(body);
            warn!(%status, %detail, "Conversion endpoint rejected upload");
            return Err(ProofsheetError::Upload(format!("{status}: {detail}")));
        }

        let payload: UploadResponse = serde_json::from_str(&body)
            .map_err(|e| ProofsheetError::Upload(format!("unexpected response: {e}")))?;
        let png = decode_payload(payload)?;

        info!(bytes = png.len(), "Upload converted");
        Ok(png)
    }
}

/// Extract the PNG bytes from a successful response body.
fn decode_payload(payload: UploadResponse) -> Result<Vec<u8>> {
    if !payload.ok {
        let detail = payload.error.unwrap_or_else(|| "conversion failed".into());
        return Err(ProofsheetError::Upload(detail));
    }
    let encoded = payload
        .base64
        .ok_or_else(|| ProofsheetError::Upload("response has no image data".into()))?;
    let png = STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| ProofsheetError::Upload(format!("response image is not valid base64: {e}")))?;
    if png.is_empty() {
        return Err(ProofsheetError::Upload("response image is empty".into()));
    }
    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::body::Bytes;
    use axum::http::StatusCode;
    use axum::routing::post;
    use proofsheet_core::ConversionPath;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn success_payload_is_decoded() {
        let router = Router::new().route(
            "/upload",
            post(|_body: Bytes| async {
                axum::Json(UploadResponse::success(
                    ConversionPath::Fallback,
                    STANDARD.encode(b"png-bytes"),
                ))
            }),
        );
        let base = serve(router).await;
        let client = HttpConversionClient::new(&format!("{base}/")).unwrap();
        assert_eq!(client.base_url(), base);

        let png = client
            .convert("scan.tiff", b"raw".to_vec(), Background::White)
            .await
            .unwrap();
        assert_eq!(png, b"png-bytes");
    }

    #[tokio::test]
    async fn server_error_is_an_upload_error() {
        let router = Router::new().route(
            "/upload",
            post(|_body: Bytes| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = serve(router).await;
        let client = HttpConversionClient::new(&base).unwrap();

        let err = client
            .convert("photo.heic", b"raw".to_vec(), Background::Transparent)
            .await
            .unwrap_err();
        match err {
            ProofsheetError::Upload(detail) => {
                assert!(detail.contains("500"), "{detail}");
                assert!(detail.contains("boom"), "{detail}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_an_upload_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpConversionClient::new(&format!("http://{addr}")).unwrap();
        let err = client
            .convert("a.png", vec![1], Background::White)
            .await
            .unwrap_err();
        assert!(matches!(err, ProofsheetError::Upload(_)));
    }

    #[test]
    fn payload_shape_is_checked() {
        assert!(matches!(
            decode_payload(UploadResponse::failure("decode failed")),
            Err(ProofsheetError::Upload(msg)) if msg == "decode failed"
        ));

        let missing = UploadResponse {
            ok: true,
            via: Some(ConversionPath::Primary),
            base64: None,
            error: None,
        };
        assert!(decode_payload(missing).is_err());

        let garbage = UploadResponse::success(ConversionPath::Primary, "***".into());
        assert!(decode_payload(garbage).is_err());
    }
}
