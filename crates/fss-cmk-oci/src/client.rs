//! Signed JSON client shared by the service adapters

use crate::auth::{sign_request, Credentials};
use fss_cmk_core::{Error, Result};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, trace};

const REQUEST_ID_HEADER: &str = "opc-request-id";

/// Deserialized body plus the request id the service echoed
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub data: T,
    pub request_id: Option<String>,
}

/// Error body returned by the control planes
#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// HTTP client that signs every request with the configured credentials
#[derive(Clone)]
pub struct OciClient {
    http: reqwest::Client,
    credentials: Arc<dyn Credentials>,
}

impl OciClient {
    pub fn new(credentials: Arc<dyn Credentials>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("fss-cmk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::transport("http", e.to_string()))?;
        Ok(Self { http, credentials })
    }

    pub async fn get<T: DeserializeOwned>(&self, service: &str, url: &str) -> Result<ApiResponse<T>> {
        self.send::<(), T>(service, Method::GET, url, None).await
    }

    pub async fn put<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        service: &str,
        url: &str,
        body: &B,
    ) -> Result<ApiResponse<T>> {
        self.send(service, Method::PUT, url, Some(body)).await
    }

    async fn send<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        service: &str,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<ApiResponse<T>> {
        debug!("{} {}", method, url);

        let mut builder = self.http.request(method, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let mut request = builder
            .build()
            .map_err(|e| Error::transport(service, e.to_string()))?;

        let material = self.credentials.signing_material().await?;
        sign_request(&material, &mut request)?;

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| Error::transport(service, e.to_string()))?;

        let request_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        if !response.status().is_success() {
            return Err(service_error(service, response, request_id).await);
        }

        let text = response
            .text()
            .await
            .map_err(|e| Error::transport(service, e.to_string()))?;
        trace!("{} response: {}", service, text);

        Ok(ApiResponse {
            data: serde_json::from_str(&text)?,
            request_id,
        })
    }
}

async fn service_error(service: &str, response: Response, request_id: Option<String>) -> Error {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let body = serde_json::from_str::<ServiceErrorBody>(&text).unwrap_or(ServiceErrorBody {
        code: status
            .canonical_reason()
            .unwrap_or("Unknown")
            .replace(' ', ""),
        message: if text.is_empty() {
            "(no response body)".to_string()
        } else {
            text
        },
    });

    Error::Service {
        service: service.to_string(),
        status: status.as_u16(),
        code: body.code,
        message: body.message,
        request_id,
    }
}
