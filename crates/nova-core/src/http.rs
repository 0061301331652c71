//! REST backend for the remote collaborators

use crate::error::{HttpStatus, NovaError};
use crate::services::{
    ArtifactService, DiagramService, ItemInfoService, ProcessService, ProjectManager,
};
use crate::types::NovaConfig;
use async_trait::async_trait;
use nova_artifact::{
    ArtifactChanges, ArtifactModel, DiagramModel, ItemInfoResult, LockResult, ProcessModel,
    SubArtifactModel,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde::de::DeserializeOwned;

/// Header carrying the session token
const SESSION_TOKEN_HEADER: &str = "Session-Token";

const USER_AGENT_VALUE: &str = concat!("nova-core/", env!("CARGO_PKG_VERSION"));

/// JSON-over-HTTP client for the artifact, admin and shared stores
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// # Errors
    /// `NovaError::Config` if the session token is not a valid header value
    /// or the client cannot be built
    pub fn new(config: &NovaConfig) -> Result<Self, NovaError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        if let Some(token) = &config.session_token {
            let value = HeaderValue::from_str(token)
                .map_err(|e| NovaError::Config(format!("invalid session token: {e}")))?;
            headers.insert(SESSION_TOKEN_HEADER, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| NovaError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn versioned(&self, path: &str, version: Option<i32>) -> String {
        match version {
            Some(v) => format!("{}?versionId={}", self.url(path), v),
            None => self.url(path),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, NovaError> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        Self::handle_response(response).await?.json().await.map_err(Into::into)
    }

    /// Map non-success statuses to `NovaError::Api`, keeping the body text
    async fn handle_response(response: reqwest::Response) -> Result<reqwest::Response, NovaError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("").to_string());
        tracing::debug!(status = status.as_u16(), "request failed");
        Err(NovaError::api(HttpStatus::from_code(status.as_u16()), message))
    }
}

#[async_trait]
impl ItemInfoService for HttpBackend {
    async fn get(&self, id: i32) -> Result<ItemInfoResult, NovaError> {
        self.get_json(self.url(&format!("/svc/artifactstore/itemInfo/{id}")))
            .await
    }
}

#[async_trait]
impl ArtifactService for HttpBackend {
    async fn get_artifact(&self, id: i32, version: Option<i32>) -> Result<ArtifactModel, NovaError> {
        self.get_json(self.versioned(&format!("/svc/bpartifactstore/artifacts/{id}"), version))
            .await
    }

    async fn get_sub_artifact(
        &self,
        artifact_id: i32,
        sub_artifact_id: i32,
        version: Option<i32>,
    ) -> Result<SubArtifactModel, NovaError> {
        let path =
            format!("/svc/bpartifactstore/artifacts/{artifact_id}/subartifacts/{sub_artifact_id}");
        self.get_json(self.versioned(&path, version)).await
    }

    async fn update_artifact(&self, changes: ArtifactChanges) -> Result<(), NovaError> {
        let url = self.url(&format!("/svc/bpartifactstore/artifacts/{}", changes.id));
        tracing::debug!("PATCH {}", url);
        let response = self.client.patch(&url).json(&changes).send().await?;
        Self::handle_response(response).await.map(|_| ())
    }

    async fn lock(&self, id: i32) -> Result<LockResult, NovaError> {
        let url = self.url("/svc/shared/artifacts/lock");
        tracing::debug!("POST {}", url);
        let response = self.client.post(&url).json(&[id]).send().await?;
        let mut results: Vec<LockResult> = Self::handle_response(response).await?.json().await?;
        if results.is_empty() {
            return Err(NovaError::Decode(format!("empty lock response for {id}")));
        }
        Ok(results.swap_remove(0))
    }

    async fn publish(&self, id: i32) -> Result<(), NovaError> {
        let url = self.url("/svc/shared/artifacts/publish");
        tracing::debug!("POST {}", url);
        let response = self.client.post(&url).json(&[id]).send().await?;
        Self::handle_response(response).await.map(|_| ())
    }
}

#[async_trait]
impl ProcessService for HttpBackend {
    async fn get_process(&self, id: i32, version: Option<i32>) -> Result<ProcessModel, NovaError> {
        self.get_json(self.versioned(&format!("/svc/bpartifactstore/process/{id}"), version))
            .await
    }

    async fn update_process(&self, id: i32, changes: ArtifactChanges) -> Result<(), NovaError> {
        let url = self.url(&format!("/svc/bpartifactstore/processupdate/{id}"));
        tracing::debug!("PUT {}", url);
        let response = self.client.put(&url).json(&changes).send().await?;
        Self::handle_response(response).await.map(|_| ())
    }
}

#[async_trait]
impl DiagramService for HttpBackend {
    async fn get_diagram(&self, id: i32, version: Option<i32>) -> Result<DiagramModel, NovaError> {
        self.get_json(self.versioned(&format!("/svc/bpartifactstore/diagram/{id}"), version))
            .await
    }
}

#[async_trait]
impl ProjectManager for HttpBackend {
    async fn open_project(&self, id: i32) -> Result<(), NovaError> {
        let url = self.url(&format!("/svc/adminstore/instance/projects/{id}"));
        tracing::debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        Self::handle_response(response).await.map(|_| ())
    }
}
