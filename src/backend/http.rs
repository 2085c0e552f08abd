//! HTTP implementation of the labeling backend
//!
//! Every request shares one `reqwest::Client` configured with the timeout
//! from [`BackendConfig`]; an expired timeout surfaces as a transport
//! failure like any other network error.

use crate::backend::types::{
    ActionResponse, ImageResponse, SessionId, SessionsResponse, TagRequest, TrainReply,
    TrainRequest,
};
use crate::backend::Backend;
use crate::config::BackendConfig;
use crate::error::{PhototagError, Result};

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

/// JSON-over-HTTP labeling backend
///
/// # Examples
///
/// ```
/// use phototag::backend::HttpBackend;
/// use phototag::config::BackendConfig;
///
/// let backend = HttpBackend::new(&BackendConfig::default()).unwrap();
/// assert_eq!(backend.base_url().as_str(), "http://127.0.0.1:5000/");
/// ```
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

/// Body shape of `/train_model` replies
#[derive(Debug, Deserialize)]
struct InfoBody {
    #[serde(default)]
    info: Option<String>,
}

impl HttpBackend {
    /// Create a backend client
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is invalid or the HTTP client cannot
    /// be built
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut base_url = Url::parse(&config.base_url).map_err(|e| {
            PhototagError::Config(format!(
                "Invalid backend URL '{}': {}",
                config.base_url, e
            ))
        })?;
        // Url::join replaces the last path segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("phototag/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PhototagError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            base_url = %base_url,
            timeout_seconds = config.timeout_seconds,
            "Initialized labeling backend client"
        );

        Ok(Self { client, base_url })
    }

    /// Base URL endpoints are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path).map_err(PhototagError::from)?)
    }

    fn session_endpoint(&self, path: &str, session: &SessionId) -> Result<Url> {
        let mut url = self.endpoint(path)?;
        url.query_pairs_mut().append_pair("session", session.as_str());
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;
        read_json(&url, response).await
    }

    async fn post_json<B: serde::Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T> {
        tracing::debug!("POST {}", url);
        let response = self
            .client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;
        read_json(&url, response).await
    }
}

fn transport_error(url: &Url, err: reqwest::Error) -> PhototagError {
    if err.is_timeout() {
        tracing::warn!("Request to {} timed out", url);
        PhototagError::Transport(format!("request to {} timed out", url.path()))
    } else {
        tracing::warn!("Request to {} failed: {}", url, err);
        PhototagError::Transport(format!("request to {} failed: {}", url.path(), err))
    }
}

async fn read_json<T: DeserializeOwned>(url: &Url, response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!("{} returned {}: {}", url, status, body);
        return Err(
            PhototagError::Transport(format!("{} returned {}", url.path(), status)).into(),
        );
    }

    response.json::<T>().await.map_err(|e| {
        tracing::warn!("Failed to parse response from {}: {}", url, e);
        PhototagError::Transport(format!("unreadable response from {}: {}", url.path(), e)).into()
    })
}

#[async_trait]
impl Backend for HttpBackend {
    async fn available_sessions(&self) -> Result<SessionsResponse> {
        let url = self.endpoint("get_available_sessions")?;
        self.get_json(url).await
    }

    async fn random_image(&self, session: &SessionId) -> Result<ImageResponse> {
        let url = self.session_endpoint("random_image64", session)?;
        self.get_json(url).await
    }

    async fn tag_image(&self, request: &TagRequest) -> Result<ImageResponse> {
        let url = self.endpoint("tag_img_get_new")?;
        tracing::debug!(
            filename = %request.filename,
            category = %request.img_type,
            session = %request.session_id,
            "Submitting label"
        );
        self.post_json(url, request).await
    }

    async fn copy_to_folders(&self, session: &SessionId) -> Result<ActionResponse> {
        let url = self.session_endpoint("copy_imgs_to_new_folder", session)?;
        self.get_json(url).await
    }

    async fn train_model(&self, request: &TrainRequest) -> Result<TrainReply> {
        let url = self.endpoint("train_model")?;
        tracing::debug!("POST {} (full_train={})", url, request.full_train);
        let response = self
            .client
            .post(url.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        let accepted = response.status().is_success();
        if !accepted {
            tracing::warn!("{} returned {}", url, response.status());
        }
        let info = response
            .json::<InfoBody>()
            .await
            .ok()
            .and_then(|body| body.info);

        Ok(TrainReply { accepted, info })
    }
}
