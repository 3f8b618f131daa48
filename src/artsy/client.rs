// Artsy API HTTP client.
// Injects the XApp token into authenticated routes and converts error responses.

use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};
use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::error::{EmergenceError, Result};

use super::routes::ArtsyRoute;
use super::token::TokenStore;

/// Header carrying the app-level token.
pub const XAPP_TOKEN_HEADER: &str = "X-Xapp-Token";

/// Artsy API client authenticating with an XApp token.
pub struct ArtsyClient {
    client: Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    tokens: TokenStore,
}

impl ArtsyClient {
    /// Create a client for the configured environment.
    pub fn new(config: &Config) -> Result<Self> {
        let tokens = match &config.token_cache_path {
            Some(path) => TokenStore::persistent(path),
            None => TokenStore::new(),
        };
        Self::with_token_store(config, tokens)
    }

    /// Create a client around an existing token store.
    pub fn with_token_store(config: &Config, tokens: TokenStore) -> Result<Self> {
        if config.client_id.is_empty() || config.client_secret.is_empty() {
            return Err(EmergenceError::MissingCredentials);
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("emergence"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(EmergenceError::Api)?;

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// The route used to exchange this client's credentials for a token.
    pub(super) fn xapp_route(&self) -> ArtsyRoute {
        ArtsyRoute::XApp {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
        }
    }

    /// Send a request for `route`, authenticating first when it needs a token.
    ///
    /// If no token can be obtained the request is never sent.
    pub async fn request(&self, route: &ArtsyRoute) -> Result<Response> {
        if route.requires_auth() {
            let token = self.authenticate().await?;
            self.send(route, Some(&token)).await
        } else {
            self.send(route, None).await
        }
    }

    /// Send a request with an explicit token (or none) and check its status.
    pub(super) async fn send(&self, route: &ArtsyRoute, token: Option<&str>) -> Result<Response> {
        let url = route.url(&self.base_url);
        trace!(method = %route.method(), url = %url, "sending Artsy request");

        let mut request = self
            .client
            .request(route.method(), &url)
            .query(&route.parameters());
        if let Some(token) = token {
            request = request.header(XAPP_TOKEN_HEADER, token);
        }

        let response = request.send().await.map_err(EmergenceError::Api)?;
        self.check_response(route, token, response).await
    }

    /// Get a valid token, fetching one through the XApp route when needed.
    pub async fn authenticate(&self) -> Result<String> {
        self.tokens.get_or_fetch(|| self.fetch_xapp_token()).await
    }

    /// Check response status and convert errors.
    ///
    /// `token` is the token the request carried, if any.
    async fn check_response(
        &self,
        route: &ArtsyRoute,
        token: Option<&str>,
        response: Response,
    ) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            debug!(path = %route.path(), status = %status, "Artsy request succeeded");
            return Ok(response);
        }

        match status {
            StatusCode::UNAUTHORIZED => match token {
                Some(sent) => {
                    if self.tokens.invalidate_if(sent).await {
                        warn!(path = %route.path(), "XApp token rejected, discarding it");
                    }
                    Err(EmergenceError::Unauthenticated(
                        "XApp token was rejected".to_string(),
                    ))
                }
                None => Err(EmergenceError::Unauthenticated(
                    "client credentials were rejected".to_string(),
                )),
            },
            StatusCode::NOT_FOUND => {
                let url = response.url().to_string();
                Err(EmergenceError::NotFound(url))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                warn!(path = %route.path(), status = %status, "Artsy request failed");
                Err(EmergenceError::Status { status, body })
            }
        }
    }
}
