use crate::config::Env;
use crate::response::ApiResponse;
use http::header::CONTENT_TYPE;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Authenticated client for the Cloudflare account API.
///
/// Remote responses are handed back to the caller as they are: status, content type
/// and body pass through unchanged.
#[derive(Debug, Clone)]
pub struct CloudflareClient {
    http: reqwest::Client,
    api_base: String,
    account_id: String,
    token: String,
}

impl CloudflareClient {
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be initialized.
    pub fn new(
        api_base: impl Into<String>,
        account_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            api_base: api_base.into(),
            account_id: account_id.into(),
            token: token.into(),
        })
    }

    /// Client for the account configured in `env`
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be initialized.
    pub fn from_env(env: &Env) -> Result<Self, reqwest::Error> {
        Self::new(&env.cf_api_base, &env.cf_account_id, &env.cf_token)
    }

    /// `{api_base}/accounts/{account_id}/{path}`
    pub fn account_url(&self, path: &str) -> String {
        format!(
            "{}/accounts/{}/{}",
            self.api_base.trim_end_matches('/'),
            self.account_id,
            path.trim_start_matches('/')
        )
    }

    pub(crate) async fn post_json(&self, path: &str, body: &Value) -> Result<ApiResponse, reqwest::Error> {
        let url = self.account_url(path);
        debug!(%url, "POST to Cloudflare");
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        passthrough(response).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<ApiResponse, reqwest::Error> {
        let url = self.account_url(path);
        debug!(%url, "DELETE to Cloudflare");
        let response = self
            .http
            .delete(url)
            .bearer_auth(&self.token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;
        passthrough(response).await
    }
}

async fn passthrough(response: reqwest::Response) -> Result<ApiResponse, reqwest::Error> {
    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = response.bytes().await?;

    let out = ApiResponse::new(status).with_body(body.to_vec());
    Ok(match content_type {
        Some(ct) => out.with_content_type(&ct),
        None => out,
    })
}
