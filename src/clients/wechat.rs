use anyhow::{Error, Result, anyhow};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::models::wechat::{
    AccessToken, StableTokenRequest, StableTokenResponse, TemplateMessage,
};

/// Thin client for the Official Account token and template-message APIs.
/// Each call is a single attempt; there is no retry and no token cache.
/// Transport and decode errors are returned as reqwest reports them.
#[derive(Clone)]
pub struct WeChatClient {
    http_client: Client,
    api_base: String,
}

impl WeChatClient {
    pub fn new(api_base: &str) -> Self {
        info!(api_base, "WeChat client initialized");

        Self {
            http_client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    pub async fn acquire_token(&self, app_id: &str, app_secret: &str) -> Result<AccessToken, Error> {
        let url = format!("{}/cgi-bin/stable_token", self.api_base);
        debug!(app_id, "Requesting stable access token");

        let response = self
            .http_client
            .post(&url)
            .json(&StableTokenRequest::client_credential(app_id, app_secret))
            .send()
            .await?;

        let body: StableTokenResponse = response.json().await?;

        match body.access_token {
            Some(token) if !token.is_empty() => {
                debug!(expires_in = ?body.expires_in, "Access token acquired");
                Ok(AccessToken::new(token))
            }
            _ => {
                warn!(errcode = ?body.errcode, errmsg = ?body.errmsg, "Token response carried no access_token");
                Err(anyhow!(
                    "Token response missing access_token (errcode: {}, errmsg: {})",
                    body.errcode.map(|c| c.to_string()).unwrap_or_else(|| "none".to_string()),
                    body.errmsg.unwrap_or_else(|| "none".to_string())
                ))
            }
        }
    }

    /// Sends one template message and returns the platform's JSON reply as-is.
    /// A non-"ok" reply is returned normally; only transport and decode
    /// failures are errors.
    pub async fn send_template(
        &self,
        token: &AccessToken,
        message: &TemplateMessage,
    ) -> Result<Value, Error> {
        let url = format!("{}/cgi-bin/message/template/send", self.api_base);
        debug!(recipient = %message.touser, "Sending template message");

        let response = self
            .http_client
            .post(&url)
            .query(&[("access_token", token.as_str())])
            .json(message)
            .send()
            .await?;

        let body: Value = response.json().await?;

        Ok(body)
    }
}
