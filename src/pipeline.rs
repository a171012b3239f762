use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    auth::authenticate,
    clients::{store::ContentStore, wechat::WeChatClient},
    error::RelayError,
    fanout::{build_template_message, fan_out, split_recipients},
    models::{
        dispatch::{DispatchConfig, DispatchDefaults, DispatchSummary},
        message::AlertMessage,
    },
    params::Params,
    utils::{MESSAGE_TTL_SECONDS, build_detail_url},
};

/// Runs one alert through authentication, validation, persistence, token
/// acquisition and fan-out. Holds no per-request state.
pub struct Dispatcher {
    api_token: String,
    defaults: DispatchDefaults,
    store: Option<Arc<dyn ContentStore>>,
    wechat: WeChatClient,
}

impl Dispatcher {
    pub fn new(
        api_token: String,
        defaults: DispatchDefaults,
        store: Option<Arc<dyn ContentStore>>,
        wechat: WeChatClient,
    ) -> Self {
        Self {
            api_token,
            defaults,
            store,
            wechat,
        }
    }

    pub async fn dispatch(
        &self,
        params: &Params,
        authorization: Option<&str>,
    ) -> Result<DispatchSummary, RelayError> {
        authenticate(params, authorization, &self.api_token)?;

        let (title, content) = validate_alert(params)?;
        let config = resolve_config(params, &self.defaults)?;
        let store = self.store.as_ref().ok_or(RelayError::StoreUnavailable)?;

        let alert = AlertMessage::new(title, content);
        let payload = serde_json::to_string(&alert.to_stored())
            .map_err(|e| RelayError::StoreWrite(e.to_string()))?;

        store
            .put(&alert.id, &payload, MESSAGE_TTL_SECONDS)
            .await
            .map_err(|e| RelayError::StoreWrite(e.to_string()))?;

        info!(message_id = %alert.id, recipients = config.recipients.len(), "Alert persisted");

        let detail_url = build_detail_url(&config.view_base_url, &alert.id);

        let token = self
            .wechat
            .acquire_token(&config.app_id, &config.app_secret)
            .await
            .map_err(|e| RelayError::Credential(e.to_string()))?;

        let messages = config
            .recipients
            .iter()
            .map(|recipient| {
                build_template_message(recipient, &config.template_id, &detail_url, &alert)
            })
            .collect();

        let results = fan_out(&self.wechat, &token, messages).await.map_err(|e| {
            warn!(message_id = %alert.id, error = %e, "Fan-out aborted");
            RelayError::SendFault(e.to_string())
        })?;

        for result in results.iter().filter(|r| !r.accepted) {
            debug!(recipient = %result.recipient, response = %result.raw_response, "Recipient rejected");
        }

        let summary = DispatchSummary::aggregate(&results, detail_url);

        info!(
            message_id = %alert.id,
            status = %summary.status,
            sent = summary.sent,
            total = summary.total,
            "Dispatch finished"
        );

        Ok(summary)
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

pub fn validate_alert(params: &Params) -> Result<(String, String), RelayError> {
    match (non_empty(params.get("title")), non_empty(params.get("content"))) {
        (Some(title), Some(content)) => Ok((title, content)),
        _ => Err(RelayError::MissingAlertFields),
    }
}

/// Request overrides win over server defaults when present and non-empty.
pub fn resolve_config(
    params: &Params,
    defaults: &DispatchDefaults,
) -> Result<DispatchConfig, RelayError> {
    let pick = |key: &str, fallback: &Option<String>| {
        non_empty(params.get(key)).or_else(|| non_empty(fallback.as_ref()))
    };

    let app_id = pick("appid", &defaults.app_id);
    let app_secret = pick("secret", &defaults.app_secret);
    let recipients = pick("userid", &defaults.recipients)
        .map(|raw| split_recipients(&raw))
        .filter(|list| !list.is_empty());
    let template_id = pick("template_id", &defaults.template_id);
    let view_base_url = pick("base_url", &defaults.view_base_url);

    match (app_id, app_secret, recipients, template_id, view_base_url) {
        (Some(app_id), Some(app_secret), Some(recipients), Some(template_id), Some(view_base_url)) => {
            Ok(DispatchConfig {
                app_id,
                app_secret,
                template_id,
                recipients,
                view_base_url,
            })
        }
        (app_id, app_secret, recipients, template_id, view_base_url) => {
            let missing: Vec<&str> = [
                ("WX_APPID", app_id.is_none()),
                ("WX_SECRET", app_secret.is_none()),
                ("WX_USERID", recipients.is_none()),
                ("WX_TEMPLATE_ID", template_id.is_none()),
                ("VIEW_URL_BASE", view_base_url.is_none()),
            ]
            .into_iter()
            .filter_map(|(name, absent)| absent.then_some(name))
            .collect();

            Err(RelayError::Configuration(missing.join(", ")))
        }
    }
}
