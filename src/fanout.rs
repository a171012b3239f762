use std::sync::LazyLock;

use anyhow::{Error, Result};
use futures_util::future::try_join_all;
use regex::Regex;
use tracing::{debug, info};

use crate::{
    clients::wechat::WeChatClient,
    models::{
        dispatch::DispatchResult,
        message::AlertMessage,
        wechat::{AccessToken, TemplateData, TemplateField, TemplateMessage},
    },
};

pub const POSITIVE_COLOR: &str = "#17B978";
pub const NEGATIVE_COLOR: &str = "#E02020";
pub const NEUTRAL_COLOR: &str = "#173177";

const KEYWORD_COLOR: &str = "#173177";
const DATE_COLOR: &str = "#333333";
const REMARK_COLOR: &str = "#666666";

const REMARK_TEXT: &str = "\n🤖 AI Deep Analysis Ready. Click to view full report & charts.";

const STRATEGY_PLACEHOLDER: &str = "Signal Alert";
const PRICE_PLACEHOLDER: &str = "Check Details";
const MAX_FIELD_CHARS: usize = 20;

const BULLISH_TERMS: [&str; 4] = ["bullish", "long", "buy", "看涨"];
const BEARISH_TERMS: [&str; 4] = ["bearish", "short", "sell", "看跌"];

static STRATEGY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Strategy:\s*([^\r\n]+)").expect("valid strategy regex"));

static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Price:\s*([^\r\n]+)").expect("valid price regex"));

/// Splits a `|`-delimited recipient list, keeping order and duplicates.
pub fn split_recipients(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Bullish markers take precedence when a title carries both kinds.
pub fn sentiment_color(title: &str) -> &'static str {
    let lowered = title.to_lowercase();

    if BULLISH_TERMS.iter().any(|term| lowered.contains(term)) {
        POSITIVE_COLOR
    } else if BEARISH_TERMS.iter().any(|term| lowered.contains(term)) {
        NEGATIVE_COLOR
    } else {
        NEUTRAL_COLOR
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalFields {
    pub strategy: String,
    pub price: String,
}

pub fn extract_fields(content: &str) -> SignalFields {
    SignalFields {
        strategy: capture_field(&STRATEGY_RE, content)
            .unwrap_or_else(|| STRATEGY_PLACEHOLDER.to_string()),
        price: capture_field(&PRICE_RE, content).unwrap_or_else(|| PRICE_PLACEHOLDER.to_string()),
    }
}

fn capture_field(re: &Regex, content: &str) -> Option<String> {
    re.captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().chars().take(MAX_FIELD_CHARS).collect())
}

pub fn build_template_message(
    recipient: &str,
    template_id: &str,
    detail_url: &str,
    alert: &AlertMessage,
) -> TemplateMessage {
    let fields = extract_fields(&alert.content);

    TemplateMessage {
        touser: recipient.to_string(),
        template_id: template_id.to_string(),
        url: detail_url.to_string(),
        data: TemplateData {
            first: TemplateField::new(alert.title.as_str(), sentiment_color(&alert.title)),
            keyword1: TemplateField::new(fields.strategy, KEYWORD_COLOR),
            keyword2: TemplateField::new(fields.price, KEYWORD_COLOR),
            keyword3: TemplateField::new(alert.created_at.as_str(), DATE_COLOR),
            remark: TemplateField::new(REMARK_TEXT, REMARK_COLOR),
        },
    }
}

pub fn is_accepted(response: &serde_json::Value) -> bool {
    response.get("errmsg").and_then(|v| v.as_str()) == Some("ok")
}

/// Sends every message concurrently and waits for all of them. A non-"ok"
/// reply is recorded per recipient, but the first transport or decode
/// failure aborts the whole batch.
pub async fn fan_out(
    client: &WeChatClient,
    token: &AccessToken,
    messages: Vec<TemplateMessage>,
) -> Result<Vec<DispatchResult>, Error> {
    debug!(recipients = messages.len(), "Fanning out template messages");

    let sends = messages.into_iter().map(|message| async move {
        let raw_response = client.send_template(token, &message).await?;
        let accepted = is_accepted(&raw_response);

        info!(recipient = %message.touser, accepted, "Template message sent");

        Ok::<_, Error>(DispatchResult {
            recipient: message.touser,
            accepted,
            raw_response,
        })
    });

    try_join_all(sends).await
}
