use std::{collections::HashMap, ops::Index};

use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Multipart},
    http::{HeaderMap, Method, Request, header::CONTENT_TYPE},
};
use serde_json::{Map, Value};
use tracing::{debug, warn};

const TOKEN_KEY: &str = "token";

/// Flat request parameters after query and body have been merged.
///
/// Falsy JSON scalars (`false`, `0`, `null`, `""`) are kept as empty strings
/// so they still shadow query fields and read as absent downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    fields: HashMap<String, String>,
    non_text_token: bool,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.fields.get(key)
    }

    pub fn insert(&mut self, key: String, value: String) {
        if key == TOKEN_KEY {
            self.non_text_token = false;
        }
        self.fields.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        if key == TOKEN_KEY {
            self.non_text_token = false;
        }
        self.fields.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && !self.non_text_token
    }

    /// A JSON body sent a truthy `token` that is not a string. No configured
    /// secret can equal it, and it still takes precedence over the header.
    pub fn has_non_text_token(&self) -> bool {
        self.non_text_token
    }

    fn mark_non_text_token(&mut self) {
        self.fields.remove(TOKEN_KEY);
        self.non_text_token = true;
    }

    /// Overlays `other` on top of `self`.
    fn merge(&mut self, other: Params) {
        if other.non_text_token {
            self.mark_non_text_token();
        }
        for (key, value) in other.fields {
            self.insert(key, value);
        }
    }
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

impl Index<&str> for Params {
    type Output = String;

    fn index(&self, key: &str) -> &String {
        &self.fields[key]
    }
}

/// How a request body is interpreted, decided from its declared content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Form,
    Multipart(String),
    Text,
}

impl BodyKind {
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(raw) = content_type else {
            return BodyKind::Text;
        };
        let lowered = raw.to_ascii_lowercase();

        if lowered.contains("application/json") {
            BodyKind::Json
        } else if lowered.contains("application/x-www-form-urlencoded") {
            BodyKind::Form
        } else if lowered.contains("multipart/form-data") {
            BodyKind::Multipart(raw.to_string())
        } else {
            BodyKind::Text
        }
    }
}

pub fn method_has_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}

/// Merges query-string and body parameters; body keys win. Body parse
/// failures never fail the request, the body just contributes nothing.
pub async fn normalize(
    method: &Method,
    query: Option<&str>,
    headers: &HeaderMap,
    body: Bytes,
) -> Params {
    let mut params = query.map(parse_form).unwrap_or_default();

    if method_has_body(method) {
        let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
        let kind = BodyKind::from_content_type(content_type);

        match parse_body(&kind, body).await {
            Ok(body_params) => {
                debug!(?kind, fields = body_params.len(), "Request body parsed");
                params.merge(body_params);
            }
            Err(e) => {
                warn!(?kind, error = %e, "Failed to parse request body");
            }
        }
    }

    params
}

async fn parse_body(kind: &BodyKind, body: Bytes) -> anyhow::Result<Params> {
    match kind {
        BodyKind::Json => {
            let value: Value = serde_json::from_slice(&body)?;
            Ok(json_body_params(value))
        }
        BodyKind::Form => Ok(parse_form(&String::from_utf8_lossy(&body))),
        BodyKind::Multipart(content_type) => parse_multipart(content_type, body).await,
        BodyKind::Text => {
            let text = String::from_utf8(body.to_vec())?;
            Ok(text_body_params(text))
        }
    }
}

fn parse_form(input: &str) -> Params {
    url::form_urlencoded::parse(input.as_bytes())
        .into_owned()
        .collect()
}

async fn parse_multipart(content_type: &str, body: Bytes) -> anyhow::Result<Params> {
    let request = Request::builder()
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(body))?;

    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| anyhow::anyhow!("Invalid multipart body: {}", e))?;

    let mut params = Params::new();
    while let Some(field) = multipart.next_field().await? {
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        params.insert(name, field.text().await?);
    }

    Ok(params)
}

/// A JSON body is either a bare string (taken as the content), or an object
/// that may wrap the real fields under `params` or `data`.
fn json_body_params(value: Value) -> Params {
    match value {
        Value::String(content) => content_params(content),
        Value::Object(mut object) => {
            let wrapper = ["params", "data"]
                .into_iter()
                .find(|key| matches!(object.get(*key), Some(Value::Object(_))));

            match wrapper.and_then(|key| object.remove(key)) {
                Some(Value::Object(inner)) => flatten_object(inner),
                _ => flatten_object(object),
            }
        }
        _ => Params::new(),
    }
}

fn text_body_params(text: String) -> Params {
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(object)) => flatten_object(object),
        _ => content_params(text),
    }
}

fn content_params(content: String) -> Params {
    [("content".to_string(), content)].into_iter().collect()
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn flatten_object(object: Map<String, Value>) -> Params {
    let mut params = Params::new();

    for (key, value) in object {
        if is_falsy(&value) {
            params.insert(key, String::new());
            continue;
        }

        match value {
            Value::String(s) => params.insert(key, s),
            _ if key == TOKEN_KEY => params.mark_non_text_token(),
            other => {
                let text = match other {
                    Value::Bool(b) => b.to_string(),
                    Value::Number(n) => n.to_string(),
                    nested => nested.to_string(),
                };
                params.insert(key, text);
            }
        }
    }

    params
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers_with(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        headers
    }

    #[tokio::test]
    async fn body_fields_override_query_fields() {
        let params = normalize(
            &Method::POST,
            Some("title=from-query&token=abc"),
            &headers_with("application/json"),
            Bytes::from(r#"{"title":"from-body","content":"hi"}"#),
        )
        .await;

        assert_eq!(params["title"], "from-body");
        assert_eq!(params["token"], "abc");
        assert_eq!(params["content"], "hi");
    }

    #[tokio::test]
    async fn json_bare_string_becomes_content() {
        let params = normalize(
            &Method::POST,
            None,
            &headers_with("application/json; charset=utf-8"),
            Bytes::from(r#""just text""#),
        )
        .await;

        assert_eq!(params.len(), 1);
        assert_eq!(params["content"], "just text");
    }

    #[tokio::test]
    async fn json_params_wrapper_takes_priority_over_data() {
        let params = normalize(
            &Method::POST,
            None,
            &headers_with("application/json"),
            Bytes::from(r#"{"params":{"title":"p"},"data":{"title":"d"},"title":"top"}"#),
        )
        .await;

        assert_eq!(params["title"], "p");
        assert!(!params.contains_key("data"));
    }

    #[tokio::test]
    async fn json_data_wrapper_is_unwrapped() {
        let params = normalize(
            &Method::POST,
            None,
            &headers_with("application/json"),
            Bytes::from(r#"{"data":{"title":"d","count":3,"flag":true,"gone":null}}"#),
        )
        .await;

        assert_eq!(params["title"], "d");
        assert_eq!(params["count"], "3");
        assert_eq!(params["flag"], "true");
        assert_eq!(params["gone"], "");
    }

    #[tokio::test]
    async fn falsy_json_values_shadow_query_fields_as_empty() {
        let params = normalize(
            &Method::POST,
            Some("title=from-query&content=from-query&appid=q"),
            &headers_with("application/json"),
            Bytes::from(r#"{"title":false,"content":0,"appid":"","secret":0.0}"#),
        )
        .await;

        assert_eq!(params["title"], "");
        assert_eq!(params["content"], "");
        assert_eq!(params["appid"], "");
        assert_eq!(params["secret"], "");
    }

    #[tokio::test]
    async fn non_string_token_is_flagged_and_overrides_query_token() {
        let params = normalize(
            &Method::POST,
            Some("token=abc"),
            &headers_with("application/json"),
            Bytes::from(r#"{"token":123,"title":"t","content":"c"}"#),
        )
        .await;

        assert!(params.has_non_text_token());
        assert!(!params.contains_key("token"));

        let falsy = normalize(
            &Method::POST,
            None,
            &headers_with("application/json"),
            Bytes::from(r#"{"token":0,"title":"t","content":"c"}"#),
        )
        .await;

        assert!(!falsy.has_non_text_token());
        assert_eq!(falsy["token"], "");
    }

    #[tokio::test]
    async fn non_object_wrapper_is_kept_as_a_field() {
        let params = normalize(
            &Method::POST,
            None,
            &headers_with("application/json"),
            Bytes::from(r#"{"data":"plain","title":"t"}"#),
        )
        .await;

        assert_eq!(params["data"], "plain");
        assert_eq!(params["title"], "t");
    }

    #[tokio::test]
    async fn form_body_is_decoded() {
        let params = normalize(
            &Method::POST,
            None,
            &headers_with("application/x-www-form-urlencoded"),
            Bytes::from("title=Buy+now&content=Price%3A+10"),
        )
        .await;

        assert_eq!(params["title"], "Buy now");
        assert_eq!(params["content"], "Price: 10");
    }

    #[tokio::test]
    async fn multipart_text_fields_are_decoded() {
        let body = "--XYZ\r\n\
            Content-Disposition: form-data; name=\"title\"\r\n\r\n\
            Sell alert\r\n\
            --XYZ\r\n\
            Content-Disposition: form-data; name=\"content\"\r\n\r\n\
            details\r\n\
            --XYZ--\r\n";

        let params = normalize(
            &Method::POST,
            None,
            &headers_with("multipart/form-data; boundary=XYZ"),
            Bytes::from(body),
        )
        .await;

        assert_eq!(params["title"], "Sell alert");
        assert_eq!(params["content"], "details");
    }

    #[tokio::test]
    async fn plain_text_json_object_is_used() {
        let params = normalize(
            &Method::POST,
            None,
            &headers_with("text/plain"),
            Bytes::from(r#"{"title":"t","content":"c"}"#),
        )
        .await;

        assert_eq!(params["title"], "t");
        assert_eq!(params["content"], "c");
    }

    #[tokio::test]
    async fn plain_text_is_wrapped_as_content() {
        let params = normalize(
            &Method::POST,
            Some("title=q"),
            &HeaderMap::new(),
            Bytes::from("Strategy: Breakout"),
        )
        .await;

        assert_eq!(params["title"], "q");
        assert_eq!(params["content"], "Strategy: Breakout");
    }

    #[tokio::test]
    async fn malformed_json_contributes_nothing() {
        let params = normalize(
            &Method::POST,
            Some("title=q"),
            &headers_with("application/json"),
            Bytes::from("{ not json"),
        )
        .await;

        assert_eq!(params.len(), 1);
        assert_eq!(params["title"], "q");
    }

    #[tokio::test]
    async fn get_requests_ignore_the_body() {
        let params = normalize(
            &Method::GET,
            Some("title=t&content=c"),
            &headers_with("application/json"),
            Bytes::from(r#"{"title":"ignored"}"#),
        )
        .await;

        assert_eq!(params["title"], "t");
    }
}
