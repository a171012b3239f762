use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct StableTokenRequest {
    pub grant_type: String,
    pub appid: String,
    pub secret: String,
    pub force_refresh: bool,
}

impl StableTokenRequest {
    pub fn client_credential(appid: &str, secret: &str) -> Self {
        Self {
            grant_type: "client_credential".to_string(),
            appid: appid.to_string(),
            secret: secret.to_string(),
            force_refresh: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StableTokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<u64>,
    pub errcode: Option<i64>,
    pub errmsg: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplateMessage {
    pub touser: String,
    pub template_id: String,
    pub url: String,
    pub data: TemplateData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplateData {
    pub first: TemplateField,
    pub keyword1: TemplateField,
    pub keyword2: TemplateField,
    pub keyword3: TemplateField,
    pub remark: TemplateField,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplateField {
    pub value: String,
    pub color: String,
}

impl TemplateField {
    pub fn new(value: impl Into<String>, color: &str) -> Self {
        Self {
            value: value.into(),
            color: color.to_string(),
        }
    }
}
