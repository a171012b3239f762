#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method, path, query_param},
};
use wxpush_service::{
    clients::{store::ContentStore, wechat::WeChatClient},
    config::{Config, ServiceRole},
    params::Params,
    pipeline::Dispatcher,
};

pub const API_TOKEN: &str = "test-secret";
pub const ACCESS_TOKEN: &str = "stable-token-123";
pub const VIEW_BASE: &str = "https://view.example.com/";

/// In-memory store that records every write.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, (String, u64)>>,
    puts: AtomicUsize,
    fail_writes: bool,
    unreachable: bool,
}

impl MemoryStore {
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Default::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Default::default()
        }
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn entry(&self, id: &str) -> Option<(String, u64)> {
        self.entries.lock().unwrap().get(id).cloned()
    }

    pub fn insert(&self, id: &str, payload: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(id.to_string(), (payload.to_string(), 604_800));
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn put(&self, id: &str, payload: &str, ttl_seconds: u64) -> Result<(), Error> {
        self.puts.fetch_add(1, Ordering::SeqCst);

        if self.fail_writes {
            return Err(anyhow!("store is read-only"));
        }

        self.entries
            .lock()
            .unwrap()
            .insert(id.to_string(), (payload.to_string(), ttl_seconds));
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<String>, Error> {
        Ok(self.entries.lock().unwrap().get(id).map(|(p, _)| p.clone()))
    }

    async fn ping(&self) -> Result<(), Error> {
        if self.unreachable {
            return Err(anyhow!("connection refused"));
        }
        Ok(())
    }
}

pub fn test_config(api_base: &str) -> Config {
    Config {
        api_token: API_TOKEN.to_string(),
        wx_appid: Some("wx-app".to_string()),
        wx_secret: Some("wx-secret".to_string()),
        wx_userid: Some("user-a|user-b|user-c".to_string()),
        wx_template_id: Some("tpl-1".to_string()),
        view_url_base: Some(VIEW_BASE.to_string()),
        wechat_api_base: api_base.to_string(),
        redis_url: None,
        server_port: 0,
        service_role: ServiceRole::Combined,
    }
}

pub fn dispatcher(config: &Config, store: Option<Arc<MemoryStore>>) -> Dispatcher {
    let store = store.map(|s| s as Arc<dyn ContentStore>);

    Dispatcher::new(
        config.api_token.clone(),
        config.dispatch_defaults(),
        store,
        WeChatClient::new(&config.wechat_api_base),
    )
}

pub fn alert_params(pairs: &[(&str, &str)]) -> Params {
    let mut params: Params = [
        ("token", API_TOKEN),
        ("title", "Buy signal triggered"),
        ("content", "Strategy: Breakout\nPrice: 105.50\n"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    for (k, v) in pairs {
        params.insert(k.to_string(), v.to_string());
    }
    params
}

pub async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/cgi-bin/stable_token"))
        .and(body_partial_json(json!({
            "grant_type": "client_credential",
            "force_refresh": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": ACCESS_TOKEN,
            "expires_in": 7200
        })))
        .mount(server)
        .await;
}

pub async fn mount_send(server: &MockServer, recipient: &str, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/cgi-bin/message/template/send"))
        .and(query_param("access_token", ACCESS_TOKEN))
        .and(body_partial_json(json!({ "touser": recipient })))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

pub fn ok_reply() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"errcode": 0, "errmsg": "ok", "msgid": 1}))
}

pub fn rejected_reply() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(json!({"errcode": 43004, "errmsg": "require subscribe"}))
}

pub fn message_id_from(detail_url: &str) -> String {
    detail_url
        .rsplit("id=")
        .next()
        .unwrap_or_default()
        .to_string()
}

pub fn parse_json(payload: &str) -> Value {
    serde_json::from_str(payload).unwrap()
}
