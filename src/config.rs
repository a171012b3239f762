use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};

use crate::models::dispatch::DispatchDefaults;

/// Which routes this process serves. The sender and viewer roles split the
/// ingestion and rendering paths across two deployments sharing one store.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceRole {
    #[default]
    Combined,
    Sender,
    Viewer,
}

impl ServiceRole {
    pub fn serves_sender(&self) -> bool {
        matches!(self, ServiceRole::Combined | ServiceRole::Sender)
    }

    pub fn serves_viewer(&self) -> bool {
        matches!(self, ServiceRole::Combined | ServiceRole::Viewer)
    }
}

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub api_token: String,

    #[serde(default)]
    pub wx_appid: Option<String>,
    #[serde(default)]
    pub wx_secret: Option<String>,
    #[serde(default)]
    pub wx_userid: Option<String>,
    #[serde(default)]
    pub wx_template_id: Option<String>,
    #[serde(default)]
    pub view_url_base: Option<String>,

    #[serde(default = "default_wechat_api_base")]
    pub wechat_api_base: String,

    #[serde(default)]
    pub redis_url: Option<String>,

    #[serde(default = "default_server_port")]
    pub server_port: u16,

    #[serde(default)]
    pub service_role: ServiceRole,
}

fn default_wechat_api_base() -> String {
    "https://api.weixin.qq.com".to_string()
}

fn default_server_port() -> u16 {
    8787
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        let config = envy::from_env::<Self>()
            .map_err(|e| anyhow!("Invalid or missing environmental variable: {}", e))?;
        Ok(config)
    }

    pub fn dispatch_defaults(&self) -> DispatchDefaults {
        DispatchDefaults {
            app_id: self.wx_appid.clone(),
            app_secret: self.wx_secret.clone(),
            recipients: self.wx_userid.clone(),
            template_id: self.wx_template_id.clone(),
            view_base_url: self.view_url_base.clone(),
        }
    }
}
