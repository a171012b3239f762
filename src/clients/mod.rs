pub mod health;
pub mod redis;
pub mod store;
pub mod wechat;
