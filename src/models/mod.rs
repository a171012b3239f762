pub mod dispatch;
pub mod health;
pub mod message;
pub mod response;
pub mod wechat;
