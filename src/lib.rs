pub mod api;
pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod fanout;
pub mod models;
pub mod params;
pub mod pipeline;
pub mod render;
pub mod utils;
