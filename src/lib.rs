pub mod api_connection;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod converter;
pub mod error;
pub mod fallback;
pub mod gateway;
pub mod media;
pub mod model;
pub mod prompt;
pub mod request;
pub mod session;
pub mod store;
pub mod threads;
pub mod view;
