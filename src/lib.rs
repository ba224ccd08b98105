pub mod app;
pub mod chunk;
pub mod client;
pub mod domain;
pub mod error;
pub mod manifest;
pub mod retry;
