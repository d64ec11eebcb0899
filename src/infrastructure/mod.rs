pub mod audio;
pub mod cache;
pub mod config;
pub mod http;
pub mod repositories;
