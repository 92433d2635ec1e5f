pub mod config;
pub mod download;
pub mod search;
