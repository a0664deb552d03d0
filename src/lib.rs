pub mod config;
pub mod fetcher;
pub mod images;
pub mod models;
pub mod processor;
pub mod storage;
