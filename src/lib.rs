// src/lib.rs

pub mod config;
pub mod crawl;
pub mod entry;
pub mod fetch;
pub mod filter;
pub mod normalize;
pub mod render;
pub mod schema;
pub mod sink;
pub mod table;
