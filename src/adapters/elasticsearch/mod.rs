//! Elasticsearch index integration

pub mod client;
pub mod models;

pub use client::ElasticsearchClient;
