//! HTTP client for the tracker REST API

pub mod client;

pub use client::RestClient;
