pub mod api;
pub mod client;

pub use api::SearchApi;
pub use client::{build_http_client, MunchApiClient, Routes};
