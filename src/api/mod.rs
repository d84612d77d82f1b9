mod client;
pub mod models;

pub use client::{ApiClient, ClientError};
