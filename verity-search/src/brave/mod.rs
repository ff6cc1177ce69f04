//! Brave Search API (web vertical).

mod client;
pub mod types;

pub use client::{BRAVE_API_BASE, BraveSearch};
