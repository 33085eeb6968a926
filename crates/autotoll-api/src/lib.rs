//! HTTP client for the autotoll backend

mod client;

pub use client::*;
