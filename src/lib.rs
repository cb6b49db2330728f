//! `fetchkit` is a convenience async HTTP client on top of `reqwest`.
//!
//! It wraps the usual request-building ceremony with ergonomic methods:
//! - [`Client::get`] / [`Client::post`] / [`Client::put`] — raw responses
//! - [`Client::get_json`] / [`Client::post_json`] — JSON encode/decode sugar
//! - [`Client::post_form`] — URL-encoded form bodies
//!
//! Query parameters are merged into the target URL, per-call behavior is
//! tuned through [`RequestOptions`], and server errors (5xx) plus transport
//! failures can be retried with a fixed delay.

mod client;
mod error;
mod options;
mod query;

pub use client::{Client, ClientBuilder};
pub use error::FetchError;
pub use options::RequestOptions;

pub type Result<T> = std::result::Result<T, FetchError>;
