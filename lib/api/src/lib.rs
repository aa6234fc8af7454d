//! HTTP surface for HostelRank
//!
//! - `GET /health` - candidate and feature counts
//! - `GET /features` - fitted catalog with ranges, medians and weights
//! - `POST /recommend` - ranked, explained recommendations

pub mod rest;

pub use rest::RestApi;
