//! HTTP probing: request construction and single-request execution.

pub mod http;
pub mod request;
pub mod useragents;

pub use http::{Prober, ProberError};
