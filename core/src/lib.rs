//! Smoke-test core for the shop's products and orders API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). `Verifier` strings those
//! calls into the fixed smoke-test script and runs them through whatever
//! `Transport` the host supplies.
//!
//! # Design
//! - `ShopClient` is stateless; it holds only `base_url`.
//! - Each endpoint call is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit and the whole script is testable with canned
//!   responses.
//! - Write DTOs are defined independently from the mock-server crate;
//!   listed rows stay untyped JSON. Integration tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod types;
pub mod verifier;

pub use client::ShopClient;
pub use error::{ApiError, VerifyError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use types::{
    CreatedProduct, EntityId, NewProduct, OrderStatus, OrderStatusUpdate, ProductDelete,
    ProductPriceUpdate,
};
pub use verifier::Verifier;

/// Where the backend lives in its stock deployment.
pub const DEFAULT_BASE_URL: &str = "http://localhost/E-commerce Fashion Store Mockup 2/api";
