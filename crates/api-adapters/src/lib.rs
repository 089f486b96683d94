//! # api-adapters
//!
//! The HTTP surface of the kxpage backend: protobuf framing, the admin
//! token check and the routing onto `services`.

pub mod wire;

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod routes;
#[cfg(feature = "web-axum")]
pub mod state;

#[cfg(feature = "web-axum")]
pub use error::{ApiError, ApiResult};
#[cfg(feature = "web-axum")]
pub use extract::{decode_cutoff, encode_cutoff, Protobuf, QueryParams};
#[cfg(feature = "web-axum")]
pub use routes::create_router;
#[cfg(feature = "web-axum")]
pub use state::AppState;
