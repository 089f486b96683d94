//! Protobuf body extractor/responder and query-string decoding.

use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use chrono::NaiveDateTime;
use domains::timeline;
use prost::Message;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// A protobuf-encoded body. As an extractor, any read or decode failure
/// rejects with [`ApiError::Decode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Protobuf<T>(pub T);

impl<T, S> FromRequest<S> for Protobuf<T>
where
    T: Message + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::PayloadTooLarge
            } else {
                ApiError::Decode
            }
        })?;

        T::decode(body).map(Protobuf).map_err(|e| {
            tracing::debug!(error = %e, "undecodable request body");
            ApiError::Decode
        })
    }
}

impl<T: Message> IntoResponse for Protobuf<T> {
    fn into_response(self) -> Response {
        (
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            )],
            self.0.encode_to_vec(),
        )
            .into_response()
    }
}

/// Query-string parameters. Unlike `Query`, a malformed query string
/// rejects with [`ApiError::Decode`], so the caller still gets a protobuf body.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(params)| QueryParams(params))
            .map_err(|rejection| {
                tracing::debug!(error = %rejection, "undecodable query string");
                ApiError::Decode
            })
    }
}

/// Restores the `=` padding clients strip from URL-safe base64.
fn repad(encoded: &str) -> String {
    let trimmed = encoded.trim_end_matches('=');
    let missing = (4 - trimmed.len() % 4) % 4;
    let mut padded = String::with_capacity(trimmed.len() + missing);
    padded.push_str(trimmed);
    padded.extend(std::iter::repeat('=').take(missing));
    padded
}

/// Decodes the `q` parameter of the event listing: unpadded URL-safe base64
/// of `YYYY-MM-DD HH:MM:SS`.
pub fn decode_cutoff(q: &str) -> Result<NaiveDateTime, ApiError> {
    let raw = URL_SAFE.decode(repad(q.trim())).map_err(|e| ApiError::BadRequest(format!("cutoff is not base64: {e}")))?;
    let text = String::from_utf8(raw).map_err(|_| ApiError::BadRequest("cutoff is not UTF-8".into()))?;
    Ok(timeline::parse_any(&text)?)
}

/// Inverse of [`decode_cutoff`], as a client builds it.
pub fn encode_cutoff(cutoff: &NaiveDateTime) -> String {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(timeline::format_storage(cutoff))
}
