use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::error::JournalError;

/// JSON request body decoded regardless of `Content-Type`.
///
/// Decodes the first JSON value in the body; anything that fails to decode,
/// including an empty body, is a bad request. Trailing bytes are ignored.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JournalError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| JournalError::BadRequest(rejection.body_text()))?;
        decode(&bytes).map(JsonBody)
    }
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, JournalError> {
    let mut de = serde_json::Deserializer::from_slice(bytes);
    T::deserialize(&mut de).map_err(|e| JournalError::BadRequest(e.to_string()))
}
