//! Request bodies accepted by the JSON endpoints.
//!
//! Absent and `null` fields both decode to their zero value, so `{}` is a
//! valid (if useless) body for every endpoint.

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub token: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateTabRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeleteTabRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RenameTabRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReplaceKeyValuesRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub tab_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub key_values: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SubmitRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub tab_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub key_values: HashMap<String, String>,
}
