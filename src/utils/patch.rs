//! Helpers for partial-update payloads
//!
//! Update requests distinguish three states for optional fields: the key is
//! absent (leave the field alone), the key is `null` (clear it), or the key
//! carries a value (set it). Plain `Option<T>` collapses the first two, so
//! clearable fields are declared as `Option<Option<T>>` with
//! [`double_option`] as their deserializer and `#[serde(default)]`.

use serde::{Deserialize, Deserializer};

/// Deserialize a present key into `Some(..)`, keeping `null` as `Some(None)`
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
