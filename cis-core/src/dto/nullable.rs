//! Null-tolerant field deserialization
//!
//! The server sends `null` for strings and ids it has no value for. Fields
//! using [`null_as_default`] read `null` the same way as a missing key.

use serde::{Deserialize, Deserializer};

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
