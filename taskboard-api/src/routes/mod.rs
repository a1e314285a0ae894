/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login and logout
/// - `projects`: Project CRUD with dashboard listing
/// - `tasks`: Task CRUD and reordering

pub mod auth;
pub mod health;
pub mod projects;
pub mod tasks;

use serde::{Deserialize, Deserializer};

/// Distinguishes an explicit JSON `null` from an omitted field.
///
/// Wrap the field as `Option<Option<T>>` with
/// `#[serde(default, deserialize_with = "double_option")]`: a missing field
/// stays `None`, `null` becomes `Some(None)` and a value `Some(Some(v))`.
pub(crate) fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}
