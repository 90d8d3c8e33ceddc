// Copyright (C) 2026 The ibcp Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use serde::Deserialize;
use serde::Deserializer;
use serde_json::Value;


/// Deserialize a `Vec` from a value that could be `null`.
pub(crate) fn vec_from_str<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  let vec = Option::<Vec<T>>::deserialize(deserializer)?;
  Ok(vec.unwrap_or_default())
}


/// Deserialize a value that could be `null`, mapping `null` to the
/// type's default.
pub(crate) fn default_from_null<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  let value = Option::<T>::deserialize(deserializer)?;
  Ok(value.unwrap_or_default())
}


/// Deserialize an optional string from a value that may be a string, a
/// number, a boolean, or `null`.
///
/// The gateway is not consistent in how it encodes some of the fields
/// it reports, and the type changes between versions.
pub(crate) fn opt_string_from_any<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  let string = match value {
    None | Some(Value::Null) => None,
    Some(Value::String(string)) => Some(string),
    Some(Value::Number(number)) => Some(number.to_string()),
    Some(Value::Bool(bool)) => Some(bool.to_string()),
    Some(value @ Value::Array(..)) | Some(value @ Value::Object(..)) => Some(value.to_string()),
  };
  Ok(string)
}


/// Deserialize a floating point number from a value that may be a
/// number, a numeric string, or `null`.
///
/// `null`, the empty string, and strings that do not parse all map to
/// `0.0`.
pub(crate) fn f64_from_any<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<Value>::deserialize(deserializer)?;
  let number = match value {
    Some(Value::Number(number)) => number.as_f64().unwrap_or_default(),
    Some(Value::String(string)) => string.trim().parse().unwrap_or_default(),
    _ => 0.0,
  };
  Ok(number)
}
