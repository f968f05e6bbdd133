use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

/// Data type used to hold a serialized instance of an arbitrary data type.
///
/// Configuration documents arrive either as CBOR bytes or as a JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SerializedData {
	Cbor(Vec<u8>),
	JSON(serde_json::Value),
}
impl SerializedData {
	pub fn deserialize<T: DeserializeOwned>(self) -> Result<T, DeserializeError> {
		let value: T = match self {
			SerializedData::Cbor(data) => ciborium::de::from_reader::<T, &[u8]>(&data)?,
			SerializedData::JSON(data) => serde_json::from_value(data)?,
		};

		return Ok(value);
	}

	/// Encodes `value` as CBOR
	pub fn cbor_from<T: Serialize>(value: &T) -> Result<Self, SerializeError> {
		let mut serialized = Vec::<u8>::new();
		ciborium::ser::into_writer(value, &mut serialized)?;
		return Ok(SerializedData::Cbor(serialized));
	}

	/// Encodes `value` as a JSON value
	pub fn json_from<T: Serialize>(value: &T) -> Result<Self, SerializeError> {
		return Ok(SerializedData::JSON(serde_json::to_value(value)?));
	}
}

/// Returned when there is an error deserializing `SerializedData`
#[derive(Error, Debug)]
#[error("Could not deserialize data: {0}")]
pub struct DeserializeError(pub String);
impl<T: std::fmt::Debug> From<ciborium::de::Error<T>> for DeserializeError {
	fn from(err: ciborium::de::Error<T>) -> Self {
		return DeserializeError(match err {
			ciborium::de::Error::Syntax(offset) => format!("Syntax error at offset {offset}"),
			ciborium::de::Error::Semantic(_, err) => err,
			other => format!("{:?}", other),
		});
	}
}
impl From<serde_json::Error> for DeserializeError {
	fn from(err: serde_json::Error) -> Self {
		return DeserializeError(err.to_string());
	}
}

/// Returned when a value cannot be encoded into `SerializedData`
#[derive(Error, Debug)]
#[error("Could not serialize data: {0}")]
pub struct SerializeError(pub String);
impl<T: std::fmt::Debug> From<ciborium::ser::Error<T>> for SerializeError {
	fn from(err: ciborium::ser::Error<T>) -> Self {
		return SerializeError(match err {
			ciborium::ser::Error::Io(err) => format!("{:?}", err),
			ciborium::ser::Error::Value(err) => err,
		});
	}
}
impl From<serde_json::Error> for SerializeError {
	fn from(err: serde_json::Error) -> Self {
		return SerializeError(err.to_string());
	}
}
