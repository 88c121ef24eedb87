//! Pluggable serialization contract for stored values

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Error from encoding or decoding a stored value
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// Value could not be encoded to a string
    #[error("encode failed: {0}")]
    Encode(Box<str>),
    /// Stored string could not be decoded back into a value
    #[error("decode failed: {0}")]
    Decode(Box<str>),
}

/// Serialization contract: a pair of pure functions between a value and
/// its stored string form.
///
/// Invariant: `decode(encode(v))` reconstructs a value behaviorally
/// equivalent to `v` for every supported `T`.
pub trait ValueCodec<T>: Send + Sync + 'static {
    /// Encode a value to its stored string form
    fn encode(&self, value: &T) -> Result<String, SerializationError>;

    /// Decode a stored string back into a value
    fn decode(&self, raw: &str) -> Result<T, SerializationError>;
}

/// Default codec: generic structured-text (JSON) encoding
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl JsonCodec {
    /// Create the JSON codec
    pub fn new() -> Self {
        Self
    }
}

impl<T> ValueCodec<T> for JsonCodec
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn encode(&self, value: &T) -> Result<String, SerializationError> {
        serde_json::to_string(value).map_err(|e| SerializationError::Encode(e.to_string().into()))
    }

    fn decode(&self, raw: &str) -> Result<T, SerializationError> {
        serde_json::from_str(raw).map_err(|e| SerializationError::Decode(e.to_string().into()))
    }
}

/// Codec built from a plain serialize/deserialize function pair
pub struct FnCodec<S, D> {
    serialize: S,
    deserialize: D,
}

impl<S, D> FnCodec<S, D> {
    /// Create a codec from a serialize and a deserialize function
    pub fn new(serialize: S, deserialize: D) -> Self {
        Self {
            serialize,
            deserialize,
        }
    }
}

impl<T, S, D> ValueCodec<T> for FnCodec<S, D>
where
    S: Fn(&T) -> Result<String, SerializationError> + Send + Sync + 'static,
    D: Fn(&str) -> Result<T, SerializationError> + Send + Sync + 'static,
{
    fn encode(&self, value: &T) -> Result<String, SerializationError> {
        (self.serialize)(value)
    }

    fn decode(&self, raw: &str) -> Result<T, SerializationError> {
        (self.deserialize)(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Profile {
        name: String,
        visits: u32,
    }

    #[test]
    fn json_round_trip() {
        let codec = JsonCodec::new();
        let value = Profile {
            name: "Miri".into(),
            visits: 3,
        };
        let raw = codec.encode(&value).unwrap();
        let back: Profile = codec.decode(&raw).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn json_round_trip_plain_string() {
        let codec = JsonCodec::new();
        let raw = codec.encode(&"pikachu".to_string()).unwrap();
        let back: String = codec.decode(&raw).unwrap();
        assert_eq!(back, "pikachu");
    }

    #[test]
    fn decode_rejects_malformed_input() {
        let codec = JsonCodec::new();
        let err = <JsonCodec as ValueCodec<Profile>>::decode(&codec, "{not json").unwrap_err();
        assert!(matches!(err, SerializationError::Decode(_)));
    }

    #[test]
    fn fn_codec_round_trip() {
        let codec = FnCodec::new(
            |v: &u32| Ok(v.to_string()),
            |raw: &str| {
                raw.parse::<u32>()
                    .map_err(|e| SerializationError::Decode(e.to_string().into()))
            },
        );
        let raw = codec.encode(&42).unwrap();
        assert_eq!(codec.decode(&raw).unwrap(), 42);
    }
}
