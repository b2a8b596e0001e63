//! Serialization of fitted model parameters.
//!
//! Parameters are stored as plain numbers ([`Coefficients`](crate::model::Coefficients)),
//! never as backend tensors or graph handles, so a checkpoint written by one
//! gradient strategy restores into any other.

use std::error::Error;

/// Byte encoding for checkpointable values.
pub trait SerializableParams: Sized {
    type Error: Error + Send + Sync + 'static;

    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error>;

    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error>;
}

// f64s are written fixed-width, so restores are bit-exact
impl<T> SerializableParams for T
where
    T: serde::Serialize + for<'de> serde::Deserialize<'de>,
{
    type Error = bincode::Error;

    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error> {
        bincode::serialize(self)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error> {
        bincode::deserialize(bytes)
    }
}
