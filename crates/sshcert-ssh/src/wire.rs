// ABOUTME: Decoder for the OpenSSH public key wire format.
// ABOUTME: Splits a base64 key blob into its u32-length-prefixed fields.

use crate::error::{Result, SshError};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;

/// Size of the big-endian length prefix in front of every field.
const LENGTH_PREFIX_LEN: usize = 4;

/// Standard alphabet that accepts key blobs with or without trailing `=`.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A decoded OpenSSH key blob.
///
/// Holds the raw bytes and hands out a fresh [`KeyFields`] iterator on every
/// call to [`KeyBlob::fields`], so the field sequence can be walked any number
/// of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBlob {
    bytes: Vec<u8>,
}

impl KeyBlob {
    /// Decode the base64 part of an OpenSSH public key line.
    ///
    /// # Errors
    /// Returns `SshError::MalformedEncoding` if `encoded` is not valid base64.
    pub fn decode(encoded: &str) -> Result<Self> {
        let bytes = LENIENT_STANDARD
            .decode(encoded)
            .map_err(SshError::MalformedEncoding)?;
        Ok(Self { bytes })
    }

    /// Wrap bytes that are already decoded.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Raw blob bytes as they appear on the wire.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lazily iterate the fields in encounter order.
    pub fn fields(&self) -> KeyFields<'_> {
        KeyFields {
            buf: &self.bytes,
            offset: 0,
            failed: false,
        }
    }

    /// Decode every field, failing if any of them is truncated.
    pub fn collect_fields(&self) -> Result<Vec<&[u8]>> {
        self.fields().collect()
    }
}

/// Iterator over the length-prefixed fields of a [`KeyBlob`].
///
/// Yields `Err(SshError::TruncatedField)` once and then stops if a length
/// prefix or payload runs past the end of the buffer.
#[derive(Debug, Clone)]
pub struct KeyFields<'a> {
    buf: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> KeyFields<'a> {
    fn truncated(&mut self, needed: usize) -> SshError {
        self.failed = true;
        SshError::TruncatedField {
            offset: self.offset,
            needed,
            available: self.buf.len() - self.offset,
        }
    }
}

impl<'a> Iterator for KeyFields<'a> {
    type Item = Result<&'a [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.buf.len() {
            return None;
        }

        let rest = &self.buf[self.offset..];
        let Some((prefix, body)) = rest.split_first_chunk::<LENGTH_PREFIX_LEN>() else {
            return Some(Err(self.truncated(LENGTH_PREFIX_LEN)));
        };

        // Wire lengths are big-endian regardless of host byte order.
        let len = u32::from_be_bytes(*prefix) as usize;
        if len > body.len() {
            return Some(Err(self.truncated(LENGTH_PREFIX_LEN.saturating_add(len))));
        }

        let field = &body[..len];
        self.offset += LENGTH_PREFIX_LEN + len;
        Some(Ok(field))
    }
}

impl std::iter::FusedIterator for KeyFields<'_> {}

/// Encode fields in the OpenSSH wire format (the inverse of [`KeyBlob::fields`]).
#[cfg(test)]
pub(crate) fn encode_fields<'a>(fields: impl IntoIterator<Item = &'a [u8]>) -> Vec<u8> {
    let mut wire_data = Vec::new();
    for field in fields {
        wire_data.extend_from_slice(&(field.len() as u32).to_be_bytes());
        wire_data.extend_from_slice(field);
    }
    wire_data
}
