//! Variable-length integer encoding utilities.
//!
//! Uses 7 bits per byte with a continuation bit, so small values (such as
//! the gaps between neighbouring document IDs in a posting list) take a
//! single byte.

use std::io::Read;

use byteorder::ReadBytesExt;

use crate::error::{Result, TweetdexError};

/// Encode a u64 value using variable-length encoding.
pub fn encode_u64(value: u64) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(10);
    let mut val = value;

    loop {
        let mut byte = (val & 0x7F) as u8;
        val >>= 7;

        if val != 0 {
            byte |= 0x80; // Set continuation bit
        }

        bytes.push(byte);

        if val == 0 {
            break;
        }
    }

    bytes
}

/// Decode a u64 value from variable-length encoding.
///
/// Returns the value and the number of bytes consumed.
pub fn decode_u64(bytes: &[u8]) -> Result<(u64, usize)> {
    let mut result = 0u64;
    let mut shift = 0;
    let mut bytes_read = 0;

    for &byte in bytes {
        bytes_read += 1;

        if shift >= 64 {
            return Err(TweetdexError::storage("VarInt overflow"));
        }

        result |= ((byte & 0x7F) as u64) << shift;

        if (byte & 0x80) == 0 {
            return Ok((result, bytes_read));
        }

        shift += 7;
    }

    Err(TweetdexError::storage("Incomplete VarInt"))
}

/// Read a variable-length encoded u64 from a reader, returning the raw
/// bytes alongside the value.
pub fn read_u64_bytes<R: Read>(reader: &mut R) -> Result<(u64, Vec<u8>)> {
    let mut bytes = Vec::with_capacity(4);
    loop {
        let byte = reader.read_u8()?;
        bytes.push(byte);
        if byte & 0x80 == 0 {
            break;
        }
        if bytes.len() > 10 {
            return Err(TweetdexError::storage("VarInt overflow"));
        }
    }

    let (value, _) = decode_u64(&bytes)?;
    Ok((value, bytes))
}
