//! Structured file I/O for binary data serialization.
//!
//! Every value is little-endian. [`StructWriter::close`] appends a CRC32 of
//! everything written, and [`StructReader::verify_checksum`] checks it, so a
//! torn or corrupted file is detected when it is loaded.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Result, TweetdexError};
use crate::storage::{StorageInput, StorageOutput};
use crate::util::varint::{encode_u64, read_u64_bytes};

/// A structured file writer for binary data.
pub struct StructWriter<W: StorageOutput> {
    writer: W,
    hasher: crc32fast::Hasher,
    position: u64,
}

impl<W: StorageOutput> StructWriter<W> {
    /// Create a new structured file writer.
    pub fn new(writer: W) -> Self {
        StructWriter {
            writer,
            hasher: crc32fast::Hasher::new(),
            position: 0,
        }
    }

    /// Write a u8 value.
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.writer.write_u8(value)?;
        self.update(&[value]);
        Ok(())
    }

    /// Write a u32 value (little-endian).
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.writer.write_u32::<LittleEndian>(value)?;
        self.update(&value.to_le_bytes());
        Ok(())
    }

    /// Write a u64 value (little-endian).
    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.writer.write_u64::<LittleEndian>(value)?;
        self.update(&value.to_le_bytes());
        Ok(())
    }

    /// Write a variable-length integer.
    pub fn write_varint(&mut self, value: u64) -> Result<()> {
        let encoded = encode_u64(value);
        self.write_raw(&encoded)
    }

    /// Write a string with length prefix.
    pub fn write_string(&mut self, value: &str) -> Result<()> {
        let bytes = value.as_bytes();
        self.write_varint(bytes.len() as u64)?;
        self.write_raw(bytes)
    }

    /// Write raw bytes without length prefix.
    pub fn write_raw(&mut self, value: &[u8]) -> Result<()> {
        self.writer.write_all(value)?;
        self.update(value);
        Ok(())
    }

    /// Get current file position.
    pub fn position(&self) -> u64 {
        self.position
    }

    fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
        self.position += data.len() as u64;
    }

    /// Write the checksum trailer, then flush and close the writer.
    pub fn close(mut self) -> Result<u32> {
        let checksum = self.hasher.clone().finalize();
        self.writer.write_u32::<LittleEndian>(checksum)?;
        self.writer.close()?;
        Ok(checksum)
    }
}

/// A structured file reader for binary data.
pub struct StructReader<R: StorageInput> {
    reader: R,
    hasher: crc32fast::Hasher,
    position: u64,
    /// Size of the payload, excluding the checksum trailer.
    payload_size: u64,
}

impl<R: StorageInput> StructReader<R> {
    /// Create a new structured file reader.
    pub fn new(reader: R) -> Result<Self> {
        let file_size = reader.size()?;
        if file_size < 4 {
            return Err(TweetdexError::storage(
                "file too short to hold a checksum trailer",
            ));
        }

        Ok(StructReader {
            reader,
            hasher: crc32fast::Hasher::new(),
            position: 0,
            payload_size: file_size - 4,
        })
    }

    /// Read a u8 value.
    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure_remaining(1)?;
        let value = self.reader.read_u8()?;
        self.update(&[value]);
        Ok(value)
    }

    /// Read a u32 value (little-endian).
    pub fn read_u32(&mut self) -> Result<u32> {
        self.ensure_remaining(4)?;
        let value = self.reader.read_u32::<LittleEndian>()?;
        self.update(&value.to_le_bytes());
        Ok(value)
    }

    /// Read a u64 value (little-endian).
    pub fn read_u64(&mut self) -> Result<u64> {
        self.ensure_remaining(8)?;
        let value = self.reader.read_u64::<LittleEndian>()?;
        self.update(&value.to_le_bytes());
        Ok(value)
    }

    /// Read a variable-length integer.
    pub fn read_varint(&mut self) -> Result<u64> {
        let (value, bytes) = read_u64_bytes(&mut self.reader)?;
        self.update(&bytes);
        if self.position > self.payload_size {
            return Err(TweetdexError::storage("varint runs past end of payload"));
        }
        Ok(value)
    }

    /// Read a string with length prefix.
    pub fn read_string(&mut self) -> Result<String> {
        let length = self.read_varint()?;
        let bytes = self.read_raw(length)?;
        String::from_utf8(bytes)
            .map_err(|e| TweetdexError::storage(format!("Invalid UTF-8 string: {e}")))
    }

    /// Read `length` raw bytes.
    pub fn read_raw(&mut self, length: u64) -> Result<Vec<u8>> {
        self.ensure_remaining(length)?;
        let mut bytes = vec![0u8; length as usize];
        self.reader.read_exact(&mut bytes)?;
        self.update(&bytes);
        Ok(bytes)
    }

    /// Number of payload bytes not yet read.
    pub fn remaining(&self) -> u64 {
        self.payload_size - self.position
    }

    /// Check that the whole payload was consumed and that the checksum
    /// trailer matches it.
    pub fn verify_checksum(mut self) -> Result<()> {
        if self.remaining() != 0 {
            return Err(TweetdexError::storage(format!(
                "{} unread bytes before checksum trailer",
                self.remaining()
            )));
        }

        let expected = self.reader.read_u32::<LittleEndian>()?;
        let actual = self.hasher.finalize();
        if expected != actual {
            return Err(TweetdexError::storage(format!(
                "checksum mismatch: stored {expected:#010x}, computed {actual:#010x}"
            )));
        }
        Ok(())
    }

    fn ensure_remaining(&self, length: u64) -> Result<()> {
        if length > self.remaining() {
            return Err(TweetdexError::storage(format!(
                "unexpected end of data: need {length} bytes, {} left",
                self.remaining()
            )));
        }
        Ok(())
    }

    fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
        self.position += data.len() as u64;
    }
}
