//! FlatBuffers model header
//!
//! Layout of the part of the buffer that is read:
//!
//! ```text
//! 0..4    u32  offset of the root table
//! 4..8    [u8] file identifier ("TFL3"), optional
//! root    i32  signed offset back to the root table's vtable
//! vtable  u16  vtable length, u16 table length, u16 field offsets...
//! ```
//!
//! Field 0 of the root table is the `u32` schema version.

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::error::{ModelError, Result};

/// Schema version the runtime expects
pub const SCHEMA_VERSION: u32 = 3;

/// File identifier written at bytes 4..8
pub const FILE_IDENTIFIER: [u8; 4] = *b"TFL3";

/// Root offset plus file identifier
pub const MIN_HEADER_LEN: usize = 8;

/// Fixed prefix of every vtable: its own length and the table length
const VTABLE_PREFIX_LEN: usize = 4;

/// Vtable slot of the `version` field
const VERSION_FIELD: usize = 0;

/// Decoded model header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelHeader {
    /// Schema version (0 when the field is absent)
    pub schema_version: u32,
    /// Bytes 4..8 of the buffer
    pub file_identifier: [u8; 4],
}

impl ModelHeader {
    /// Header for the current schema version
    pub fn new(schema_version: u32) -> Self {
        Self {
            schema_version,
            file_identifier: FILE_IDENTIFIER,
        }
    }

    /// Whether the buffer carries the expected file identifier
    pub fn has_file_identifier(&self) -> bool {
        self.file_identifier == FILE_IDENTIFIER
    }

    /// Decode the header from the start of a model buffer
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < MIN_HEADER_LEN {
            return Err(ModelError::BufferTooShort {
                need: MIN_HEADER_LEN,
                have: data.len(),
            });
        }

        let root = LittleEndian::read_u32(&data[0..4]) as usize;
        let mut file_identifier = [0u8; 4];
        file_identifier.copy_from_slice(&data[4..8]);

        if root.checked_add(4).map_or(true, |end| end > data.len()) {
            return Err(ModelError::Malformed(format!(
                "root table offset {} outside buffer of {} bytes",
                root,
                data.len()
            )));
        }

        let soffset = LittleEndian::read_i32(&data[root..root + 4]) as i64;
        let vtable = root as i64 - soffset;
        if vtable < 0 || vtable as usize + VTABLE_PREFIX_LEN > data.len() {
            return Err(ModelError::Malformed(format!(
                "vtable offset {} outside buffer of {} bytes",
                vtable,
                data.len()
            )));
        }
        let vtable = vtable as usize;

        let vtable_len = LittleEndian::read_u16(&data[vtable..vtable + 2]) as usize;
        let table_len = LittleEndian::read_u16(&data[vtable + 2..vtable + 4]) as usize;
        if vtable_len < VTABLE_PREFIX_LEN || vtable + vtable_len > data.len() {
            return Err(ModelError::Malformed(format!(
                "vtable length {} invalid",
                vtable_len
            )));
        }

        let slot = VTABLE_PREFIX_LEN + 2 * VERSION_FIELD;
        let field_offset = if slot + 2 <= vtable_len {
            LittleEndian::read_u16(&data[vtable + slot..vtable + slot + 2]) as usize
        } else {
            0
        };

        // Absent fields take the schema default
        if field_offset == 0 {
            return Ok(Self {
                schema_version: 0,
                file_identifier,
            });
        }

        let start = root + field_offset;
        if field_offset + 4 > table_len || start + 4 > data.len() {
            return Err(ModelError::Malformed(format!(
                "version field at offset {} outside root table",
                field_offset
            )));
        }

        Ok(Self {
            schema_version: LittleEndian::read_u32(&data[start..start + 4]),
            file_identifier,
        })
    }

    /// Encode a minimal buffer holding just this header, followed by `body`
    pub fn encode_with_body(&self, body: &[u8]) -> Result<Vec<u8>> {
        // root offset, identifier, vtable (6 bytes) + 2 padding, table (8 bytes)
        const VTABLE_AT: u32 = 8;
        const ROOT_AT: u32 = 16;

        let mut buf = Vec::with_capacity(ROOT_AT as usize + 8 + body.len());
        buf.write_u32::<LittleEndian>(ROOT_AT)?;
        buf.extend_from_slice(&self.file_identifier);

        buf.write_u16::<LittleEndian>(6)?; // vtable length
        buf.write_u16::<LittleEndian>(8)?; // table length
        buf.write_u16::<LittleEndian>(4)?; // version field offset
        buf.write_u16::<LittleEndian>(0)?; // padding

        buf.write_i32::<LittleEndian>((ROOT_AT - VTABLE_AT) as i32)?;
        buf.write_u32::<LittleEndian>(self.schema_version)?;

        buf.extend_from_slice(body);
        Ok(buf)
    }

    /// Encode a minimal buffer holding just this header
    pub fn encode(&self) -> Result<Vec<u8>> {
        self.encode_with_body(&[])
    }
}
