//! RIFF/WAVE streaming header format
//!
//! Audio arrives as a stream of chunks where only the first one carries any
//! framing. The recorder writes the header before it knows how long the
//! capture is going to be, so both length fields in it are placeholders
//! (usually `0x7FFFFFFF`). Nothing in here ever trusts them: the payload
//! length is always computed from the bytes actually received.
//!
//! Unless otherwise noted everything is stored in Little Endian format.
//!
//! # Top Level
//!
//! | Offset | Type    | Name       | Description |
//! | -----: | ------: | ---------- | ----------- |
//! | 0      | [u8; 4] | magic      | `RIFF` |
//! | 4      | u32     | chunk size | Size of the whole file minus 8, placeholder while streaming |
//! | 8      | [u8; 4] | format     | `WAVE` |
//! | 12     | [u8; 4] | fmt id     | `fmt ` |
//! | 16     | u32     | fmt size   | 16 (canonical) or 18 (extended) |
//!
//! ## fmt
//!
//! | Offset | Type | Name            | Description |
//! | -----: | ---: | --------------- | ----------- |
//! | 20     | u16  | encoding        | Must be `1` (integer PCM) |
//! | 22     | u16  | channels        | |
//! | 24     | u32  | sampling rate   | |
//! | 28     | u32  | byte rate       | Not interpreted |
//! | 32     | u16  | block align     | Not interpreted |
//! | 34     | u16  | bits per sample | |
//! | 36     | u16  | extension size  | Only present when fmt size is 18 |
//!
//! An extended `fmt ` block is followed by `extension size` bytes which are
//! carried along untouched.
//!
//! # Blocks after fmt
//!
//! Each block is a `[u8; 4]` id followed by a u32 declared size. Any number
//! of `LIST` blocks may appear, these are skipped by their declared size. The
//! first block that is not a `LIST` must be `data`, its payload begins right
//! after its own 8 byte id+size header.
//!
//! | Block  | Description |
//! | :----: | ----------- |
//! | LIST   | Metadata, skipped but copied verbatim on rewrite |
//! | data   | Raw sample bytes, declared size is a placeholder while streaming |
pub mod cursor;
pub mod header;
pub mod rewrite;

use thiserror::Error;

pub const MAGIC: &[u8; 4] = b"RIFF";
pub const FORMAT: &[u8; 4] = b"WAVE";
pub const FMT_ID: &[u8; 4] = b"fmt ";
pub const LIST_ID: &[u8; 4] = b"LIST";
pub const DATA_ID: &[u8; 4] = b"data";

pub const FMT_SIZE_PCM: u32 = 16;
pub const FMT_SIZE_EXTENDED: u32 = 18;
pub const ENCODING_PCM: u16 = 1;

// Largest payload the parser accepts
pub const MAX_PAYLOAD_LENGTH: u64 = (1 << 33) - 1;

pub const TRUNCATED_HEADER: &str = "truncated header";

#[derive(Error, Debug, PartialEq)]
pub enum RiffError {
    #[error("{0}")]
    Format(&'static str),
    #[error("payload length {0} out of range")]
    Length(u64),
}

#[cfg(test)]
pub mod testing;
