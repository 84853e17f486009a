// Synthetic headers for tests, written the way the browser recorder does
// with placeholder lengths in both size fields
use crate::riff::{FMT_SIZE_EXTENDED, FMT_SIZE_PCM};

// What the browser recorder writes for the data size before it knows better
pub const DATA_SIZE_NOT_SET: u32 = 0x7FFF_FFFF;

pub fn pcm_header(channels: u16, rate: u32, bits: u16) -> Vec<u8> {
    build(channels, rate, bits, None, &[])
}

// Mono 16kHz 16 bit, with optional fmt extension and LIST blocks
pub fn header(extension: Option<&[u8]>, lists: &[&[u8]]) -> Vec<u8> {
    build(1, 16000, 16, extension, lists)
}

fn build(channels: u16, rate: u32, bits: u16, extension: Option<&[u8]>, lists: &[&[u8]]) -> Vec<u8> {
    let block_align = channels * bits / 8;
    let byte_rate = rate * block_align as u32;

    let mut buf = Vec::new();
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&DATA_SIZE_NOT_SET.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    buf.extend_from_slice(b"fmt ");
    match extension {
        None => buf.extend_from_slice(&FMT_SIZE_PCM.to_le_bytes()),
        Some(_) => buf.extend_from_slice(&FMT_SIZE_EXTENDED.to_le_bytes()),
    }
    buf.extend_from_slice(&1u16.to_le_bytes());
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits.to_le_bytes());

    if let Some(ext) = extension {
        buf.extend_from_slice(&(ext.len() as u16).to_le_bytes());
        buf.extend_from_slice(ext);
    }

    for list in lists {
        buf.extend_from_slice(b"LIST");
        buf.extend_from_slice(&(list.len() as u32).to_le_bytes());
        buf.extend_from_slice(list);
    }

    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&DATA_SIZE_NOT_SET.to_le_bytes());
    buf
}

pub fn le_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}
