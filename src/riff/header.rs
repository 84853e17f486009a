use crate::riff::cursor::RiffCursor;
use crate::riff::RiffError;
use crate::riff::{DATA_ID, FMT_ID, FORMAT, LIST_ID, MAGIC};
use crate::riff::{ENCODING_PCM, FMT_SIZE_EXTENDED, FMT_SIZE_PCM, MAX_PAYLOAD_LENGTH};

#[derive(Debug, Clone, PartialEq)]
pub struct RiffHeader {
    pub num_channels: u16,
    pub sampling_rate: u32,
    pub bits_per_sample: u16,

    // First payload byte within the parsed buffer
    pub payload_offset: usize,

    // Live figure, only what this buffer holds past the offset. Never the
    // final length of a stream that is still being received.
    pub payload_length: u64,
}

/// Parse the header at the start of `buf`.
///
/// The declared `data` size is ignored, the payload length is whatever the
/// buffer holds after the payload offset.
pub fn parse(buf: &[u8]) -> Result<RiffHeader, RiffError> {
    let mut cur = RiffCursor::new(buf);

    if &cur.read_tag()? != MAGIC {
        return Err(RiffError::Format("bad magic"));
    }

    // Outer chunk size, placeholder while streaming
    cur.skip(4)?;

    if &cur.read_tag()? != FORMAT {
        return Err(RiffError::Format("bad format"));
    }

    if &cur.read_tag()? != FMT_ID {
        return Err(RiffError::Format("bad fmt block id"));
    }

    let fmt_size = cur.read_u32()?;
    if fmt_size != FMT_SIZE_PCM && fmt_size != FMT_SIZE_EXTENDED {
        return Err(RiffError::Format("unsupported fixed-block size"));
    }

    if cur.read_u16()? != ENCODING_PCM {
        return Err(RiffError::Format("unsupported encoding"));
    }

    let num_channels = cur.read_u16()?;
    let sampling_rate = cur.read_u32()?;

    // Byte rate + block align, derivable so not interpreted
    cur.skip(6)?;

    let bits_per_sample = cur.read_u16()?;

    if fmt_size == FMT_SIZE_EXTENDED {
        let extension_size = cur.read_u16()?;
        cur.skip(extension_size as u64)?;
    }

    let payload_offset = locate_payload(&mut cur)?;
    let payload_length = check_payload_length((buf.len() - payload_offset) as u64)?;

    Ok(RiffHeader {
        num_channels,
        sampling_rate,
        bits_per_sample,
        payload_offset,
        payload_length,
    })
}

// Walk the blocks after fmt, skipping LIST, until the data block
fn locate_payload(cur: &mut RiffCursor) -> Result<usize, RiffError> {
    loop {
        let id = cur.read_tag()?;
        let size = cur.read_u32()?;

        if &id == LIST_ID {
            cur.skip(size as u64)?;
        } else if &id == DATA_ID {
            return Ok(cur.position());
        } else {
            return Err(RiffError::Format("expected payload block"));
        }
    }
}

pub fn check_payload_length(len: u64) -> Result<u64, RiffError> {
    if len > MAX_PAYLOAD_LENGTH {
        Err(RiffError::Length(len))
    } else {
        Ok(len)
    }
}

// Both length fields are u32, a payload is only framable while the data
// size and the outer chunk size (payload + offset - 8) both fit
pub fn check_framed_length(payload_offset: usize, len: u64) -> Result<u64, RiffError> {
    let len = check_payload_length(len)?;
    if len + payload_offset as u64 - 8 > u32::MAX as u64 {
        Err(RiffError::Length(len))
    } else {
        Ok(len)
    }
}
