use byteorder::{ByteOrder, LittleEndian};

use crate::riff::{RiffError, TRUNCATED_HEADER};

const TRUNCATED: RiffError = RiffError::Format(TRUNCATED_HEADER);

// Bounds checked reader over a header buffer, every read that would run
// off the end fails with a truncated header error instead
pub struct RiffCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> RiffCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        RiffCursor { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn seek(&mut self, pos: usize) -> Result<(), RiffError> {
        if pos > self.buf.len() {
            return Err(TRUNCATED);
        }
        self.pos = pos;
        Ok(())
    }

    pub fn skip(&mut self, len: u64) -> Result<(), RiffError> {
        let pos = usize::try_from(len)
            .ok()
            .and_then(|len| self.pos.checked_add(len))
            .ok_or(TRUNCATED)?;
        self.seek(pos)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], RiffError> {
        let end = self.pos.checked_add(len).ok_or(TRUNCATED)?;
        let out = self.buf.get(self.pos..end).ok_or(TRUNCATED)?;
        self.pos = end;
        Ok(out)
    }

    pub fn read_tag(&mut self) -> Result<[u8; 4], RiffError> {
        let mut tag = [0u8; 4];
        tag.copy_from_slice(self.take(4)?);
        Ok(tag)
    }

    pub fn read_u16(&mut self) -> Result<u16, RiffError> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32, RiffError> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }
}

#[cfg(test)]
mod test_riff_cursor {
    use super::*;

    #[test]
    fn reads_little_endian() {
        let data = [b'f', b'm', b't', b' ', 0x10, 0, 0, 0, 0x01, 0x00];
        let mut cur = RiffCursor::new(&data);

        assert_eq!(&cur.read_tag().unwrap(), b"fmt ");
        assert_eq!(cur.read_u32().unwrap(), 16);
        assert_eq!(cur.read_u16().unwrap(), 1);
        assert_eq!(cur.position(), 10);
    }

    #[test]
    fn short_read_is_truncated() {
        let data = [0x01, 0x02, 0x03];
        let mut cur = RiffCursor::new(&data);

        assert_eq!(cur.read_u32(), Err(RiffError::Format("truncated header")));
        // Failed read does not move the cursor
        assert_eq!(cur.position(), 0);
        assert_eq!(cur.read_u16().unwrap(), 0x0201);
    }

    #[test]
    fn skip_past_end() {
        let data = [0u8; 8];
        let mut cur = RiffCursor::new(&data);

        cur.skip(8).unwrap();
        assert_eq!(cur.position(), 8);
        assert!(cur.skip(1).is_err());
        assert!(cur.skip(u64::MAX).is_err());
    }

    #[test]
    fn seek_bounds() {
        let data = [0u8; 4];
        let mut cur = RiffCursor::new(&data);

        assert!(cur.seek(4).is_ok());
        assert!(cur.seek(5).is_err());
    }
}
