use std::io::Write;

use tracing::trace;

use crate::{Error, Result};

/// Number of completed bytes held before they are handed to the sink.
pub const BUFFER_CAPACITY: usize = 256;

/// Packs bits into bytes and forwards them to a borrowed sink in chunks of
/// [`BUFFER_CAPACITY`] bytes. Bits are ordered most to least significant,
/// both within a byte and within the values passed to [`BitPacker::write`].
///
/// Nothing is written on drop, [`BitPacker::flush`] must be called once all
/// bits have been written.
pub struct BitPacker<'a, W: Write> {
    sink: &'a mut W,

    buffer: [u8; BUFFER_CAPACITY],
    len: usize,

    pending: u8,
    bits_remaining: u8,

    bits_written: u64,
}

impl<'a, W: Write> BitPacker<'a, W> {
    pub fn new(sink: &'a mut W) -> Self {
        Self {
            sink,
            buffer: [0; BUFFER_CAPACITY],
            len: 0,
            pending: 0,
            bits_remaining: 8,
            bits_written: 0,
        }
    }

    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.bits_remaining -= 1;
        self.pending |= (bit as u8) << self.bits_remaining;
        self.bits_written += 1;

        if self.bits_remaining == 0 {
            self.commit_pending();
            if self.len == BUFFER_CAPACITY {
                self.drain()?;
            }
        }

        Ok(())
    }

    /// Writes the low `bits` bits of `value`, most significant first. Any
    /// higher bits of `value` are ignored. Equivalent to:
    /// ```rust,ignore
    /// (0..bits).rev().for_each(|bit| self.write_bit((value >> bit) & 1 != 0));
    /// ```
    pub fn write(&mut self, value: u64, bits: u32) -> Result<()> {
        if bits > u64::BITS {
            return Err(Error::BitCountTooLarge(bits));
        }

        for bit in (0..bits).rev() {
            self.write_bit((value >> bit) & 1 != 0)?;
        }

        Ok(())
    }

    /// Commits any partially filled byte (low bits left as zero) and writes
    /// all buffered bytes to the sink. Afterwards the packer is byte aligned
    /// and holds no buffered data.
    pub fn flush(&mut self) -> Result<()> {
        if self.bits_remaining < 8 {
            self.commit_pending();
        }

        if self.len > 0 {
            self.drain()?;
        }

        Ok(())
    }

    /// Total number of bits accepted since construction, excluding padding.
    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    pub fn is_aligned(&self) -> bool {
        self.bits_remaining == 8
    }

    fn commit_pending(&mut self) {
        self.buffer[self.len] = self.pending;
        self.len += 1;

        self.pending = 0;
        self.bits_remaining = 8;
    }

    fn drain(&mut self) -> Result<()> {
        let len = self.len;
        trace!("writing {len} packed bytes to sink");

        self.len = 0;
        self.sink
            .write_all(&self.buffer[..len])
            .map_err(|source| Error::SinkWriteFailed { len, source })
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use proptest::prelude::*;

    use super::*;

    /// Records every chunk handed to it so tests can check write boundaries.
    #[derive(Default)]
    struct RecordingSink {
        writes: Vec<Vec<u8>>,
    }

    impl RecordingSink {
        fn bytes(&self) -> Vec<u8> {
            self.writes.concat()
        }
    }

    impl Write for RecordingSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.writes.push(buf.to_vec());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "sink closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn read_bits(bytes: &[u8], start: usize, count: u32) -> u64 {
        (0..count as usize).fold(0, |acc, i| {
            let bit = start + i;
            let value = (bytes[bit / 8] >> (7 - bit % 8)) & 1;
            (acc << 1) | value as u64
        })
    }

    #[test]
    fn msb_first_within_byte() {
        let mut sink = RecordingSink::default();
        let mut packer = BitPacker::new(&mut sink);
        for bit in [true, false, true, true, false, false, false, true] {
            packer.write_bit(bit).unwrap();
        }
        packer.flush().unwrap();

        assert_eq!(sink.bytes(), vec![0b1011_0001]);
    }

    #[test]
    fn multi_bit_values_span_bytes() {
        let mut sink = RecordingSink::default();
        let mut packer = BitPacker::new(&mut sink);
        packer.write(0b101, 3).unwrap();
        packer.write(0xABC, 12).unwrap();
        packer.write(1, 1).unwrap();
        packer.flush().unwrap();

        // 101 1010 1011 1100 1
        assert_eq!(sink.bytes(), vec![0b1011_0101, 0b0111_1001]);
    }

    #[test]
    fn high_bits_are_ignored() {
        let mut sink = RecordingSink::default();
        let mut packer = BitPacker::new(&mut sink);
        packer.write(0xFFFF_FF0F, 8).unwrap();
        packer.flush().unwrap();

        assert_eq!(sink.bytes(), vec![0x0F]);
    }

    #[test]
    fn zero_bits_is_noop() {
        let mut sink = RecordingSink::default();
        let mut packer = BitPacker::new(&mut sink);
        packer.write(u64::MAX, 0).unwrap();
        assert_eq!(packer.bits_written(), 0);
        packer.flush().unwrap();

        assert!(sink.writes.is_empty());
    }

    #[test]
    fn full_width_value() {
        let mut sink = RecordingSink::default();
        let mut packer = BitPacker::new(&mut sink);
        packer.write(0x0123_4567_89AB_CDEF, 64).unwrap();
        packer.flush().unwrap();

        assert_eq!(sink.bytes(), 0x0123_4567_89AB_CDEF_u64.to_be_bytes());
    }

    #[test]
    fn rejects_oversized_bit_count() {
        let mut sink = RecordingSink::default();
        let mut packer = BitPacker::new(&mut sink);

        assert!(matches!(
            packer.write(0, 65),
            Err(Error::BitCountTooLarge(65))
        ));
        assert_eq!(packer.bits_written(), 0);
    }

    #[test]
    fn partial_byte_is_zero_padded() {
        let mut sink = RecordingSink::default();
        let mut packer = BitPacker::new(&mut sink);
        packer.write(0b111, 3).unwrap();
        assert!(!packer.is_aligned());
        packer.flush().unwrap();
        assert!(packer.is_aligned());

        assert_eq!(sink.bytes(), vec![0b1110_0000]);
    }

    #[test]
    fn whole_bytes_have_no_padding() {
        let mut sink = RecordingSink::default();
        let mut packer = BitPacker::new(&mut sink);
        for i in 0..24 {
            packer.write_bit(i % 3 == 0).unwrap();
        }
        packer.flush().unwrap();

        assert_eq!(sink.bytes(), vec![0b1001_0010, 0b0100_1001, 0b0010_0100]);
    }

    #[test]
    fn double_flush_writes_once() {
        let mut sink = RecordingSink::default();
        let mut packer = BitPacker::new(&mut sink);
        packer.write(0x5A, 8).unwrap();
        packer.flush().unwrap();
        packer.flush().unwrap();

        assert_eq!(sink.writes, vec![vec![0x5A]]);
    }

    #[test]
    fn writes_after_flush_start_new_byte() {
        let mut sink = RecordingSink::default();
        let mut packer = BitPacker::new(&mut sink);
        packer.write_bit(true).unwrap();
        packer.flush().unwrap();
        packer.write_bit(true).unwrap();
        packer.flush().unwrap();

        assert_eq!(sink.writes, vec![vec![0x80], vec![0x80]]);
    }

    #[test]
    fn full_buffer_is_written_before_flush() {
        let mut sink = RecordingSink::default();
        let mut packer = BitPacker::new(&mut sink);
        for i in 0..BUFFER_CAPACITY * 8 {
            packer.write_bit(i % 2 == 0).unwrap();
        }
        packer.flush().unwrap();
        assert_eq!(packer.bits_written(), 2048);

        assert_eq!(sink.writes.len(), 1);
        assert_eq!(sink.writes[0], vec![0xAA; BUFFER_CAPACITY]);
    }

    #[test]
    fn buffer_wraps_across_chunks() {
        let mut sink = RecordingSink::default();
        let mut packer = BitPacker::new(&mut sink);
        for i in 0..300u64 {
            packer.write(i, 8).unwrap();
        }
        packer.flush().unwrap();

        assert_eq!(sink.writes.len(), 2);
        assert_eq!(sink.writes[0].len(), BUFFER_CAPACITY);
        assert_eq!(sink.writes[1].len(), 300 - BUFFER_CAPACITY);
        let expected = (0..300u64).map(|i| i as u8).collect::<Vec<_>>();
        assert_eq!(sink.bytes(), expected);
    }

    #[test]
    fn sink_failure_on_full_buffer() {
        let mut sink = FailingSink;
        let mut packer = BitPacker::new(&mut sink);
        for _ in 0..BUFFER_CAPACITY - 1 {
            packer.write(0xFF, 8).unwrap();
        }

        let err = packer.write(0xFF, 8).unwrap_err();
        assert!(matches!(
            err,
            Error::SinkWriteFailed {
                len: BUFFER_CAPACITY,
                ..
            }
        ));
    }

    #[test]
    fn sink_failure_on_flush() {
        let mut sink = FailingSink;
        let mut packer = BitPacker::new(&mut sink);
        packer.write(0b1, 1).unwrap();

        assert!(matches!(
            packer.flush(),
            Err(Error::SinkWriteFailed { len: 1, .. })
        ));
    }

    #[test]
    fn empty_flush_does_not_touch_sink() {
        let mut sink = FailingSink;
        let mut packer = BitPacker::new(&mut sink);
        assert!(packer.flush().is_ok());
    }

    proptest! {
        #[test]
        fn values_read_back_msb_first(
            values in prop::collection::vec((any::<u64>(), 0..=32u32), 1..64)
        ) {
            let mut sink = RecordingSink::default();
            let mut packer = BitPacker::new(&mut sink);
            for &(value, bits) in &values {
                packer.write(value, bits).unwrap();
            }
            let total = packer.bits_written();
            packer.flush().unwrap();

            let bytes = sink.bytes();
            prop_assert_eq!(bytes.len() as u64, total.div_ceil(8));

            let mut pos = 0;
            for &(value, bits) in &values {
                let mask = 1u64.checked_shl(bits).map_or(u64::MAX, |x| x - 1);
                prop_assert_eq!(read_bits(&bytes, pos, bits), value & mask);
                pos += bits as usize;
            }

            // Padding after the final bit must be zero.
            let padding = (bytes.len() * 8 - pos) as u32;
            prop_assert_eq!(read_bits(&bytes, pos, padding), 0);
        }
    }
}
