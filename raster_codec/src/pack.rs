//! Raw bit packed image output. Each image is written as a fixed header
//! followed by the top `depth` bits of every pixel in row-major order, all
//! MSB-first and zero padded to a whole byte at the end.

use std::io::Write;

use tracing::debug;

use crate::{container::BitPacker, container::Image, Error, Result};

/// Size of [`PackHeader`] in bits.
pub const HEADER_BITS: u64 = 32 + 32 + 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackHeader {
    pub width: u32,
    pub height: u32,
    pub depth: u8,
}

impl PackHeader {
    pub fn serialize<W: Write>(&self, packer: &mut BitPacker<W>) -> Result<()> {
        packer.write(self.width as u64, 32)?;
        packer.write(self.height as u64, 32)?;
        packer.write(self.depth as u64, 8)
    }
}

/// Writes `image` to `sink` with `depth` bits per pixel and returns the
/// number of pixel bits written, not counting the header or padding.
pub fn pack_image<W: Write>(sink: &mut W, image: &Image, depth: u8) -> Result<u64> {
    if !(1..=8).contains(&depth) {
        return Err(Error::InvalidDepth(depth));
    }

    let invalid_size = || Error::InvalidDimensions {
        org_width: image.size.x,
        org_height: image.size.y,
        width: image.size.x,
        height: image.size.y,
        len: image.data().len(),
    };
    let header = PackHeader {
        width: image.size.x.try_into().map_err(|_| invalid_size())?,
        height: image.size.y.try_into().map_err(|_| invalid_size())?,
        depth,
    };

    let mut packer = BitPacker::new(sink);
    header.serialize(&mut packer)?;

    let shift = 8 - depth;
    for &pixel in image.data() {
        packer.write((pixel >> shift) as u64, depth as u32)?;
    }
    packer.flush()?;

    let payload = packer.bits_written() - HEADER_BITS;
    debug!(
        "packed {}x{} image at {depth} bpp ({payload} bits)",
        header.width, header.height
    );
    Ok(payload)
}
