mod bit_packer;
mod image;

pub use bit_packer::{BitPacker, BUFFER_CAPACITY};
pub use image::Image;
