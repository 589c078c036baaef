use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The underlying byte sink rejected a write. The packer that produced
    /// this error holds undefined state and should not be used again.
    #[error("failed to write {len} bytes to sink")]
    SinkWriteFailed {
        len: usize,
        #[source]
        source: io::Error,
    },

    #[error(
        "invalid dimensions: {org_width}x{org_height} -> {width}x{height} \
         with a buffer of {len} pixels"
    )]
    InvalidDimensions {
        org_width: usize,
        org_height: usize,
        width: usize,
        height: usize,
        len: usize,
    },

    #[error("cannot write {0} bits from a 64 bit value")]
    BitCountTooLarge(u32),

    #[error("bit depth must be between 1 and 8, got {0}")]
    InvalidDepth(u8),
}
