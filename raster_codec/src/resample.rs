//! Nearest neighbor resampling of single channel images using only integer
//! math. Source positions are stepped with a Bresenham style error
//! accumulator on each axis, so output is identical on every platform.

use std::borrow::Cow;

use tracing::debug;

use crate::{Error, Result};

/// Resizes a row-major `org_width` x `org_height` buffer to `width` x
/// `height`.
///
/// When the size is unchanged the input is returned as [`Cow::Borrowed`]
/// without copying, otherwise a new buffer of `width * height` pixels is
/// allocated.
pub fn resize<T: Copy>(
    pixels: &[T],
    org_width: usize,
    org_height: usize,
    width: usize,
    height: usize,
) -> Result<Cow<'_, [T]>> {
    let valid = org_width > 0
        && org_height > 0
        && width > 0
        && height > 0
        && org_width.checked_mul(org_height) == Some(pixels.len())
        && width.checked_mul(height).is_some();
    if !valid {
        return Err(Error::InvalidDimensions {
            org_width,
            org_height,
            width,
            height,
            len: pixels.len(),
        });
    }

    if org_width == width && org_height == height {
        return Ok(Cow::Borrowed(pixels));
    }

    debug!("resizing {org_width}x{org_height} to {width}x{height}");

    // Whole source rows / columns to advance per output row / column, and
    // the remainders distributed with the error accumulators.
    let row_step = (org_height / height) * org_width;
    let row_fraction_step = org_height % height;
    let col_step = org_width / width;
    let col_fraction_step = org_width % width;

    let mut out = Vec::with_capacity(width * height);

    let mut vfrac = 0;
    let mut source_row_pos = 0;
    let mut last_row_pos = None;

    for row in 0..height {
        if last_row_pos == Some(source_row_pos) {
            // The source row did not advance (vertical upscale), so the
            // previous output row can be reused as is.
            let start = (row - 1) * width;
            out.extend_from_within(start..start + width);
        } else {
            let mut hfrac = 0;
            let mut source_pos = source_row_pos;

            for _ in 0..width {
                out.push(pixels[source_pos]);

                source_pos += col_step;
                hfrac += col_fraction_step;
                if hfrac >= width {
                    hfrac -= width;
                    source_pos += 1;
                }
            }

            last_row_pos = Some(source_row_pos);
        }

        source_row_pos += row_step;
        vfrac += row_fraction_step;
        if vfrac >= height {
            vfrac -= height;
            source_row_pos += org_width;
        }
    }

    debug_assert_eq!(out.len(), width * height);
    Ok(Cow::Owned(out))
}
