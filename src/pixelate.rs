//! Block pixelation by nearest-neighbor resampling.
//!
//! Both passes use the same floor-indexed point sampling rule: destination
//! pixel `d` on an axis of length `dst_len` reads source pixel
//! `floor(d * src_len / dst_len)`. Pixels are never averaged or
//! interpolated, which keeps block edges hard.

use crate::error::EngineError;
use crate::frame::FrameBuffer;

/// Dimensions of the reduced frame for a given pixel size.
///
/// Each axis is `floor(len / pixel_size)`, clamped to at least 1.
///
/// # Errors
/// * `EngineError::InvalidOption` - If `pixel_size` is 0
pub fn reduced_dimensions(
    width: u32,
    height: u32,
    pixel_size: u32,
) -> Result<(u32, u32), EngineError> {
    if pixel_size == 0 {
        return Err(EngineError::InvalidOption(
            "pixel size must be at least 1".to_string(),
        ));
    }
    Ok(((width / pixel_size).max(1), (height / pixel_size).max(1)))
}

/// Source index sampled by destination index `dst` on one axis.
#[inline]
fn source_index(dst: u32, src_len: u32, dst_len: u32) -> usize {
    (dst as u64 * src_len as u64 / dst_len as u64) as usize
}

/// Point-sample `src` onto `dst`, which must already have its final
/// dimensions and the same pixel format.
pub fn resample_into(src: &FrameBuffer, dst: &mut FrameBuffer) -> Result<(), EngineError> {
    src.validate()?;
    dst.validate()?;
    if src.format != dst.format {
        return Err(EngineError::InvalidOption(format!(
            "cannot resample {:?} into {:?}",
            src.format, dst.format
        )));
    }

    let bpp = src.bytes_per_pixel();
    let src_stride = src.stride();
    let dst_stride = dst.stride();

    // Column lookup shared by every row
    let columns: Vec<usize> = (0..dst.width)
        .map(|x| source_index(x, src.width, dst.width) * bpp)
        .collect();

    for (y, dst_row) in dst.data.chunks_exact_mut(dst_stride).enumerate() {
        let sy = source_index(y as u32, src.height, dst.height);
        let src_row = &src.data[sy * src_stride..(sy + 1) * src_stride];

        for (dst_px, &sx) in dst_row.chunks_exact_mut(bpp).zip(&columns) {
            dst_px.copy_from_slice(&src_row[sx..sx + bpp]);
        }
    }

    Ok(())
}

/// Reduce `frame` to `floor(w / pixel_size) x floor(h / pixel_size)`.
pub fn downsample(frame: &FrameBuffer, pixel_size: u32) -> Result<FrameBuffer, EngineError> {
    let mut reduced = FrameBuffer::blank(0, 0, frame.format);
    downsample_into(frame, pixel_size, &mut reduced)?;
    Ok(reduced)
}

/// Reduce `frame` into an existing buffer to avoid allocation.
///
/// `reduced` is resized as needed; its previous contents are discarded.
pub fn downsample_into(
    frame: &FrameBuffer,
    pixel_size: u32,
    reduced: &mut FrameBuffer,
) -> Result<(), EngineError> {
    frame.validate()?;
    let (width, height) = reduced_dimensions(frame.width, frame.height, pixel_size)?;

    reduced.width = width;
    reduced.height = height;
    reduced.format = frame.format;
    reduced.data.resize(reduced.expected_len(), 0);

    resample_into(frame, reduced)
}

/// Expand `reduced` back over the full dimensions of `frame`.
pub fn upsample_into(reduced: &FrameBuffer, frame: &mut FrameBuffer) -> Result<(), EngineError> {
    resample_into(reduced, frame)
}

/// Downsample then upsample `frame` in place, with nothing in between.
pub fn pixelate(frame: &mut FrameBuffer, pixel_size: u32) -> Result<(), EngineError> {
    let reduced = downsample(frame, pixel_size)?;
    upsample_into(&reduced, frame)
}
