/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use crate::enums::ImageMode;

/// Unpack one encoded row into 8 bit samples.
///
/// - Depths below 8 are expanded, luma samples are scaled to the full
///   range while palette indices are kept as they are.
/// - 16 bit samples are big endian, only the high byte is kept.
///
/// `out` must hold exactly one row of the pixel buffer.
pub(crate) fn unpack_row(raw: &[u8], mode: ImageMode, out: &mut [u8]) {
    match mode.depth() {
        8 => {
            let len = out.len().min(raw.len());
            out[..len].copy_from_slice(&raw[..len]);
        }
        16 => {
            for (out_px, in_px) in out.iter_mut().zip(raw.chunks_exact(2)) {
                *out_px = in_px[0];
            }
        }
        depth @ (1 | 2 | 4) => expand_bits_to_byte(raw, depth, mode.sample_scale(), out),
        _ => unreachable!("modes are validated on creation")
    }
}

/// Expand samples packed `depth` bits at a time, most significant bits first
fn expand_bits_to_byte(raw: &[u8], depth: u8, scale: u8, out: &mut [u8]) {
    let per_byte = usize::from(8 / depth);
    let mask = (1_u8 << depth) - 1;

    for (out_chunk, in_val) in out.chunks_mut(per_byte).zip(raw) {
        for (p, out_px) in out_chunk.iter_mut().enumerate() {
            let shift = 8 - depth * (p as u8 + 1);

            *out_px = scale.wrapping_mul((in_val >> shift) & mask);
        }
    }
}
