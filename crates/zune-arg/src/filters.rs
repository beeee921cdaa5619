/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Scanline de-filtering for row-filtered image data.
//!
//! The filters are the five png filters, the row above the
//! first scanline is treated as zero.

use alloc::format;
use alloc::vec;
use alloc::vec::Vec;

use crate::enums::FilterMethod;
use crate::errors::ArgDecodeErrors;

/// Undo scanline filtering of `height` rows.
///
/// Every row in `data` is a filter byte followed by `stride` bytes,
/// `components` is the byte distance to the same sample of the previous pixel.
///
/// Returns the de-filtered rows without their filter bytes.
pub(crate) fn unfilter_rows(
    data: &[u8], height: usize, stride: usize, components: usize
) -> Result<Vec<u8>, ArgDecodeErrors> {
    let expected = (stride + 1) * height;

    if data.len() < expected {
        return Err(ArgDecodeErrors::DecodeError(format!(
            "Not enough pixels, expected {} but found {}",
            expected,
            data.len()
        )));
    }
    let mut out = vec![0_u8; stride * height];
    let zero_row = vec![0_u8; stride];

    for (row, in_stride) in data.chunks_exact(stride + 1).take(height).enumerate() {
        let (prev, current) = out.split_at_mut(row * stride);
        let current = &mut current[..stride];

        let prev_row = if row == 0 {
            &zero_row[..]
        } else {
            &prev[(row - 1) * stride..]
        };
        let filter_byte = in_stride[0];
        let raw = &in_stride[1..];

        let filter = FilterMethod::from_int(filter_byte).ok_or_else(|| {
            ArgDecodeErrors::DecodeError(format!("Unknown filter {filter_byte}"))
        })?;

        match filter {
            FilterMethod::None => current.copy_from_slice(raw),
            FilterMethod::Sub => handle_sub(raw, current, components),
            FilterMethod::Up => handle_up(prev_row, raw, current),
            FilterMethod::Average => handle_avg(prev_row, raw, current, components),
            FilterMethod::Paeth => handle_paeth(prev_row, raw, current, components)
        }
    }
    Ok(out)
}

#[allow(clippy::manual_memcpy)]
fn handle_sub(raw: &[u8], current: &mut [u8], components: usize) {
    let lead = components.min(raw.len());
    // handle leftmost byte explicitly
    for i in 0..lead {
        current[i] = raw[i];
    }
    for i in lead..raw.len() {
        let a = current[i - components];
        current[i] = raw[i].wrapping_add(a);
    }
}

fn handle_up(prev_row: &[u8], raw: &[u8], current: &mut [u8]) {
    for ((filt, recon), up) in raw.iter().zip(current).zip(prev_row) {
        *recon = (*filt).wrapping_add(*up);
    }
}

fn handle_avg(prev_row: &[u8], raw: &[u8], current: &mut [u8], components: usize) {
    let lead = components.min(raw.len());

    for i in 0..lead {
        current[i] = raw[i].wrapping_add(prev_row[i] >> 1);
    }
    for i in lead..raw.len() {
        let a = current[i - components];
        let b = prev_row[i];
        // average without overflow, from stanford bit-hacks
        let c = (a & b) + ((a ^ b) >> 1);

        current[i] = raw[i].wrapping_add(c);
    }
}

fn handle_paeth(prev_row: &[u8], raw: &[u8], current: &mut [u8], components: usize) {
    let lead = components.min(raw.len());

    for i in 0..lead {
        current[i] = raw[i].wrapping_add(paeth(0, prev_row[i], 0));
    }
    for i in lead..raw.len() {
        let paeth_res = paeth(
            current[i - components],
            prev_row[i],
            prev_row[i - components]
        );
        current[i] = raw[i].wrapping_add(paeth_res);
    }
}

#[inline(always)]
fn paeth(a: u8, b: u8, c: u8) -> u8 {
    // branch free formulation from stb_image, equivalent to the reference predictor
    let a = i32::from(a);
    let b = i32::from(b);
    let c = i32::from(c);
    let thresh = c * 3 - (a + b);
    let lo = if a < b { a } else { b };
    let hi = if a < b { b } else { a };

    let t0 = if hi <= thresh { lo } else { c };
    let t1 = if thresh <= lo { hi } else { t0 };
    t1 as u8
}
