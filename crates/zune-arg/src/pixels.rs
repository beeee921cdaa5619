/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Pixel buffers and the compositing primitives frames are built with

use alloc::vec;
use alloc::vec::Vec;

use crate::enums::ArgColor;
use crate::errors::ArgDecodeErrors;

/// A rectangle given by its top left (inclusive) and
/// bottom right (exclusive) corners
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Rect {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize
}

impl Rect {
    /// Rectangle of `width` by `height` pixels starting at `(x, y)`
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Rect {
        Rect {
            x0: x,
            y0: y,
            x1: x.saturating_add(width),
            y1: y.saturating_add(height)
        }
    }

    pub const fn width(&self) -> usize {
        self.x1.saturating_sub(self.x0)
    }

    pub const fn height(&self) -> usize {
        self.y1.saturating_sub(self.y0)
    }
}

/// An owned image, interleaved 8 bit samples in row major order
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PixelBuffer {
    width:  usize,
    height: usize,
    color:  ArgColor,
    pixels: Vec<u8>
}

impl PixelBuffer {
    /// Create a zero filled buffer
    pub fn new(width: usize, height: usize, color: ArgColor) -> PixelBuffer {
        PixelBuffer::fill(width, height, color, 0)
    }

    /// Create a buffer with every sample set to `value`
    pub fn fill(width: usize, height: usize, color: ArgColor, value: u8) -> PixelBuffer {
        let size = width * height * color.num_components();

        PixelBuffer {
            width,
            height,
            color,
            pixels: vec![value; size]
        }
    }

    /// Wrap already decoded pixels.
    ///
    /// Returns `None` if `pixels` is not exactly `width*height*components` long
    pub fn from_pixels(
        width: usize, height: usize, color: ArgColor, pixels: Vec<u8>
    ) -> Option<PixelBuffer> {
        let expected = width
            .checked_mul(height)?
            .checked_mul(color.num_components())?;

        if pixels.len() != expected {
            return None;
        }
        Some(PixelBuffer {
            width,
            height,
            color,
            pixels
        })
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    /// Width and height as a tuple
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub const fn color(&self) -> ArgColor {
        self.color
    }

    /// Raw interleaved samples
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Samples of the pixel at `(x, y)` or `None` if out of bounds
    pub fn pixel(&self, x: usize, y: usize) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let comps = self.color.num_components();
        let start = (y * self.width + x) * comps;

        self.pixels.get(start..start + comps)
    }

    /// Bytes in one row of pixels
    pub const fn stride(&self) -> usize {
        self.width * self.color.num_components()
    }

    /// Copy out `rect`.
    ///
    /// The returned buffer is always `rect` sized, parts of
    /// `rect` outside this image are zero.
    pub fn crop(&self, rect: Rect) -> PixelBuffer {
        let mut out = PixelBuffer::new(rect.width(), rect.height(), self.color);
        let comps = self.color.num_components();

        let x_end = rect.x1.min(self.width);
        let y_end = rect.y1.min(self.height);

        if rect.x0 >= x_end || rect.y0 >= y_end {
            return out;
        }
        let copy_bytes = (x_end - rect.x0) * comps;
        let in_stride = self.stride();
        let out_stride = out.stride();

        for (row, y) in (rect.y0..y_end).enumerate() {
            let in_start = y * in_stride + rect.x0 * comps;
            let out_start = row * out_stride;

            out.pixels[out_start..out_start + copy_bytes]
                .copy_from_slice(&self.pixels[in_start..in_start + copy_bytes]);
        }
        out
    }

    /// Clip a `src` sized rectangle at `(x, y)` to this image.
    ///
    /// Returns the number of pixel columns and rows that overlap,
    /// both are zero when nothing overlaps.
    fn clip(&self, src: &PixelBuffer, x: usize, y: usize) -> (usize, usize) {
        let columns = src.width.min(self.width.saturating_sub(x));
        let rows = src.height.min(self.height.saturating_sub(y));

        if columns == 0 || rows == 0 {
            return (0, 0);
        }
        (columns, rows)
    }

    /// Paste `src` with its top left corner at `(x, y)`, replacing
    /// the pixels underneath.
    ///
    /// Parts of `src` falling outside this image are dropped.
    ///
    /// Both images must have the same colour, the source is never
    /// converted, a mismatch is reported as [`ArgDecodeErrors::ModeMismatch`].
    pub fn paste(&mut self, src: &PixelBuffer, x: usize, y: usize) -> Result<(), ArgDecodeErrors> {
        if self.color != src.color {
            return Err(ArgDecodeErrors::ModeMismatch(self.color, src.color));
        }
        let (columns, rows) = self.clip(src, x, y);

        if rows == 0 {
            return Ok(());
        }
        let comps = self.color.num_components();
        let copy_bytes = columns * comps;
        let dst_stride = self.stride();
        let src_stride = src.stride();

        for row in 0..rows {
            let dst_start = (y + row) * dst_stride + x * comps;
            let src_start = row * src_stride;

            self.pixels[dst_start..dst_start + copy_bytes]
                .copy_from_slice(&src.pixels[src_start..src_start + copy_bytes]);
        }
        Ok(())
    }

    /// Paste `src` at `(x, y)` using its own alpha channel as the mask.
    ///
    /// When both images carry alpha, every sample including alpha is blended.
    /// An RGBA source can also be pasted into an RGB image and a luma-alpha
    /// source into a luma image, in which case only colour samples are blended.
    pub fn paste_with_alpha(
        &mut self, src: &PixelBuffer, x: usize, y: usize
    ) -> Result<(), ArgDecodeErrors> {
        let compatible = src.color.has_alpha()
            && (self.color == src.color || self.color == src.color.without_alpha());

        if !compatible {
            return Err(ArgDecodeErrors::ModeMismatch(self.color, src.color));
        }
        let (columns, rows) = self.clip(src, x, y);

        if rows == 0 {
            return Ok(());
        }
        let src_comps = src.color.num_components();
        let dst_comps = self.color.num_components();
        let dst_stride = self.stride();
        let src_stride = src.stride();

        for row in 0..rows {
            let dst_start = (y + row) * dst_stride + x * dst_comps;
            let src_start = row * src_stride;

            let dst_row = &mut self.pixels[dst_start..dst_start + columns * dst_comps];
            let src_row = &src.pixels[src_start..src_start + columns * src_comps];

            for (dst_px, src_px) in dst_row
                .chunks_exact_mut(dst_comps)
                .zip(src_row.chunks_exact(src_comps))
            {
                let alpha = src_px[src_comps - 1];

                for (out, sample) in dst_px.iter_mut().zip(src_px) {
                    *out = blend(*out, *sample, alpha);
                }
            }
        }
        Ok(())
    }

    /// Add two images sample by sample, wrapping at 256.
    ///
    /// The result covers the area both images share.
    pub fn add_modulo(&self, other: &PixelBuffer) -> Result<PixelBuffer, ArgDecodeErrors> {
        if self.color != other.color {
            return Err(ArgDecodeErrors::ModeMismatch(self.color, other.color));
        }
        let width = self.width.min(other.width);
        let height = self.height.min(other.height);

        let mut out = PixelBuffer::new(width, height, self.color);
        let row_bytes = out.stride();

        for row in 0..height {
            let a = &self.pixels[row * self.stride()..][..row_bytes];
            let b = &other.pixels[row * other.stride()..][..row_bytes];
            let c = &mut out.pixels[row * row_bytes..][..row_bytes];

            for ((out_px, a_px), b_px) in c.iter_mut().zip(a).zip(b) {
                *out_px = a_px.wrapping_add(*b_px);
            }
        }
        Ok(out)
    }

    /// Turn a palette image into an RGB image by looking up every index
    /// in `palette`, other colours are returned unchanged.
    pub fn expand_palette(&self, palette: &[[u8; 3]]) -> PixelBuffer {
        if self.color != ArgColor::Palette {
            return self.clone();
        }
        let mut out = PixelBuffer::new(self.width, self.height, ArgColor::RGB);

        for (px, index) in out.pixels.chunks_exact_mut(3).zip(&self.pixels) {
            if let Some(entry) = palette.get(usize::from(*index)) {
                px.copy_from_slice(entry);
            }
        }
        out
    }
}

/// Blend `src` over `dst` with weight `alpha`, rounding the
/// same way for every sample.
#[inline(always)]
fn blend(dst: u8, src: u8, alpha: u8) -> u8 {
    let dst = i32::from(dst);
    let src = i32::from(src);
    let alpha = i32::from(alpha);

    let t = (src - dst) * alpha + dst * 255 + 128;

    ((t + (t >> 8)) >> 8) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_extremes() {
        assert_eq!(blend(10, 200, 255), 200);
        assert_eq!(blend(10, 200, 0), 10);
        assert_eq!(blend(0, 255, 128), 128);
    }

    #[test]
    fn crop_outside_is_zero() {
        let image = PixelBuffer::fill(4, 4, ArgColor::Luma, 7);
        let cropped = image.crop(Rect::new(2, 2, 4, 4));

        assert_eq!(cropped.dimensions(), (4, 4));
        assert_eq!(cropped.pixel(0, 0), Some(&[7][..]));
        assert_eq!(cropped.pixel(1, 1), Some(&[7][..]));
        assert_eq!(cropped.pixel(2, 0), Some(&[0][..]));
        assert_eq!(cropped.pixel(0, 3), Some(&[0][..]));
    }

    #[test]
    fn paste_is_clipped() {
        let mut dst = PixelBuffer::new(4, 4, ArgColor::RGB);
        let src = PixelBuffer::fill(3, 3, ArgColor::RGB, 255);

        dst.paste(&src, 2, 2).unwrap();

        for y in 0..4 {
            for x in 0..4 {
                let expected = if x >= 2 && y >= 2 { 255 } else { 0 };
                assert_eq!(dst.pixel(x, y).unwrap(), &[expected; 3]);
            }
        }
    }

    #[test]
    fn paste_outside_leaves_image_alone() {
        let mut dst = PixelBuffer::fill(4, 4, ArgColor::Luma, 3);
        let src = PixelBuffer::fill(2, 2, ArgColor::Luma, 9);

        for (x, y) in [(4, 0), (5, 2), (100, 100), (0, 4), (1, 9), (usize::MAX, 0)] {
            dst.paste(&src, x, y).unwrap();
        }
        assert_eq!(dst.pixels(), &[3; 16]);

        let mut rgb = PixelBuffer::fill(4, 4, ArgColor::RGB, 3);
        let rgba = PixelBuffer::fill(2, 2, ArgColor::RGBA, 255);

        for (x, y) in [(4, 1), (1, 4), (17, 0), (0, usize::MAX)] {
            rgb.paste_with_alpha(&rgba, x, y).unwrap();
        }
        assert_eq!(rgb.pixels(), &[3; 48]);
    }

    #[test]
    fn paste_rejects_other_colours() {
        let mut dst = PixelBuffer::new(4, 4, ArgColor::RGB);
        let src = PixelBuffer::new(2, 2, ArgColor::Luma);

        assert!(matches!(
            dst.paste(&src, 0, 0),
            Err(ArgDecodeErrors::ModeMismatch(ArgColor::RGB, ArgColor::Luma))
        ));
    }

    #[test]
    fn alpha_paste_blends_every_sample() {
        let mut dst = PixelBuffer::fill(2, 1, ArgColor::RGBA, 0);
        let mut src = PixelBuffer::new(2, 1, ArgColor::RGBA);
        // opaque white then fully transparent white
        src.pixels_mut()
            .copy_from_slice(&[255, 255, 255, 255, 255, 255, 255, 0]);

        dst.paste_with_alpha(&src, 0, 0).unwrap();

        assert_eq!(dst.pixel(0, 0).unwrap(), &[255, 255, 255, 255]);
        assert_eq!(dst.pixel(1, 0).unwrap(), &[0, 0, 0, 0]);
    }

    #[test]
    fn alpha_paste_into_image_without_alpha() {
        let mut dst = PixelBuffer::fill(1, 1, ArgColor::Luma, 100);
        let mut src = PixelBuffer::new(1, 1, ArgColor::LumaA);
        src.pixels_mut().copy_from_slice(&[200, 255]);

        dst.paste_with_alpha(&src, 0, 0).unwrap();
        assert_eq!(dst.pixels(), &[200]);

        let rgb = PixelBuffer::new(1, 1, ArgColor::RGB);
        assert!(dst.paste_with_alpha(&rgb, 0, 0).is_err());
    }

    #[test]
    fn add_modulo_wraps() {
        let a = PixelBuffer::fill(2, 2, ArgColor::Luma, 200);
        let b = PixelBuffer::fill(3, 1, ArgColor::Luma, 100);

        let c = a.add_modulo(&b).unwrap();

        assert_eq!(c.dimensions(), (2, 1));
        assert_eq!(c.pixels(), &[44, 44]);
    }

    #[test]
    fn palette_expansion() {
        let mut image = PixelBuffer::new(2, 1, ArgColor::Palette);
        image.pixels_mut().copy_from_slice(&[1, 0]);

        let palette = [[0, 0, 0], [10, 20, 30]];
        let rgb = image.expand_palette(&palette);

        assert_eq!(rgb.color(), ArgColor::RGB);
        assert_eq!(rgb.pixels(), &[10, 20, 30, 0, 0, 0]);
    }
}
