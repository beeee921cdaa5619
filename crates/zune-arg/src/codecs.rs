/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Incremental image decoders.
//!
//! Every image header opens one decoder bound to a freshly allocated
//! pixel buffer, image data chunks are fed to it and the end chunk
//! closes it, returning the filled buffer.

use alloc::boxed::Box;
use alloc::format;
use alloc::vec::Vec;

use log::{trace, warn};
use zune_core::bytestream::ZCursor;
use zune_core::colorspace::ColorSpace;
use zune_core::options::DecoderOptions;
use zune_inflate::{DeflateDecoder, DeflateOptions};
use zune_jpeg::JpegDecoder;

use crate::enums::{ArgColor, ImageCodec, ImageMode};
use crate::errors::ArgDecodeErrors;
use crate::filters::unfilter_rows;
use crate::pixels::PixelBuffer;
use crate::unpack::unpack_row;

/// Progress reported by a decoder after it was fed
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DecodeStatus {
    /// More image data is needed
    NeedMore,
    /// The image is complete, further data is ignored
    Done
}

/// A decoder fed with image data in arbitrary pieces
pub(crate) trait IncrementalDecoder {
    fn name(&self) -> &'static str;

    /// Feed bytes, returning how many bytes were consumed
    /// and whether the image is complete.
    ///
    /// Bytes that were not consumed must be passed again,
    /// prefixed to the next piece of data.
    fn feed(&mut self, data: &[u8]) -> Result<(usize, DecodeStatus), ArgDecodeErrors>;

    /// Close the decoder and return the decoded image
    fn finish(self: Box<Self>) -> Result<PixelBuffer, ArgDecodeErrors>;
}

/// Open a decoder for a `width` by `height` image of `mode` encoded with `codec`
pub(crate) fn open_decoder(
    codec: ImageCodec, mode: ImageMode, width: usize, height: usize, options: DecoderOptions
) -> Result<Box<dyn IncrementalDecoder>, ArgDecodeErrors> {
    let stride = mode
        .encoded_stride(width)
        .ok_or(ArgDecodeErrors::TooLargeDimensions("width", usize::MAX, width))?;

    let image = PixelBuffer::new(width, height, mode.color());

    match codec {
        ImageCodec::RowFilter => Ok(Box::new(RowFilterDecoder {
            image,
            mode,
            stride,
            compressed: Vec::new(),
            options
        })),
        ImageCodec::Raw => Ok(Box::new(RawDecoder {
            image,
            mode,
            stride,
            row: 0,
            options
        })),
        ImageCodec::Jpeg => {
            let colorspace = match mode.color() {
                ArgColor::Luma => ColorSpace::Luma,
                ArgColor::RGB => ColorSpace::RGB,
                ArgColor::RGBA => ColorSpace::RGBA,
                ArgColor::Palette | ArgColor::LumaA => {
                    return Err(ArgDecodeErrors::Generic(format!(
                        "JPEG images cannot be decoded to {:?}",
                        mode.color()
                    )));
                }
            };
            Ok(Box::new(JpegImageDecoder {
                width,
                height,
                color: mode.color(),
                colorspace,
                data: Vec::new(),
                options
            }))
        }
    }
}

/// zlib compressed, scanline filtered image data.
///
/// The zlib stream is collected and inflated in one go
/// when the decoder is closed.
struct RowFilterDecoder {
    image:      PixelBuffer,
    mode:       ImageMode,
    stride:     usize,
    compressed: Vec<u8>,
    options:    DecoderOptions
}

impl IncrementalDecoder for RowFilterDecoder {
    fn name(&self) -> &'static str {
        "row-filter"
    }

    fn feed(&mut self, data: &[u8]) -> Result<(usize, DecodeStatus), ArgDecodeErrors> {
        self.compressed.extend_from_slice(data);
        Ok((data.len(), DecodeStatus::NeedMore))
    }

    fn finish(mut self: Box<Self>) -> Result<PixelBuffer, ArgDecodeErrors> {
        let height = self.image.height();

        if self.stride == 0 || height == 0 {
            return Ok(self.image);
        }
        let size_hint = (self.stride + 1) * height;

        let options = DeflateOptions::default()
            .set_size_hint(size_hint)
            .set_confirm_checksum(self.options.inflate_get_confirm_adler());

        let mut decoder = DeflateDecoder::new_with_options(&self.compressed, options);
        let inflated = decoder.decode_zlib()?;

        trace!(
            "Inflated {} bytes into {} bytes",
            self.compressed.len(),
            inflated.len()
        );
        let rows = unfilter_rows(&inflated, height, self.stride, self.mode.filter_stride())?;
        let out_stride = self.image.stride();

        for (in_row, out_row) in rows
            .chunks_exact(self.stride)
            .zip(self.image.pixels_mut().chunks_exact_mut(out_stride))
        {
            unpack_row(in_row, self.mode, out_row);
        }
        Ok(self.image)
    }
}

/// Uncompressed, unfiltered packed scanlines, decoded a row at a time
struct RawDecoder {
    image:   PixelBuffer,
    mode:    ImageMode,
    stride:  usize,
    row:     usize,
    options: DecoderOptions
}

impl IncrementalDecoder for RawDecoder {
    fn name(&self) -> &'static str {
        "raw"
    }

    fn feed(&mut self, data: &[u8]) -> Result<(usize, DecodeStatus), ArgDecodeErrors> {
        let height = self.image.height();

        if self.row >= height {
            return Ok((data.len(), DecodeStatus::Done));
        }
        if self.stride == 0 {
            self.row = height;
            return Ok((0, DecodeStatus::Done));
        }
        let out_stride = self.image.stride();
        let rows = (data.len() / self.stride).min(height - self.row);

        for (in_row, out_row) in data.chunks_exact(self.stride).take(rows).zip(
            self.image.pixels_mut()[self.row * out_stride..].chunks_exact_mut(out_stride)
        ) {
            unpack_row(in_row, self.mode, out_row);
        }
        self.row += rows;

        let status = if self.row == height {
            DecodeStatus::Done
        } else {
            DecodeStatus::NeedMore
        };
        Ok((rows * self.stride, status))
    }

    fn finish(self: Box<Self>) -> Result<PixelBuffer, ArgDecodeErrors> {
        let height = self.image.height();

        if self.row < height {
            if self.options.strict_mode() {
                return Err(ArgDecodeErrors::DecodeError(format!(
                    "Raw image data ended after {} of {} rows",
                    self.row, height
                )));
            }
            warn!(
                "Raw image data ended after {} of {} rows, remaining rows are zero",
                self.row, height
            );
        }
        Ok(self.image)
    }
}

/// JPEG data is collected and decoded once the image is closed
struct JpegImageDecoder {
    width:      usize,
    height:     usize,
    color:      ArgColor,
    colorspace: ColorSpace,
    data:       Vec<u8>,
    options:    DecoderOptions
}

impl IncrementalDecoder for JpegImageDecoder {
    fn name(&self) -> &'static str {
        "jpeg"
    }

    fn feed(&mut self, data: &[u8]) -> Result<(usize, DecodeStatus), ArgDecodeErrors> {
        self.data.extend_from_slice(data);
        Ok((data.len(), DecodeStatus::NeedMore))
    }

    fn finish(self: Box<Self>) -> Result<PixelBuffer, ArgDecodeErrors> {
        let options = self.options.jpeg_set_out_colorspace(self.colorspace);
        let mut decoder = JpegDecoder::new_with_options(ZCursor::new(&self.data[..]), options);

        let pixels = decoder.decode()?;
        let (width, height) = decoder
            .dimensions()
            .ok_or(ArgDecodeErrors::DecodeError("JPEG headers not decoded".into()))?;

        if (width, height) != (self.width, self.height) {
            return Err(ArgDecodeErrors::DecodeError(format!(
                "JPEG image is {}x{} but the header declared {}x{}",
                width, height, self.width, self.height
            )));
        }
        PixelBuffer::from_pixels(width, height, self.color, pixels).ok_or_else(|| {
            ArgDecodeErrors::DecodeError("JPEG output does not match the image size".into())
        })
    }
}
