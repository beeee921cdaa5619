/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
#![allow(dead_code)]

//! Helpers for building ARG streams in memory

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::{Compression, Crc};
use jpeg_encoder::{ColorType, Encoder};
use zune_arg::{ArgDecoder, ARG_SIGNATURE};
use zune_core::bytestream::ZCursor;
use zune_core::options::DecoderOptions;

pub fn chunk_crc(tag: &[u8; 4], payload: &[u8]) -> u32 {
    let mut crc = Crc::new();
    crc.update(tag);
    crc.update(payload);
    crc.sum()
}

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Baseline JPEG of `pixels` at the highest quality
pub fn jpeg(pixels: &[u8], width: u16, height: u16, color: ColorType) -> Vec<u8> {
    let mut out = Vec::new();
    Encoder::new(&mut out, 100)
        .encode(pixels, width, height, color)
        .unwrap();
    out
}

/// Prefix every row of `pixels` with filter type 0
pub fn unfiltered_rows(pixels: &[u8], stride: usize) -> Vec<u8> {
    let mut out = Vec::new();

    for row in pixels.chunks_exact(stride) {
        out.push(0);
        out.extend_from_slice(row);
    }
    out
}

fn size_mode(width: u32, height: u32, depth: u8, color_type: u8) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&width.to_be_bytes());
    payload.extend_from_slice(&height.to_be_bytes());
    payload.extend_from_slice(&[depth, color_type]);
    payload
}

/// Writes an ARG stream chunk by chunk
pub struct ArgBuilder {
    data: Vec<u8>
}

impl ArgBuilder {
    /// Signature and animation header
    pub fn new(width: u32, height: u32, depth: u8, color_type: u8) -> ArgBuilder {
        let builder = ArgBuilder {
            data: ARG_SIGNATURE.to_vec()
        };
        builder.chunk(b"AHDR", &size_mode(width, height, depth, color_type))
    }

    pub fn chunk(self, tag: &[u8; 4], payload: &[u8]) -> ArgBuilder {
        let crc = chunk_crc(tag, payload);
        self.chunk_with_crc(tag, payload, crc)
    }

    pub fn chunk_with_crc(mut self, tag: &[u8; 4], payload: &[u8], crc: u32) -> ArgBuilder {
        self.data
            .extend_from_slice(&(payload.len() as u32).to_be_bytes());
        self.data.extend_from_slice(tag);
        self.data.extend_from_slice(payload);
        self.data.extend_from_slice(&crc.to_be_bytes());
        self
    }

    pub fn frame(self, id: u16, count: u16, repair: Option<u16>) -> ArgBuilder {
        let mut payload = Vec::new();
        payload.extend_from_slice(&id.to_be_bytes());
        payload.extend_from_slice(&count.to_be_bytes());
        if let Some(repair) = repair {
            payload.extend_from_slice(&repair.to_be_bytes());
        }
        self.chunk(b"AFRM", &payload)
    }

    pub fn define(self, id: u16, count: u16) -> ArgBuilder {
        let mut payload = Vec::new();
        payload.extend_from_slice(&id.to_be_bytes());
        payload.extend_from_slice(&count.to_be_bytes());
        self.chunk(b"ADEF", &payload)
    }

    pub fn blank(self, width: u32, height: u32, depth: u8, color_type: u8) -> ArgBuilder {
        self.chunk(b"BLNK", &size_mode(width, height, depth, color_type))
    }

    /// `UHDR`, one `IDAT` with `pixels` and `UEND`
    pub fn raw_image(
        self, width: u32, height: u32, depth: u8, color_type: u8, pixels: &[u8]
    ) -> ArgBuilder {
        self.chunk(b"UHDR", &size_mode(width, height, depth, color_type))
            .chunk(b"IDAT", pixels)
            .chunk(b"UEND", &[])
    }

    /// `IHDR`, the zlib compressed `rows` split over `IDAT` chunks of
    /// `split` bytes and `IEND`.
    ///
    /// `rows` must already carry a filter byte per row
    pub fn filtered_image(
        self, width: u32, height: u32, depth: u8, color_type: u8, rows: &[u8], split: usize
    ) -> ArgBuilder {
        let mut header = size_mode(width, height, depth, color_type);
        header.extend_from_slice(&[0, 0, 0]);

        let mut builder = self.chunk(b"IHDR", &header);
        for piece in zlib(rows).chunks(split) {
            builder = builder.chunk(b"IDAT", piece);
        }
        builder.chunk(b"IEND", &[])
    }

    /// `JHDR`, `jpeg` split over `IDAT` chunks of `split` bytes and `JEND`
    pub fn jpeg_image(
        self, width: u32, height: u32, color_type: u8, jpeg: &[u8], split: usize
    ) -> ArgBuilder {
        let mut builder = self.chunk(b"JHDR", &size_mode(width, height, 8, color_type));
        for piece in jpeg.chunks(split) {
            builder = builder.chunk(b"IDAT", piece);
        }
        builder.chunk(b"JEND", &[])
    }

    /// `DHDR` for a 8 bit patch at `(x, y)` followed by its data and `DEND`
    pub fn delta(
        self, width: u32, height: u32, color_type: u8, blend: u8, x: u32, y: u32,
        pixels: &[u8]
    ) -> ArgBuilder {
        let mut header = size_mode(width, height, 8, color_type);
        header.extend_from_slice(&[0, 0, 0, blend]);
        header.extend_from_slice(&x.to_be_bytes());
        header.extend_from_slice(&y.to_be_bytes());

        let stride = pixels.len() / height as usize;
        let data = zlib(&unfiltered_rows(pixels, stride));

        self.chunk(b"DHDR", &header)
            .chunk(b"IDAT", &data)
            .chunk(b"DEND", &[])
    }

    pub fn paste(self, source: u16, x: u32, y: u32) -> ArgBuilder {
        let mut payload = Vec::new();
        payload.extend_from_slice(&source.to_be_bytes());
        payload.extend_from_slice(&x.to_be_bytes());
        payload.extend_from_slice(&y.to_be_bytes());
        self.chunk(b"PAST", &payload)
    }

    pub fn sync(self) -> ArgBuilder {
        self.chunk(b"sYNC", &[])
    }

    /// Finish with an `AEND` chunk
    pub fn end(self) -> Vec<u8> {
        self.chunk(b"AEND", &[]).data
    }

    /// The stream as written so far, without an end chunk
    pub fn build(self) -> Vec<u8> {
        self.data
    }
}

pub fn decoder(data: &[u8]) -> ArgDecoder<ZCursor<&[u8]>> {
    ArgDecoder::new(ZCursor::new(data))
}

pub fn decoder_with_options(data: &[u8], options: DecoderOptions) -> ArgDecoder<ZCursor<&[u8]>> {
    ArgDecoder::new_with_options(ZCursor::new(data), options)
}
