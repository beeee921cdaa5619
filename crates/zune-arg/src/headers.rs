/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Payload layouts of the fixed size chunks

use alloc::vec::Vec;

use zune_core::options::DecoderOptions;

use crate::constants::{
    DELTA_HEADER_LENGTH, FULL_HEADER_LENGTH, PALETTE_ENTRIES, PASTE_LENGTH, SIZE_MODE_LENGTH
};
use crate::enums::{DeltaBlend, ImageMode};
use crate::errors::ArgDecodeErrors;
use crate::pixels::Rect;

#[inline]
fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([bytes[offset], bytes[offset + 1]])
}

#[inline]
fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3]
    ])
}

fn ensure_length(chunk: &'static str, payload: &[u8], length: usize) -> Result<(), ArgDecodeErrors> {
    if payload.len() < length {
        return Err(ArgDecodeErrors::ShortChunk(chunk, length, payload.len()));
    }
    Ok(())
}

/// Size and colour mode shared by the animation header and
/// every image header.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ImageHeader {
    pub width:  usize,
    pub height: usize,
    pub mode:   ImageMode
}

impl ImageHeader {
    /// Parse `width u32, height u32, depth u8, colour type u8`
    /// and confirm the dimensions are within the limits of `options`
    pub(crate) fn parse(
        chunk: &'static str, payload: &[u8], options: &DecoderOptions
    ) -> Result<ImageHeader, ArgDecodeErrors> {
        ensure_length(chunk, payload, SIZE_MODE_LENGTH)?;

        let width = read_u32(payload, 0) as usize;
        let height = read_u32(payload, 4) as usize;

        if width > options.max_width() {
            return Err(ArgDecodeErrors::TooLargeDimensions(
                "width",
                options.max_width(),
                width
            ));
        }
        if height > options.max_height() {
            return Err(ArgDecodeErrors::TooLargeDimensions(
                "height",
                options.max_height(),
                height
            ));
        }
        let mode = ImageMode::from_header(payload[8], payload[9])?;

        Ok(ImageHeader {
            width,
            height,
            mode
        })
    }

    /// Parse an `IHDR` payload, which carries compression, filter and
    /// interlace method bytes after the size and mode.
    pub(crate) fn parse_full(
        chunk: &'static str, payload: &[u8], options: &DecoderOptions
    ) -> Result<ImageHeader, ArgDecodeErrors> {
        ensure_length(chunk, payload, FULL_HEADER_LENGTH)?;

        let header = ImageHeader::parse(chunk, payload, options)?;

        if payload[10] != 0 {
            return Err(ArgDecodeErrors::GenericStatic("Unknown compression method"));
        }
        if payload[11] != 0 {
            return Err(ArgDecodeErrors::GenericStatic("Unknown filter category"));
        }
        if payload[12] != 0 {
            return Err(ArgDecodeErrors::GenericStatic("Interlaced images are not supported"));
        }
        Ok(header)
    }
}

/// The animation header, parsed from the first chunk of the stream
/// and fixed for the lifetime of the stream
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AnimationHeader {
    pub width:  usize,
    pub height: usize,
    pub mode:   ImageMode
}

impl AnimationHeader {
    pub(crate) fn parse(
        payload: &[u8], options: &DecoderOptions
    ) -> Result<AnimationHeader, ArgDecodeErrors> {
        let header = ImageHeader::parse("AHDR", payload, options)?;

        Ok(AnimationHeader {
            width:  header.width,
            height: header.height,
            mode:   header.mode
        })
    }
}

/// A delta image header, an `IHDR` layout followed by
/// the blend method and the offset of the patch
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct DeltaHeader {
    pub image: ImageHeader,
    pub blend: DeltaBlend,
    pub rect:  Rect
}

impl DeltaHeader {
    pub(crate) fn parse(
        payload: &[u8], options: &DecoderOptions
    ) -> Result<DeltaHeader, ArgDecodeErrors> {
        ensure_length("DHDR", payload, DELTA_HEADER_LENGTH)?;

        let image = ImageHeader::parse_full("DHDR", payload, options)?;
        let blend = DeltaBlend::from_int(payload[13]);
        let x = read_u32(payload, 14) as usize;
        let y = read_u32(payload, 18) as usize;

        Ok(DeltaHeader {
            image,
            blend,
            rect: Rect::new(x, y, image.width, image.height)
        })
    }
}

/// What the next images of the stream are used for.
///
/// Installed by `AFRM` (visible) and `ADEF` (off-screen) chunks,
/// resolved once `count` image operations have completed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FrameDirective {
    /// Image the operations write to
    pub id:      u16,
    /// Image operations left before the directive resolves
    pub count:   u16,
    /// Image cloned into `id` before the first paste
    pub repair:  Option<u16>,
    /// Whether resolving the directive shows a frame
    pub visible: bool
}

impl FrameDirective {
    /// Parse an `AFRM` payload, `[id u16 [count u16 [repair u16]]]`
    pub(crate) fn parse_frame(payload: &[u8]) -> FrameDirective {
        let mut directive = FrameDirective::parse_define(payload);

        directive.visible = true;
        if payload.len() >= 6 {
            directive.repair = Some(read_u16(payload, 4));
        }
        directive
    }

    /// Parse an `ADEF` payload, `[id u16 [count u16]]`
    pub(crate) fn parse_define(payload: &[u8]) -> FrameDirective {
        let mut directive = FrameDirective {
            id:      0,
            count:   1,
            repair:  None,
            visible: false
        };
        if payload.len() >= 2 {
            directive.id = read_u16(payload, 0);
        }
        if payload.len() >= 4 {
            directive.count = read_u16(payload, 2);
        }
        directive
    }
}

/// Arguments of a `PAST` chunk
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct PasteArgs {
    pub source: u16,
    pub x:      usize,
    pub y:      usize
}

impl PasteArgs {
    pub(crate) fn parse(payload: &[u8]) -> Result<PasteArgs, ArgDecodeErrors> {
        ensure_length("PAST", payload, PASTE_LENGTH)?;

        Ok(PasteArgs {
            source: read_u16(payload, 0),
            x:      read_u32(payload, 2) as usize,
            y:      read_u32(payload, 6) as usize
        })
    }
}

/// Read RGB triplets from a `PLTE` payload, trailing bytes and
/// entries past the 256th are ignored.
pub(crate) fn parse_palette(payload: &[u8]) -> Vec<[u8; 3]> {
    payload
        .chunks_exact(3)
        .take(PALETTE_ENTRIES)
        .map(|rgb| [rgb[0], rgb[1], rgb[2]])
        .collect()
}
