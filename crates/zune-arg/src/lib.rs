/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! An Animated Raster Graphics (ARG) decoder
//!
//! ARG is a chunk based animation format built on the png chunk layout,
//! a stream of images is decoded into a table of stored images which are
//! pasted, patched and shown as frames.
//!
//! # Features
//! - Row filtered (deflate), JPEG and raw images
//! - Delta images with add-modulo or replace blending
//! - Off-screen image definitions and pasting with alpha
//! - Frame by frame decoding, with rewinding to sync points
//! - No unsafe
//!
//! # Usage notes
//! Every frame is returned as an owned [`PixelBuffer`] holding 8 bit
//! interleaved samples, 16 bit images are narrowed to their high byte and
//! 1, 2 and 4 bit luma images are scaled to the full range.
//!
//! Palette animations return palette indices, use [`ArgDecoder::palette`] with
//! [`PixelBuffer::expand_palette`] to get RGB pixels.
//!
//! # Example
//! ```no_run
//! use zune_arg::ArgDecoder;
//! use zune_arg::zune_core::bytestream::ZCursor;
//!
//! let data = std::fs::read("animation.arg").unwrap();
//! let mut decoder = ArgDecoder::new(ZCursor::new(&data));
//!
//! let frames = decoder.decode_all().unwrap();
//! println!("{} frames", frames.len());
//! ```
//!
//! The chunk state machine is also usable on its own, see [`ArgStream`]
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
extern crate alloc;

pub use chunks::{ChunkHeader, ChunkSource};
pub use codecs::DecodeStatus;
pub use constants::ARG_SIGNATURE;
pub use decoder::{is_arg, ArgDecoder, FrameOutcome};
pub use enums::{ArgChunkType, ArgColor, DeltaBlend, ImageCodec, ImageMode};
pub use errors::ArgDecodeErrors;
pub use headers::{AnimationHeader, FrameDirective, ImageHeader};
pub use pixels::{PixelBuffer, Rect};
pub use stream::{ArgStream, ChunkResult};
pub use zune_core;

mod chunks;
mod codecs;
mod constants;
mod crc;
mod decoder;
mod enums;
mod errors;
mod filters;
mod headers;
mod pixels;
mod stream;
mod unpack;
