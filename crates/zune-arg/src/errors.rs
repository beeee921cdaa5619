/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::string::String;
use core::fmt::{Debug, Display, Formatter};

use zune_core::bytestream::ZByteIoError;
use zune_inflate::errors::InflateDecodeErrors;

use crate::enums::ArgColor;

/// Errors that can occur while decoding an ARG animation
///
/// Errors fall in two groups, protocol errors where a chunk appears
/// in a state that doesn't allow it, see [`is_protocol_error`](Self::is_protocol_error),
/// and decode errors where a codec failed on image data, see [`is_decode_error`](Self::is_decode_error).
///
/// Both kinds are fatal to the stream, frames already returned stay valid.
pub enum ArgDecodeErrors {
    /// The stream doesn't start with the ARG magic bytes
    BadSignature,
    /// A chunk appeared where the decoder state does not allow it,
    /// contains the chunk name and the reason
    MisplacedChunk(&'static str, &'static str),
    /// A chunk payload is shorter than its fixed layout,
    /// contains chunk name, expected length and found length
    ShortChunk(&'static str, usize, usize),
    /// Bit depth and colour type combination is not supported
    UnsupportedMode(u8, u8),
    /// An image id was referenced before it was defined
    UnknownImage(u16),
    /// The stream ended inside a chunk, contains the
    /// number of bytes expected and the number found
    Truncated(usize, usize),
    /// Two buffers that must share a colour do not
    ModeMismatch(ArgColor, ArgColor),
    /// Too large dimensions for a given dimension
    TooLargeDimensions(&'static str, usize, usize),
    /// Stored and calculated CRC do not match
    BadCrc(u32, u32),
    /// zlib decoding of row filtered image data failed
    ZlibDecodeErrors(InflateDecodeErrors),
    /// JPEG decoding failed
    JpegDecodeErrors(zune_jpeg::errors::DecodeErrors),
    /// A codec failed for a reason of its own
    DecodeError(String),
    /// Generic protocol error with a static message
    GenericStatic(&'static str),
    /// Generic protocol error
    Generic(String),
    /// The underlying byte source failed
    IoErrors(ZByteIoError)
}

impl ArgDecodeErrors {
    /// Return true if the error is caused by a chunk appearing
    /// in an invalid state or carrying an invalid header
    pub const fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            Self::BadSignature
                | Self::MisplacedChunk(..)
                | Self::ShortChunk(..)
                | Self::UnsupportedMode(..)
                | Self::UnknownImage(_)
                | Self::Truncated(..)
                | Self::ModeMismatch(..)
                | Self::TooLargeDimensions(..)
                | Self::GenericStatic(_)
                | Self::Generic(_)
        )
    }

    /// Return true if the error was raised by a codec while
    /// decoding image data
    pub const fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Self::ZlibDecodeErrors(_) | Self::JpegDecodeErrors(_) | Self::DecodeError(_)
        )
    }
}

impl Debug for ArgDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BadSignature => writeln!(f, "Bad ARG signature, not an ARG file"),
            Self::MisplacedChunk(chunk, reason) => {
                writeln!(f, "Misplaced {chunk} chunk, {reason}")
            }
            Self::ShortChunk(chunk, expected, found) => writeln!(
                f,
                "{chunk} chunk too short, expected at least {expected} bytes but found {found}"
            ),
            Self::UnsupportedMode(depth, color) => writeln!(
                f,
                "Unsupported mode, bit depth {depth} with colour type {color}"
            ),
            Self::UnknownImage(id) => {
                writeln!(f, "Image {id} referenced before it was defined")
            }
            Self::Truncated(expected, found) => writeln!(
                f,
                "Stream ended inside a chunk, expected {expected} bytes but found {found}"
            ),
            Self::ModeMismatch(dst, src) => {
                writeln!(f, "Images do not match, {dst:?} and {src:?}")
            }
            Self::TooLargeDimensions(dimension, expected, found) => writeln!(
                f,
                "Too large dimensions for {dimension}, {found} exceeds {expected}"
            ),
            Self::BadCrc(expected, found) => writeln!(
                f,
                "CRC does not match, expected {expected} but found {found}"
            ),
            Self::ZlibDecodeErrors(err) => writeln!(f, "Error decoding image data {err:?}"),
            Self::JpegDecodeErrors(err) => writeln!(f, "Error decoding jpeg data {err:?}"),
            Self::DecodeError(err) => writeln!(f, "Decoder error {err}"),
            Self::GenericStatic(val) => writeln!(f, "{val}"),
            Self::Generic(val) => writeln!(f, "{val}"),
            Self::IoErrors(err) => writeln!(f, "I/O error {err:?}")
        }
    }
}

impl Display for ArgDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ArgDecodeErrors {}

impl From<&'static str> for ArgDecodeErrors {
    fn from(val: &'static str) -> Self {
        Self::GenericStatic(val)
    }
}

impl From<String> for ArgDecodeErrors {
    fn from(val: String) -> Self {
        Self::Generic(val)
    }
}

impl From<ZByteIoError> for ArgDecodeErrors {
    fn from(val: ZByteIoError) -> Self {
        Self::IoErrors(val)
    }
}

impl From<InflateDecodeErrors> for ArgDecodeErrors {
    fn from(val: InflateDecodeErrors) -> Self {
        Self::ZlibDecodeErrors(val)
    }
}

impl From<zune_jpeg::errors::DecodeErrors> for ArgDecodeErrors {
    fn from(val: zune_jpeg::errors::DecodeErrors) -> Self {
        Self::JpegDecodeErrors(val)
    }
}
