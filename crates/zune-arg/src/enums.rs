/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
#![allow(clippy::upper_case_acronyms, non_camel_case_types)]

use crate::constants::DEPTH_SCALE_TABLE;
use crate::errors::ArgDecodeErrors;

/// Chunk types understood by the animation decoder
///
/// Anything else is carried as `Unknown` with its four byte
/// tag and skipped.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ArgChunkType {
    /// Animation header, the first chunk of every stream
    AHDR,
    /// Next frame follows
    AFRM,
    /// Define an off-screen image
    ADEF,
    /// Name the current image
    NAME,
    /// End of animation
    AEND,
    /// Paste one stored image into another
    PAST,
    /// Blank image
    BLNK,
    /// Full row-filtered (deflate) image follows
    IHDR,
    /// Delta image follows
    DHDR,
    /// JPEG image follows
    JHDR,
    /// Uncompressed image follows
    UHDR,
    /// Image data
    IDAT,
    /// End of a row-filtered image
    IEND,
    /// End of a delta image
    DEND,
    /// End of a JPEG image
    JEND,
    /// End of an uncompressed image
    UEND,
    /// Global palette
    PLTE,
    /// Reset the decoder
    sYNC,
    /// A chunk type we do not know about
    Unknown([u8; 4])
}

impl ArgChunkType {
    pub fn from_tag(tag: [u8; 4]) -> ArgChunkType {
        match &tag {
            b"AHDR" => Self::AHDR,
            b"AFRM" => Self::AFRM,
            b"ADEF" => Self::ADEF,
            b"NAME" => Self::NAME,
            b"AEND" => Self::AEND,
            b"PAST" => Self::PAST,
            b"BLNK" => Self::BLNK,
            b"IHDR" => Self::IHDR,
            b"DHDR" => Self::DHDR,
            b"JHDR" => Self::JHDR,
            b"UHDR" => Self::UHDR,
            b"IDAT" => Self::IDAT,
            b"IEND" => Self::IEND,
            b"DEND" => Self::DEND,
            b"JEND" => Self::JEND,
            b"UEND" => Self::UEND,
            b"PLTE" => Self::PLTE,
            b"sYNC" => Self::sYNC,
            _ => Self::Unknown(tag)
        }
    }

    /// Four letter name of the chunk, `"????"` for unknown chunks
    pub const fn name(self) -> &'static str {
        match self {
            Self::AHDR => "AHDR",
            Self::AFRM => "AFRM",
            Self::ADEF => "ADEF",
            Self::NAME => "NAME",
            Self::AEND => "AEND",
            Self::PAST => "PAST",
            Self::BLNK => "BLNK",
            Self::IHDR => "IHDR",
            Self::DHDR => "DHDR",
            Self::JHDR => "JHDR",
            Self::UHDR => "UHDR",
            Self::IDAT => "IDAT",
            Self::IEND => "IEND",
            Self::DEND => "DEND",
            Self::JEND => "JEND",
            Self::UEND => "UEND",
            Self::PLTE => "PLTE",
            Self::sYNC => "sYNC",
            Self::Unknown(_) => "????"
        }
    }
}

/// Colour of a pixel buffer.
///
/// All buffers store interleaved 8 bit samples, palette
/// buffers store one index per pixel.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ArgColor {
    Luma,
    Palette,
    LumaA,
    RGB,
    RGBA
}

impl ArgColor {
    /// Number of bytes a single pixel occupies in a pixel buffer
    pub const fn num_components(self) -> usize {
        match self {
            ArgColor::Luma | ArgColor::Palette => 1,
            ArgColor::LumaA => 2,
            ArgColor::RGB => 3,
            ArgColor::RGBA => 4
        }
    }

    /// Return true if the last component of every pixel is an alpha channel
    pub const fn has_alpha(self) -> bool {
        matches!(self, ArgColor::LumaA | ArgColor::RGBA)
    }

    /// Colour with the alpha channel stripped
    pub const fn without_alpha(self) -> ArgColor {
        match self {
            ArgColor::LumaA => ArgColor::Luma,
            ArgColor::RGBA => ArgColor::RGB,
            c => c
        }
    }
}

/// Colour mode plus the layout of samples in encoded image data.
///
/// Created from the `(bit depth, colour type)` pair found in
/// animation and image headers.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ImageMode {
    color: ArgColor,
    depth: u8
}

impl ImageMode {
    pub fn from_header(depth: u8, color_type: u8) -> Result<ImageMode, ArgDecodeErrors> {
        let color = match (depth, color_type) {
            (1 | 2 | 4 | 8 | 16, 0) => ArgColor::Luma,
            (8 | 16, 2) => ArgColor::RGB,
            (1 | 2 | 4 | 8, 3) => ArgColor::Palette,
            (8 | 16, 4) => ArgColor::LumaA,
            (8 | 16, 6) => ArgColor::RGBA,
            _ => return Err(ArgDecodeErrors::UnsupportedMode(depth, color_type))
        };
        Ok(ImageMode { color, depth })
    }

    /// Colour of buffers decoded with this mode
    pub const fn color(self) -> ArgColor {
        self.color
    }

    /// Bits per sample in the encoded data
    pub const fn depth(self) -> u8 {
        self.depth
    }

    /// Number of bytes one encoded row of `width` pixels occupies,
    /// excluding any filter byte.
    pub(crate) fn encoded_stride(self, width: usize) -> Option<usize> {
        let bits = width
            .checked_mul(self.color.num_components())?
            .checked_mul(usize::from(self.depth))?;
        Some(bits.div_ceil(8))
    }

    /// Distance in bytes between a byte and the byte of the same sample
    /// in the previous pixel, used by scanline filters
    pub(crate) fn filter_stride(self) -> usize {
        if self.depth < 8 {
            1
        } else {
            self.color.num_components() * usize::from(self.depth / 8)
        }
    }

    /// Scale applied to sub-byte samples, palette indices are never scaled
    pub(crate) fn sample_scale(self) -> u8 {
        if self.color == ArgColor::Palette {
            1
        } else {
            DEPTH_SCALE_TABLE[usize::from(self.depth.min(8))]
        }
    }
}

/// How a delta image is combined with the image it updates
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DeltaBlend {
    /// The decoded patch is added to the old pixels, modulo 256
    AddModulo,
    /// The decoded patch replaces the old pixels
    Replace
}

impl DeltaBlend {
    pub const fn from_int(int: u8) -> DeltaBlend {
        if int == 0 {
            DeltaBlend::AddModulo
        } else {
            DeltaBlend::Replace
        }
    }
}

/// Codec requested by an image header
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ImageCodec {
    /// zlib compressed, png style filtered scanlines
    RowFilter,
    /// Baseline or progressive JPEG
    Jpeg,
    /// Uncompressed packed scanlines
    Raw
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum FilterMethod {
    None,
    Sub,
    Up,
    Average,
    Paeth
}

impl FilterMethod {
    pub(crate) fn from_int(int: u8) -> Option<FilterMethod> {
        match int {
            0 => Some(FilterMethod::None),
            1 => Some(FilterMethod::Sub),
            2 => Some(FilterMethod::Up),
            3 => Some(FilterMethod::Average),
            4 => Some(FilterMethod::Paeth),
            _ => None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_match_png_color_types() {
        let mode = ImageMode::from_header(8, 3).unwrap();
        assert_eq!(mode.color(), ArgColor::Palette);

        let mode = ImageMode::from_header(16, 6).unwrap();
        assert_eq!(mode.color(), ArgColor::RGBA);
        assert_eq!(mode.filter_stride(), 8);

        assert!(ImageMode::from_header(16, 3).is_err());
        assert!(ImageMode::from_header(4, 2).is_err());
        assert!(ImageMode::from_header(8, 5).is_err());
    }

    #[test]
    fn sub_byte_strides_round_up() {
        let mode = ImageMode::from_header(1, 0).unwrap();
        assert_eq!(mode.encoded_stride(9), Some(2));
        assert_eq!(mode.filter_stride(), 1);
        assert_eq!(mode.sample_scale(), 0xff);

        let mode = ImageMode::from_header(2, 3).unwrap();
        assert_eq!(mode.encoded_stride(5), Some(2));
        assert_eq!(mode.sample_scale(), 1);
    }

    #[test]
    fn unknown_tags_are_kept() {
        assert_eq!(ArgChunkType::from_tag(*b"sYNC"), ArgChunkType::sYNC);
        assert_eq!(
            ArgChunkType::from_tag(*b"tEXt"),
            ArgChunkType::Unknown(*b"tEXt")
        );
    }
}
