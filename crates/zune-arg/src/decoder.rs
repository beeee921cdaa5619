/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::vec::Vec;

use log::{debug, info, trace, warn};
use zune_core::bytestream::ZByteReaderTrait;
use zune_core::options::DecoderOptions;

use crate::chunks::{ChunkHeader, ChunkSource};
use crate::constants::ARG_SIGNATURE;
use crate::enums::{ArgChunkType, ArgColor};
use crate::errors::ArgDecodeErrors;
use crate::headers::AnimationHeader;
use crate::pixels::PixelBuffer;
use crate::stream::{ArgStream, ChunkResult};

/// Result of asking the decoder for the next frame
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FrameOutcome {
    /// A composited frame, a copy of the image the frame shows
    Frame(PixelBuffer),
    /// No more frames, either the end of animation chunk was
    /// reached or the stream ran out
    EndOfAnimation
}

/// Return true if `bytes` starts with the ARG signature
pub fn is_arg(bytes: &[u8]) -> bool {
    bytes.get(..ARG_SIGNATURE.len()) == Some(&ARG_SIGNATURE[..])
}

/// An ARG animation decoder
///
/// Frames are decoded one at a time in stream order with
/// [`advance`](Self::advance).
///
/// # Example
/// ```no_run
/// use zune_arg::{ArgDecoder, FrameOutcome};
/// use zune_arg::zune_core::bytestream::ZCursor;
///
/// let data = std::fs::read("animation.arg").unwrap();
/// let mut decoder = ArgDecoder::new(ZCursor::new(&data));
///
/// while let FrameOutcome::Frame(frame) = decoder.advance().unwrap() {
///     println!("{:?}", frame.dimensions());
/// }
/// ```
pub struct ArgDecoder<T: ZByteReaderTrait> {
    source:          ChunkSource<T>,
    options:         DecoderOptions,
    stream:          Option<ArgStream>,
    decoded_headers: bool,
    reset_point:     u64,
    frame_index:     usize,
    exhausted:       bool
}

impl<T> ArgDecoder<T>
where
    T: ZByteReaderTrait
{
    /// Create a new decoder with default options
    pub fn new(data: T) -> ArgDecoder<T> {
        ArgDecoder::new_with_options(data, DecoderOptions::default())
    }

    /// Create a new decoder with the specified options
    ///
    /// - Max width and height limit the animation and every image in it.
    /// - `png_set_confirm_crc` decides whether a checksum mismatch is an error
    ///   or just logged.
    /// - Strict mode turns short raw image data into an error.
    pub fn new_with_options(data: T, options: DecoderOptions) -> ArgDecoder<T> {
        ArgDecoder {
            source: ChunkSource::new(data),
            options,
            stream: None,
            decoded_headers: false,
            reset_point: 0,
            frame_index: 0,
            exhausted: false
        }
    }

    /// Read the signature and the animation header
    ///
    /// This is called by [`advance`](Self::advance) if it hasn't been
    /// called before.
    pub fn decode_headers(&mut self) -> Result<(), ArgDecodeErrors> {
        if self.decoded_headers {
            return Ok(());
        }
        self.source.read_signature()?;

        let header = self
            .source
            .next_chunk()?
            .ok_or(ArgDecodeErrors::GenericStatic("No chunks after the signature"))?;

        if header.chunk_type != ArgChunkType::AHDR {
            return Err(ArgDecodeErrors::MisplacedChunk(
                header.chunk_type.name(),
                "expected an AHDR chunk"
            ));
        }
        let payload = self.source.read_payload(&header)?;
        let crc = self.source.read_crc()?;
        self.confirm_checksum(&header, &payload, crc)?;

        let animation = AnimationHeader::parse(&payload, &self.options)?;

        info!("Width: {}", animation.width);
        info!("Height: {}", animation.height);
        info!("Colour: {:?}", animation.mode.color());
        info!("Depth: {}", animation.mode.depth());

        self.stream = Some(ArgStream::new(animation, self.options));
        self.reset_point = self.source.position()?;
        self.decoded_headers = true;

        Ok(())
    }

    fn confirm_checksum(
        &self, header: &ChunkHeader, payload: &[u8], stored_crc: u32
    ) -> Result<(), ArgDecodeErrors> {
        if header.verify_checksum(payload, stored_crc) {
            return Ok(());
        }
        let calculated = header.calculate_checksum(payload);

        if self.options.png_get_confirm_crc() {
            return Err(ArgDecodeErrors::BadCrc(stored_crc, calculated));
        }
        warn!(
            "CRC mismatch in {} chunk, stored {stored_crc:#010x}, calculated {calculated:#010x}",
            header.name()
        );
        Ok(())
    }

    /// Read a whole chunk, `None` if the source ran out
    fn read_chunk(&mut self) -> Result<Option<(ChunkHeader, Vec<u8>)>, ArgDecodeErrors> {
        let chunk = self.source.next_chunk().and_then(|header| match header {
            Some(header) => {
                let payload = self.source.read_payload(&header)?;
                let crc = self.source.read_crc()?;
                Ok(Some((header, payload, crc)))
            }
            None => Ok(None)
        });

        match chunk {
            Ok(Some((header, payload, crc))) => {
                self.confirm_checksum(&header, &payload, crc)?;
                Ok(Some((header, payload)))
            }
            Ok(None) => Ok(None),
            Err(ArgDecodeErrors::Truncated(expected, found)) => {
                warn!("Stream ends inside a chunk, expected {expected} bytes but found {found}");
                Ok(None)
            }
            Err(err) => Err(err)
        }
    }

    fn stream_mut(&mut self) -> Result<&mut ArgStream, ArgDecodeErrors> {
        self.stream
            .as_mut()
            .ok_or(ArgDecodeErrors::GenericStatic("Headers not decoded"))
    }

    /// Decode chunks until the next frame is complete
    ///
    /// # Returns
    /// - `Frame`: The next frame, a copy owned by the caller
    /// - `EndOfAnimation`: The end of animation chunk was reached
    ///   or the stream ran out of chunks, every later call returns this too
    ///
    /// # Errors
    /// A protocol or decode error, the decoder should not be used afterwards
    /// except to [`reset`](Self::reset) it.
    pub fn advance(&mut self) -> Result<FrameOutcome, ArgDecodeErrors> {
        self.decode_headers()?;

        loop {
            if self.exhausted || self.stream_mut()?.is_eof() {
                return Ok(FrameOutcome::EndOfAnimation);
            }
            let Some((header, payload)) = self.read_chunk()? else {
                let stream = self.stream_mut()?;

                if let Some(directive) = stream.pending() {
                    debug!(
                        "Stream ended with image {} waiting for {} operations",
                        directive.id, directive.count
                    );
                }
                self.exhausted = true;
                return Ok(FrameOutcome::EndOfAnimation);
            };
            let stream = self.stream_mut()?;

            match stream.dispatch(header.chunk_type, &payload)? {
                ChunkResult::Continue => {
                    if header.chunk_type == ArgChunkType::sYNC {
                        self.reset_point = self.source.position()?;
                        trace!("Reset point moved to {}", self.reset_point);
                    }
                }
                ChunkResult::FrameReady(id) => {
                    let frame = stream
                        .image(id)
                        .cloned()
                        .ok_or(ArgDecodeErrors::UnknownImage(id))?;

                    self.frame_index += 1;
                    return Ok(FrameOutcome::Frame(frame));
                }
                ChunkResult::StreamEnded => return Ok(FrameOutcome::EndOfAnimation)
            }
        }
    }

    /// Walk every chunk of the stream checking its checksum,
    /// without decoding anything.
    ///
    /// Checksums are always confirmed here whatever the options say.
    /// Reading stops at the end of animation chunk, the position of
    /// the decoder is left as it was.
    ///
    /// # Errors
    /// - `BadSignature` if the stream is not an ARG stream
    /// - `BadCrc` for the first chunk whose checksum does not match
    /// - `Truncated` if the stream ends inside a chunk
    pub fn verify(&mut self) -> Result<(), ArgDecodeErrors> {
        let position = self.source.position()?;

        let result = self.verify_chunks();
        self.source.set_position(position)?;
        result
    }

    fn verify_chunks(&mut self) -> Result<(), ArgDecodeErrors> {
        self.source.set_position(0)?;
        self.source.read_signature()?;

        let mut chunks = 0_usize;

        while let Some(header) = self.source.next_chunk()? {
            let payload = self.source.read_payload(&header)?;
            let stored_crc = self.source.read_crc()?;
            let calculated = header.calculate_checksum(&payload);

            if stored_crc != calculated {
                return Err(ArgDecodeErrors::BadCrc(stored_crc, calculated));
            }
            chunks += 1;

            if header.chunk_type == ArgChunkType::AEND {
                break;
            }
        }
        trace!("Verified {chunks} chunks");
        Ok(())
    }

    /// Decode every remaining frame
    pub fn decode_all(&mut self) -> Result<Vec<PixelBuffer>, ArgDecodeErrors> {
        let mut frames = Vec::new();

        while let FrameOutcome::Frame(frame) = self.advance()? {
            frames.push(frame);
        }
        Ok(frames)
    }

    /// Rewind to the last sync point, or to the first chunk after
    /// the animation header if the stream has none.
    ///
    /// Stored images are dropped, the palette is kept.
    pub fn reset(&mut self) -> Result<(), ArgDecodeErrors> {
        self.decode_headers()?;

        let reset_point = self.reset_point;
        self.source.set_position(reset_point)?;
        self.stream_mut()?.reset_state();
        self.frame_index = 0;
        self.exhausted = false;

        debug!("Rewound to {reset_point}");
        Ok(())
    }

    /// Number of frames returned since the decoder was created or last reset
    pub const fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Animation width and height or `None` if the headers
    /// haven't been decoded
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.stream
            .as_ref()
            .map(|stream| (stream.header().width, stream.header().height))
    }

    /// Colour of the animation or `None` if the headers
    /// haven't been decoded
    pub fn color(&self) -> Option<ArgColor> {
        self.stream
            .as_ref()
            .map(|stream| stream.header().mode.color())
    }

    /// The global palette, only present in palette animations
    /// that carry a `PLTE` chunk
    pub fn palette(&self) -> Option<&[[u8; 3]]> {
        self.stream.as_ref().and_then(|stream| stream.palette())
    }

    /// Name given to image `id`
    pub fn name(&self, id: u16) -> Option<&[u8]> {
        self.stream.as_ref().and_then(|stream| stream.name(id))
    }

    /// The state machine, for inspecting stored images
    pub const fn stream(&self) -> Option<&ArgStream> {
        self.stream.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffing() {
        assert!(is_arg(b"\x8aARG\r\n\x1a\n\x00"));
        assert!(!is_arg(b"\x89PNG\r\n\x1a\n"));
        assert!(!is_arg(b"\x8aARG"));
    }
}
