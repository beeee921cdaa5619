/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Chunk framing
//!
//! Chunks are laid out as `length - chunk type - [data] - crc`, the same
//! way png lays out its chunks.

use alloc::vec::Vec;

use zune_core::bytestream::{ZByteReaderTrait, ZReader};

use crate::constants::ARG_SIGNATURE;
use crate::enums::ArgChunkType;
use crate::errors::ArgDecodeErrors;

/// Largest buffer read from the source in one go when reading payloads,
/// keeps a corrupt length from allocating gigabytes up front.
const PAYLOAD_READ_SIZE: usize = 1 << 16;

/// Header of a single chunk, the stream is positioned
/// at the start of the payload after this has been read.
#[derive(Copy, Clone, Debug)]
pub struct ChunkHeader {
    pub length:     usize,
    pub chunk:      [u8; 4],
    pub chunk_type: ArgChunkType
}

impl ChunkHeader {
    /// Printable chunk name
    pub fn name(&self) -> &str {
        core::str::from_utf8(&self.chunk).unwrap_or("XXXX")
    }

    /// Crc calculated over the chunk type and `payload`
    pub fn calculate_checksum(&self, payload: &[u8]) -> u32 {
        crate::crc::chunk_crc(&self.chunk, payload)
    }

    /// Confirm `stored_crc` matches the crc calculated over the chunk
    /// type and payload.
    ///
    /// Always true when the `crc` feature is disabled.
    pub fn verify_checksum(&self, payload: &[u8], stored_crc: u32) -> bool {
        #[cfg(feature = "crc")]
        {
            self.calculate_checksum(payload) == stored_crc
        }
        #[cfg(not(feature = "crc"))]
        {
            let _ = (payload, stored_crc);
            true
        }
    }
}

/// Sequential reader of chunks from an underlying byte source
pub struct ChunkSource<T: ZByteReaderTrait> {
    stream: ZReader<T>
}

impl<T> ChunkSource<T>
where
    T: ZByteReaderTrait
{
    pub fn new(data: T) -> ChunkSource<T> {
        ChunkSource {
            stream: ZReader::new(data)
        }
    }

    /// Read until `buf` is full or the source runs out,
    /// returning the number of bytes read
    fn read_full(&mut self, buf: &mut [u8]) -> Result<usize, ArgDecodeErrors> {
        let mut filled = 0;

        while filled < buf.len() {
            let read = self.stream.read_bytes(&mut buf[filled..])?;
            if read == 0 {
                break;
            }
            filled += read;
        }
        Ok(filled)
    }

    /// Read and confirm the eight byte signature
    pub fn read_signature(&mut self) -> Result<(), ArgDecodeErrors> {
        let mut signature = [0; 8];
        let read = self.read_full(&mut signature)?;

        if read != signature.len() || signature != ARG_SIGNATURE {
            return Err(ArgDecodeErrors::BadSignature);
        }
        Ok(())
    }

    /// Read the next chunk header.
    ///
    /// Returns `Ok(None)` when the source is exhausted on a chunk boundary.
    pub fn next_chunk(&mut self) -> Result<Option<ChunkHeader>, ArgDecodeErrors> {
        let mut header = [0; 8];
        let read = self.read_full(&mut header)?;

        if read == 0 {
            return Ok(None);
        }
        if read != header.len() {
            return Err(ArgDecodeErrors::Truncated(header.len(), read));
        }
        let length = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
        let chunk = [header[4], header[5], header[6], header[7]];

        Ok(Some(ChunkHeader {
            length: length as usize,
            chunk,
            chunk_type: ArgChunkType::from_tag(chunk)
        }))
    }

    /// Read the payload of the chunk whose header was just returned
    /// by [`next_chunk`](Self::next_chunk)
    pub fn read_payload(&mut self, header: &ChunkHeader) -> Result<Vec<u8>, ArgDecodeErrors> {
        let mut payload = Vec::with_capacity(header.length.min(PAYLOAD_READ_SIZE));
        let mut scratch = [0_u8; 4096];
        let mut remaining = header.length;

        while remaining > 0 {
            let wanted = remaining.min(scratch.len());
            let read = self.stream.read_bytes(&mut scratch[..wanted])?;

            if read == 0 {
                return Err(ArgDecodeErrors::Truncated(header.length, payload.len()));
            }
            payload.extend_from_slice(&scratch[..read]);
            remaining -= read;
        }
        Ok(payload)
    }

    /// Read the crc trailing a chunk payload
    pub fn read_crc(&mut self) -> Result<u32, ArgDecodeErrors> {
        let mut crc = [0; 4];
        let read = self.read_full(&mut crc)?;

        if read != crc.len() {
            return Err(ArgDecodeErrors::Truncated(crc.len(), read));
        }
        Ok(u32::from_be_bytes(crc))
    }

    /// Current position in the underlying source
    pub fn position(&mut self) -> Result<u64, ArgDecodeErrors> {
        Ok(self.stream.position()?)
    }

    /// Move to an absolute position in the underlying source,
    /// used to rewind to a reset point.
    pub fn set_position(&mut self, position: u64) -> Result<(), ArgDecodeErrors> {
        let position = usize::try_from(position)
            .map_err(|_| ArgDecodeErrors::GenericStatic("Reset point out of range"))?;
        self.stream.set_position(position)?;
        Ok(())
    }
}
