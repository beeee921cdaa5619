/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The animation state machine
//!
//! [`ArgStream`] takes chunks one at a time, keeps the table of stored
//! images and composites them, reporting when a frame is complete.
//! It knows nothing about where chunks come from, see
//! [`ArgDecoder`](crate::ArgDecoder) for the part that reads them.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use log::{debug, trace, warn};
use zune_core::options::DecoderOptions;

use crate::codecs::{open_decoder, DecodeStatus, IncrementalDecoder};
use crate::enums::{ArgChunkType, ArgColor, DeltaBlend, ImageCodec};
use crate::errors::ArgDecodeErrors;
use crate::headers::{
    parse_palette, AnimationHeader, DeltaHeader, FrameDirective, ImageHeader, PasteArgs
};
use crate::pixels::{PixelBuffer, Rect};

/// Outcome of dispatching a single chunk
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ChunkResult {
    /// Nothing visible happened, keep feeding chunks
    Continue,
    /// A frame is complete, contains the id of the image shown
    FrameReady(u16),
    /// The end of the animation was reached
    StreamEnded
}

/// What happens to the image currently being built once it is complete
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum PendingOperation {
    None,
    /// Install the image as the directive's target
    Store,
    /// Already applied when the chunk was read
    Paste,
    /// Combine the image with the target inside `rect`
    Delta { blend: DeltaBlend, rect: Rect }
}

/// An open decoder and the bytes it has not consumed yet
struct DecodeContext {
    decoder: Box<dyn IncrementalDecoder>,
    data:    Vec<u8>,
    status:  DecodeStatus
}

/// Chunk dispatcher and image store of an ARG animation
pub struct ArgStream {
    header:    AnimationHeader,
    options:   DecoderOptions,
    images:    BTreeMap<u16, PixelBuffer>,
    names:     BTreeMap<u16, Vec<u8>>,
    directive: Option<FrameDirective>,
    operation: PendingOperation,
    context:   Option<DecodeContext>,
    palette:   Option<Vec<[u8; 3]>>,
    current:   Option<u16>,
    eof:       bool
}

impl ArgStream {
    /// Create a state machine for an animation described by `header`
    pub fn new(header: AnimationHeader, options: DecoderOptions) -> ArgStream {
        ArgStream {
            header,
            options,
            images: BTreeMap::new(),
            names: BTreeMap::new(),
            directive: None,
            operation: PendingOperation::None,
            context: None,
            palette: None,
            current: None,
            eof: false
        }
    }

    /// Process one chunk whose payload has already been read.
    ///
    /// # Errors
    /// A chunk that is invalid in the current state is a protocol error,
    /// see [`ArgDecodeErrors::is_protocol_error`].
    /// Failures of the image codecs are decode errors.
    ///
    /// Either way the stream should be abandoned, the state machine
    /// makes no attempt at recovering.
    pub fn dispatch(
        &mut self, chunk_type: ArgChunkType, payload: &[u8]
    ) -> Result<ChunkResult, ArgDecodeErrors> {
        let name = chunk_type.name();

        if self.eof {
            return Err(ArgDecodeErrors::MisplacedChunk(name, "animation already ended"));
        }
        trace!("Chunk {name}, length {}", payload.len());

        match chunk_type {
            ArgChunkType::AHDR => Err(ArgDecodeErrors::MisplacedChunk(
                name,
                "animation header was already read"
            )),
            ArgChunkType::AFRM => self.begin_directive(name, FrameDirective::parse_frame(payload)),
            ArgChunkType::ADEF => self.begin_directive(name, FrameDirective::parse_define(payload)),
            ArgChunkType::NAME => {
                let id = self.pending_directive(name)?.id;
                self.names.insert(id, payload.to_vec());
                Ok(ChunkResult::Continue)
            }
            ArgChunkType::AEND => {
                debug!("End of animation");
                self.eof = true;
                Ok(ChunkResult::StreamEnded)
            }
            ArgChunkType::PAST => self.paste(payload),
            ArgChunkType::BLNK => {
                self.ensure_can_open(name)?;
                let header = ImageHeader::parse(name, payload, &self.options)?;
                let image = PixelBuffer::new(header.width, header.height, header.mode.color());

                self.operation = PendingOperation::Store;
                self.resolve(Some(image))
            }
            ArgChunkType::IHDR => {
                self.ensure_can_open(name)?;
                let header = ImageHeader::parse_full(name, payload, &self.options)?;
                self.open_image(ImageCodec::RowFilter, header, PendingOperation::Store)
            }
            ArgChunkType::DHDR => {
                self.ensure_can_open(name)?;
                let delta = DeltaHeader::parse(payload, &self.options)?;
                let operation = PendingOperation::Delta {
                    blend: delta.blend,
                    rect:  delta.rect
                };
                self.open_image(ImageCodec::RowFilter, delta.image, operation)
            }
            ArgChunkType::JHDR => {
                self.ensure_can_open(name)?;
                let header = ImageHeader::parse(name, payload, &self.options)?;
                self.open_image(ImageCodec::Jpeg, header, PendingOperation::Store)
            }
            ArgChunkType::UHDR => {
                self.ensure_can_open(name)?;
                let header = ImageHeader::parse(name, payload, &self.options)?;
                self.open_image(ImageCodec::Raw, header, PendingOperation::Store)
            }
            ArgChunkType::IDAT => self.feed(payload),
            ArgChunkType::IEND | ArgChunkType::DEND | ArgChunkType::JEND | ArgChunkType::UEND => {
                self.end_image(name)
            }
            ArgChunkType::PLTE => {
                if self.header.mode.color() == ArgColor::Palette {
                    let palette = parse_palette(payload);
                    debug!("Palette with {} entries", palette.len());
                    self.palette = Some(palette);
                } else {
                    warn!(
                        "Ignoring PLTE chunk in a {:?} animation",
                        self.header.mode.color()
                    );
                }
                Ok(ChunkResult::Continue)
            }
            ArgChunkType::sYNC => {
                if self.directive.is_some() {
                    return Err(ArgDecodeErrors::MisplacedChunk(
                        name,
                        "a frame or definition is still pending"
                    ));
                }
                debug!("Sync, dropping {} stored images", self.images.len());
                self.reset_state();
                Ok(ChunkResult::Continue)
            }
            ArgChunkType::Unknown(tag) => {
                debug!(
                    "Skipping unknown chunk {:?}",
                    core::str::from_utf8(&tag).unwrap_or("XXXX")
                );
                Ok(ChunkResult::Continue)
            }
        }
    }

    fn begin_directive(
        &mut self, name: &'static str, directive: FrameDirective
    ) -> Result<ChunkResult, ArgDecodeErrors> {
        if self.directive.is_some() {
            return Err(ArgDecodeErrors::MisplacedChunk(
                name,
                "a frame or definition is still pending"
            ));
        }
        if directive.count == 0 {
            return Err(ArgDecodeErrors::MisplacedChunk(name, "image count is zero"));
        }
        debug!(
            "{name}: image {}, {} operations, repair {:?}",
            directive.id, directive.count, directive.repair
        );
        self.directive = Some(directive);
        Ok(ChunkResult::Continue)
    }

    fn pending_directive(
        &mut self, name: &'static str
    ) -> Result<&mut FrameDirective, ArgDecodeErrors> {
        self.directive.as_mut().ok_or(ArgDecodeErrors::MisplacedChunk(
            name,
            "no frame or definition is pending"
        ))
    }

    /// Image operations need a pending directive and no image
    /// being decoded
    fn ensure_can_open(&mut self, name: &'static str) -> Result<(), ArgDecodeErrors> {
        self.pending_directive(name)?;

        if self.context.is_some() {
            return Err(ArgDecodeErrors::MisplacedChunk(
                name,
                "an image is still being decoded"
            ));
        }
        Ok(())
    }

    fn paste(&mut self, payload: &[u8]) -> Result<ChunkResult, ArgDecodeErrors> {
        self.ensure_can_open("PAST")?;
        let args = PasteArgs::parse(payload)?;

        let directive = self.pending_directive("PAST")?;
        let target = directive.id;

        if let Some(repair) = directive.repair.take() {
            let base = self
                .images
                .get(&repair)
                .ok_or(ArgDecodeErrors::UnknownImage(repair))?
                .clone();

            debug!("Repairing image {target} from image {repair}");
            self.images.insert(target, base);
        }
        // cloned since an image may be pasted into itself
        let source = self
            .images
            .get(&args.source)
            .ok_or(ArgDecodeErrors::UnknownImage(args.source))?
            .clone();

        let canvas = self
            .images
            .get_mut(&target)
            .ok_or(ArgDecodeErrors::UnknownImage(target))?;

        trace!(
            "Pasting image {} into image {target} at ({}, {})",
            args.source,
            args.x,
            args.y
        );
        if source.color().has_alpha() {
            canvas.paste_with_alpha(&source, args.x, args.y)?;
        } else {
            canvas.paste(&source, args.x, args.y)?;
        }
        self.operation = PendingOperation::Paste;
        self.resolve(None)
    }

    fn open_image(
        &mut self, codec: ImageCodec, header: ImageHeader, operation: PendingOperation
    ) -> Result<ChunkResult, ArgDecodeErrors> {
        let decoder = open_decoder(
            codec,
            header.mode,
            header.width,
            header.height,
            self.options
        )?;
        trace!(
            "Opened {} decoder, {}x{} {:?}",
            decoder.name(),
            header.width,
            header.height,
            header.mode
        );
        self.context = Some(DecodeContext {
            decoder,
            data: Vec::new(),
            status: DecodeStatus::NeedMore
        });
        self.operation = operation;
        Ok(ChunkResult::Continue)
    }

    fn feed(&mut self, payload: &[u8]) -> Result<ChunkResult, ArgDecodeErrors> {
        let context = self.context.as_mut().ok_or(ArgDecodeErrors::MisplacedChunk(
            "IDAT",
            "no image is being decoded"
        ))?;

        if context.status == DecodeStatus::Done {
            trace!("Image complete, ignoring {} bytes", payload.len());
            return Ok(ChunkResult::Continue);
        }
        context.data.extend_from_slice(payload);

        let (consumed, status) = context.decoder.feed(&context.data)?;
        context.data.drain(..consumed.min(context.data.len()));
        context.status = status;

        Ok(ChunkResult::Continue)
    }

    fn end_image(&mut self, name: &'static str) -> Result<ChunkResult, ArgDecodeErrors> {
        let context = self.context.take().ok_or(ArgDecodeErrors::MisplacedChunk(
            name,
            "no image is being decoded"
        ))?;

        let image = context.decoder.finish()?;
        self.resolve(Some(image))
    }

    /// Carry out the pending operation and count it against the directive
    fn resolve(&mut self, image: Option<PixelBuffer>) -> Result<ChunkResult, ArgDecodeErrors> {
        let operation = core::mem::replace(&mut self.operation, PendingOperation::None);

        let Some(mut directive) = self.directive else {
            return Err(ArgDecodeErrors::GenericStatic(
                "Image completed without a frame or definition"
            ));
        };

        match (operation, image) {
            (PendingOperation::Store, Some(image)) => {
                self.images.insert(directive.id, image);
            }
            (PendingOperation::Delta { blend, rect }, Some(patch)) => {
                let target = self
                    .images
                    .get_mut(&directive.id)
                    .ok_or(ArgDecodeErrors::UnknownImage(directive.id))?;

                let patch = match blend {
                    DeltaBlend::AddModulo => patch.add_modulo(&target.crop(rect))?,
                    DeltaBlend::Replace => patch
                };
                target.paste(&patch, rect.x0, rect.y0)?;
            }
            _ => {}
        }

        directive.count = directive.count.saturating_sub(1);

        if directive.count > 0 {
            self.directive = Some(directive);
            return Ok(ChunkResult::Continue);
        }
        self.directive = None;

        if !directive.visible {
            debug!("Image {} defined", directive.id);
            return Ok(ChunkResult::Continue);
        }
        if !self.images.contains_key(&directive.id) {
            return Err(ArgDecodeErrors::UnknownImage(directive.id));
        }
        debug!("Frame ready, image {}", directive.id);
        self.current = Some(directive.id);

        Ok(ChunkResult::FrameReady(directive.id))
    }

    /// Drop stored images, names and anything pending, returning
    /// to the state right after the animation header.
    ///
    /// The palette is kept.
    pub fn reset_state(&mut self) {
        self.images.clear();
        self.names.clear();
        self.directive = None;
        self.operation = PendingOperation::None;
        self.context = None;
        self.current = None;
        self.eof = false;
    }

    /// The animation header this stream was created with
    pub const fn header(&self) -> &AnimationHeader {
        &self.header
    }

    /// A stored image
    pub fn image(&self, id: u16) -> Option<&PixelBuffer> {
        self.images.get(&id)
    }

    /// Name given to an image by a `NAME` chunk
    pub fn name(&self, id: u16) -> Option<&[u8]> {
        self.names.get(&id).map(|name| name.as_slice())
    }

    /// The global palette, only set for palette animations
    pub fn palette(&self) -> Option<&[[u8; 3]]> {
        self.palette.as_deref()
    }

    /// The image shown by the most recent frame
    pub fn current_frame(&self) -> Option<&PixelBuffer> {
        self.current.and_then(|id| self.images.get(&id))
    }

    /// The directive waiting for image operations, if any
    pub const fn pending(&self) -> Option<&FrameDirective> {
        self.directive.as_ref()
    }

    /// Return true once the end of animation chunk was seen
    pub const fn is_eof(&self) -> bool {
        self.eof
    }
}
