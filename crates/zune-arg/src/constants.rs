/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

/// Magic bytes every ARG stream starts with
pub const ARG_SIGNATURE: [u8; 8] = [0x8A, b'A', b'R', b'G', b'\r', b'\n', 0x1A, b'\n'];

/// Minimum length of an `AHDR`, `BLNK`, `JHDR` or `UHDR` payload
pub(crate) const SIZE_MODE_LENGTH: usize = 10;

/// Minimum length of an `IHDR` payload
pub(crate) const FULL_HEADER_LENGTH: usize = 13;

/// Minimum length of a `DHDR` payload
pub(crate) const DELTA_HEADER_LENGTH: usize = 22;

/// Minimum length of a `PAST` payload
pub(crate) const PASTE_LENGTH: usize = 10;

/// Number of entries in the global palette
pub(crate) const PALETTE_ENTRIES: usize = 256;

/// Scale factors to bring 1, 2 and 4 bit luma samples to the full
/// 8 bit range, indexed by depth
pub(crate) const DEPTH_SCALE_TABLE: [u8; 9] = [0, 0xff, 0x55, 0, 0x11, 0, 0, 0, 0x01];
