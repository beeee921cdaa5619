/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! CRC-32 as used by png and ARG chunk trailers

const CRC_POLYNOMIAL: u32 = 0xEDB8_8320;

const fn make_crc_table() -> [u32; 256] {
    let mut table = [0_u32; 256];
    let mut n = 0;

    while n < 256 {
        let mut c = n as u32;
        let mut k = 0;

        while k < 8 {
            if c & 1 != 0 {
                c = CRC_POLYNOMIAL ^ (c >> 1);
            } else {
                c >>= 1;
            }
            k += 1;
        }
        table[n] = c;
        n += 1;
    }
    table
}

static CRC_TABLE: [u32; 256] = make_crc_table();

/// Update a running crc with `bytes`.
///
/// Start with `u32::MAX` and invert the final value
pub(crate) fn crc32_update(bytes: &[u8], mut crc: u32) -> u32 {
    for byte in bytes {
        crc = CRC_TABLE[usize::from((crc as u8) ^ *byte)] ^ (crc >> 8);
    }
    crc
}

/// Calculate the crc of a chunk, covering the chunk type and payload
pub(crate) fn chunk_crc(chunk_type: &[u8; 4], payload: &[u8]) -> u32 {
    !crc32_update(payload, crc32_update(chunk_type, u32::MAX))
}
