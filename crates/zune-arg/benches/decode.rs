/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::io::Write;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use flate2::write::ZlibEncoder;
use flate2::{Compression, Crc};
use nanorand::{Rng, WyRand};
use zune_arg::{ArgDecoder, ARG_SIGNATURE};
use zune_core::bytestream::ZCursor;

const WIDTH: u32 = 256;
const HEIGHT: u32 = 256;
const FRAMES: usize = 24;

fn write_chunk(out: &mut Vec<u8>, tag: &[u8; 4], payload: &[u8]) {
    let mut crc = Crc::new();
    crc.update(tag);
    crc.update(payload);

    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(tag);
    out.extend_from_slice(payload);
    out.extend_from_slice(&crc.sum().to_be_bytes());
}

fn size_mode(width: u32, height: u32) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&width.to_be_bytes());
    payload.extend_from_slice(&height.to_be_bytes());
    payload.extend_from_slice(&[8, 6]);
    payload
}

/// A full RGBA key frame followed by delta frames patching a
/// quarter of the canvas each
fn make_animation() -> Vec<u8> {
    let mut rng = WyRand::new_seed(0x5eed);
    let mut out = ARG_SIGNATURE.to_vec();

    write_chunk(&mut out, b"AHDR", &size_mode(WIDTH, HEIGHT));

    for frame in 0..FRAMES {
        let (width, height, x, y) = if frame == 0 {
            (WIDTH, HEIGHT, 0, 0)
        } else {
            let x = (frame as u32 % 2) * WIDTH / 2;
            let y = (frame as u32 / 2 % 2) * HEIGHT / 2;
            (WIDTH / 2, HEIGHT / 2, x, y)
        };
        let stride = width as usize * 4;
        let mut rows = Vec::with_capacity((stride + 1) * height as usize);

        for _ in 0..height {
            rows.push(rng.generate_range(0_u8..5));
            rows.extend((0..stride).map(|_| rng.generate::<u8>() & 0x0f));
        }
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(&rows).unwrap();
        let compressed = encoder.finish().unwrap();

        write_chunk(&mut out, b"AFRM", &[0, 0, 0, 1]);

        if frame == 0 {
            let mut header = size_mode(width, height);
            header.extend_from_slice(&[0, 0, 0]);
            write_chunk(&mut out, b"IHDR", &header);
        } else {
            let mut header = size_mode(width, height);
            header.extend_from_slice(&[0, 0, 0, 0]);
            header.extend_from_slice(&x.to_be_bytes());
            header.extend_from_slice(&y.to_be_bytes());
            write_chunk(&mut out, b"DHDR", &header);
        }
        for piece in compressed.chunks(8192) {
            write_chunk(&mut out, b"IDAT", piece);
        }
        write_chunk(&mut out, if frame == 0 { b"IEND" } else { b"DEND" }, &[]);
    }
    write_chunk(&mut out, b"AEND", &[]);
    out
}

fn decode_zune(data: &[u8]) -> usize {
    ArgDecoder::new(ZCursor::new(data))
        .decode_all()
        .unwrap()
        .len()
}

fn decode_test(c: &mut Criterion) {
    let data = make_animation();

    let mut group = c.benchmark_group("[arg]: ARG decoding");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("ARG decoding, key frame and deltas", |b| {
        b.iter(|| black_box(decode_zune(data.as_slice())))
    });
}

criterion_group!(name=benches;
      config={
      let c = Criterion::default();
        c.measurement_time(std::time::Duration::from_secs(20))
      };
    targets=decode_test);

criterion_main!(benches);
