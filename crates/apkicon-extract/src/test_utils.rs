use std::io::{Cursor, Write};

use image::{ImageFormat, Rgba, RgbaImage};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

/// Builds an in-memory zip with stored entries, in the given order.
pub fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    build_zip_with(entries, CompressionMethod::Stored)
}

/// Builds an in-memory zip using `method` for every file entry.
/// Names ending in `/` become directory entries.
pub fn build_zip_with(entries: &[(&str, &[u8])], method: CompressionMethod) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(method);

    for (name, data) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
    }

    writer.finish().unwrap().into_inner()
}

/// Flips one byte inside a stored payload so its CRC no longer matches.
pub fn corrupt_payload(zip: &mut [u8], payload: &[u8]) {
    let offset = zip
        .windows(payload.len())
        .position(|window| window == payload)
        .expect("payload not found in archive");
    zip[offset] ^= 0xff;
}

/// Encodes a solid square PNG of the given size.
pub fn png_icon(size: u32) -> Vec<u8> {
    let image = RgbaImage::from_pixel(size, size, Rgba([0x3d, 0xdc, 0x84, 0xff]));
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}
