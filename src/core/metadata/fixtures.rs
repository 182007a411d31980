//! Minimal JPEG files carrying an EXIF block, for tests.
//!
//! Shared with the integration tests, which include this file by path.

const TYPE_ASCII: u16 = 2;
const TYPE_LONG: u16 = 4;
const TAG_DATE_TIME: u16 = 0x0132;
const TAG_EXIF_POINTER: u16 = 0x8769;
const TAG_DATE_TIME_ORIGINAL: u16 = 0x9003;

/// SOI + APP1(Exif) + EOI with the given date fields
pub fn jpeg_with_dates(original: Option<&str>, date_time: Option<&str>) -> Vec<u8> {
    let tiff = tiff_block(original, date_time);

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    let segment_len = (2 + 6 + tiff.len()) as u16;
    jpeg.extend_from_slice(&segment_len.to_be_bytes());
    jpeg.extend_from_slice(b"Exif\0\0");
    jpeg.extend_from_slice(&tiff);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}

fn tiff_block(original: Option<&str>, date_time: Option<&str>) -> Vec<u8> {
    let ifd0_count = date_time.is_some() as usize + original.is_some() as usize;
    let ifd0_len = 2 + 12 * ifd0_count + 4;
    let exif_ifd_offset = 8 + ifd0_len;
    let exif_ifd_len = if original.is_some() { 2 + 12 + 4 } else { 0 };
    let mut data_offset = exif_ifd_offset + exif_ifd_len;

    let mut out = Vec::new();
    out.extend_from_slice(b"II");
    out.extend_from_slice(&42u16.to_le_bytes());
    out.extend_from_slice(&8u32.to_le_bytes());

    let mut data = Vec::new();
    let mut ascii_entry = |out: &mut Vec<u8>, tag: u16, value: &str| {
        let mut bytes = value.as_bytes().to_vec();
        bytes.push(0);
        entry(out, tag, TYPE_ASCII, bytes.len() as u32, data_offset as u32);
        data_offset += bytes.len();
        data.extend_from_slice(&bytes);
    };

    out.extend_from_slice(&(ifd0_count as u16).to_le_bytes());
    if let Some(value) = date_time {
        ascii_entry(&mut out, TAG_DATE_TIME, value);
    }
    if original.is_some() {
        entry(&mut out, TAG_EXIF_POINTER, TYPE_LONG, 1, exif_ifd_offset as u32);
    }
    out.extend_from_slice(&0u32.to_le_bytes());

    if let Some(value) = original {
        out.extend_from_slice(&1u16.to_le_bytes());
        ascii_entry(&mut out, TAG_DATE_TIME_ORIGINAL, value);
        out.extend_from_slice(&0u32.to_le_bytes());
    }

    out.extend_from_slice(&data);
    out
}

fn entry(out: &mut Vec<u8>, tag: u16, kind: u16, count: u32, value: u32) {
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&kind.to_le_bytes());
    out.extend_from_slice(&count.to_le_bytes());
    out.extend_from_slice(&value.to_le_bytes());
}
