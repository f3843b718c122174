//! Minimal 24-bit uncompressed TGA reader/writer and the `lbg` CLI's
//! end-to-end quantize-a-file entry point.
//!
//! Grounded on `original_source/LBG/main.cpp`'s `loadColors`/
//! `transformImage`: the 18-byte header plus optional image-ID and
//! color-map blocks are copied verbatim, pixel data is BGR-ordered, and
//! MSE/SNR/SNR(dB) are accumulated the same way.

use std::collections::HashMap;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use rand::RngCore;

use super::color::Color;
use crate::Error;

const HEADER_LEN: usize = 18;

/// Figures reported after a quantize-and-transform run.
#[derive(Debug, Clone, Copy)]
pub struct Report {
    pub unique_colors: usize,
    pub codebook_size: usize,
    pub mse: f64,
    pub snr: f64,
    pub snr_db: f64,
}

struct TgaHeader {
    id_len: u8,
    color_map_len: u16,
    color_map_entry_bits: u8,
    width: u16,
    height: u16,
    prefix: Vec<u8>,
}

fn read_header(data: &[u8]) -> Result<TgaHeader, Error> {
    if data.len() < HEADER_LEN {
        return Err(Error::FormatError);
    }
    let id_len = data[0];
    let color_map_len = u16::from_le_bytes([data[5], data[6]]);
    let color_map_entry_bits = data[7];
    let width = u16::from_le_bytes([data[12], data[13]]);
    let height = u16::from_le_bytes([data[14], data[15]]);

    let prefix_len = HEADER_LEN + id_len as usize + color_map_len as usize * (color_map_entry_bits as usize / 8);
    if data.len() < prefix_len {
        return Err(Error::FormatError);
    }

    Ok(TgaHeader {
        id_len,
        color_map_len,
        color_map_entry_bits,
        width,
        height,
        prefix: data[..prefix_len].to_vec(),
    })
}

/// Read every pixel of an uncompressed 24-bit TGA, returning its
/// color histogram (unique RGB -> occurrence count).
pub fn load_colors(path: &Path) -> Result<HashMap<Color, u64>, Error> {
    let file = std::fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;

    let header = read_header(&data)?;
    log::debug!(
        "tga header: id_len={} color_map_len={} width={} height={}",
        header.id_len, header.color_map_len, header.width, header.height
    );

    let pixel_count = header.width as usize * header.height as usize;
    let mut pixels = &data[header.prefix.len()..];
    if pixels.len() < pixel_count * 3 {
        return Err(Error::FormatError);
    }

    let mut histogram = HashMap::new();
    for _ in 0..pixel_count {
        let b = pixels[0];
        let g = pixels[1];
        let r = pixels[2];
        *histogram.entry(Color::new(r, g, b)).or_insert(0u64) += 1;
        pixels = &pixels[3..];
    }

    log::info!("loaded {} pixels, {} unique colors", pixel_count, histogram.len());
    Ok(histogram)
}

/// Quantise the 24-bit TGA at `input` to a codebook of `2^k` colors and
/// write the result to `output`, preserving the input header (and any
/// color map) verbatim. Returns distortion figures over the whole
/// image.
pub fn quantize_file(
    input: &Path,
    output: &Path,
    k: u32,
    epsilon: f64,
    rng: &mut impl RngCore,
) -> Result<Report, crate::DYNERR> {
    if k > 24 {
        return Err(Error::ArgumentError.into());
    }
    let target = 1usize << k;

    let raw = std::fs::read(input)?;
    let header = read_header(&raw)?;
    let histogram = load_colors(input)?;

    let (code_book, color_to_uuid) = super::quantize(&histogram, target, epsilon, rng);
    log::info!("quantized to {} codewords", code_book.len());

    let out_file = std::fs::File::create(output)?;
    let mut writer = BufWriter::new(out_file);
    writer.write_all(&header.prefix)?;

    let pixel_count = header.width as usize * header.height as usize;
    let mut pixels = &raw[header.prefix.len()..header.prefix.len() + pixel_count * 3];

    let mut mse_sum = 0u64;
    let mut snr_sum = 0u64;
    let mut count = 0u64;

    for _ in 0..pixel_count {
        let b = pixels[0];
        let g = pixels[1];
        let r = pixels[2];
        let original = Color::new(r, g, b);

        snr_sum += r as u64 * r as u64;
        snr_sum += g as u64 * g as u64;
        snr_sum += b as u64 * b as u64;

        let uuid = color_to_uuid[&original];
        let replacement = code_book[&uuid];
        mse_sum += super::distance(original, replacement);
        count += 1;

        writer.write_all(&[replacement.b, replacement.g, replacement.r])?;
        pixels = &pixels[3..];
    }
    writer.write_all(&raw[header.prefix.len() + pixel_count * 3..])?;
    writer.flush()?;

    count *= 3;
    let real_mse = ((mse_sum as f64) / (count as f64)).sqrt();
    let snr = if real_mse == 0.0 { f64::INFINITY } else { (snr_sum as f64 / count as f64) / real_mse };
    let snr_db = if real_mse == 0.0 { f64::INFINITY } else { 10.0 * snr.log10() };

    Ok(Report { unique_colors: histogram.len(), codebook_size: code_book.len(), mse: real_mse, snr, snr_db })
}
