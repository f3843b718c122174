//! Order-0 byte-histogram entropy, used to report the compressor's
//! effectiveness against an ideal predictor.
//!
//! `H = |log2(prod_i (count_i/size)^(count_i/size))|`, computed over the
//! 256-bin byte histogram. Equivalent to and numerically nicer than the
//! usual `-sum p_i log2 p_i` form, matching how the source accumulates it
//! (a running product rather than a running sum).

pub fn order0_entropy(counts: &[u64; 256]) -> f64 {
    let size: u64 = counts.iter().sum();
    if size == 0 {
        return 0.0;
    }
    let mut product = 1f64;
    for &count in counts {
        if count == 0 {
            continue;
        }
        let p = count as f64 / size as f64;
        product *= p.powf(p);
    }
    product.log2().abs()
}

pub fn histogram(data: &[u8]) -> [u64; 256] {
    let mut counts = [0u64; 256];
    for &b in data {
        counts[b as usize] += 1;
    }
    counts
}

/// Bundles the figures the CLI reports after a `code` run.
#[derive(Debug, Clone, Copy)]
pub struct Report {
    pub uncompressed_size: u64,
    pub compressed_size: u64,
    pub uncompressed_entropy: f64,
    pub compressed_entropy: f64,
    pub avg_codeword_bits: f64,
    pub compression_ratio: f64,
}

pub fn report(uncompressed: &[u8], compressed_bytes: &[u8]) -> Report {
    let u_counts = histogram(uncompressed);
    let c_counts = histogram(compressed_bytes);
    let uncompressed_size = uncompressed.len() as u64;
    let compressed_size = compressed_bytes.len() as u64;
    Report {
        uncompressed_size,
        compressed_size,
        uncompressed_entropy: order0_entropy(&u_counts),
        compressed_entropy: order0_entropy(&c_counts),
        avg_codeword_bits: if uncompressed_size == 0 {
            0.0
        } else {
            8.0 * compressed_size as f64 / uncompressed_size as f64
        },
        compression_ratio: if compressed_size == 0 {
            0.0
        } else {
            uncompressed_size as f64 / compressed_size as f64
        },
    }
}
