//! 60-bit rescaling arithmetic coder built on the [`super::FreqTree`].
//!
//! `low`/`high` are kept in the low 60 bits of a `u64`; products and
//! divisions against the frequency total are carried out in `u128` to
//! stand in for the 64x64->128 wide multiply and 128/64->64 wide divide
//! the source leans on directly.

use bit_vec::BitVec;

use super::FreqTree;

const CODE_BITS: u32 = 60;
const HIGH_INIT: u64 = (1u64 << CODE_BITS) - 1;
const MSB: u64 = 1u64 << (CODE_BITS - 1);
const LOW_MASK: u64 = MSB - 1;

fn narrow(low: u64, high: u64, c_lo: u64, c_hi: u64, total: u64) -> (u64, u64) {
    let width = (high + 1 - low) as u128;
    let low_n = (width * c_lo as u128 / total as u128) as u64 + low;
    let high_n = (width * c_hi as u128 / total as u128) as u64 + low - 1;
    (low_n, high_n)
}

fn renormalize(low: &mut u64, high: &mut u64, out: &mut BitVec) {
    while (*low & MSB) == (*high & MSB) {
        out.push(*low & MSB != 0);
        *low &= LOW_MASK;
        *high &= LOW_MASK;
        *low <<= 1;
        *high = (*high << 1) | 1;
    }
}

/// Encode `data` against `tree`, mutating it adaptively as each symbol
/// is seen. The implicit EOF symbol is encoded last.
pub fn encode(data: &[u8], tree: &mut FreqTree) -> BitVec {
    let mut low: u64 = 0;
    let mut high: u64 = HIGH_INIT;
    let mut out = BitVec::new();

    for &byte in data {
        let total = tree.total();
        let (c_lo, c_hi) = tree.range_and_inc(byte);
        let (low_n, high_n) = narrow(low, high, c_lo, c_hi, total);
        low = low_n;
        high = high_n;
        renormalize(&mut low, &mut high, &mut out);
    }

    let total = tree.total();
    let (c_lo, c_hi) = tree.eof_range();
    let (low_n, high_n) = narrow(low, high, c_lo, c_hi, total);
    low = low_n;
    high = high_n;
    renormalize(&mut low, &mut high, &mut out);

    out.push(high & MSB != 0);
    out
}

/// Decode a bitstream produced by [`encode`] against a freshly
/// initialized `tree` of the same kind used to encode it.
pub fn decode(bits: &BitVec, tree: &mut FreqTree) -> Vec<u8> {
    let mut low: u64 = 0;
    let mut high: u64 = HIGH_INIT;
    let mut code: u64 = 0;
    let mut pos = 0usize;

    for _ in 0..CODE_BITS {
        code <<= 1;
        if let Some(bit) = bits.get(pos) {
            code |= bit as u64;
        }
        pos += 1;
    }

    let mut out = Vec::new();
    loop {
        let total = tree.total();
        let width = (high + 1 - low) as u128;
        let idx = (((code - low + 1) as u128 * total as u128 - 1) / width) as u64;
        if tree.is_eof(idx) {
            break;
        }
        let (symbol, c_lo, c_hi) = tree.lookup_and_inc(idx);
        out.push(symbol);

        let (low_n, high_n) = narrow(low, high, c_lo, c_hi, total);
        low = low_n;
        high = high_n;

        while (low & MSB) == (high & MSB) {
            low &= LOW_MASK;
            high &= LOW_MASK;
            low <<= 1;
            high = (high << 1) | 1;

            code &= LOW_MASK;
            code <<= 1;
            if let Some(bit) = bits.get(pos) {
                code |= bit as u64;
            }
            pos += 1;
        }
    }
    out
}
