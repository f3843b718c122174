//! Adaptive order-0 arithmetic coding.
//!
//! The frequency tree (`tree`) keeps symbols sorted by descending
//! frequency in a heap-laid array so rank/select stay O(log N + run
//! length) instead of O(N). `coder` builds the 60-bit rescaling
//! arithmetic on top of it.

mod tree;
mod coder;

pub use tree::FreqTree;
pub use coder::{decode, encode};

use crate::{Error, STDRESULT};

/// Encode `data` then decode the result and check for equality. This is
/// the only externally visible behavior the format requires: no
/// persistent header is defined, so there is nothing to round-trip
/// against except itself.
pub fn self_check(data: &[u8]) -> STDRESULT {
    let mut enc_tree = FreqTree::new_full();
    let compressed = encode(data, &mut enc_tree);
    let mut dec_tree = FreqTree::new_full();
    let decoded = decode(&compressed, &mut dec_tree);
    if decoded != data {
        log::error!("AC self-check mismatch: {} bytes in, {} bytes out", data.len(), decoded.len());
        return Err(Error::IntegrityError.into());
    }
    log::debug!("AC self-check ok: {} bytes, {} compressed bits", data.len(), compressed.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_pattern_round_trips() {
        let pattern = b"Loremipsumdolorsitamet,consecteturadipiscingelit.";
        let mut data = Vec::new();
        for _ in 0..200 {
            data.extend_from_slice(pattern);
        }
        assert!(self_check(&data).is_ok());
    }

    #[test]
    fn empty_input_round_trips() {
        assert!(self_check(&[]).is_ok());
    }

    #[test]
    fn single_byte_round_trips() {
        assert!(self_check(&[42]).is_ok());
    }

    #[test]
    fn skewed_alphabet_round_trips() {
        // heavily skewed distribution exercises the swap-to-leftmost-run path often
        let mut data = Vec::new();
        for _ in 0..5000 {
            data.push(b'a');
        }
        for i in 0..500u32 {
            data.push((i % 256) as u8);
        }
        assert!(self_check(&data).is_ok());
    }
}
