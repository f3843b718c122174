//! LZW dictionary compression framed by a pluggable universal integer
//! code over an open-addressed hash-table dictionary.

mod dictionary;
mod codes;
pub mod entropy;

pub use codes::Coding;
pub use dictionary::{Dictionary, Entry, Speed};

use bit_vec::BitVec;

/// Default dictionary size. The source uses `10 * 1000 * 1024` entries
/// for production runs; that's needlessly large for a library default,
/// so this scales it down while keeping it configurable per-call.
pub const DEFAULT_BASE_SIZE: usize = 1 << 20;

#[derive(Clone, Copy, Debug)]
pub struct Settings {
    pub base_size: usize,
    pub speed: Speed,
    pub coding: Coding,
}

pub const STD_SETTINGS: Settings = Settings {
    base_size: DEFAULT_BASE_SIZE,
    speed: Speed::Slow,
    coding: Coding::Omega,
};

/// Compress `data` with the dictionary/codec combination in `settings`.
/// The returned bitstream is padded to a byte boundary with the codec's
/// fill bit.
pub fn compress(data: &[u8], settings: &Settings) -> BitVec {
    let mut dict = Dictionary::new(settings.base_size, settings.speed);
    let mut out = BitVec::new();

    // last_real_id/last_index start at the reserved sentinel slot; the
    // very first byte always matches the singleton whose (index, parent)
    // key is exactly (hash(0, byte), 0), so the cache-miss branch below
    // is never reached with last_real_id still at its sentinel value.
    let mut last_index: u64 = 0;
    let mut last_real_id: usize = 0;

    for &byte in data {
        let next_index = dict.hash(last_index, byte as u64);
        if let Some(id) = dict.real_id_of(next_index, last_real_id as u64) {
            last_index = next_index;
            last_real_id = id;
            continue;
        }

        settings.coding.encode(&mut out, last_real_id as u64);

        if dict.len() < dict.max_size() {
            dict.insert(Entry { index: next_index, parent: last_real_id as u64, character: byte });
        }
        if dict.len() >= dict.max_size() {
            log::debug!("lzw dictionary full at {} entries, resetting", dict.len());
            dict.clear();
        }

        last_real_id = dict.base_node_real_id(byte);
        last_index = dict.at(last_real_id).index;
    }

    // Guard against the empty-input case: the sentinel real id 0 does
    // not name an entry and encoding it would be meaningless.
    if last_real_id != 0 {
        settings.coding.encode(&mut out, last_real_id as u64);
    }

    while out.len() % 8 != 0 {
        out.push(settings.coding.fill());
    }
    out
}

/// Expand a bitstream produced by [`compress`] with the same `settings`.
pub fn expand(bits: &BitVec, settings: &Settings) -> Vec<u8> {
    let mut out = Vec::new();
    if bits.is_empty() {
        return out;
    }

    let mut dict = Dictionary::new(settings.base_size, settings.speed);
    let mut pos = 0usize;

    let first_id = match settings.coding.decode(bits, &mut pos) {
        Some(v) => v as usize,
        None => return out,
    };

    let mut last_real_id = first_id;
    let mut last_index = dict.at(last_real_id).index;
    out.push(dict.at(last_real_id).character);
    let mut tmp = last_real_id;

    loop {
        let next_real_id = match settings.coding.decode(bits, &mut pos) {
            Some(v) => v as usize,
            None => break,
        };

        if dict.at(next_real_id).index == 0 {
            // KwK case: the encoder emitted this code before defining it.
            let ch = dict.at(tmp).character;
            let new_index = dict.hash(last_index, ch as u64);
            dict.insert(Entry { index: new_index, parent: last_real_id as u64, character: ch });
        }

        tmp = next_real_id;
        let mut chain = Vec::new();
        loop {
            chain.push(dict.at(tmp).character);
            let parent = dict.at(tmp).parent;
            if parent == 0 {
                break;
            }
            tmp = parent as usize;
        }
        out.extend(chain.iter().rev());

        let first_byte = dict.at(tmp).character;
        let next_index = dict.hash(last_index, first_byte as u64);
        if dict.len() < dict.max_size() {
            dict.insert(Entry { index: next_index, parent: last_real_id as u64, character: first_byte });
        }
        if dict.len() >= dict.max_size() {
            dict.clear();
        }

        last_real_id = next_real_id;
        last_index = dict.at(last_real_id).index;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_for(speed: Speed, coding: Coding) -> Settings {
        Settings { base_size: 4096, speed, coding }
    }

    #[test]
    fn round_trips_across_codings_and_speeds() {
        let data = b"ababababababababababababababababababababababababab".to_vec();
        for speed in [Speed::Slow, Speed::Fast] {
            for coding in [Coding::Gamma, Coding::Delta, Coding::Omega, Coding::Fibonacci] {
                let settings = settings_for(speed, coding);
                let compressed = compress(&data, &settings);
                let decompressed = expand(&compressed, &settings);
                assert_eq!(decompressed, data, "speed={:?} coding={:?}", speed, coding);
            }
        }
    }

    #[test]
    fn repeated_pattern_compresses_smaller_than_input() {
        let pattern = b"ab";
        let mut data = Vec::new();
        for _ in 0..32 {
            data.extend_from_slice(pattern);
        }
        let settings = settings_for(Speed::Slow, Coding::Gamma);
        let compressed = compress(&data, &settings);
        assert!(compressed.len() / 8 < data.len());
        let decompressed = expand(&compressed, &settings);
        assert_eq!(decompressed, data);
    }

    #[test]
    fn empty_input_round_trips_to_empty_output() {
        let settings = STD_SETTINGS;
        let compressed = compress(&[], &settings);
        assert!(compressed.is_empty());
        let decompressed = expand(&compressed, &settings);
        assert!(decompressed.is_empty());
    }

    #[test]
    fn single_byte_round_trips() {
        let settings = settings_for(Speed::Slow, Coding::Omega);
        let compressed = compress(&[7], &settings);
        let decompressed = expand(&compressed, &settings);
        assert_eq!(decompressed, vec![7]);
    }

    #[test]
    fn dictionary_reset_under_small_capacity_still_round_trips() {
        // small base_size forces several reset-to-singletons cycles
        let settings = Settings { base_size: 300, speed: Speed::Slow, coding: Coding::Delta };
        let mut data = Vec::new();
        for i in 0..5000u32 {
            data.push((i % 97) as u8);
        }
        let compressed = compress(&data, &settings);
        let decompressed = expand(&compressed, &settings);
        assert_eq!(decompressed, data);
    }

    #[test]
    fn random_like_byte_stream_round_trips() {
        let mut data = Vec::new();
        let mut x: u32 = 12345;
        for _ in 0..3000 {
            x = x.wrapping_mul(1103515245).wrapping_add(12345);
            data.push((x >> 16) as u8);
        }
        let settings = settings_for(Speed::Fast, Coding::Fibonacci);
        let compressed = compress(&data, &settings);
        let decompressed = expand(&compressed, &settings);
        assert_eq!(decompressed, data);
    }
}
