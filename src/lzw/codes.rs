//! Universal integer codes used to frame the LZW index stream: Elias
//! gamma, delta, omega, and Fibonacci/Zeckendorf. Each is a capability
//! of `{encode, decode, fill}` selected at dictionary-coder construction,
//! mirroring the four `NumbersCoder<T>` specializations of the source.

use bit_vec::BitVec;

/// Binary length of `v`, i.e. `floor(log2(v)) + 1`. Never called with 0.
fn bit_length(v: u64) -> u32 {
    64 - v.leading_zeros()
}

fn push_msb_first(bits: &mut BitVec, value: u64, size: u32) {
    for i in (0..size).rev() {
        bits.push((value >> i) & 1 == 1);
    }
}

fn read_msb_first(bits: &BitVec, pos: &mut usize, count: u32) -> u64 {
    let mut value = 0u64;
    for _ in 0..count {
        value <<= 1;
        value |= bits.get(*pos).unwrap_or(false) as u64;
        *pos += 1;
    }
    value
}

fn encode_gamma(bits: &mut BitVec, value: u64) {
    let size = bit_length(value);
    for _ in 0..size - 1 {
        bits.push(false);
    }
    push_msb_first(bits, value, size);
}

fn decode_gamma(bits: &BitVec, pos: &mut usize) -> Option<u64> {
    let len = bits.len();
    let mut size = 0u32;
    let mut p = *pos;
    while p < len && !bits.get(p).unwrap() {
        size += 1;
        p += 1;
    }
    if p >= len || len - p < (size + 1) as usize {
        return None;
    }
    let value = read_msb_first(bits, &mut p, size + 1);
    *pos = p;
    Some(value)
}

fn encode_delta(bits: &mut BitVec, value: u64) {
    let size_val = bit_length(value);
    let size_n = bit_length(size_val as u64);
    for _ in 0..size_n - 1 {
        bits.push(false);
    }
    push_msb_first(bits, size_val as u64, size_n);
    push_msb_first(bits, value, size_val - 1);
}

fn decode_delta(bits: &BitVec, pos: &mut usize) -> Option<u64> {
    let len = bits.len();
    let mut size_n = 0u32;
    let mut p = *pos;
    while p < len && !bits.get(p).unwrap() {
        size_n += 1;
        p += 1;
    }
    if p >= len || len - p < (size_n + 1) as usize {
        return None;
    }
    let size_val = read_msb_first(bits, &mut p, size_n + 1);
    if size_val == 0 {
        return None;
    }
    let remaining = (size_val - 1) as usize;
    if len - p < remaining {
        return None;
    }
    let mut value = 1u64;
    for _ in 0..remaining {
        value <<= 1;
        value |= bits.get(p).unwrap() as u64;
        p += 1;
    }
    *pos = p;
    Some(value)
}

fn encode_omega(bits: &mut BitVec, mut value: u64) {
    let mut tmp: Vec<bool> = Vec::new();
    while value > 1 {
        let size = bit_length(value);
        for i in 0..size {
            tmp.push((value >> i) & 1 == 1);
        }
        value = (size - 1) as u64;
    }
    tmp.reverse();
    tmp.push(false);
    for b in tmp {
        bits.push(b);
    }
}

fn decode_omega(bits: &BitVec, pos: &mut usize) -> Option<u64> {
    let len = bits.len();
    if *pos != len && !bits.get(*pos).unwrap() {
        *pos += 1;
        return Some(1);
    }
    let mut l_sh = *pos;
    let mut to_read: u64 = 2;
    let mut value: u64 = 0;
    loop {
        if to_read as usize + l_sh > len {
            return None;
        }
        for _ in 0..to_read {
            value <<= 1;
            value |= bits.get(l_sh).unwrap() as u64;
            l_sh += 1;
        }
        if l_sh == len {
            return None;
        }
        if !bits.get(l_sh).unwrap() {
            *pos = l_sh + 1;
            return Some(value);
        }
        to_read = value + 1;
        value = 0;
    }
}

/// `fib_table[i]` is the (i+2)'th Fibonacci number, i.e. index 0 holds
/// F2 = 1, index 1 holds F3 = 2, and so on up to F93 (F94 would overflow
/// `u64`, and the spec's usable range tops out at F93 regardless).
fn fib_table() -> [u64; 92] {
    let mut table = [0u64; 92];
    table[0] = 1;
    table[1] = 2;
    for i in 2..92 {
        table[i] = table[i - 1] + table[i - 2];
    }
    table
}

/// Greedy Zeckendorf decomposition of `value` into non-consecutive
/// Fibonacci numbers, returned as LSB-first inclusion bits (index i set
/// iff `fib_table[i]` is used).
fn zeckendorf_bits(mut value: u64, table: &[u64; 92]) -> Vec<bool> {
    let mut top = 0usize;
    while top + 1 < table.len() && table[top + 1] <= value {
        top += 1;
    }
    let mut bits = vec![false; top + 1];
    let mut cur = top;
    loop {
        bits[cur] = true;
        value -= table[cur];
        if value == 0 {
            break;
        }
        let mut next = cur - 1;
        while table[next] > value {
            next -= 1;
        }
        cur = next;
    }
    bits
}

fn encode_fib(bits: &mut BitVec, value: u64) {
    let table = fib_table();
    let digits = zeckendorf_bits(value, &table);
    for b in &digits {
        bits.push(*b);
    }
    bits.push(true);
}

fn decode_fib(bits: &BitVec, pos: &mut usize) -> Option<u64> {
    let table = fib_table();
    let len = bits.len();
    let mut l_sh = *pos;
    let mut req0 = false;
    let mut valid = false;
    while l_sh < len {
        let bit = bits.get(l_sh).unwrap();
        if req0 && bit {
            valid = true;
            break;
        }
        req0 = bit;
        l_sh += 1;
    }
    if !valid {
        return None;
    }
    let size = l_sh - *pos;
    let mut value = 0u64;
    for i in 0..size {
        if bits.get(*pos + i).unwrap() {
            value += table[i];
        }
    }
    *pos = l_sh + 1;
    Some(value)
}

/// Selects which universal integer code frames the dictionary index
/// stream. Default is `Omega`, matching the CLI default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Coding {
    Gamma,
    Delta,
    Omega,
    Fibonacci,
}

impl Coding {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "gamma" => Some(Coding::Gamma),
            "delta" => Some(Coding::Delta),
            "omega" => Some(Coding::Omega),
            "fib" => Some(Coding::Fibonacci),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Coding::Gamma => "gamma",
            Coding::Delta => "delta",
            Coding::Omega => "omega",
            Coding::Fibonacci => "fib",
        }
    }

    /// Padding bit used to fill the last byte during encode, and the
    /// sentinel fed to the decoder once real input is exhausted.
    pub fn fill(&self) -> bool {
        matches!(self, Coding::Omega)
    }

    pub fn encode(&self, bits: &mut BitVec, value: u64) {
        match self {
            Coding::Gamma => encode_gamma(bits, value),
            Coding::Delta => encode_delta(bits, value),
            Coding::Omega => encode_omega(bits, value),
            Coding::Fibonacci => encode_fib(bits, value),
        }
    }

    pub fn decode(&self, bits: &BitVec, pos: &mut usize) -> Option<u64> {
        match self {
            Coding::Gamma => decode_gamma(bits, pos),
            Coding::Delta => decode_delta(bits, pos),
            Coding::Omega => decode_omega(bits, pos),
            Coding::Fibonacci => decode_fib(bits, pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits_from_str(s: &str) -> BitVec {
        s.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn gamma_matches_known_codewords() {
        let mut bits = BitVec::new();
        Coding::Gamma.encode(&mut bits, 1);
        assert_eq!(bits, bits_from_str("1"));
        let mut bits = BitVec::new();
        Coding::Gamma.encode(&mut bits, 5);
        assert_eq!(bits, bits_from_str("00101"));
        let mut bits = BitVec::new();
        Coding::Gamma.encode(&mut bits, 10);
        assert_eq!(bits, bits_from_str("0001010"));
    }

    #[test]
    fn delta_matches_known_codewords() {
        let mut bits = BitVec::new();
        Coding::Delta.encode(&mut bits, 1);
        assert_eq!(bits, bits_from_str("1"));
        let mut bits = BitVec::new();
        Coding::Delta.encode(&mut bits, 5);
        assert_eq!(bits, bits_from_str("01101"));
    }

    #[test]
    fn omega_matches_known_codewords() {
        let mut bits = BitVec::new();
        Coding::Omega.encode(&mut bits, 1);
        assert_eq!(bits, bits_from_str("0"));
        let mut bits = BitVec::new();
        Coding::Omega.encode(&mut bits, 2);
        assert_eq!(bits, bits_from_str("100"));
        let mut bits = BitVec::new();
        Coding::Omega.encode(&mut bits, 8);
        assert_eq!(bits, bits_from_str("1110000"));
    }

    #[test]
    fn fibonacci_matches_known_codewords() {
        let mut bits = BitVec::new();
        Coding::Fibonacci.encode(&mut bits, 1);
        assert_eq!(bits, bits_from_str("11"));
        let mut bits = BitVec::new();
        Coding::Fibonacci.encode(&mut bits, 7);
        assert_eq!(bits, bits_from_str("01011"));
    }

    #[test]
    fn round_trips_for_many_values() {
        for coding in [Coding::Gamma, Coding::Delta, Coding::Omega, Coding::Fibonacci] {
            for n in 1..2000u64 {
                let mut bits = BitVec::new();
                coding.encode(&mut bits, n);
                let mut pos = 0;
                let (decoded, ok) = match coding.decode(&bits, &mut pos) {
                    Some(v) => (v, true),
                    None => (0, false),
                };
                assert!(ok, "{:?} failed to decode n={}", coding, n);
                assert_eq!(decoded, n, "{:?} round trip mismatch for n={}", coding, n);
                assert_eq!(pos, bits.len(), "{:?} left unread bits for n={}", coding, n);
            }
        }
    }

    #[test]
    fn round_trips_near_the_60_bit_boundary() {
        let values: [u64; 6] = [
            1,
            (1u64 << 59) - 1,
            1u64 << 59,
            (1u64 << 60) - 1,
            1u64 << 60,
            u64::MAX >> 2,
        ];
        for coding in [Coding::Gamma, Coding::Delta, Coding::Omega, Coding::Fibonacci] {
            for &n in &values {
                let mut bits = BitVec::new();
                coding.encode(&mut bits, n);
                let mut pos = 0;
                let decoded = coding.decode(&bits, &mut pos);
                assert_eq!(decoded, Some(n), "{:?} failed to round trip n={}", coding, n);
                assert_eq!(pos, bits.len(), "{:?} left unread bits for n={}", coding, n);
            }
        }
    }

    #[test]
    fn concatenation_decodes_back_to_sequence() {
        for coding in [Coding::Gamma, Coding::Delta, Coding::Omega, Coding::Fibonacci] {
            let values: Vec<u64> = vec![1, 2, 3, 7, 42, 1000, 5];
            let mut bits = BitVec::new();
            for &v in &values {
                coding.encode(&mut bits, v);
            }
            let mut pos = 0;
            let mut decoded = Vec::new();
            while pos < bits.len() {
                match coding.decode(&bits, &mut pos) {
                    Some(v) => decoded.push(v),
                    None => break,
                }
            }
            assert_eq!(decoded, values, "{:?} failed to decode concatenation", coding);
        }
    }

    #[test]
    fn truncated_stream_reports_not_ok() {
        for coding in [Coding::Gamma, Coding::Delta, Coding::Omega, Coding::Fibonacci] {
            let mut bits = BitVec::new();
            coding.encode(&mut bits, 1000);
            bits.truncate(bits.len() - 1);
            let mut pos = 0;
            assert!(coding.decode(&bits, &mut pos).is_none());
        }
    }
}
