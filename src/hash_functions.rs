//! Interchangeable string hash functions.
//!
//! Every function has the shape [`HashFn`]: it takes the key and the modulus to bound the result
//! by, and returns a value in `0..modulus`. The tables pass their current capacity as the
//! modulus, so a function never depends on anything but its arguments. A modulus of zero yields
//! zero, and every function is defined for the empty key.

use std::hash::{DefaultHasher, Hash, Hasher};

/// Signature shared by all hash functions: `(key, modulus) -> hash in 0..modulus`
pub type HashFn = fn(&str, usize) -> usize;

/// Radix used when folding a string into one integer
const CHAR_RADIX: u64 = 128;
/// Base of the polynomial rolling hash
const POLYNOMIAL_BASE: u64 = 31;
/// Multiplier applied after each XOR step
const XOR_MULTIPLIER: u32 = 31;
/// 32-bit FNV prime
const FNV_PRIME: u32 = 16_777_619;
/// Largest prime below 2^16, the Adler-32 modulus
const ADLER_MODULUS: u32 = 65_521;
/// 2^64 divided by the golden ratio, i.e. `A = (sqrt(5) - 1) / 2` in 64-bit fixed point
const FIBONACCI_MULTIPLIER: u64 = 11_400_714_819_323_198_485;

/// Hash functions compared by the chained-table suite
pub const CHAINED_HASH_FUNCTIONS: &[(&str, HashFn)] = &[
    ("default", default_hash),
    ("multiplicative", multiplicative),
    ("polynomial", polynomial),
    ("first_last", first_last),
    ("division", division),
    ("adler32", adler32),
];

/// Hash functions compared by the open-addressing suite
pub const OPEN_ADDRESSING_HASH_FUNCTIONS: &[(&str, HashFn)] = &[
    ("default", default_hash),
    ("multiplicative", multiplicative),
    ("length_based", length_based),
    ("polynomial", polynomial),
    ("first_last", first_last),
];

/// Every hash function in this module
pub const ALL_HASH_FUNCTIONS: &[(&str, HashFn)] = &[
    ("default", default_hash),
    ("division", division),
    ("multiplicative", multiplicative),
    ("polynomial", polynomial),
    ("length_based", length_based),
    ("xor", xor),
    ("shift_xor_multiply", shift_xor_multiply),
    ("adler32", adler32),
    ("first_last", first_last),
];

/// Reduces `value` into `0..modulus`, mapping a zero modulus to zero
#[allow(clippy::cast_possible_truncation)]
fn reduce(value: u64, modulus: usize) -> usize {
    value.checked_rem(modulus as u64).unwrap_or(0) as usize
}

/// Folds the characters of `key` into one integer in radix 128, wrapping on overflow
fn fold_radix(key: &str) -> u64 {
    key.chars()
        .fold(0_u64, |acc, ch| acc.wrapping_mul(CHAR_RADIX).wrapping_add(u64::from(ch)))
}

/// Division method: the radix-128 value of the key modulo `modulus`
#[must_use]
pub fn division(key: &str, modulus: usize) -> usize {
    reduce(fold_radix(key), modulus)
}

/// Multiplication method with Knuth's golden-ratio constant: `floor(m * frac(k * A))`
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::arithmetic_side_effects)]
pub fn multiplicative(key: &str, modulus: usize) -> usize {
    let fraction = fold_radix(key).wrapping_mul(FIBONACCI_MULTIPLIER);
    // fraction / 2^64 is frac(k * A), so the high word of the product is the scaled hash
    ((u128::from(fraction) * modulus as u128) >> 64) as usize
}

/// Polynomial rolling hash with base 31, reduced after every character
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::arithmetic_side_effects)]
pub fn polynomial(key: &str, modulus: usize) -> usize {
    if modulus == 0 {
        return 0;
    }
    let wide_modulus = modulus as u128;
    // the accumulator stays below `modulus`, so it always fits back into usize
    key.chars().fold(0_usize, |acc, ch| {
        let next = acc as u128 * u128::from(POLYNOMIAL_BASE) + u128::from(u32::from(ch));
        (next % wide_modulus) as usize
    })
}

/// Hashes by key length alone, counted in characters
#[must_use]
pub fn length_based(key: &str, modulus: usize) -> usize {
    reduce(key.chars().count() as u64, modulus)
}

/// XORs each character into the state and multiplies by 31
#[must_use]
pub fn xor(key: &str, modulus: usize) -> usize {
    let hash = key
        .chars()
        .fold(0_u32, |acc, ch| (acc ^ u32::from(ch)).wrapping_mul(XOR_MULTIPLIER));
    reduce(u64::from(hash), modulus)
}

/// Shift-and-XOR mixing followed by a multiply with the FNV prime
#[must_use]
pub fn shift_xor_multiply(key: &str, modulus: usize) -> usize {
    let hash = key.chars().fold(0_u32, |acc, ch| {
        let mixed = acc ^ (acc << 5).wrapping_add(acc >> 2).wrapping_add(u32::from(ch));
        mixed.wrapping_mul(FNV_PRIME)
    });
    reduce(u64::from(hash), modulus)
}

/// Adler-32 style checksum: two running sums modulo 65521 packed into one word
#[must_use]
pub fn adler32(key: &str, modulus: usize) -> usize {
    let (a, b) = key.chars().fold((1_u32, 0_u32), |(a, b), ch| {
        let a = a.wrapping_add(u32::from(ch)) % ADLER_MODULUS;
        let b = b.wrapping_add(a) % ADLER_MODULUS;
        (a, b)
    });
    reduce(u64::from((b << 16) | a), modulus)
}

/// Combines the first and the last character; the empty key hashes to zero
#[must_use]
pub fn first_last(key: &str, modulus: usize) -> usize {
    let mut chars = key.chars();
    let Some(first) = chars.next() else {
        return 0;
    };
    let last = chars.next_back().unwrap_or(first);
    let combined =
        u64::from(first).wrapping_mul(POLYNOMIAL_BASE).wrapping_add(u64::from(last));
    reduce(combined, modulus)
}

/// The standard library's `DefaultHasher` (`SipHash` with fixed keys) modulo `modulus`
#[must_use]
pub fn default_hash(key: &str, modulus: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    reduce(hasher.finish(), modulus)
}
