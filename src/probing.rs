//! Probe sequence generators for open addressing.
//!
//! A probe function maps `(base_hash, attempt, capacity)` to the slot tried on that attempt. All
//! arithmetic is carried out modulo `capacity` in 128-bit intermediates, so results are always in
//! `0..capacity` and never overflow regardless of how large the attempt number gets. A capacity
//! of zero yields zero.
//!
//! Only linear probing is guaranteed to visit every slot. Quadratic, cubic and exponential
//! sequences can cycle through a subset of the table, and double hashing only covers the whole
//! table when its step is coprime with the capacity. The tables therefore stop after `capacity`
//! attempts and report [`MapError::TableFull`](crate::MapError::TableFull).

/// Signature shared by all probe functions: `(base_hash, attempt, capacity) -> slot`
pub type ProbeFn = fn(usize, usize, usize) -> usize;

/// Linear coefficient of quadratic probing
const QUADRATIC_C1: u128 = 1;
/// Quadratic coefficient of quadratic probing
const QUADRATIC_C2: u128 = 3;
/// Linear coefficient of cubic probing
const CUBIC_C1: u128 = 1;
/// Cubic coefficient of cubic probing
const CUBIC_C2: u128 = 1;

/// Every probe function in this module
pub const PROBE_FUNCTIONS: &[(&str, ProbeFn)] = &[
    ("linear", linear),
    ("quadratic", quadratic),
    ("double_hashing", double_hashing),
    ("exponential", exponential),
    ("cubic", cubic),
];

/// `(a * b) mod m` for operands already reduced below `m`
#[allow(clippy::arithmetic_side_effects)]
fn mul_mod(a: u128, b: u128, m: u128) -> u128 {
    a * b % m
}

/// `base^exp mod m` by square-and-multiply
#[allow(clippy::arithmetic_side_effects)]
fn pow_mod(base: u128, mut exp: usize, m: u128) -> u128 {
    let mut result = 1 % m;
    let mut base = base % m;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul_mod(result, base, m);
        }
        base = mul_mod(base, base, m);
        exp >>= 1;
    }
    result
}

/// Adds the reduced `base_hash` and `step` and folds the sum back into `0..capacity`
#[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
fn offset(base_hash: usize, step: u128, capacity: u128) -> usize {
    ((base_hash as u128 % capacity + step % capacity) % capacity) as usize
}

/// `(base_hash + attempt) mod capacity`
#[must_use]
pub fn linear(base_hash: usize, attempt: usize, capacity: usize) -> usize {
    if capacity == 0 {
        return 0;
    }
    offset(base_hash, attempt as u128, capacity as u128)
}

/// `(base_hash + attempt + 3 * attempt^2) mod capacity`
#[must_use]
#[allow(clippy::arithmetic_side_effects)]
pub fn quadratic(base_hash: usize, attempt: usize, capacity: usize) -> usize {
    if capacity == 0 {
        return 0;
    }
    let m = capacity as u128;
    let i = attempt as u128 % m;
    let step = mul_mod(QUADRATIC_C1, i, m) + mul_mod(QUADRATIC_C2 % m, mul_mod(i, i, m), m);
    offset(base_hash, step, m)
}

/// `(base_hash + attempt * step) mod capacity` with `step = 1 + base_hash mod (capacity - 1)`
#[must_use]
#[allow(clippy::arithmetic_side_effects)]
pub fn double_hashing(base_hash: usize, attempt: usize, capacity: usize) -> usize {
    if capacity == 0 {
        return 0;
    }
    let m = capacity as u128;
    let secondary = base_hash.checked_rem(capacity - 1).unwrap_or(0) as u128 + 1;
    let step = mul_mod(attempt as u128 % m, secondary % m, m);
    offset(base_hash, step, m)
}

/// `(base_hash + 2^attempt) mod capacity`
#[must_use]
pub fn exponential(base_hash: usize, attempt: usize, capacity: usize) -> usize {
    if capacity == 0 {
        return 0;
    }
    let m = capacity as u128;
    offset(base_hash, pow_mod(2, attempt, m), m)
}

/// `(base_hash + attempt + attempt^3) mod capacity`
#[must_use]
#[allow(clippy::arithmetic_side_effects)]
pub fn cubic(base_hash: usize, attempt: usize, capacity: usize) -> usize {
    if capacity == 0 {
        return 0;
    }
    let m = capacity as u128;
    let i = attempt as u128 % m;
    let cube = mul_mod(mul_mod(i, i, m), i, m);
    let step = mul_mod(CUBIC_C1, i, m) + mul_mod(CUBIC_C2 % m, cube, m);
    offset(base_hash, step, m)
}
