//! Galois Field GF(2^8) arithmetic for Reed-Solomon erasure coding
//!
//! ## Field Polynomial
//!
//! Elements are single bytes. The field is built from the primitive polynomial
//! **0x11D** (x⁸ + x⁴ + x³ + x² + 1), written as `29` once the x⁸ term is dropped,
//! with generator 2.
//!
//! - Addition and subtraction are XOR (characteristic 2)
//! - Multiplication and division go through logarithm/antilogarithm tables
//!
//! The exponent table is stored twice over (510 entries) so that
//! `log[a] + log[b]` indexes it directly without a modulo.
//!
//! ## Hot Path
//!
//! [`MulTable`] expands `multiply` into a full 256×256 table, built once and
//! shared by every engine. Region codecs index one 256-byte row per coefficient.

use super::error::{RsError, RsResult};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Sub, SubAssign};
use std::sync::OnceLock;

/// Number of elements in the field
pub const FIELD_SIZE: usize = 256;

/// Order of the multiplicative group
const LIMIT: usize = FIELD_SIZE - 1;

/// Generating polynomial 0x11D with the x⁸ term dropped
pub const GENERATING_POLYNOMIAL: u8 = 29;

const fn build_log_table(polynomial: u8) -> Option<[u8; FIELD_SIZE]> {
    let mut log = [0u8; FIELD_SIZE];
    let mut seen = [false; FIELD_SIZE];
    let mut b: usize = 1;
    let mut l = 0;

    while l < LIMIT {
        if seen[b] {
            return None;
        }
        seen[b] = true;
        log[b] = l as u8;

        b <<= 1;
        if b >= FIELD_SIZE {
            b = (b - FIELD_SIZE) ^ polynomial as usize;
        }
        l += 1;
    }

    Some(log)
}

const fn build_exp_table(log: &[u8; FIELD_SIZE]) -> [u8; 2 * LIMIT] {
    let mut exp = [0u8; 2 * LIMIT];
    let mut i = 1;

    while i < FIELD_SIZE {
        let l = log[i] as usize;
        exp[l] = i as u8;
        exp[l + LIMIT] = i as u8;
        i += 1;
    }

    exp
}

/// Logarithm table for polynomial 29. `LOG_TABLE[0]` is unused and holds 0.
pub const LOG_TABLE: [u8; FIELD_SIZE] = match build_log_table(GENERATING_POLYNOMIAL) {
    Some(table) => table,
    None => panic!("generating polynomial does not produce 255 distinct logarithms"),
};

/// Antilogarithm table, doubled to 510 entries
pub const EXP_TABLE: [u8; 2 * LIMIT] = build_exp_table(&LOG_TABLE);

/// Generate the logarithm table for `polynomial`
///
/// Fails with [`RsError::DuplicateLogarithm`] when the polynomial does not
/// cycle through all 255 nonzero elements.
pub fn generate_log_table(polynomial: u8) -> RsResult<[u8; FIELD_SIZE]> {
    build_log_table(polynomial).ok_or(RsError::DuplicateLogarithm { polynomial })
}

/// Generate the doubled antilogarithm table from a logarithm table
pub fn generate_exp_table(log: &[u8; FIELD_SIZE]) -> [u8; 2 * LIMIT] {
    build_exp_table(log)
}

#[inline]
pub fn add(a: u8, b: u8) -> u8 {
    a ^ b
}

#[inline]
pub fn subtract(a: u8, b: u8) -> u8 {
    a ^ b
}

#[inline]
pub fn multiply(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    EXP_TABLE[LOG_TABLE[a as usize] as usize + LOG_TABLE[b as usize] as usize]
}

/// Divide `a` by `b`
pub fn divide(a: u8, b: u8) -> RsResult<u8> {
    if b == 0 {
        return Err(RsError::DivisionByZero);
    }
    if a == 0 {
        return Ok(0);
    }
    // log[a] + 255 - log[b] stays inside the doubled table
    let log = LOG_TABLE[a as usize] as usize + LIMIT - LOG_TABLE[b as usize] as usize;
    Ok(EXP_TABLE[log])
}

/// Raise `a` to the power `n`
pub fn exp(a: u8, n: usize) -> u8 {
    if n == 0 {
        return 1;
    }
    if a == 0 {
        return 0;
    }
    let log = (LOG_TABLE[a as usize] as usize * n) % LIMIT;
    EXP_TABLE[log]
}

/// GF(2^8) field element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Galois8(u8);

impl Galois8 {
    pub const ZERO: Self = Galois8(0);
    pub const ONE: Self = Galois8(1);

    pub const fn new(value: u8) -> Self {
        Galois8(value)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// Power operation
    pub fn pow(self, exponent: usize) -> Self {
        Galois8(exp(self.0, exponent))
    }

    /// Division that fails on a zero divisor instead of panicking
    pub fn checked_div(self, rhs: Self) -> RsResult<Self> {
        divide(self.0, rhs.0).map(Galois8)
    }
}

impl From<u8> for Galois8 {
    fn from(value: u8) -> Self {
        Galois8(value)
    }
}

impl From<Galois8> for u8 {
    fn from(value: Galois8) -> Self {
        value.0
    }
}

impl Add for Galois8 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Galois8(add(self.0, rhs.0))
    }
}

impl AddAssign for Galois8 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}

impl Sub for Galois8 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Galois8(subtract(self.0, rhs.0))
    }
}

impl SubAssign for Galois8 {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}

impl Mul for Galois8 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Galois8(multiply(self.0, rhs.0))
    }
}

impl MulAssign for Galois8 {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        self.0 = multiply(self.0, rhs.0);
    }
}

impl fmt::Display for Galois8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Full 256×256 multiplication table
///
/// Row `c` holds `c * x` for every byte `x`, so a region pass for coefficient
/// `c` is a single indexed load per byte.
pub struct MulTable {
    rows: Box<[[u8; FIELD_SIZE]]>,
}

impl Default for MulTable {
    fn default() -> Self {
        Self::new()
    }
}

impl MulTable {
    pub fn new() -> Self {
        let mut rows = vec![[0u8; FIELD_SIZE]; FIELD_SIZE].into_boxed_slice();
        for (a, row) in rows.iter_mut().enumerate() {
            for (b, entry) in row.iter_mut().enumerate() {
                *entry = multiply(a as u8, b as u8);
            }
        }
        MulTable { rows }
    }

    /// Process-wide table, built on first use
    pub fn global() -> &'static MulTable {
        static TABLE: OnceLock<MulTable> = OnceLock::new();
        TABLE.get_or_init(MulTable::new)
    }

    #[inline]
    pub fn row(&self, coefficient: u8) -> &[u8; FIELD_SIZE] {
        &self.rows[coefficient as usize]
    }

    #[inline]
    pub fn get(&self, a: u8, b: u8) -> u8 {
        self.rows[a as usize][b as usize]
    }
}
