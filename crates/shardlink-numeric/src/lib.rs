//! Scaled arbitrary-precision decimal values for the shardlink client.
//!
//! All monetary amounts in the client are carried by [`ScaledDecimal`], an
//! immutable arbitrary-precision decimal tagged with the scale it currently
//! operates at. The [`Scale::Raw`] scale is for values already denominated in
//! the smallest indivisible on-chain unit; the [`Scale::Display`] scale is for
//! human-facing values which are implicitly multiplied by `10^decimals`.
//!
//! With the default `decimals = 18` the following two values are equivalent:
//!
//! - `Raw` value `1000000000000000000`
//! - `Display` value `1`
//!
//! Every arithmetic operation first normalizes the right-hand operand to the
//! receiver's scale, and the result always carries the receiver's scale and
//! decimals configuration. Operations never mutate their inputs.

use bigdecimal::{rounding::RoundingMode, BigDecimal};
use num_bigint::{BigInt, ToBigInt};
use num_traits::ToPrimitive;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default number of decimal places between the raw and display scales.
pub const DEFAULT_DECIMALS: u32 = 18;

/// Errors that can occur when constructing numeric values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumericError {
	/// Error that occurs when parsing a malformed numeric literal.
	#[error("invalid number format: {0}")]
	InvalidNumberFormat(String),
}

/// The scale a [`ScaledDecimal`] currently operates at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
	/// Denominated in the smallest indivisible on-chain unit.
	Raw,
	/// Human-facing units, implicitly scaled by `10^decimals`.
	Display,
}

/// An arbitrary-precision decimal carrying a scale tag.
///
/// See the crate-level documentation for the scale semantics. Instances are
/// immutable: all operations return new values.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledDecimal {
	value: BigDecimal,
	scale: Scale,
	decimals: u32,
}

/// Right-hand operand of a [`ScaledDecimal`] operation.
///
/// A plain numeric operand is assumed to already be at the receiver's scale;
/// a scaled operand is first re-scaled to match the receiver, guarding
/// against silently mixing raw and display values.
#[derive(Debug, Clone)]
pub enum Operand {
	/// A bare magnitude with no scale metadata.
	Plain(BigDecimal),
	/// A value carrying its own scale metadata.
	Scaled(ScaledDecimal),
}

impl From<ScaledDecimal> for Operand {
	fn from(v: ScaledDecimal) -> Self {
		Operand::Scaled(v)
	}
}

impl From<&ScaledDecimal> for Operand {
	fn from(v: &ScaledDecimal) -> Self {
		Operand::Scaled(v.clone())
	}
}

impl From<BigDecimal> for Operand {
	fn from(v: BigDecimal) -> Self {
		Operand::Plain(v)
	}
}

macro_rules! operand_from_int {
	($($t:ty),*) => {
		$(impl From<$t> for Operand {
			fn from(v: $t) -> Self {
				Operand::Plain(BigDecimal::from(BigInt::from(v)))
			}
		})*
	};
}

operand_from_int!(u32, u64, u128, i32, i64, i128);

impl Operand {
	/// Resolves the operand to a bare magnitude at the reference scale.
	fn at_scale_of(self, reference: &ScaledDecimal) -> BigDecimal {
		match self {
			Operand::Plain(v) => v,
			Operand::Scaled(v) => v.to_scale(reference.scale).value,
		}
	}
}

impl ScaledDecimal {
	/// Parses a decimal literal at the given scale, with the default
	/// `decimals` configuration.
	pub fn new(src: &str, scale: Scale) -> Result<Self, NumericError> {
		Self::with_decimals(src, scale, DEFAULT_DECIMALS)
	}

	/// Parses a decimal literal at the given scale and decimals configuration.
	pub fn with_decimals(src: &str, scale: Scale, decimals: u32) -> Result<Self, NumericError> {
		let value = BigDecimal::from_str(src.trim())
			.map_err(|_| NumericError::InvalidNumberFormat(src.to_string()))?;
		Ok(Self {
			value,
			scale,
			decimals,
		})
	}

	/// Builds a value from an integer at the given scale.
	pub fn from_int(src: i128, scale: Scale) -> Self {
		Self {
			value: BigDecimal::from(BigInt::from(src)),
			scale,
			decimals: DEFAULT_DECIMALS,
		}
	}

	/// Parses a base-16 unsigned magnitude at the given scale.
	///
	/// This is how big-integer contract return values are decoded.
	pub fn from_hex(src: &str, scale: Scale) -> Result<Self, NumericError> {
		let digits = src.strip_prefix("0x").unwrap_or(src);
		if digits.is_empty() {
			return Ok(Self::from_int(0, scale));
		}
		let magnitude = BigInt::parse_bytes(digits.as_bytes(), 16)
			.ok_or_else(|| NumericError::InvalidNumberFormat(src.to_string()))?;
		Ok(Self {
			value: BigDecimal::from(magnitude),
			scale,
			decimals: DEFAULT_DECIMALS,
		})
	}

	/// The zero value at the given scale.
	pub fn zero(scale: Scale) -> Self {
		Self::from_int(0, scale)
	}

	/// Current scale tag.
	pub fn scale(&self) -> Scale {
		self.scale
	}

	/// Decimals configuration.
	pub fn decimals(&self) -> u32 {
		self.decimals
	}

	/// Wraps a magnitude with the receiver's scale and decimals.
	fn derive(&self, value: BigDecimal) -> Self {
		Self {
			value,
			scale: self.scale,
			decimals: self.decimals,
		}
	}

	/// `10^decimals` as an exact decimal.
	fn scale_factor(&self) -> BigDecimal {
		BigDecimal::new(BigInt::from(1), -(self.decimals as i64))
	}

	/// Adds the operand, normalized to the receiver's scale.
	pub fn add(&self, rhs: impl Into<Operand>) -> Self {
		self.derive(&self.value + rhs.into().at_scale_of(self))
	}

	/// Subtracts the operand, normalized to the receiver's scale.
	pub fn sub(&self, rhs: impl Into<Operand>) -> Self {
		self.derive(&self.value - rhs.into().at_scale_of(self))
	}

	/// Multiplies by the operand, normalized to the receiver's scale.
	pub fn mul(&self, rhs: impl Into<Operand>) -> Self {
		self.derive(&self.value * rhs.into().at_scale_of(self))
	}

	/// Divides by the operand, normalized to the receiver's scale.
	///
	/// Division is exact up to the library's high internal precision; the
	/// result is never clamped to `decimals` places.
	pub fn div(&self, rhs: impl Into<Operand>) -> Self {
		self.derive(&self.value / rhs.into().at_scale_of(self))
	}

	/// Greater-than comparison against the operand at the receiver's scale.
	pub fn gt(&self, rhs: impl Into<Operand>) -> bool {
		self.value > rhs.into().at_scale_of(self)
	}

	/// Greater-or-equal comparison against the operand at the receiver's scale.
	pub fn gte(&self, rhs: impl Into<Operand>) -> bool {
		self.value >= rhs.into().at_scale_of(self)
	}

	/// Less-than comparison against the operand at the receiver's scale.
	pub fn lt(&self, rhs: impl Into<Operand>) -> bool {
		self.value < rhs.into().at_scale_of(self)
	}

	/// Less-or-equal comparison against the operand at the receiver's scale.
	pub fn lte(&self, rhs: impl Into<Operand>) -> bool {
		self.value <= rhs.into().at_scale_of(self)
	}

	/// Equality against the operand at the receiver's scale.
	pub fn eq(&self, rhs: impl Into<Operand>) -> bool {
		self.value == rhs.into().at_scale_of(self)
	}

	/// Rounds to the nearest whole number, half away from zero.
	pub fn round(&self) -> Self {
		self.derive(self.value.with_scale_round(0, RoundingMode::HalfUp))
	}

	/// Converts to the raw scale. Idempotent.
	pub fn to_raw_scale(&self) -> Self {
		match self.scale {
			Scale::Raw => self.clone(),
			Scale::Display => Self {
				value: &self.value * self.scale_factor(),
				scale: Scale::Raw,
				decimals: self.decimals,
			},
		}
	}

	/// Converts to the display scale. Idempotent.
	pub fn to_display_scale(&self) -> Self {
		match self.scale {
			Scale::Display => self.clone(),
			Scale::Raw => Self {
				value: &self.value / self.scale_factor(),
				scale: Scale::Display,
				decimals: self.decimals,
			},
		}
	}

	/// Converts to the given scale.
	pub fn to_scale(&self, scale: Scale) -> Self {
		match scale {
			Scale::Raw => self.to_raw_scale(),
			Scale::Display => self.to_display_scale(),
		}
	}

	/// Renders the integer magnitude in the given base.
	///
	/// Base 16 and base 2 render without any leading marker so the output is
	/// byte-identical to what a receiving contract expects; any fractional
	/// part is truncated. Other bases fall back to the decimal rendering.
	pub fn to_string_radix(&self, base: u32) -> String {
		match base {
			2 | 16 => self
				.value
				.to_bigint()
				.map(|i| i.to_str_radix(base))
				.unwrap_or_default(),
			_ => self.to_string(),
		}
	}

	/// Base-10 string rendered to the given number of decimal places.
	pub fn to_fixed(&self, places: usize) -> String {
		format!("{:.*}", places, self.value)
	}

	/// Lossy conversion to a 64-bit float.
	pub fn to_f64(&self) -> f64 {
		self.value.to_f64().unwrap_or(f64::NAN)
	}
}

impl fmt::Display for ScaledDecimal {
	/// Renders the full plain-notation form.
	///
	/// Large magnitudes must never fall into exponential notation: the
	/// rendering feeds the transaction `value` field, which the network
	/// expects as an exact integer string.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.value.normalized().to_plain_string())
	}
}

impl FromStr for ScaledDecimal {
	type Err = NumericError;

	/// Parses a literal at the raw scale with default decimals.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s, Scale::Raw)
	}
}
