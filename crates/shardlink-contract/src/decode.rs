//! Read-only query result decoding.
//!
//! Contract queries return a positional list of base64-encoded values with no
//! type information; the caller states the expected type and slot. An absent
//! or empty slot decodes to the type's zero value rather than an error, so
//! callers can treat "not set yet" storage uniformly.

use crate::ContractError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use regex::Regex;
use shardlink_address::Address;
use shardlink_numeric::{Scale, ScaledDecimal};
use shardlink_types::ContractQueryResult;

/// Expected type of a single query return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
	/// An unsigned machine integer, big-endian on the wire.
	Int,
	/// An arbitrary-precision unsigned integer, big-endian on the wire.
	BigInt,
	/// A boolean. Any non-zero byte is true.
	Boolean,
	/// A raw 32-byte account address.
	Address,
	/// Uninterpreted bytes, rendered as `0x`-prefixed hex.
	Hex,
	/// A UTF-8 string.
	String,
}

/// A decoded query return value.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
	Int(u64),
	BigInt(ScaledDecimal),
	Boolean(bool),
	Address(Address),
	Hex(String),
	String(String),
}

/// Decodes one positional return value of a query.
///
/// The slot at `index` is base64-decoded and interpreted as `target`. When an
/// extraction pattern is given, the decoded bytes are treated as text, the
/// pattern's first capture group is taken, and the captured text is then
/// interpreted lexically (decimal digits for the integer types, the literal
/// `true` for booleans, hex digits for addresses and hex values). Without a
/// pattern the raw bytes are interpreted directly.
pub fn decode_query_result(
	result: &ContractQueryResult,
	target: ValueType,
	index: usize,
	extraction_pattern: Option<&Regex>,
) -> Result<DecodedValue, ContractError> {
	let bytes = match result.return_data.get(index) {
		None => Vec::new(),
		Some(slot) if slot.is_empty() => Vec::new(),
		Some(slot) => BASE64
			.decode(slot)
			.map_err(|e| ContractError::InvalidQueryResult(format!("bad base64: {e}")))?,
	};

	if let Some(pattern) = extraction_pattern {
		let text = String::from_utf8_lossy(&bytes);
		let captured = pattern
			.captures(&text)
			.and_then(|c| c.get(1))
			.map(|m| m.as_str().to_string())
			.unwrap_or_default();
		return decode_text(&captured, target);
	}

	decode_bytes(&bytes, target)
}

fn decode_bytes(bytes: &[u8], target: ValueType) -> Result<DecodedValue, ContractError> {
	if bytes.is_empty() {
		return Ok(zero_value(target));
	}
	Ok(match target {
		ValueType::Int => {
			if bytes.len() > 8 {
				return Err(ContractError::InvalidQueryResult(format!(
					"integer value is {} bytes wide",
					bytes.len()
				)));
			}
			let mut word = [0u8; 8];
			word[8 - bytes.len()..].copy_from_slice(bytes);
			DecodedValue::Int(u64::from_be_bytes(word))
		}
		ValueType::BigInt => {
			DecodedValue::BigInt(ScaledDecimal::from_hex(&hex::encode(bytes), Scale::Raw)?)
		}
		ValueType::Boolean => DecodedValue::Boolean(bytes.iter().any(|b| *b != 0)),
		ValueType::Address => DecodedValue::Address(Address::from_bytes(bytes)?),
		ValueType::Hex => DecodedValue::Hex(format!("0x{}", hex::encode(bytes))),
		ValueType::String => DecodedValue::String(String::from_utf8_lossy(bytes).into_owned()),
	})
}

fn decode_text(text: &str, target: ValueType) -> Result<DecodedValue, ContractError> {
	if text.is_empty() {
		return Ok(zero_value(target));
	}
	Ok(match target {
		ValueType::Int => DecodedValue::Int(
			text.parse()
				.map_err(|_| ContractError::InvalidQueryResult(format!("bad integer: {text}")))?,
		),
		ValueType::BigInt => DecodedValue::BigInt(
			ScaledDecimal::new(text, Scale::Raw)
				.map_err(|_| ContractError::InvalidQueryResult(format!("bad integer: {text}")))?,
		),
		ValueType::Boolean => DecodedValue::Boolean(text == "true"),
		ValueType::Address => {
			let raw = hex::decode(text)
				.map_err(|e| ContractError::InvalidQueryResult(format!("bad address: {e}")))?;
			DecodedValue::Address(Address::from_bytes(&raw)?)
		}
		ValueType::Hex => DecodedValue::Hex(format!("0x{text}")),
		ValueType::String => DecodedValue::String(text.to_string()),
	})
}

/// The zero value of each type, used for absent or empty slots.
fn zero_value(target: ValueType) -> DecodedValue {
	match target {
		ValueType::Int => DecodedValue::Int(0),
		ValueType::BigInt => DecodedValue::BigInt(ScaledDecimal::zero(Scale::Raw)),
		ValueType::Boolean => DecodedValue::Boolean(false),
		ValueType::Address => DecodedValue::Address(Address::zero()),
		ValueType::Hex => DecodedValue::Hex("0x0".to_string()),
		ValueType::String => DecodedValue::String(String::new()),
	}
}
