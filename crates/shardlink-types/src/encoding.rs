//! Transaction payload argument encoding.
//!
//! The transaction `data` field is an ASCII string of `@`-delimited tokens:
//! the first token is the function name, subsequent tokens are hex-encoded
//! arguments in call order.

/// Delimiter between the function name and each argument in the `data` field.
pub const ARGS_DELIMITER: &str = "@";

/// Converts an ASCII/UTF-8 string to its hex representation.
///
/// Each byte becomes exactly two lowercase hex digits, with no separators.
pub fn string_to_hex(arg: &str) -> String {
	hex::encode(arg.as_bytes())
}

/// Converts a number to its minimal big-endian hex representation.
///
/// The result always has an even number of digits (a single leading zero
/// nibble is added when needed) and zero encodes as `"00"`, never as an
/// empty string.
pub fn number_to_hex(arg: u128) -> String {
	pad_even_hex(format!("{:x}", arg))
}

/// Pads a hex magnitude to an even number of digits.
///
/// An empty magnitude becomes `"00"` so that a zero argument is still a
/// visible token on the wire.
pub fn pad_even_hex(mut hex_str: String) -> String {
	if hex_str.is_empty() {
		return "00".to_string();
	}
	if hex_str.len() % 2 != 0 {
		hex_str.insert(0, '0');
	}
	hex_str
}

/// Joins the function name and hex-encoded arguments into a `data` string.
pub fn join_data_args(args: &[String]) -> String {
	args.join(ARGS_DELIMITER)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_string_to_hex() {
		assert_eq!(string_to_hex("this is a test"), "7468697320697320612074657374");
		assert_eq!(string_to_hex(""), "");
	}

	#[test]
	fn test_number_to_hex() {
		assert_eq!(number_to_hex(0), "00");
		assert_eq!(number_to_hex(666), "029a");
		assert_eq!(number_to_hex(10000), "2710");
	}

	#[test]
	fn test_pad_even_hex() {
		assert_eq!(pad_even_hex("a".to_string()), "0a");
		assert_eq!(pad_even_hex("2710".to_string()), "2710");
		assert_eq!(pad_even_hex(String::new()), "00");
	}

	#[test]
	fn test_join_data_args() {
		let args = vec![
			"issue".to_string(),
			"52616d546f6b656e".to_string(),
			"029a".to_string(),
		];
		assert_eq!(join_data_args(&args), "issue@52616d546f6b656e@029a");
	}
}
