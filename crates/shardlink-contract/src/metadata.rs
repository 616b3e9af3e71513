//! Contract code metadata flags.

/// Deployment flags attached to contract code.
///
/// The wire form is two bytes rendered as four hex digits: the first byte
/// carries the upgradeable and readable bits, the second the payable bit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodeMetadata {
	/// The contract code can be replaced through an upgrade transaction.
	pub upgradeable: bool,
	/// Other contracts may read this contract's storage.
	pub readable: bool,
	/// The contract can receive value transfers.
	pub payable: bool,
}

const FLAG_UPGRADEABLE: u8 = 0x01;
const FLAG_READABLE: u8 = 0x04;
const FLAG_PAYABLE: u8 = 0x02;

impl CodeMetadata {
	/// Creates metadata with the given flags.
	pub fn new(upgradeable: bool, readable: bool, payable: bool) -> Self {
		Self {
			upgradeable,
			readable,
			payable,
		}
	}

	/// Renders the metadata as its four-digit hex wire form.
	pub fn to_hex(&self) -> String {
		let mut first = 0u8;
		if self.upgradeable {
			first |= FLAG_UPGRADEABLE;
		}
		if self.readable {
			first |= FLAG_READABLE;
		}
		let second = if self.payable { FLAG_PAYABLE } else { 0 };
		format!("{:02x}{:02x}", first, second)
	}
}
