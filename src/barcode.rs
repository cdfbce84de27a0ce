//! Loyalty card barcode generation and validation.
//!
//! Barcodes are `LC` followed by 7 zero-padded decimal digits. Generation is
//! pure randomness; uniqueness is enforced by the caller against the database
//! unique constraint, retrying on collision.

pub const BARCODE_PREFIX: &str = "LC";

pub const BARCODE_DIGITS: usize = 7;

const BARCODE_SPACE: u32 = 10_000_000;

/// Generate a candidate barcode from a uniform random source.
#[must_use]
pub fn generate() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let digits = rng.random_range(0..BARCODE_SPACE);

    format!("{BARCODE_PREFIX}{digits:07}")
}

/// Check the textual format: `LC` plus exactly 7 ASCII digits.
#[must_use]
pub fn is_valid(barcode: &str) -> bool {
    let Some(digits) = barcode.strip_prefix(BARCODE_PREFIX) else {
        return false;
    };

    digits.len() == BARCODE_DIGITS && digits.bytes().all(|b| b.is_ascii_digit())
}
