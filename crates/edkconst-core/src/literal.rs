//! Integer literal parsing.
//!
//! Header values are written the way C writes them: `0x` hexadecimal, a leading
//! `0` for octal, otherwise decimal. `0b`/`0o` prefixes and a sign are accepted as well.

use crate::error::{Error, Result};

/// Parse an integer literal token.
///
/// ```
/// use edkconst_core::parse_literal;
///
/// assert_eq!(parse_literal("0x0010")?, 16);
/// assert_eq!(parse_literal("017")?, 15);
/// assert_eq!(parse_literal("-3")?, -3);
/// assert!(parse_literal("EDK_OK").is_err());
/// # Ok::<(), edkconst_core::Error>(())
/// ```
pub fn parse_literal(token: &str) -> Result<i64> {
    let (negative, body) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };

    let (radix, digits) = split_radix(body);

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(Error::malformed_literal(token));
    }

    let magnitude =
        u64::from_str_radix(digits, radix).map_err(|_| Error::malformed_literal(token))?;
    let value = if negative {
        -i128::from(magnitude)
    } else {
        i128::from(magnitude)
    };

    i64::try_from(value).map_err(|_| Error::malformed_literal(token))
}

/// Split a literal body into its radix and digit string
fn split_radix(body: &str) -> (u32, &str) {
    let bytes = body.as_bytes();
    if bytes.len() >= 2 && bytes[0] == b'0' {
        match bytes[1] {
            b'x' | b'X' => return (16, &body[2..]),
            b'b' | b'B' => return (2, &body[2..]),
            b'o' | b'O' => return (8, &body[2..]),
            _ => return (8, &body[1..]),
        }
    }
    (10, body)
}
