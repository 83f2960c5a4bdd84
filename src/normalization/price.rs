use std::str::FromStr;

use bigdecimal::BigDecimal;

use crate::error::ExtractionError;

/// Parse a human-formatted price string into an exact decimal.
///
/// Upstream price strings carry currency glyphs and thousands separators,
/// including Indian-style grouping (`"₹1,23,456"`). Everything that is not an
/// ASCII digit or a decimal point is stripped before parsing; whatever is
/// left must parse as a decimal or the whole string is reported as
/// `MalformedNumber`. The filter drops any minus sign, so a successful parse
/// is non-negative by construction.
pub fn parse_price_string(raw: &str) -> Result<BigDecimal, ExtractionError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if cleaned.is_empty() {
        return Err(ExtractionError::MalformedNumber {
            raw: raw.to_string(),
        });
    }

    BigDecimal::from_str(&cleaned).map_err(|_| ExtractionError::MalformedNumber {
        raw: raw.to_string(),
    })
}
