use std::fmt;

/// Money is represented as integer paise to keep settlement checks exact.
/// 1 rupee = 100 paise, so ₹50.00 = 5000 paise.
pub type Cents = i64;

/// Format paise as a human-readable decimal string.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    let units = abs_cents / 100;
    let remainder = abs_cents % 100;
    format!("{}{}.{:02}", sign, units, remainder)
}

/// Format paise as a display currency string with the ₹ prefix.
pub fn format_currency(cents: Cents) -> String {
    if cents < 0 {
        format!("-₹{}", format_cents(-cents))
    } else {
        format!("₹{}", format_cents(cents))
    }
}

/// Parse a decimal string into paise.
/// Example: "50.00" -> 5000, "12.5" -> 1250, "100" -> 10000, "-0.50" -> -50
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let negative = input.starts_with('-');
    let input = input.trim_start_matches('-').trim_start_matches('₹');

    let parts: Vec<&str> = input.split('.').collect();
    let cents = match parts.len() {
        1 => {
            // No decimal point, treat as whole rupees
            let units: i64 = parts[0]
                .parse()
                .map_err(|_| ParseCentsError::InvalidFormat)?;
            units
                .checked_mul(100)
                .ok_or(ParseCentsError::InvalidFormat)?
        }
        2 => {
            let units: i64 = if parts[0].is_empty() {
                0
            } else {
                parts[0]
                    .parse()
                    .map_err(|_| ParseCentsError::InvalidFormat)?
            };
            if units < 0 {
                return Err(ParseCentsError::InvalidFormat);
            }

            // Pad or truncate the decimal part to 2 digits
            let decimal_str = parts[1];
            let decimal_cents: i64 = match decimal_str.len() {
                0 => 0,
                1 => {
                    // Single digit like "5" means 50 paise
                    decimal_str
                        .parse::<i64>()
                        .map_err(|_| ParseCentsError::InvalidFormat)?
                        * 10
                }
                2 => decimal_str
                    .parse()
                    .map_err(|_| ParseCentsError::InvalidFormat)?,
                // `get` rejects a prefix that is not a char boundary, so a
                // stray multibyte character errors instead of panicking
                _ => decimal_str
                    .get(..2)
                    .ok_or(ParseCentsError::InvalidFormat)?
                    .parse()
                    .map_err(|_| ParseCentsError::InvalidFormat)?,
            };

            units
                .checked_mul(100)
                .and_then(|c| c.checked_add(decimal_cents))
                .ok_or(ParseCentsError::InvalidFormat)?
        }
        _ => return Err(ParseCentsError::InvalidFormat),
    };

    Ok(if negative { -cents } else { cents })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    InvalidFormat,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
        }
    }
}

impl std::error::Error for ParseCentsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(5000), "50.00");
        assert_eq!(format_cents(1234), "12.34");
        assert_eq!(format_cents(100), "1.00");
        assert_eq!(format_cents(1), "0.01");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(-5000), "-50.00");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(5000), "₹50.00");
        assert_eq!(format_currency(0), "₹0.00");
        assert_eq!(format_currency(-250), "-₹2.50");
    }

    #[test]
    fn test_parse_cents() {
        assert_eq!(parse_cents("50.00"), Ok(5000));
        assert_eq!(parse_cents("50"), Ok(5000));
        assert_eq!(parse_cents("12.34"), Ok(1234));
        assert_eq!(parse_cents("12.5"), Ok(1250));
        assert_eq!(parse_cents("0.01"), Ok(1));
        assert_eq!(parse_cents(".50"), Ok(50));
        assert_eq!(parse_cents("₹99.99"), Ok(9999));
        assert_eq!(parse_cents("100.999"), Ok(10099)); // Truncates
    }

    #[test]
    fn test_parse_cents_negative() {
        assert_eq!(parse_cents("-5.50"), Ok(-550));
        assert_eq!(parse_cents("-0.50"), Ok(-50));
        assert_eq!(parse_cents("-₹2.50"), Ok(-250));
        assert_eq!(parse_cents("-100"), Ok(-10000));
    }

    #[test]
    fn test_parse_cents_invalid() {
        assert!(parse_cents("abc").is_err());
        assert!(parse_cents("12.34.56").is_err());
        assert!(parse_cents("").is_err());
        // Multibyte junk in the decimal part must error, not panic
        assert!(parse_cents("1.₹50").is_err());
        assert!(parse_cents("1.5x0").is_err());
    }
}
