use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderNumberError {
    #[error("The order number is empty")]
    Empty,
    #[error("Order numbers may only contain digits, but found '{0}'")]
    NonDigit(char),
    #[error("The order number failed the Luhn checksum")]
    BadChecksum,
}

/// Checks that `number` is a non-empty string of ASCII digits whose last digit is a valid Luhn check digit.
pub fn validate_order_number(number: &str) -> Result<(), OrderNumberError> {
    if number.is_empty() {
        return Err(OrderNumberError::Empty);
    }
    if let Some(c) = number.chars().find(|c| !c.is_ascii_digit()) {
        return Err(OrderNumberError::NonDigit(c));
    }
    if luhn_sum(number.bytes().rev(), false) % 10 == 0 {
        Ok(())
    } else {
        Err(OrderNumberError::BadChecksum)
    }
}

/// Calculates the digit that must be appended to `payload` to produce a Luhn-valid number.
/// Returns `None` if `payload` contains anything other than ASCII digits.
pub fn luhn_check_digit(payload: &str) -> Option<u8> {
    if !payload.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // The check digit will occupy the first (undoubled) position, so the payload starts on a doubled one.
    let sum = luhn_sum(payload.bytes().rev(), true);
    #[allow(clippy::cast_possible_truncation)]
    let digit = ((10 - sum % 10) % 10) as u8;
    Some(digit)
}

fn luhn_sum<I: Iterator<Item = u8>>(digits_from_right: I, double_first: bool) -> u32 {
    digits_from_right
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            let doubled = (i % 2 == 1) != double_first;
            match (doubled, d * 2) {
                (true, dd) if dd > 9 => dd - 9,
                (true, dd) => dd,
                (false, _) => d,
            }
        })
        .sum()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn known_numbers() {
        assert!(validate_order_number("79927398713").is_ok());
        assert!(validate_order_number("4561261212345467").is_ok());
        assert!(validate_order_number("0").is_ok());
        assert_eq!(validate_order_number("79927398714"), Err(OrderNumberError::BadChecksum));
        assert_eq!(validate_order_number("12a4"), Err(OrderNumberError::NonDigit('a')));
        assert_eq!(validate_order_number(""), Err(OrderNumberError::Empty));
    }

    #[test]
    fn check_digits() {
        assert_eq!(luhn_check_digit("7992739871"), Some(3));
        assert_eq!(luhn_check_digit("1234567890"), Some(3));
        assert_eq!(luhn_check_digit(""), Some(0));
        assert_eq!(luhn_check_digit("12x"), None);
        for payload in ["1", "42", "1000", "987654321", "5555555555554444"] {
            let digit = luhn_check_digit(payload).unwrap();
            let number = format!("{payload}{digit}");
            assert!(validate_order_number(&number).is_ok(), "{number} should be valid");
        }
    }
}
