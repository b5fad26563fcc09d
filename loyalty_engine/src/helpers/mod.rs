mod order_number;

pub use order_number::{luhn_check_digit, validate_order_number, OrderNumberError};
