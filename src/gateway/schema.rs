//! Contact validation schema, applied on every save.

use lazy_static::lazy_static;
use regex::Regex;

use super::{GatewayError, GatewayResult};
use crate::model::ContactRecord;

lazy_static! {
    static ref PHONE_NUMBER: Regex = Regex::new(r"^[0-9]{3}-[0-9]{3}-[0-9]{4}$").unwrap();
}

pub fn is_valid_phone_number(number: &str) -> bool {
    PHONE_NUMBER.is_match(number)
}

pub fn validate(record: &ContactRecord) -> GatewayResult<()> {
    if record.name.trim().is_empty() {
        return Err(GatewayError::validation("name", "Path `name` is required."));
    }

    if record.number.is_empty() {
        return Err(GatewayError::validation(
            "number",
            "User phone number required",
        ));
    }

    if !is_valid_phone_number(&record.number) {
        return Err(GatewayError::validation(
            "number",
            format!("{} is not a valid phone number!", record.number),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_numbers() {
        for number in ["555-123-4567", "000-000-0000", "999-999-9999"] {
            assert!(is_valid_phone_number(number), "{number} should be valid");
        }
    }

    #[test]
    fn rejects_malformed_numbers() {
        for number in [
            "",
            "5551234567",
            "555-1234-567",
            "55-123-4567",
            "555-123-45678",
            "1555-123-4567",
            "abc-def-ghij",
            "555 123 4567",
            "555-123-4567 ",
            "٥٥٥-١٢٣-٤٥٦٧",
            "５５５-１２３-４５６７",
        ] {
            assert!(!is_valid_phone_number(number), "{number:?} should be invalid");
        }
    }

    #[test]
    fn reports_failing_field() {
        let err = validate(&ContactRecord::new("  ", "555-123-4567", 1)).unwrap_err();
        assert!(matches!(err, GatewayError::Validation { field: "name", .. }));

        let err = validate(&ContactRecord::new("Alice", "", 1)).unwrap_err();
        assert!(matches!(err, GatewayError::Validation { field: "number", .. }));

        let err = validate(&ContactRecord::new("Alice", "12-34", 1)).unwrap_err();
        assert_eq!(err.to_string(), "number: 12-34 is not a valid phone number!");
    }
}
