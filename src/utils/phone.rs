/// Numbers with fewer digits than this are returned as-is.
pub const MIN_MASKABLE_DIGITS: usize = 6;
/// Trailing digits left visible.
pub const VISIBLE_DIGITS: usize = 4;

pub fn digits_only(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Redacts a phone number down to its last four digits.
///
/// Empty or absent input yields `None`. Inputs with fewer than six digits are
/// returned unchanged, otherwise every digit but the last four becomes `*`
/// and formatting characters are dropped: `"(555) 123-4567"` renders as
/// `"******4567"`.
pub fn mask_phone(phone: Option<&str>) -> Option<String> {
    let phone = phone.filter(|p| !p.is_empty())?;
    let digits = digits_only(phone);

    if digits.len() < MIN_MASKABLE_DIGITS {
        return Some(phone.to_string());
    }

    let hidden = digits.len() - VISIBLE_DIGITS;
    Some(format!("{}{}", "*".repeat(hidden), &digits[hidden..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_all_but_last_four_digits() {
        assert_eq!(mask_phone(Some("5551234567")).as_deref(), Some("******4567"));
        assert_eq!(mask_phone(Some("9999999999")).as_deref(), Some("******9999"));
    }

    #[test]
    fn strips_formatting_before_masking() {
        assert_eq!(
            mask_phone(Some("(555) 123-4567")).as_deref(),
            Some("******4567")
        );
        assert_eq!(
            mask_phone(Some("+1 555 123 4567")).as_deref(),
            Some("*******4567")
        );
    }

    #[test]
    fn six_digits_is_the_masking_boundary() {
        assert_eq!(mask_phone(Some("123456")).as_deref(), Some("**3456"));
        assert_eq!(mask_phone(Some("12345")).as_deref(), Some("12345"));
    }

    #[test]
    fn short_numbers_are_returned_untouched() {
        assert_eq!(mask_phone(Some("123")).as_deref(), Some("123"));
        // formatting kept verbatim when too short to mask
        assert_eq!(mask_phone(Some("(12) 3-4")).as_deref(), Some("(12) 3-4"));
    }

    #[test]
    fn absent_or_empty_is_none() {
        assert_eq!(mask_phone(None), None);
        assert_eq!(mask_phone(Some("")), None);
    }
}
