/// Normalize a stored phone number to a single international format for the
/// SMS gateway. The gateway rejects national formats, so numbers without a
/// leading `+` get the configured country prefix.
pub fn normalize_phone(raw: &str, country_prefix: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    if cleaned.is_empty() || !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    if let Some(rest) = cleaned.strip_prefix('+') {
        return Some(format!("+{}", rest.replace('+', "")));
    }

    // "00" international dial prefix is equivalent to "+"
    if let Some(rest) = cleaned.strip_prefix("00") {
        return Some(format!("+{}", rest));
    }

    // National format: drop the trunk "0" and prepend the country code
    let national = cleaned.strip_prefix('0').unwrap_or(&cleaned);
    Some(format!("{}{}", country_prefix, national))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_international_numbers_untouched() {
        assert_eq!(
            normalize_phone("+353871234567", "+353"),
            Some("+353871234567".to_string())
        );
    }

    #[test]
    fn prefixes_national_numbers() {
        assert_eq!(
            normalize_phone("0871234567", "+353"),
            Some("+353871234567".to_string())
        );
    }

    #[test]
    fn converts_double_zero_prefix() {
        assert_eq!(
            normalize_phone("00353871234567", "+353"),
            Some("+353871234567".to_string())
        );
    }

    #[test]
    fn strips_formatting_characters() {
        assert_eq!(
            normalize_phone("087 123-4567", "+353"),
            Some("+353871234567".to_string())
        );
    }

    #[test]
    fn rejects_empty_and_garbage_input() {
        assert_eq!(normalize_phone("", "+353"), None);
        assert_eq!(normalize_phone("n/a", "+353"), None);
    }
}
