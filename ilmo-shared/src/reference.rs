/// Finnish bank reference numbers (viitenumero)
///
/// The check digit is computed over the base digits from right to left with
/// repeating weights 7, 3, 1: `(10 - sum % 10) % 10`.

/// Offset added to an attendee's sequence number to form the reference base
///
/// Keeps every base at least four digits long (the minimum base length).
pub const REFERENCE_BASE_OFFSET: i64 = 1000;

const WEIGHTS: [u32; 3] = [7, 3, 1];

/// Check digit for a base made of ASCII digits
///
/// Returns `None` if `base` is empty or contains a non-digit.
pub fn check_digit(base: &str) -> Option<u32> {
    if base.is_empty() {
        return None;
    }

    let mut sum = 0;
    for (i, c) in base.chars().rev().enumerate() {
        sum += c.to_digit(10)? * WEIGHTS[i % WEIGHTS.len()];
    }

    Some((10 - sum % 10) % 10)
}

/// Reference number for an attendee sequence number
///
/// # Example
///
/// ```
/// use ilmo_shared::reference::reference_number;
///
/// // base 1001
/// assert_eq!(reference_number(1), "10016");
/// ```
pub fn reference_number(sequence: i64) -> String {
    let base = (REFERENCE_BASE_OFFSET + sequence.max(0)).to_string();
    // base is all digits, so the check digit always exists
    let digit = check_digit(&base).unwrap_or(0);
    format!("{}{}", base, digit)
}

/// Validates a complete reference number (base followed by check digit)
pub fn is_valid(reference: &str) -> bool {
    let reference: String = reference.chars().filter(|c| !c.is_whitespace()).collect();
    if !(4..=20).contains(&reference.len()) || !reference.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let (base, check) = reference.split_at(reference.len() - 1);
    match (check_digit(base), check.chars().next().and_then(|c| c.to_digit(10))) {
        (Some(expected), Some(actual)) => expected == actual,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_digit_known_values() {
        assert_eq!(check_digit("123456"), Some(1));
        assert_eq!(check_digit("1232"), Some(8));
        assert_eq!(check_digit("1001"), Some(6));
        assert_eq!(check_digit(""), None);
        assert_eq!(check_digit("12a"), None);
    }

    #[test]
    fn test_reference_number_is_valid() {
        for seq in [1, 2, 57, 999, 123_456] {
            let reference = reference_number(seq);
            assert!(is_valid(&reference), "{} should be valid", reference);
        }
    }

    #[test]
    fn test_is_valid_rejects_tampering() {
        assert!(is_valid("1234561"));
        assert!(is_valid("12345 61"));
        assert!(!is_valid("1234562"));
        assert!(!is_valid("12"));
        assert!(!is_valid("abcd1"));
    }

    #[test]
    fn test_is_valid_rejects_non_ascii() {
        assert!(!is_valid("1234ä"));
        assert!(!is_valid("ä"));
        assert!(!is_valid("１２３４５"));
    }
}
