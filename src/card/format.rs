//! Display formatting for card form fields

/// Maximum display length of a grouped card number (16 digits + 3 spaces).
const MAX_GROUPED_LEN: usize = 19;

/// Groups digits in blocks of four: `"4532015112830366"` → `"4532 0151 1283 0366"`.
///
/// Non-digits are dropped and the result is capped at 19 characters, which is
/// what the card number field shows while the user types.
pub fn format_card_number(raw: &str) -> String {
    let digits: Vec<char> = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let grouped = digits
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ");

    grouped.chars().take(MAX_GROUPED_LEN).collect()
}

/// Formats a partially typed expiry as `MM/YY`.
///
/// `"1"` → `"1"`, `"12"` → `"12/"`, `"1225"` → `"12/25"`, `"12/2599"` → `"12/25"`.
pub fn format_expiry_input(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 2 {
        return digits;
    }

    let year: String = digits.chars().skip(2).take(2).collect();
    format!("{}/{}", &digits[..2], year)
}

/// Keeps only digits in a CVV field.
pub fn format_cvv_input(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// `"4532015112830366"` → `"**** **** **** 0366"`. Numbers of four digits or
/// fewer are returned unchanged.
pub fn mask_card_number(number: &str) -> String {
    let len = number.chars().count();
    if len <= 4 {
        return number.to_string();
    }

    let last_four: String = number.chars().skip(len - 4).collect();
    format!("**** **** **** {}", last_four)
}
