//! Number and date formatting shared by popups and legends.

use chrono::NaiveDate;

/// `1234567` → `"1,234,567"`.
pub fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// One decimal place with a percent sign: `62.345` → `"62.3%"`.
pub fn percent(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    format!("{value:.1}%")
}

/// `part / whole * 100`, `0.0` for an empty whole.
pub fn share(part: u64, whole: u64) -> f64 {
    if whole == 0 { 0.0 } else { part as f64 / whole as f64 * 100.0 }
}

/// `"2024-11-05"` → `"November 5, 2024"`; anything unparsable is shown as given.
pub fn display_date(date: &str) -> String {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map(|d| d.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|_| date.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(1234567), "1,234,567");
    }

    #[test]
    fn percentages_have_one_decimal() {
        assert_eq!(percent(share(1, 3)), "33.3%");
        assert_eq!(percent(share(5, 0)), "0.0%");
        assert_eq!(percent(100.0), "100.0%");
    }

    #[test]
    fn election_dates_are_spelled_out() {
        assert_eq!(display_date("2024-11-05"), "November 5, 2024");
        assert_eq!(display_date("special"), "special");
    }
}
