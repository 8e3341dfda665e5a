//! Display formatting for KPI cards and table cells.

/// Insert `,` every three digits of a non-negative integer string.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `$1,234.56`; negative values as `-$1,234.56`; NaN as `n/a`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}${}.{frac_part}", group_thousands(int_part))
}

/// One decimal and a percent sign; NaN as `n/a`.
pub fn format_percent(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.1}%")
    } else {
        "n/a".to_string()
    }
}

pub fn format_count(value: usize) -> String {
    group_thousands(&value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(999.999), "$1,000.00");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(-2871.5), "-$2,871.50");
        assert_eq!(format_currency(-0.001), "$0.00");
        assert_eq!(format_currency(f64::NAN), "n/a");
    }

    #[test]
    fn percent_and_counts() {
        assert_eq!(format_percent(12.345), "12.3%");
        assert_eq!(format_percent(-4.0), "-4.0%");
        assert_eq!(format_percent(f64::NAN), "n/a");
        assert_eq!(format_count(2823), "2,823");
        assert_eq!(format_count(100), "100");
        assert_eq!(format_count(0), "0");
    }
}
