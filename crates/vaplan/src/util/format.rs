/// Format a dollar amount with thousands separators, no cents
pub fn format_currency(value: f64) -> String {
    let dollars = value.abs().round() as i64;

    let dollars_str = dollars.to_string();
    let mut result = String::new();
    for (i, c) in dollars_str.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    let dollars_formatted: String = result.chars().rev().collect();

    if value < 0.0 && dollars > 0 {
        format!("-${}", dollars_formatted)
    } else {
        format!("${}", dollars_formatted)
    }
}

/// Format a fraction as a percentage (0.0935 -> "9.35%")
pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// Format a currency value in compact form (e.g., $2.1M, $450K, $50)
pub fn format_compact_currency(value: f64) -> String {
    let abs_value = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };

    if abs_value >= 1_000_000.0 {
        format!("{}${:.1}M", sign, abs_value / 1_000_000.0)
    } else if abs_value >= 1_000.0 {
        format!("{}${:.0}K", sign, abs_value / 1_000.0)
    } else {
        format!("{}${:.0}", sign, abs_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(360_180.0), "$360,180");
        assert_eq!(format_currency(30_636.4), "$30,636");
        assert_eq!(format_currency(999.5), "$1,000");
        assert_eq!(format_currency(-20_000.0), "-$20,000");
        assert_eq!(format_currency(-0.2), "$0");
        assert_eq!(format_currency(0.0), "$0");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(0.0935), "9.35%");
        assert_eq!(format_percentage(0.0135), "1.35%");
    }

    #[test]
    fn test_format_compact_currency() {
        assert_eq!(format_compact_currency(2_150_000.0), "$2.1M");
        assert_eq!(format_compact_currency(360_180.0), "$360K");
        assert_eq!(format_compact_currency(50.0), "$50");
        assert_eq!(format_compact_currency(-4_200.0), "-$4K");
    }
}
