//! Number formatting for dashboard cards (pt-BR conventions)

/// Integer with `.` as thousands separator: `12345` -> `"12.345"`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Gross weight card. Above one million the total is shown in `t`, otherwise
/// divided by a thousand with a `kg` suffix.
pub fn format_weight(total: f64) -> String {
    if total > 1_000_000.0 {
        format!("{:.1}t", total / 1_000_000.0)
    } else {
        format!("{:.0}kg", total / 1000.0)
    }
}

pub fn format_mean_weight(mean: f64) -> String {
    format!("{:.1} kg", mean)
}

/// Invoice value card: `R$ 1.2M` or `R$ 850K`.
pub fn format_currency(total: f64) -> String {
    if total > 1_000_000.0 {
        format!("R$ {:.1}M", total / 1_000_000.0)
    } else {
        format!("R$ {:.0}K", total / 1000.0)
    }
}

/// Round to one decimal place, as every percentage on the dashboard is shown.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Render a whole-number float without the trailing `.0` (`70.0` -> `"70"`).
pub fn format_integral(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1.000");
        assert_eq!(format_count(1234567), "1.234.567");
    }

    #[test]
    fn test_weight_and_currency() {
        assert_eq!(format_weight(2_500_000.0), "2.5t");
        assert_eq!(format_weight(350_000.0), "350kg");
        assert_eq!(format_currency(1_260_000.0), "R$ 1.3M");
        assert_eq!(format_currency(85_000.0), "R$ 85K");
        assert_eq!(format_mean_weight(12.345), "12.3 kg");
    }

    #[test]
    fn test_format_integral() {
        assert_eq!(format_integral(70.0), "70");
        assert_eq!(format_integral(123456.0), "123456");
        assert_eq!(format_integral(1.5), "1.5");
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(33.333), 33.3);
        assert_eq!(round1(66.66), 66.7);
    }
}
