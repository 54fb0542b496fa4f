use crate::render::table::Span;
use crossterm::style::Color;

/// 固定小數位數後去掉尾端的 0 與小數點
pub fn pretty_float(num: f64, precision: usize) -> String {
    let formatted = format!("{:.*}", precision, num);
    if formatted.contains('.') {
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        formatted
    }
}

/// 以千分位逗號分隔，例如 1234567 => "1,234,567"
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn time_unit(value: f64, unit: &str, color: Color) -> Span {
    Span::colored(format!("{}{}", pretty_float(value, 1), unit), color)
}

/// 模糊的人類可讀時間：49000 => "49s"、90000 => "1.5m"、18000000 => "5h"
pub fn human_time_offset(milliseconds: f64) -> Span {
    if milliseconds < 1000.0 {
        return time_unit(milliseconds, "ms", Color::Cyan);
    }

    let seconds = milliseconds / 1000.0;
    if seconds < 60.0 {
        return time_unit(seconds, "s", Color::DarkCyan);
    }

    let minutes = seconds / 60.0;
    if minutes < 60.0 {
        return time_unit(minutes, "m", Color::Blue);
    }

    time_unit(minutes / 60.0, "h", Color::Magenta)
}

/// duration / denominator；分母為 0 時顯示 "-"
pub fn time_per(duration_ms: f64, denominator: f64) -> Span {
    if denominator > 0.0 {
        human_time_offset(duration_ms / denominator)
    } else {
        Span::plain("-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_float_trims_zeros() {
        assert_eq!(pretty_float(1.5, 1), "1.5");
        assert_eq!(pretty_float(2.0, 1), "2");
        assert_eq!(pretty_float(0.04, 1), "0");
        assert_eq!(pretty_float(10.0, 0), "10");
        assert_eq!(pretty_float(3.14159, 2), "3.14");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_human_time_offset_units() {
        let ms = human_time_offset(250.0);
        assert_eq!(ms.text, "250ms");
        assert_eq!(ms.color, Some(Color::Cyan));

        assert_eq!(human_time_offset(49_000.0).text, "49s");
        assert_eq!(human_time_offset(90_000.0).text, "1.5m");

        let hours = human_time_offset(18_000_000.0);
        assert_eq!(hours.text, "5h");
        assert_eq!(hours.color, Some(Color::Magenta));
    }

    #[test]
    fn test_time_per_zero_denominator() {
        assert_eq!(time_per(1000.0, 0.0).text, "-");
        assert_eq!(time_per(1000.0, 2.0).text, "500ms");
    }
}
