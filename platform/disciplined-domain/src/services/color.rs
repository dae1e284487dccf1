/// `#rrggbb`, the only colour form accepted by the theme and the HTML report.
pub fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|ch| ch.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::is_hex_color;

    #[test]
    fn accepts_six_digit_hex_only() {
        assert!(is_hex_color("#00FFaa"));
        assert!(!is_hex_color("#00FFa"));
        assert!(!is_hex_color("00FFaa0"));
        assert!(!is_hex_color("#00ffzz"));
        assert!(!is_hex_color("#ééé"));
    }
}
