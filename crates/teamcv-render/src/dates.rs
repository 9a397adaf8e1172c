use chrono::{DateTime, NaiveDate};

pub const PRESENT: &str = "Present";

/// Parse the date shapes the editor produces
fn parse_date(text: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    // Month pickers emit "YYYY-MM"
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", text), "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.date_naive())
}

/// "Jan 2022". Unparsable text is returned as is.
pub fn format_month(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return String::new();
    }
    match parse_date(text) {
        Some(date) => date.format("%b %Y").to_string(),
        None => text.to_string(),
    }
}

/// "Jan 2022 - Present". An ongoing entry or a missing end date both read "Present".
pub fn format_date_range(start: &str, end: Option<&str>, is_current: bool) -> String {
    let end = match end {
        Some(end) if !is_current => format_month(end),
        _ => PRESENT.to_string(),
    };
    format!("{} - {}", format_month(start), end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_month_shapes() {
        assert_eq!(format_month("2022-01-01"), "Jan 2022");
        assert_eq!(format_month("2019-06"), "Jun 2019");
        assert_eq!(format_month("2020-12-31T23:00:00Z"), "Dec 2020");
        assert_eq!(format_month(""), "");
        assert_eq!(format_month("Spring 2018"), "Spring 2018");
    }

    #[test]
    fn test_range_present_rules() {
        assert_eq!(
            format_date_range("2022-01-01", None, true),
            "Jan 2022 - Present"
        );
        assert_eq!(
            format_date_range("2022-01-01", None, false),
            "Jan 2022 - Present"
        );
        // isCurrent wins over a stray end date
        assert_eq!(
            format_date_range("2022-01-01", Some("2030-01-01"), true),
            "Jan 2022 - Present"
        );
        assert_eq!(
            format_date_range("2019-06-01", Some("2021-12-31"), false),
            "Jun 2019 - Dec 2021"
        );
    }
}
