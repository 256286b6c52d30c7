use chrono::NaiveDate;

use crate::error::{PayplanError, Result};

/// Monetary amount in integer cents.
pub type Cents = i64;

/// Format cents as a dollar amount with thousands separators: $1,234.56
pub fn money(cents: Cents) -> String {
    let negative = cents < 0;
    let abs = cents.abs();
    let int_part = (abs / 100).to_string();
    let dec_part = abs % 100;

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-${with_commas}.{dec_part:02}")
    } else {
        format!("${with_commas}.{dec_part:02}")
    }
}

/// Parse a decimal dollar amount ("1234.56", "$1,200") into cents.
pub fn parse_amount(input: &str) -> Result<Cents> {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|c| *c != '$' && *c != ',')
        .collect();
    let (sign, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, cleaned.as_str()),
    };
    let (dollars, cents) = match digits.split_once('.') {
        Some((d, c)) => (d, c),
        None => (digits, ""),
    };
    if dollars.is_empty() && cents.is_empty() {
        return Err(PayplanError::Validation(format!("not an amount: {input:?}")));
    }
    if cents.len() > 2 {
        return Err(PayplanError::Validation(format!(
            "amounts have at most two decimal places: {input:?}"
        )));
    }
    let whole: i64 = if dollars.is_empty() {
        0
    } else {
        dollars
            .parse()
            .map_err(|_| PayplanError::Validation(format!("not an amount: {input:?}")))?
    };
    let mut frac: i64 = if cents.is_empty() {
        0
    } else {
        cents
            .parse()
            .map_err(|_| PayplanError::Validation(format!("not an amount: {input:?}")))?
    };
    if cents.len() == 1 {
        frac *= 10;
    }
    Ok(sign * (whole * 100 + frac))
}

/// Parse an amount that must be strictly positive.
pub fn parse_positive_amount(input: &str) -> Result<Cents> {
    let cents = parse_amount(input)?;
    if cents <= 0 {
        return Err(PayplanError::Validation(format!(
            "amount must be greater than zero: {input:?}"
        )));
    }
    Ok(cents)
}

/// Parse an ISO date (YYYY-MM-DD).
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        PayplanError::Validation(format!("not a date (expected YYYY-MM-DD): {input:?}"))
    })
}

/// Percentage of an amount, rounded to the nearest cent.
pub fn percent_of(cents: Cents, percentage: f64) -> Cents {
    (cents as f64 * percentage / 100.0).round() as Cents
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(123456), "$1,234.56");
        assert_eq!(money(-50000), "-$500.00");
        assert_eq!(money(0), "$0.00");
        assert_eq!(money(100000099), "$1,000,000.99");
        assert_eq!(money(4210), "$42.10");
        assert_eq!(money(5), "$0.05");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1234.56").unwrap(), 123456);
        assert_eq!(parse_amount("$1,200").unwrap(), 120000);
        assert_eq!(parse_amount("0.5").unwrap(), 50);
        assert_eq!(parse_amount(".75").unwrap(), 75);
        assert_eq!(parse_amount("-19.99").unwrap(), -1999);
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("1.234").is_err());
        assert!(parse_amount("").is_err());
    }

    #[test]
    fn test_parse_positive_amount() {
        assert_eq!(parse_positive_amount("20").unwrap(), 2000);
        assert!(parse_positive_amount("0").is_err());
        assert!(parse_positive_amount("-5").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2026-01-31").unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 31).unwrap()
        );
        assert!(parse_date("01/31/2026").is_err());
        assert!(parse_date("2026-13-01").is_err());
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(200000, 50.0), 100000);
        assert_eq!(percent_of(120000, 30.0), 36000);
        assert_eq!(percent_of(333, 33.0), 110);
        assert_eq!(percent_of(0, 50.0), 0);
    }
}
