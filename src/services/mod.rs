use rust_decimal::Decimal;

use crate::error::{AppError, AppResult};

pub mod category_service;
pub mod order_service;
pub mod product_service;
pub mod user_service;

/// NUMERIC(10, 2) leaves eight digits before the point.
const MONEY_LIMIT: i64 = 100_000_000;

/// Round a price to cents and check it fits the money columns.
pub(crate) fn checked_money(price: Decimal) -> AppResult<Decimal> {
    let price = price.round_dp(2);
    if price.is_sign_negative() && !price.is_zero() {
        return Err(AppError::BadRequest("Price must not be negative".into()));
    }
    if price >= Decimal::from(MONEY_LIMIT) {
        return Err(AppError::BadRequest("Price is too large".into()));
    }
    Ok(price.abs())
}

/// Build an `ILIKE` pattern matching `term` as a literal substring; `None` for blank terms.
pub(crate) fn like_pattern(term: &str) -> Option<String> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}

/// Treat whitespace-only optional text as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_wraps_and_escapes() {
        assert_eq!(like_pattern("shipped").as_deref(), Some("%shipped%"));
        assert_eq!(like_pattern("  Mug ").as_deref(), Some("%Mug%"));
        assert_eq!(like_pattern("50%_off\\").as_deref(), Some("%50\\%\\_off\\\\%"));
        assert_eq!(like_pattern("   "), None);
        assert_eq!(like_pattern(""), None);
    }

    #[test]
    fn money_is_rounded_before_the_range_check() {
        let cents = |raw: &str| checked_money(raw.parse().unwrap());
        assert_eq!(cents("19.999").unwrap().to_string(), "20.00");
        assert_eq!(cents("99999999.99").unwrap().to_string(), "99999999.99");
        assert!(matches!(cents("99999999.999"), Err(AppError::BadRequest(_))));
        assert!(matches!(cents("1000000000"), Err(AppError::BadRequest(_))));
        assert!(matches!(cents("-0.01"), Err(AppError::BadRequest(_))));
        assert_eq!(cents("-0.001").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn non_blank_drops_whitespace() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some(" hi ".into())).as_deref(), Some(" hi "));
    }
}
