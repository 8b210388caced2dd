//! Exchange rates between two priced tokens.
use std::{fmt::Display, str::FromStr as _};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::catalog::Token;

/// Fractional digits shown for converted amounts and rates.
pub const DISPLAY_DP: u32 = 6;

/// Price of one `from` expressed in `to`.
///
/// `None` if either token has no positive price.
pub fn compute_rate(from: &Token, to: &Token) -> Option<Decimal> {
    let from_price = from.price().filter(|p| p.is_sign_positive() && !p.is_zero())?;
    let to_price = to.price().filter(|p| p.is_sign_positive() && !p.is_zero())?;
    from_price.checked_div(to_price)
}

/// `amount * rate` with exactly six fractional digits. Unparseable amounts
/// count as zero.
///
/// `None` if the amount is numeric but does not fit in a [`Decimal`], or the
/// product overflows.
pub fn convert(amount: &str, rate: Decimal) -> Option<String> {
    let amount = amount_or_zero(amount)?;
    amount.checked_mul(rate).map(format_fixed)
}

/// Renders `value` with exactly six fractional digits.
pub fn format_fixed(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(DISPLAY_DP, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.prec$}", prec = DISPLAY_DP as usize)
}

/// Parses amount text as typed into the amount field; `".5"` and `"5."` are
/// both accepted.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let text = text.trim();
    let text = text.strip_suffix('.').unwrap_or(text);
    if text.is_empty() {
        return None;
    }
    if let Some(fraction) = text.strip_prefix('.') {
        return Decimal::from_str(&format!("0.{fraction}")).ok();
    }
    Decimal::from_str(text).ok()
}

/// Digits with at most one point, so a failed parse means out of range.
pub fn is_numeric(text: &str) -> bool {
    let text = text.trim();
    text.bytes().any(|b| b.is_ascii_digit())
        && text.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && text.bytes().filter(|&b| b == b'.').count() <= 1
}

fn amount_or_zero(text: &str) -> Option<Decimal> {
    match parse_amount(text) {
        Some(amount) => Some(amount),
        None if is_numeric(text) => None,
        None => Some(Decimal::ZERO),
    }
}

/// Forward and reverse rate between two tokens, always computed together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExchangeRate {
    /// `from` expressed in `to`
    pub forward: Decimal,
    /// `to` expressed in `from`
    pub reverse: Decimal,
}

impl ExchangeRate {
    pub fn between(from: &Token, to: &Token) -> Option<Self> {
        let forward = compute_rate(from, to)?;
        let reverse = Decimal::ONE.checked_div(forward)?;
        Some(Self { forward, reverse })
    }
}

#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub amount: String,
    pub from: Token,
    pub to: Token,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
    pub amount: String,
    pub from: String,
    pub to: String,
    /// Rounded to six fractional digits
    pub converted_amount: Decimal,
    pub rate: ExchangeRate,
}

impl ConversionRequest {
    /// `None` when no rate can be computed between the two tokens, or the
    /// converted amount does not fit in a [`Decimal`].
    pub fn quote(&self) -> Option<ConversionResult> {
        let rate = ExchangeRate::between(&self.from, &self.to)?;
        let converted_amount = amount_or_zero(&self.amount)?
            .checked_mul(rate.forward)?
            .round_dp_with_strategy(DISPLAY_DP, RoundingStrategy::MidpointAwayFromZero);

        Some(ConversionResult {
            amount: self.amount.clone(),
            from: self.from.name().to_string(),
            to: self.to.name().to_string(),
            converted_amount,
            rate,
        })
    }
}

impl Display for ConversionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let amount = if self.amount.is_empty() { "0" } else { &self.amount };
        writeln!(f, "{amount} {} =", self.from)?;
        writeln!(f, "{} {}", format_fixed(self.converted_amount), self.to)?;
        writeln!(f, "1 {} = {} {}", self.from, format_fixed(self.rate.forward), self.to)?;
        write!(f, "1 {} = {} {}", self.to, format_fixed(self.rate.reverse), self.from)
    }
}
