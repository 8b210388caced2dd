//! Amount and token-pair validation for the swap form.
//!
//! Validation never fails loudly: errors are values the form keeps next to the
//! field they belong to, and rejected edits simply leave the field unchanged.
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::{
    catalog::Token,
    rate::{ConversionRequest, ConversionResult, is_numeric, parse_amount},
};

/// Amount the form starts with.
pub const DEFAULT_AMOUNT: &str = "1.20";

// ASCII digits only, at most 6 after the point
static AMOUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]*\.?[0-9]{0,6}$").expect("amount pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Amount is required")]
    AmountRequired,

    #[error("Amount must be greater than 0")]
    AmountNotPositive,

    #[error("Please select different tokens")]
    SameToken,
}

/// Outcome of validating one edit of the amount field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountValidation {
    /// Store the text, it is a usable amount
    Valid,
    /// Store the text, but show the error
    Invalid(ValidationError),
    /// Keep the previous text
    Rejected,
}

impl AmountValidation {
    pub fn is_stored(&self) -> bool {
        !matches!(self, Self::Rejected)
    }

    pub fn error(&self) -> Option<ValidationError> {
        match self {
            Self::Invalid(e) => Some(*e),
            Self::Valid | Self::Rejected => None,
        }
    }
}

pub fn validate_amount(text: &str) -> AmountValidation {
    if text.is_empty() {
        return AmountValidation::Invalid(ValidationError::AmountRequired);
    }
    if !AMOUNT_PATTERN.is_match(text) {
        return AmountValidation::Rejected;
    }
    // "." matches the pattern but is not a number, treat it like zero
    match parse_amount(text) {
        Some(amount) if amount > Decimal::ZERO => AmountValidation::Valid,
        None if is_numeric(text) => AmountValidation::Rejected,
        _ => AmountValidation::Invalid(ValidationError::AmountNotPositive),
    }
}

/// Errors only when both sides are selected and name the same token.
pub fn validate_token_pair(a: Option<&Token>, b: Option<&Token>) -> Result<(), ValidationError> {
    match (a, b) {
        (Some(a), Some(b)) if a == b => Err(ValidationError::SameToken),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary {
    Quote(ConversionResult),
    /// At least one side has no selection yet
    SelectTokens,
    /// Both selected, but no rate between them
    Unavailable,
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Summary::Quote(result) => write!(f, "{result}"),
            Summary::SelectTokens => write!(f, "Select tokens to see exchange rate"),
            Summary::Unavailable => write!(f, "Unable to calculate exchange rate"),
        }
    }
}

/// State of the swap form: the amount text, both selections and their errors.
///
/// Each field has exactly one writer, the method handling its event.
#[derive(Debug, Clone)]
pub struct SwapForm {
    amount: String,
    amount_error: Option<ValidationError>,
    from: Option<Token>,
    to: Option<Token>,
    pair_error: Option<ValidationError>,
}

impl Default for SwapForm {
    fn default() -> Self {
        Self {
            amount: DEFAULT_AMOUNT.to_string(),
            amount_error: None,
            from: None,
            to: None,
            pair_error: None,
        }
    }
}

impl SwapForm {
    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn amount_error(&self) -> Option<ValidationError> {
        self.amount_error
    }

    pub fn from_token(&self) -> Option<&Token> {
        self.from.as_ref()
    }

    pub fn to_token(&self) -> Option<&Token> {
        self.to.as_ref()
    }

    pub fn pair_error(&self) -> Option<ValidationError> {
        self.pair_error
    }

    /// Applies an edit of the amount field.
    pub fn set_amount(&mut self, text: &str) -> AmountValidation {
        let validation = validate_amount(text);
        if validation.is_stored() {
            self.amount = text.to_string();
            self.amount_error = validation.error();
        }
        validation
    }

    pub fn select_from(&mut self, token: Token) {
        self.pair_error = validate_token_pair(Some(&token), self.to.as_ref()).err();
        self.from = Some(token);
    }

    pub fn select_to(&mut self, token: Token) {
        self.pair_error = validate_token_pair(self.from.as_ref(), Some(&token)).err();
        self.to = Some(token);
    }

    /// Exchanges both selections and clears the pairing error. The amount is
    /// left as is.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.from, &mut self.to);
        self.pair_error = None;
    }

    /// First error to show, amount before pairing.
    pub fn error(&self) -> Option<ValidationError> {
        self.amount_error.or(self.pair_error)
    }

    pub fn request(&self) -> Option<ConversionRequest> {
        Some(ConversionRequest {
            amount: self.amount.clone(),
            from: self.from.clone()?,
            to: self.to.clone()?,
        })
    }

    pub fn quote(&self) -> Option<ConversionResult> {
        self.request()?.quote()
    }

    pub fn summary(&self) -> Summary {
        match self.request() {
            None => Summary::SelectTokens,
            Some(request) => request.quote().map_or(Summary::Unavailable, Summary::Quote),
        }
    }
}
