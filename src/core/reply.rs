//! Fixed reply templates sent back to the chat

use crate::core::currency::{BASE_CURRENCY, ConversionResult};

pub const HELP_TEXT: &str = "Welcome to currency converter bot.

Usage instructions:
/usd <amount> <target_currency>

Example:
/usd 100 eur

Supported codes: All in floatrates.com
";

pub const INVALID_COMMAND: &str = "Incorrect command, please see /help.";

pub const SOURCE_UNAVAILABLE: &str =
    "⚠️ Couldn't reach currency data at this moment, please try again.";

pub fn unknown_currency(code: &str) -> String {
    format!("Invalid currency code: {}", code.to_uppercase())
}

pub fn conversion(result: &ConversionResult) -> String {
    let base = BASE_CURRENCY.to_uppercase();
    format!(
        "💵 {} {base} = {:.2} {}\n\nCurrency: 1 {base} = {:.2} {}\nSource: FloatRates.com",
        result.amount,
        result.converted_amount,
        result.target_code.to_uppercase(),
        result.rate,
        result.target_code,
    )
}
