//! Inbound command routing and conversion request parsing

use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Help,
    Convert,
}

impl FromStr for BotCommand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "start" | "help" => Ok(BotCommand::Help),
            "usd" => Ok(BotCommand::Convert),
            _ => Err(anyhow::anyhow!("Unknown command: {}", s)),
        }
    }
}

impl BotCommand {
    /// Routes a message to a command. Returns `None` for plain text, unknown
    /// commands and commands addressed to a different bot (`/help@OtherBot`).
    pub fn route(text: &str, bot_username: Option<&str>) -> Option<BotCommand> {
        let head = text.split_whitespace().next()?;
        let name = head.strip_prefix('/')?;

        let name = match name.split_once('@') {
            Some((name, mention)) => {
                let addressed_to_us =
                    bot_username.is_some_and(|username| username.eq_ignore_ascii_case(mention));
                if !addressed_to_us {
                    return None;
                }
                name
            }
            None => name,
        };

        name.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub amount: f64,
    pub target_code: String,
}

impl ConversionRequest {
    /// Parses `/<cmd> <amount> <code>`. Tokens past the code are ignored.
    pub fn parse(text: &str) -> Option<ConversionRequest> {
        let mut parts = text.split_whitespace().skip(1);

        let amount: f64 = parts.next()?.parse().ok()?;
        if !amount.is_finite() || amount <= 0.0 {
            return None;
        }

        let target_code = parts.next()?.to_lowercase();

        Some(ConversionRequest {
            amount,
            target_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed() {
        let request = ConversionRequest::parse("/usd 100 eur").unwrap();
        assert_eq!(request.amount, 100.0);
        assert_eq!(request.target_code, "eur");
    }

    #[test]
    fn test_parse_lowercases_code_and_trims() {
        let request = ConversionRequest::parse("   /usd   12.5\tGBP  ").unwrap();
        assert_eq!(request.amount, 12.5);
        assert_eq!(request.target_code, "gbp");
    }

    #[test]
    fn test_parse_ignores_trailing_tokens() {
        let request = ConversionRequest::parse("/usd 3 jpy please now").unwrap();
        assert_eq!(request.amount, 3.0);
        assert_eq!(request.target_code, "jpy");
    }

    #[test]
    fn test_parse_missing_tokens() {
        for text in ["", "   ", "/usd", "/usd 100", "/usd  100   "] {
            assert!(ConversionRequest::parse(text).is_none(), "{text:?}");
        }
    }

    #[test]
    fn test_parse_non_numeric_amount() {
        for text in [
            "/usd abc eur",
            "/usd eur 100",
            "/usd NaN eur",
            "/usd inf eur",
            "/usd 10,5 eur",
        ] {
            assert!(ConversionRequest::parse(text).is_none(), "{text:?}");
        }
    }

    #[test]
    fn test_parse_rejects_non_positive_amount() {
        assert!(ConversionRequest::parse("/usd 0 eur").is_none());
        assert!(ConversionRequest::parse("/usd -5 eur").is_none());
    }

    #[test]
    fn test_route_commands_case_insensitive() {
        assert_eq!(BotCommand::route("/start", None), Some(BotCommand::Help));
        assert_eq!(BotCommand::route("/HELP", None), Some(BotCommand::Help));
        assert_eq!(BotCommand::route("/Help me please", None), Some(BotCommand::Help));
        assert_eq!(BotCommand::route("/USD 1 eur", None), Some(BotCommand::Convert));
        assert_eq!(BotCommand::route("  /usd", None), Some(BotCommand::Convert));
    }

    #[test]
    fn test_route_ignores_other_text() {
        assert_eq!(BotCommand::route("hello", None), None);
        assert_eq!(BotCommand::route("usd 100 eur", None), None);
        assert_eq!(BotCommand::route("/eur 100 usd", None), None);
        assert_eq!(BotCommand::route("/usdx 100 eur", None), None);
        assert_eq!(BotCommand::route("", None), None);
    }

    #[test]
    fn test_route_bot_mentions() {
        assert_eq!(
            BotCommand::route("/help@FxBot", Some("fxbot")),
            Some(BotCommand::Help)
        );
        assert_eq!(
            BotCommand::route("/usd@fxbot 1 eur", Some("FxBot")),
            Some(BotCommand::Convert)
        );
        assert_eq!(BotCommand::route("/help@OtherBot", Some("fxbot")), None);
        assert_eq!(BotCommand::route("/help@fxbot", None), None);
    }
}
