use crate::error::ConfigError;
use std::env;
use tabsplit_domain::EmailMatch;

pub const EMAIL_MATCH_VAR: &str = "TABSPLIT_EMAIL_MATCH";
pub const CURRENCY_VAR: &str = "TABSPLIT_CURRENCY";

const DEFAULT_CURRENCY: &str = "USD";

/// Runtime settings for the ledger use cases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerConfig {
    /// How participant emails are compared with the viewer's email.
    pub email_match: EmailMatch,
    /// Currency label shown next to amounts.
    pub currency: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            email_match: EmailMatch::Exact,
            currency: DEFAULT_CURRENCY.to_owned(),
        }
    }
}

impl LedgerConfig {
    /// Reads `.env` (if present) and then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(EMAIL_MATCH_VAR) {
            config.email_match = parse_email_match(&raw)?;
        }
        if let Some(currency) = lookup(CURRENCY_VAR) {
            let currency = currency.trim();
            if !currency.is_empty() {
                config.currency = currency.to_uppercase();
            }
        }

        Ok(config)
    }
}

fn parse_email_match(raw: &str) -> Result<EmailMatch, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "exact" => Ok(EmailMatch::Exact),
        "case_insensitive" | "case-insensitive" => Ok(EmailMatch::CaseInsensitive),
        _ => Err(ConfigError::InvalidValue {
            key: EMAIL_MATCH_VAR,
            expected: "exact, case_insensitive",
            found: raw.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_variables() {
        let config = LedgerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, LedgerConfig::default());
        assert_eq!(config.email_match, EmailMatch::Exact);
        assert_eq!(config.currency, "USD");
    }

    #[rstest]
    #[case::exact("exact", EmailMatch::Exact)]
    #[case::snake("case_insensitive", EmailMatch::CaseInsensitive)]
    #[case::kebab_upper("Case-Insensitive", EmailMatch::CaseInsensitive)]
    fn reads_email_match(#[case] raw: &str, #[case] expected: EmailMatch) {
        let config = LedgerConfig::from_lookup(lookup_from(&[(EMAIL_MATCH_VAR, raw)])).unwrap();
        assert_eq!(config.email_match, expected);
    }

    #[test]
    fn rejects_unknown_email_match() {
        let err = LedgerConfig::from_lookup(lookup_from(&[(EMAIL_MATCH_VAR, "fuzzy")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: EMAIL_MATCH_VAR,
                expected: "exact, case_insensitive",
                found: "fuzzy".into(),
            }
        );
    }

    #[test]
    fn currency_is_uppercased() {
        let config = LedgerConfig::from_lookup(lookup_from(&[(CURRENCY_VAR, " eur ")])).unwrap();
        assert_eq!(config.currency, "EUR");
    }
}
