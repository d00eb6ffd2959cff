//! Gateway settings, loaded once at startup from a JSON file.

use crate::domain::order::{Order, OrderStatus};
use crate::domain::signature::{SecretKey, Signer};
use crate::error::{GatewayError, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub const TEST_ACTION_URL: &str = "https://testsecureacceptance.cybersource.com/silent/pay";
pub const LIVE_ACTION_URL: &str = "https://secureacceptance.cybersource.com/silent/pay";

/// Operating context. Selects credentials and the processor endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Test,
    Live,
}

/// Which status an accepted payment moves an order to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutocompleteMode {
    /// Accepted orders go to `processing`.
    #[default]
    Off,
    /// Accepted orders awaiting payment go straight to `completed`.
    Paid,
    /// Like `Paid`, restricted to orders with virtual items only.
    Virtual,
    /// Every accepted order goes to `completed`.
    All,
}

/// Merchant credentials for one mode.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub profile_id: String,
    pub access_key: String,
    pub secret_key: SecretKey,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub mode: Mode,
    pub merchant_id: String,
    pub test: Credentials,
    pub live: Credentials,
    pub locale: String,
    pub currency: String,
    pub transaction_type: String,
    pub device_fingerprint: bool,
    pub autocomplete: AutocompleteMode,
    /// Storefront base URL used to build landing pages.
    pub store_url: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Test,
            merchant_id: String::new(),
            test: Credentials::default(),
            live: Credentials::default(),
            locale: "en".to_string(),
            currency: "GBP".to_string(),
            transaction_type: "sale".to_string(),
            device_fingerprint: false,
            autocomplete: AutocompleteMode::Off,
            store_url: "http://localhost".to_string(),
        }
    }
}

impl GatewayConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Credentials of the configured mode.
    pub fn credentials(&self) -> &Credentials {
        match self.mode {
            Mode::Test => &self.test,
            Mode::Live => &self.live,
        }
    }

    pub fn action_url(&self) -> &'static str {
        match self.mode {
            Mode::Test => TEST_ACTION_URL,
            Mode::Live => LIVE_ACTION_URL,
        }
    }

    /// Fails with the first missing setting the gateway cannot work without.
    pub fn validate(&self) -> Result<()> {
        let credentials = self.credentials();
        if credentials.profile_id.is_empty() {
            return Err(GatewayError::ConfigurationIncomplete("profile_id"));
        }
        if credentials.access_key.is_empty() {
            return Err(GatewayError::ConfigurationIncomplete("access_key"));
        }
        if credentials.secret_key.is_empty() {
            return Err(GatewayError::ConfigurationIncomplete("secret_key"));
        }
        if self.merchant_id.is_empty() {
            return Err(GatewayError::ConfigurationIncomplete("merchant_id"));
        }
        Ok(())
    }

    pub fn is_available(&self) -> bool {
        self.validate().is_ok()
    }

    /// A signer for the configured mode's secret key.
    pub fn signer(&self) -> Result<Signer> {
        self.validate()?;
        Ok(Signer::new(self.credentials().secret_key.clone()))
    }

    /// Status an accepted payment moves `order` to, judged on the order as currently stored.
    ///
    /// `paid` and `virtual` only complete orders that were still awaiting payment.
    pub fn paid_status(&self, order: &Order) -> OrderStatus {
        let awaiting_payment = matches!(
            order.status,
            OrderStatus::Pending | OrderStatus::OnHold | OrderStatus::Failed
        );
        match self.autocomplete {
            AutocompleteMode::All => OrderStatus::Completed,
            AutocompleteMode::Paid if awaiting_payment => OrderStatus::Completed,
            AutocompleteMode::Virtual if awaiting_payment && order.virtual_only => {
                OrderStatus::Completed
            }
            _ => OrderStatus::Processing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn complete_config() -> GatewayConfig {
        serde_json::from_str(
            r#"{
                "mode": "live",
                "merchant_id": "merchant",
                "test": {"profile_id": "tp", "access_key": "ta", "secret_key": "ts"},
                "live": {"profile_id": "lp", "access_key": "la", "secret_key": "ls"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_mode_selects_credentials_and_url() {
        let mut config = complete_config();
        assert_eq!(config.credentials().profile_id, "lp");
        assert_eq!(config.action_url(), LIVE_ACTION_URL);

        config.mode = Mode::Test;
        assert_eq!(config.credentials().profile_id, "tp");
        assert_eq!(config.action_url(), TEST_ACTION_URL);
    }

    #[test]
    fn test_defaults_fill_missing_settings() {
        let config = complete_config();
        assert_eq!(config.locale, "en");
        assert_eq!(config.transaction_type, "sale");
        assert_eq!(config.autocomplete, AutocompleteMode::Off);
        assert!(config.is_available());
    }

    #[test]
    fn test_validate_reports_missing_secret() {
        let mut config = complete_config();
        config.live.secret_key = SecretKey::default();
        assert!(matches!(
            config.validate(),
            Err(GatewayError::ConfigurationIncomplete("secret_key"))
        ));
        assert!(!config.is_available());
        assert!(config.signer().is_err());
    }

    #[test]
    fn test_validate_reports_missing_merchant() {
        let mut config = complete_config();
        config.merchant_id.clear();
        assert!(matches!(
            config.validate(),
            Err(GatewayError::ConfigurationIncomplete("merchant_id"))
        ));
    }

    #[test]
    fn test_other_mode_credentials_do_not_count() {
        let mut config = complete_config();
        config.live = Credentials::default();
        assert!(!config.is_available());
    }

    #[test]
    fn test_debug_output_hides_secret() {
        let config = complete_config();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("\"ls\""));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_paid_status_follows_autocomplete() {
        let mut config = complete_config();
        let mut order = Order::new(1, "key", dec!(1.00));
        assert_eq!(config.paid_status(&order), OrderStatus::Processing);

        config.autocomplete = AutocompleteMode::Paid;
        assert_eq!(config.paid_status(&order), OrderStatus::Completed);

        config.autocomplete = AutocompleteMode::Virtual;
        assert_eq!(config.paid_status(&order), OrderStatus::Processing);
        order.virtual_only = true;
        assert_eq!(config.paid_status(&order), OrderStatus::Completed);
    }

    #[test]
    fn test_autocomplete_only_applies_to_orders_awaiting_payment() {
        let mut config = complete_config();
        let mut order = Order::new(1, "key", dec!(1.00));
        order.virtual_only = true;

        for status in [OrderStatus::Pending, OrderStatus::OnHold, OrderStatus::Failed] {
            order.status = status;
            config.autocomplete = AutocompleteMode::Paid;
            assert_eq!(config.paid_status(&order), OrderStatus::Completed, "{status}");
            config.autocomplete = AutocompleteMode::Virtual;
            assert_eq!(config.paid_status(&order), OrderStatus::Completed, "{status}");
        }

        for status in [OrderStatus::Cancelled, OrderStatus::Refunded] {
            order.status = status;
            config.autocomplete = AutocompleteMode::Paid;
            assert_eq!(config.paid_status(&order), OrderStatus::Processing, "{status}");
            config.autocomplete = AutocompleteMode::Virtual;
            assert_eq!(config.paid_status(&order), OrderStatus::Processing, "{status}");
            config.autocomplete = AutocompleteMode::All;
            assert_eq!(config.paid_status(&order), OrderStatus::Completed, "{status}");
        }
    }

    #[test]
    fn test_autocomplete_all_is_parsed() {
        let config: GatewayConfig = serde_json::from_str(r#"{"autocomplete": "all"}"#).unwrap();
        assert_eq!(config.autocomplete, AutocompleteMode::All);
    }
}
