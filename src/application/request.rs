use crate::config::GatewayConfig;
use crate::domain::fields::{
    CARD_FIELDS, FieldSet, SIGNATURE, SIGNED_FIELD_NAMES, UNSIGNED_FIELD_NAMES,
};
use crate::domain::order::Order;
use crate::domain::signature::Signer;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

/// Per-request facts that do not come from the order itself.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub customer_ip: String,
    pub signed_at: DateTime<Utc>,
}

impl RequestContext {
    pub fn now(customer_ip: impl Into<String>) -> Self {
        Self {
            customer_ip: customer_ip.into(),
            signed_at: Utc::now(),
        }
    }
}

/// A signed field set ready to be posted to the processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentRequest {
    pub action_url: String,
    pub fields: FieldSet,
}

/// Builds signed outbound requests for the configured mode.
pub struct RequestBuilder {
    config: GatewayConfig,
    signer: Signer,
}

impl RequestBuilder {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let signer = config.signer()?;
        Ok(Self { config, signer })
    }

    pub fn build(&self, order: &Order, context: &RequestContext) -> Result<PaymentRequest> {
        let credentials = self.config.credentials();
        let billing = &order.billing;

        let mut fields = FieldSet::new();
        fields.set("access_key", credentials.access_key.as_str());
        fields.set("profile_id", credentials.profile_id.as_str());
        fields.set("transaction_uuid", order.order_key.as_str());
        fields.set(UNSIGNED_FIELD_NAMES, CARD_FIELDS.join(","));
        fields.set(
            "signed_date_time",
            context.signed_at.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        );
        fields.set("locale", self.config.locale.as_str());
        fields.set("transaction_type", self.config.transaction_type.as_str());
        fields.set("reference_number", order.id.to_string());
        fields.set("amount", format!("{:.2}", order.total));
        fields.set("currency", self.config.currency.as_str());
        fields.set("payment_method", "card");
        fields.set("bill_to_forename", billing.first_name.as_str());
        fields.set("bill_to_surname", billing.last_name.as_str());
        fields.set("bill_to_email", billing.email.as_str());
        fields.set("bill_to_phone", billing.phone.as_str());
        fields.set("bill_to_address_line1", billing.address_1.as_str());
        fields.set("bill_to_address_line2", billing.address_2.as_str());
        fields.set("bill_to_address_city", billing.city.as_str());
        fields.set("bill_to_address_state", billing.state.as_str());
        fields.set("bill_to_address_country", billing.country.as_str());
        fields.set("bill_to_address_postal_code", billing.postcode.as_str());
        fields.set("bill_to_company_name", billing.company.as_str());
        fields.set("customer_ip_address", context.customer_ip.as_str());
        fields.set("device_fingerprint_id", self.device_fingerprint_id(order));

        let mut signed: Vec<&str> = vec![SIGNED_FIELD_NAMES];
        signed.extend(
            fields
                .iter()
                .filter(|(_, value)| !value.is_empty())
                .map(|(name, _)| name),
        );
        let signed_field_names = signed.join(",");
        fields.set(SIGNED_FIELD_NAMES, signed_field_names);

        let signature = self.signer.sign_declared(&fields)?;
        fields.set(SIGNATURE, signature);

        debug!(order_id = order.id, fields = fields.len(), "Built signed payment request");

        Ok(PaymentRequest {
            action_url: self.config.action_url().to_string(),
            fields,
        })
    }

    /// Session id shared with the fingerprinting service, empty when fingerprinting is off.
    fn device_fingerprint_id(&self, order: &Order) -> String {
        if !self.config.device_fingerprint {
            return String::new();
        }
        let key_suffix = order.order_key.get(9..).unwrap_or("");
        format!("{}{}", order.id, key_suffix)
    }
}
