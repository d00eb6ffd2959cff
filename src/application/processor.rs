use crate::config::GatewayConfig;
use crate::domain::decision::Decision;
use crate::domain::fields::FieldSet;
use crate::domain::order::{Order, OrderId, OrderStatus};
use crate::domain::ports::{OrderStoreBox, StorefrontBox, Transition};
use crate::domain::reason;
use crate::domain::signature::Signer;
use crate::error::{GatewayError, Result};
use serde::Serialize;
use tracing::{debug, error, info, warn};

pub const REQ_PAYMENT_METHOD: &str = "req_payment_method";
pub const REQ_REFERENCE_NUMBER: &str = "req_reference_number";
pub const DECISION: &str = "decision";
pub const REASON_CODE: &str = "reason_code";
pub const MESSAGE: &str = "message";

/// The only payment method this gateway handles on the shared response endpoint.
pub const CARD_PAYMENT_METHOD: &str = "card";

/// Fields a response must carry under its signature before any of them is acted upon.
const TRUSTED_FIELDS: [&str; 4] = [
    REQ_PAYMENT_METHOD,
    REQ_REFERENCE_NUMBER,
    DECISION,
    REASON_CODE,
];

pub const DUPLICATE_NOTE: &str = "Duplicate transaction received.";

/// How many times a conditional transition is retried after losing a race.
const MAX_TRANSITION_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeKind {
    Success,
    Duplicate,
    SignatureInvalid,
    Malformed,
    OrderNotFound,
    InvalidPayloadKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub status: u16,
    pub location: String,
}

impl Redirect {
    pub fn found(location: String) -> Self {
        Self {
            status: 302,
            location,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

/// What handling one processor response did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub kind: OutcomeKind,
    pub order_id: Option<OrderId>,
    pub decision: Option<Decision>,
    pub redirect: Option<Redirect>,
    pub note: Option<String>,
    pub transition: Option<StatusChange>,
    pub cart_cleared: bool,
    pub needs_investigation: bool,
}

impl Outcome {
    fn new(kind: OutcomeKind) -> Self {
        Self {
            kind,
            order_id: None,
            decision: None,
            redirect: None,
            note: None,
            transition: None,
            cart_cleared: false,
            needs_investigation: false,
        }
    }
}

/// Target status and note for one decision, before any store interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Action {
    target: OrderStatus,
    note: String,
    needs_investigation: bool,
}

fn action_for(
    decision: &Decision,
    reason_code: &str,
    message: Option<&str>,
    paid_status: OrderStatus,
) -> Action {
    let suffix = message.map(|m| format!(" - {m}")).unwrap_or_default();
    let (target, note) = match decision {
        Decision::Accept => (paid_status, reason::describe(reason_code)),
        Decision::Decline => (OrderStatus::Failed, reason::describe(reason_code)),
        Decision::Review => (OrderStatus::OnHold, reason::describe(reason_code)),
        Decision::Error => (
            OrderStatus::Failed,
            format!(
                "Access denied, page not found, or internal server error: code {reason_code}{suffix}"
            ),
        ),
        Decision::Cancel => (
            OrderStatus::Cancelled,
            format!("The order has been cancelled by the customer: code {reason_code}{suffix}"),
        ),
        Decision::Unknown(raw) => (
            OrderStatus::OnHold,
            format!(
                "Unknown decision received from gateway: {raw} with reason code \
                 {reason_code}{suffix}. Flagged for manual investigation."
            ),
        ),
    };
    Action {
        target,
        note,
        needs_investigation: matches!(decision, Decision::Unknown(_)),
    }
}

/// Extracts the order id from a `<orderId>_...` reference number.
pub fn parse_reference(reference: &str) -> Result<OrderId> {
    let prefix = reference.trim().split('_').next().unwrap_or("");
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GatewayError::MalformedReference(reference.to_string()));
    }
    prefix
        .parse()
        .map_err(|_| GatewayError::MalformedReference(reference.to_string()))
}

/// Verifies processor responses and applies their decision to the referenced order.
///
/// A response whose signature does not verify never touches an order, but the shopper is still
/// redirected. Orders that are already paid only receive a duplicate note.
pub struct ResponseProcessor {
    config: GatewayConfig,
    signer: Signer,
    orders: OrderStoreBox,
    storefront: StorefrontBox,
}

impl ResponseProcessor {
    /// Creates a processor for the configured mode. Fails if the configuration is incomplete.
    pub fn new(
        config: GatewayConfig,
        orders: OrderStoreBox,
        storefront: StorefrontBox,
    ) -> Result<Self> {
        let signer = config.signer()?;
        Ok(Self {
            config,
            signer,
            orders,
            storefront,
        })
    }

    /// Handles one response payload.
    ///
    /// Protocol failures (wrong payment method, bad signature, bad reference, unknown order)
    /// come back as an [`Outcome`]; only store and storefront failures are errors.
    pub async fn handle_response(&self, payload: &FieldSet) -> Result<Outcome> {
        if payload.get(REQ_PAYMENT_METHOD) != Some(CARD_PAYMENT_METHOD) {
            debug!("Ignoring response for a non-card payment method");
            return Ok(Outcome::new(OutcomeKind::InvalidPayloadKind));
        }

        let reference = payload.get(REQ_REFERENCE_NUMBER).unwrap_or_default();
        if let Err(e) = self.signer.verify_covering(payload, &TRUSTED_FIELDS) {
            warn!(
                reference,
                error = %e,
                "Signature verification failed, check the gateway settings"
            );
            return self.reject(OutcomeKind::SignatureInvalid).await;
        }

        let order_id = match parse_reference(reference) {
            Ok(order_id) => order_id,
            Err(e) => {
                error!(error = %e, "Cannot resolve order from response");
                return self.reject(OutcomeKind::Malformed).await;
            }
        };

        let decision = Decision::parse(payload.get(DECISION).unwrap_or_default());
        let reason_code = payload.get(REASON_CODE).unwrap_or_default().trim();
        // An unsigned message is display text from an unknown source, so it is dropped.
        let message = payload
            .get(MESSAGE)
            .filter(|_| payload.is_signed(MESSAGE))
            .map(str::trim)
            .filter(|m| !m.is_empty());

        for _ in 0..MAX_TRANSITION_ATTEMPTS {
            let Some(order) = self.orders.get(order_id).await? else {
                warn!(order_id, "Response references an unknown order");
                let mut outcome = self.reject(OutcomeKind::OrderNotFound).await?;
                outcome.order_id = Some(order_id);
                return Ok(outcome);
            };

            if let Some(outcome) = self
                .apply(&order, &decision, reason_code, message)
                .await?
            {
                return Ok(outcome);
            }
            debug!(order_id, "Order changed status concurrently, re-reading");
        }

        Err(GatewayError::ConcurrentModification(order_id))
    }

    /// Applies `decision` to `order` as read. Returns `None` when the order changed underneath.
    async fn apply(
        &self,
        order: &Order,
        decision: &Decision,
        reason_code: &str,
        message: Option<&str>,
    ) -> Result<Option<Outcome>> {
        let mut outcome = Outcome::new(OutcomeKind::Success);
        outcome.order_id = Some(order.id);
        outcome.decision = Some(decision.clone());
        outcome.redirect = Some(Redirect::found(self.storefront.return_url(order).await?));

        if order.status.is_paid() {
            info!(order_id = order.id, "Possible duplicate, order has already been processed");
            self.orders
                .add_note(order.id, DUPLICATE_NOTE.to_string())
                .await?;
            outcome.kind = OutcomeKind::Duplicate;
            outcome.note = Some(DUPLICATE_NOTE.to_string());
            return Ok(Some(outcome));
        }

        let action = action_for(
            decision,
            reason_code,
            message,
            self.config.paid_status(order),
        );
        outcome.needs_investigation = action.needs_investigation;
        outcome.note = Some(action.note.clone());

        if order.status == action.target {
            // Repeated delivery of the same verdict only grows the audit trail.
            info!(
                order_id = order.id,
                decision = %decision,
                reason_code,
                status = %order.status,
                "Order already in target status, appending note"
            );
            self.orders.add_note(order.id, action.note).await?;
            return Ok(Some(outcome));
        }

        let transition = self
            .orders
            .compare_and_transition(order.id, order.status, action.target, action.note)
            .await?;
        if let Transition::Conflict(found) = transition {
            debug!(
                order_id = order.id,
                expected = %order.status,
                found = %found,
                "Transition lost a race"
            );
            return Ok(None);
        }

        if action.needs_investigation {
            warn!(
                order_id = order.id,
                decision = %decision,
                reason_code,
                "Unknown decision, order placed on hold for investigation"
            );
        } else {
            info!(
                order_id = order.id,
                decision = %decision,
                reason_code,
                from = %order.status,
                to = %action.target,
                "Order status updated"
            );
        }
        outcome.transition = Some(StatusChange {
            from: order.status,
            to: action.target,
        });

        if *decision == Decision::Accept {
            // The payment is already recorded; a failed clear must not lose the redirect.
            match self.storefront.clear_cart(order).await {
                Ok(()) => outcome.cart_cleared = true,
                Err(e) => error!(order_id = order.id, error = %e, "Failed to clear cart"),
            }
        }

        Ok(Some(outcome))
    }

    async fn reject(&self, kind: OutcomeKind) -> Result<Outcome> {
        let mut outcome = Outcome::new(kind);
        outcome.redirect = Some(Redirect::found(self.storefront.fallback_url().await?));
        Ok(outcome)
    }

    /// Consumes the processor and returns the final state of all orders.
    pub async fn into_orders(self) -> Result<Vec<Order>> {
        self.orders.get_all().await
    }
}
