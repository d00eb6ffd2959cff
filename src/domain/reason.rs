//! Human-readable explanations for processor reason codes. Used only to annotate order notes.

/// Looks up the explanation for a numeric reason code.
pub fn reason_text(code: u16) -> Option<&'static str> {
    let text = match code {
        100 => "Card transaction was processed successfully.",
        102 => {
            "One or more fields in the request contain invalid data. Possible action: see the \
             reply field invalid_fields for which fields are invalid and resend the request \
             with the correct information."
        }
        104 => {
            "The access_key and transaction_uuid of this request match another authorization \
             request sent within the past 15 minutes. Possible action: resend the request with \
             a unique access_key and transaction_uuid."
        }
        110 => "Only a partial amount was approved.",
        150 => {
            "Error - general system failure. Possible action: see the processor documentation \
             on how to handle retries for system errors."
        }
        200 => {
            "The authorization was approved by the issuing bank but declined because it did not \
             pass the Address Verification System (AVS) check. Possible action: you can capture \
             the authorization, but consider reviewing the order for fraud."
        }
        201 => {
            "The issuing bank has questions about the request. Possible action: call your \
             processor to possibly receive a verbal authorization."
        }
        202 => {
            "Expired card, or the expiration date does not match the issuing bank's records. \
             Possible action: request a different card or other form of payment."
        }
        203 => {
            "General decline of the card. No other information was provided by the issuing \
             bank. Possible action: request a different card or other form of payment."
        }
        204 => {
            "Insufficient funds in the account. Possible action: request a different card or \
             other form of payment."
        }
        205 => {
            "Stolen or lost card. Possible action: review this transaction manually to ensure \
             that the correct information was submitted."
        }
        207 => {
            "Issuing bank unavailable. Possible action: wait a few minutes and resend the request."
        }
        208 => {
            "Inactive card or card not authorized for card-not-present transactions. Possible \
             action: request a different card or other form of payment."
        }
        210 => {
            "The card has reached the credit limit. Possible action: request a different card or \
             other form of payment."
        }
        211 => "Invalid CVN. Possible action: request a different card or other form of payment.",
        221 => "The customer matched an entry on the processor's negative file.",
        222 => "Account frozen or closed.",
        230 => {
            "The authorization was approved by the issuing bank but declined because it did not \
             pass the Card Verification Number (CVN) check. Possible action: you can capture the \
             authorization, but consider reviewing the order for fraud."
        }
        231 => {
            "Invalid account number. Possible action: request a different card or other form of \
             payment."
        }
        232 => {
            "The card type is not accepted by the payment processor. Possible action: contact \
             your acquirer to confirm the account is set up to receive this card type."
        }
        233 => {
            "General decline by processor. Possible action: request a different card or other \
             form of payment."
        }
        234 => {
            "There is a problem with the merchant account information. Possible action: do not \
             resend the request; contact your acquirer to correct the account."
        }
        236 => "Processor failure. Possible action: wait a few minutes and resend the request.",
        240 => {
            "The card type is invalid or does not correlate with the card number. Possible \
             action: confirm the card type matches the card number, then resend the request."
        }
        475 => {
            "The cardholder is enrolled for payer authentication. Possible action: authenticate \
             the cardholder before proceeding."
        }
        476 => "Payer authentication could not be authenticated.",
        481 => "The order has been rejected by Decision Manager.",
        520 => {
            "The authorization was approved by the issuing bank but declined based on legacy \
             Smart Authorization settings. Possible action: review the authorization request."
        }
        _ => return None,
    };
    Some(text)
}

/// Describes a raw `reason_code` field value, falling back to the code itself.
pub fn describe(raw: &str) -> String {
    raw.trim()
        .parse::<u16>()
        .ok()
        .and_then(reason_text)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Reason code {}", raw.trim()))
}
