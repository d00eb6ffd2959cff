#![allow(dead_code)]

use secure_acceptance::application::processor::{
    CARD_PAYMENT_METHOD, DECISION, REASON_CODE, REQ_PAYMENT_METHOD, REQ_REFERENCE_NUMBER,
};
use secure_acceptance::config::GatewayConfig;
use secure_acceptance::domain::fields::{FieldSet, SIGNATURE, SIGNED_FIELD_NAMES};
use secure_acceptance::domain::order::Order;
use std::fs::File;
use std::io::{Error, Write};
use std::path::Path;

pub const SECRET: &str = "test-secret";

pub const CONFIG_JSON: &str = r#"{
    "mode": "test",
    "merchant_id": "merchant",
    "test": {"profile_id": "profile", "access_key": "access", "secret_key": "test-secret"},
    "live": {"profile_id": "live-profile", "access_key": "live-access", "secret_key": "live-secret"},
    "store_url": "https://shop.example"
}"#;

pub fn test_config() -> GatewayConfig {
    serde_json::from_str(CONFIG_JSON).expect("valid test configuration")
}

pub fn write_config(path: &Path) -> Result<(), Error> {
    std::fs::write(path, CONFIG_JSON)
}

/// A response payload for `reference`, signed with the test-mode key.
pub fn signed_payload(decision: &str, reference: &str, reason_code: &str) -> FieldSet {
    let mut payload: FieldSet = [
        ("req_amount", "25.00"),
        (REQ_PAYMENT_METHOD, CARD_PAYMENT_METHOD),
        (REQ_REFERENCE_NUMBER, reference),
        (DECISION, decision),
        (REASON_CODE, reason_code),
        ("req_card_number", "xxxxxxxxxxxx1111"),
        (
            SIGNED_FIELD_NAMES,
            "signed_field_names,req_amount,req_payment_method,req_reference_number,decision,reason_code",
        ),
    ]
    .into_iter()
    .collect();
    let signature = test_config()
        .signer()
        .and_then(|signer| signer.sign_declared(&payload))
        .expect("payload signs");
    payload.set(SIGNATURE, signature);
    payload
}

pub fn write_fields_csv(path: &Path, fields: &FieldSet) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["name", "value"])?;
    for (name, value) in fields.iter() {
        wtr.write_record([name, value])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_orders_csv(path: &Path, orders: &[Order]) -> Result<(), Error> {
    let mut file = File::create(path)?;
    writeln!(file, "id,order_key,status,total")?;
    for order in orders {
        writeln!(
            file,
            "{},{},{},{}",
            order.id, order.order_key, order.status, order.total
        )?;
    }
    Ok(())
}
