mod common;

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use rust_decimal_macros::dec;
use secure_acceptance::domain::order::Order;
use std::path::Path;
use std::process::Command;

fn respond_cmd(dir: &Path, db_path: &Path) -> Command {
    let config = dir.join("gateway.json");
    common::write_config(&config).unwrap();
    let orders = dir.join("orders.csv");
    common::write_orders_csv(&orders, &[Order::new(1, "wc_order_one", dec!(100.00))]).unwrap();
    let payload = dir.join("payload.csv");
    common::write_fields_csv(&payload, &common::signed_payload("REVIEW", "1_1", "480")).unwrap();

    let mut cmd = Command::new(cargo_bin!("secure-acceptance"));
    cmd.arg("--config")
        .arg(config)
        .arg("respond")
        .arg("--orders")
        .arg(orders)
        .arg("--db-path")
        .arg(db_path)
        .arg(payload);
    cmd
}

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let dir = tempfile::tempdir().unwrap();

    respond_cmd(dir.path(), &dir.path().join("some_db"))
        .assert()
        .success()
        .stdout(predicate::str::contains("1,on-hold,100.00,"))
        .stderr(predicate::str::contains("Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let dir = tempfile::tempdir().unwrap();

    respond_cmd(dir.path(), &dir.path().join("test_db"))
        .assert()
        .success()
        .stdout(predicate::str::contains("1,on-hold,100.00,"))
        .stderr(predicate::str::contains("Persistent storage requested").not());
}
