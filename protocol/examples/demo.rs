//! Terminal walkthrough of one donation's trip through the hash protocol.
//!
//! Signs a request, plays the gateway's part by posting back a signed
//! callback, verifies it, then shows what a tampered callback looks like.
//! Uses throwaway demo credentials; nothing leaves the process.
//!
//! Run with:
//!   cargo run --example demo

use std::time::Instant;

use donation_protocol::callback::{
    expected_callback_hash, verify_callback, GatewayCallback, OutcomeResolver,
};
use donation_protocol::config::{GatewayEndpoints, TEST_PAYMENT_URL};
use donation_protocol::credentials::MerchantCredentials;
use donation_protocol::transaction::{build_payload, TransactionRequest, TxnIdGenerator};

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn section(num: u32, title: &str) {
    println!();
    println!("{BOLD}{CYAN}===[{YELLOW} Step {num} {CYAN}]========================================{RESET}");
    println!("{BOLD}{WHITE}  {title}{RESET}");
}

fn info(label: &str, value: &str) {
    println!("{WHITE}  {BOLD}{label}:{RESET} {YELLOW}{value}{RESET}");
}

fn success(text: &str) {
    println!("{GREEN}  [OK] {text}{RESET}");
}

fn rejected(text: &str) {
    println!("{RED}  [REJECTED] {text}{RESET}");
}

fn timing(label: &str, elapsed: std::time::Duration) {
    let us = elapsed.as_secs_f64() * 1_000_000.0;
    println!("{DIM}{MAGENTA}  [{label}: {us:.1} us]{RESET}");
}

fn short(hash: &str) -> String {
    format!("{}...{}", &hash[..12], &hash[hash.len() - 12..])
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    let creds = MerchantCredentials::new("demo-key", "demo-salt-not-for-production")
        .expect("demo credentials");
    let endpoints = GatewayEndpoints {
        payment_url: TEST_PAYMENT_URL.to_string(),
        ..GatewayEndpoints::default()
    };
    let resolver = OutcomeResolver::from_endpoints(&endpoints);

    section(1, "Sign the donation request");
    let request = TransactionRequest {
        amount: Some("500.00".into()),
        name: Some("Asha".into()),
        email: Some("asha@example.com".into()),
        purpose: Some("School library".into()),
        ..Default::default()
    };
    let txnid = TxnIdGenerator::new().generate();

    let t = Instant::now();
    let payload = build_payload(&request, &txnid, &creds, &endpoints).expect("valid request");
    timing("sign", t.elapsed());

    info("txnid", &payload.txnid);
    info("productinfo", &payload.productinfo);
    info("hash", &short(&payload.hash));
    info("post to", &endpoints.payment_url);

    section(2, "Gateway posts back a signed callback");
    let mut callback = GatewayCallback {
        txnid: Some(payload.txnid.clone()),
        amount: Some(payload.amount.clone()),
        productinfo: Some(payload.productinfo.clone()),
        firstname: Some(payload.firstname.clone()),
        email: Some(payload.email.clone()),
        status: Some("success".into()),
        key: Some(payload.key.clone()),
        ..Default::default()
    };
    callback.hash = Some(expected_callback_hash(&callback, &creds));

    let t = Instant::now();
    let result = verify_callback(&callback, &creds).expect("well-formed callback");
    timing("verify", t.elapsed());

    let outcome = resolver.resolve(callback.status(), result.is_valid);
    success(&format!(
        "hash valid, disposition {} -> {}",
        outcome.disposition,
        outcome.redirect.as_deref().unwrap_or("-")
    ));

    section(3, "Someone edits the amount in transit");
    callback.amount = Some("5.00".into());
    let result = verify_callback(&callback, &creds).expect("well-formed callback");
    let outcome = resolver.resolve(callback.status(), result.is_valid);
    rejected(&format!(
        "hash valid = {}, disposition {} ({})",
        result.is_valid, outcome.disposition, outcome.message
    ));

    section(4, "A request with no email never gets signed");
    let incomplete = TransactionRequest {
        email: None,
        ..request
    };
    match build_payload(&incomplete, &txnid, &creds, &endpoints) {
        Ok(_) => unreachable!("email is required"),
        Err(e) => rejected(&e.to_string()),
    }
    println!();
}
