// Hashing benchmarks for the donation protocol.
//
// Covers raw SHA-512 hex digests, request signing (normalize + canonical
// string + digest), callback verification, and txnid generation.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use donation_protocol::callback::{expected_callback_hash, verify_callback, GatewayCallback};
use donation_protocol::credentials::MerchantCredentials;
use donation_protocol::crypto::sha512_hex;
use donation_protocol::transaction::{
    sign_request, TransactionId, TransactionRequest, TxnIdGenerator,
};

fn creds() -> MerchantCredentials {
    MerchantCredentials::new("qyHOaB", "0x99YlO1SoZtMA98MzO9ebBrKEssz4z0").unwrap()
}

fn bench_sha512(c: &mut Criterion) {
    let mut group = c.benchmark_group("sha512/hex");

    for size in [64, 256, 1024] {
        let data = vec![b'x'; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| sha512_hex(data));
        });
    }

    group.finish();
}

fn bench_sign_request(c: &mut Criterion) {
    let creds = creds();
    let txnid = TransactionId::new("TXN1700000000000").unwrap();
    let request = TransactionRequest {
        amount: Some("10.00".into()),
        first_name: Some("Test".into()),
        email: Some("test@example.com".into()),
        ..Default::default()
    };

    c.bench_function("protocol/sign_request", |b| {
        b.iter(|| sign_request(&request, &txnid, &creds).unwrap());
    });
}

fn bench_verify_callback(c: &mut Criterion) {
    let creds = creds();
    let mut callback = GatewayCallback {
        txnid: Some("TXN1700000000000".into()),
        amount: Some("10.00".into()),
        productinfo: Some("Donation".into()),
        firstname: Some("Test".into()),
        email: Some("test@example.com".into()),
        status: Some("success".into()),
        ..Default::default()
    };
    callback.hash = Some(expected_callback_hash(&callback, &creds));

    c.bench_function("protocol/verify_callback", |b| {
        b.iter(|| verify_callback(&callback, &creds).unwrap());
    });
}

fn bench_txnid_generation(c: &mut Criterion) {
    let gen = TxnIdGenerator::new();

    c.bench_function("protocol/txnid_generate", |b| {
        b.iter(|| gen.generate());
    });
}

criterion_group!(
    benches,
    bench_sha512,
    bench_sign_request,
    bench_verify_callback,
    bench_txnid_generation,
);
criterion_main!(benches);
