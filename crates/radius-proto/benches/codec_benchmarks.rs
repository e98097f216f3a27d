//! Benchmarks for the Status-Server wire layer
//!
//! Run with: cargo bench -p radius-proto --bench codec_benchmarks

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use radius_proto::freeradius::{self, StatisticsType, attr};
use radius_proto::message_auth::sign_packet;
use radius_proto::{Attribute, Code, Packet, vendor};
use std::hint::black_box;

/// Access-Accept carrying `count` statistics, one Vendor-Specific each
fn create_response(count: u8) -> Packet {
    let mut packet = Packet::new(Code::AccessAccept, 1, [0u8; 16]);
    for i in 0..count {
        let tlv = vendor::encode(attr::TOTAL_ACCESS_REQUESTS + i, &u32::from(i).to_be_bytes())
            .expect("Failed to encode sub-attribute");
        packet.add_attribute(
            Attribute::vendor_specific(freeradius::VENDOR_ID, &tlv)
                .expect("Failed to create Vendor-Specific attribute"),
        );
    }
    packet
}

fn bench_vendor_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("vendor_lookup");

    for count in [1u8, 16, 58] {
        let packet = create_response(count);
        let last = attr::TOTAL_ACCESS_REQUESTS + count - 1;
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| vendor::get_integer(black_box(&packet.attributes), freeradius::VENDOR_ID, last))
        });
    }

    group.finish();
}

fn bench_vendor_set(c: &mut Criterion) {
    c.bench_function("vendor_set_replace", |b| {
        let mut attributes = create_response(16).attributes;
        b.iter(|| {
            vendor::set(
                &mut attributes,
                freeradius::VENDOR_ID,
                attr::STATISTICS_TYPE,
                black_box(&StatisticsType::ALL.bits().to_be_bytes()),
            )
            .expect("Failed to set sub-attribute")
        });
    });
}

fn bench_sign_status_request(c: &mut Criterion) {
    let mut group = c.benchmark_group("sign_status_request");
    group.throughput(Throughput::Elements(1));

    group.bench_function("home_server", |b| {
        b.iter(|| {
            let mut packet = Packet::new(Code::StatusServer, 1, [7u8; 16]);
            let attrs = &mut packet.attributes;
            vendor::set(attrs, freeradius::VENDOR_ID, attr::STATISTICS_TYPE, &147u32.to_be_bytes())
                .expect("Failed to set statistics type");
            vendor::set(attrs, freeradius::VENDOR_ID, attr::STATS_SERVER_IP_ADDRESS, &[127, 0, 0, 1])
                .expect("Failed to set server address");
            vendor::set(attrs, freeradius::VENDOR_ID, attr::STATS_SERVER_PORT, &1812u32.to_be_bytes())
                .expect("Failed to set server port");
            sign_packet(&mut packet, black_box(b"adminsecret")).expect("Failed to sign packet")
        });
    });

    group.finish();
}

fn bench_response_decode(c: &mut Criterion) {
    let encoded = create_response(58).encode().expect("Failed to encode");
    c.bench_function("response_decode_58_stats", |b| {
        b.iter(|| Packet::decode(black_box(&encoded)).expect("Failed to decode packet"))
    });
}

criterion_group!(
    benches,
    bench_vendor_lookup,
    bench_vendor_set,
    bench_sign_status_request,
    bench_response_decode
);
criterion_main!(benches);
