use std::fmt::Write as _;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const ROWS: usize = 2500;

/// (protocol, weight, services)
const PROTOCOLS: [(&str, u32, &[&str]); 3] = [
    ("tcp", 80, &["http", "smtp", "ftp_data", "private"]),
    ("udp", 12, &["domain_u", "private", "ntp_u"]),
    ("icmp", 8, &["ecr_i", "eco_i"]),
];

fn pick_protocol(rng: &mut StdRng) -> (&'static str, &'static [&'static str]) {
    let total: u32 = PROTOCOLS.iter().map(|(_, w, _)| w).sum();
    let mut roll = rng.gen_range(0..total);
    for (name, weight, services) in PROTOCOLS {
        if roll < weight {
            return (name, services);
        }
        roll -= weight;
    }
    (PROTOCOLS[0].0, PROTOCOLS[0].2)
}

fn main() {
    let mut rng = StdRng::seed_from_u64(42);

    let services: Vec<&str> = {
        let mut all: Vec<&str> = PROTOCOLS.iter().flat_map(|(_, _, s)| s.iter().copied()).collect();
        all.sort_unstable();
        all.dedup();
        all
    };

    let mut text = String::new();
    text.push_str("% Synthetic network connection records\n");
    text.push_str("@relation 'synthetic_traffic'\n\n");
    text.push_str("@attribute duration numeric\n");
    text.push_str("@attribute protocol_type {tcp,udp,icmp}\n");
    let _ = writeln!(text, "@attribute service {{{}}}", services.join(","));
    text.push_str("@attribute src_bytes numeric\n");
    text.push_str("@attribute dst_bytes numeric\n");
    text.push_str("@attribute class {normal,anomaly}\n\n@data\n");

    for _ in 0..ROWS {
        let (protocol, protocol_services) = pick_protocol(&mut rng);
        let service = protocol_services.choose(&mut rng).copied().unwrap_or("private");
        let duration = if protocol == "tcp" { rng.gen_range(0..300) } else { 0 };
        // about 2% of byte counts are unknown
        let src_bytes = if rng.gen_bool(0.02) {
            "?".to_string()
        } else {
            rng.gen_range(0..50_000).to_string()
        };
        let dst_bytes: u32 = rng.gen_range(0..20_000);
        let class = if rng.gen_bool(0.3) { "anomaly" } else { "normal" };
        let _ = writeln!(
            text,
            "{duration},{protocol},{service},{src_bytes},{dst_bytes},{class}"
        );
    }

    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_data.arff".to_string());
    if let Err(e) = std::fs::write(&output_path, text) {
        eprintln!("Failed to write {output_path}: {e}");
        std::process::exit(1);
    }

    println!("Wrote {ROWS} records to {output_path}");
}
