//! Sample Transaction Generator
//!
//! Writes a CSV of random transactions for trying out batch scoring.
//!
//! Usage: sample-generator [count] [fraud_rate] [output]

use anyhow::Context;
use fraud_sentinel::types::transaction::{DEVICE_TYPES, MERCHANT_CATEGORIES};
use rand::Rng;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use tracing::info;

/// CSV row in the layout batch scoring expects
#[derive(Debug, Clone, Serialize)]
struct SampleTransaction {
    transaction_id: String,
    amount: f64,
    transaction_time: u8,
    merchant_category: String,
    device_type: String,
}

/// Transaction generator for sample data
struct TransactionGenerator {
    rng: rand::rngs::ThreadRng,
    transaction_counter: u64,
}

impl TransactionGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
            transaction_counter: 0,
        }
    }

    /// Generate a random everyday transaction
    fn generate_legitimate(&mut self) -> SampleTransaction {
        self.transaction_counter += 1;

        SampleTransaction {
            transaction_id: format!("tx_{:08}", self.transaction_counter),
            amount: round_cents(self.rng.gen_range(5.0..600.0)),
            transaction_time: self.rng.gen_range(7..=21),
            merchant_category: self
                .random_choice(&["Retail", "Food", "Grocery"])
                .to_string(),
            device_type: self.random_choice(&["Mobile", "Web"]).to_string(),
        }
    }

    /// Generate a suspicious transaction: large, late, risky merchant or POS
    fn generate_suspicious(&mut self) -> SampleTransaction {
        self.transaction_counter += 1;

        let late_hours = [0, 1, 2, 3, 4, 5, 23];
        let hour = late_hours[self.rng.gen_range(0..late_hours.len())];

        SampleTransaction {
            transaction_id: format!("tx_{:08}", self.transaction_counter),
            // Strictly above the 1000 rule threshold after rounding
            amount: round_cents(self.rng.gen_range(1000.01..5000.0)),
            transaction_time: hour,
            merchant_category: self.random_choice(&["Electronics", "Luxury"]).to_string(),
            device_type: self.random_choice(&DEVICE_TYPES).to_string(),
        }
    }

    /// Generate a transaction with no bias toward either class
    fn generate_mixed(&mut self) -> SampleTransaction {
        self.transaction_counter += 1;

        SampleTransaction {
            transaction_id: format!("tx_{:08}", self.transaction_counter),
            amount: round_cents(self.rng.gen_range(0.0..5000.0)),
            transaction_time: self.rng.gen_range(0..24),
            merchant_category: self.random_choice(&MERCHANT_CATEGORIES).to_string(),
            device_type: self.random_choice(&DEVICE_TYPES).to_string(),
        }
    }

    fn random_choice<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices[self.rng.gen_range(0..choices.len())]
    }
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sample_generator=info".parse()?),
        )
        .with_writer(io::stderr)
        .init();

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let count: u64 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(100);
    let fraud_rate: f64 = args
        .get(2)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|rate| rate.is_finite())
        .unwrap_or(0.1)
        .clamp(0.0, 1.0);
    let output = args.get(3).cloned();

    info!(
        count = count,
        fraud_rate = fraud_rate,
        output = output.as_deref().unwrap_or("stdout"),
        "Configuration loaded"
    );

    let writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Failed to create {}", path))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut generator = TransactionGenerator::new();
    let mut rng = rand::thread_rng();

    let mut legitimate_count = 0;
    let mut suspicious_count = 0;
    let mut mixed_count = 0;

    for _ in 0..count {
        let transaction = if rng.gen_bool(fraud_rate) {
            suspicious_count += 1;
            generator.generate_suspicious()
        } else if rng.gen_bool(0.1) {
            mixed_count += 1;
            generator.generate_mixed()
        } else {
            legitimate_count += 1;
            generator.generate_legitimate()
        };

        csv_writer.serialize(&transaction)?;
    }

    csv_writer.flush()?;

    info!(
        "Completed! Wrote {} transactions ({} legitimate, {} suspicious, {} mixed)",
        count, legitimate_count, suspicious_count, mixed_count
    );

    Ok(())
}
