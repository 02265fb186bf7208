// crates/server/src/sim/generator.rs
//! Synthetic provider record generation.
//!
//! Each record is independently sampled. The confidence distribution is
//! fixed at 60% auto-approve / 30% manual-review / 10% reject so every demo
//! run lands in recognizable bands; the descriptive fields are cosmetic and
//! never influence classification.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{ProviderRecord, Recommendation, Severity};

const PROVIDER_NAMES: &[&str] = &[
    "Dr. Anil Sharma",
    "Dr. Priya Mehta",
    "Dr. Rahul Verma",
    "Dr. Neha Iyer",
    "Dr. Arjun Singh",
    "Dr. Kavita Rao",
    "Dr. Suresh Patel",
    "Dr. Pooja Nair",
    "Dr. Amit Kulkarni",
    "Dr. Ritu Malhotra",
    "Dr. Vijay Kumar",
    "Dr. Anjali Desai",
    "Dr. Raj Gupta",
    "Dr. Sneha Reddy",
    "Dr. Manish Jain",
    "Dr. Divya Pillai",
    "Dr. Karthik Menon",
    "Dr. Lakshmi Krishnan",
    "Dr. Rohan Das",
    "Dr. Deepika Shah",
];

const SPECIALTIES: &[&str] = &[
    "Cardiology",
    "Dermatology",
    "Orthopedics",
    "Pediatrics",
    "Neurology",
    "Gynecology",
    "General Medicine",
    "ENT",
    "Oncology",
    "Psychiatry",
    "Ophthalmology",
    "Gastroenterology",
    "Nephrology",
    "Pulmonology",
];

const CITIES: &[(&str, &str)] = &[
    ("Bengaluru", "Karnataka"),
    ("Mumbai", "Maharashtra"),
    ("Delhi", "Delhi"),
    ("Chennai", "Tamil Nadu"),
    ("Hyderabad", "Telangana"),
    ("Kolkata", "West Bengal"),
    ("Pune", "Maharashtra"),
    ("Ahmedabad", "Gujarat"),
    ("Jaipur", "Rajasthan"),
    ("Lucknow", "Uttar Pradesh"),
    ("Kochi", "Kerala"),
    ("Chandigarh", "Punjab"),
];

const STREETS: &[&str] = &["MG Road", "Main Street", "Ring Road", "Park Street"];

const VALIDATION_AGENTS: &[&str] = &[
    "NPI Validator",
    "Address Geocoding",
    "License Verification",
    "Specialty Match",
];

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Generate the full record set for a job: exactly `count` records with ids
/// `{job_id}-rec-0000` through `{job_id}-rec-{count-1:04}`.
///
/// Never fails; `count == 0` yields an empty set.
pub fn generate(job_id: &str, count: u32, rng: &mut impl Rng) -> Vec<ProviderRecord> {
    (0..count).map(|i| generate_one(job_id, i, rng)).collect()
}

fn generate_one(job_id: &str, index: u32, rng: &mut impl Rng) -> ProviderRecord {
    // 60% high confidence, 30% medium, 10% low.
    let band = rng.gen::<f64>();
    let (overall, recommendation, severity) = if band < 0.6 {
        (
            rng.gen_range(0.95..0.99),
            Recommendation::AutoApprove,
            Severity::Low,
        )
    } else if band < 0.9 {
        (
            rng.gen_range(0.85..0.94),
            Recommendation::ManualReview,
            Severity::Medium,
        )
    } else {
        (rng.gen_range(0.70..0.84), Recommendation::Reject, Severity::High)
    };

    // Pre-validation confidence is always lower, showing a 5-15 point
    // improvement from validation, floored at 0.50.
    let original_confidence = round2(overall - rng.gen_range(0.05..0.15)).max(0.50);

    let (city, state) = CITIES.choose(rng).copied().unwrap_or(CITIES[0]);
    let street = STREETS.choose(rng).copied().unwrap_or(STREETS[0]);
    let name = PROVIDER_NAMES.choose(rng).copied().unwrap_or(PROVIDER_NAMES[0]);
    let specialty = SPECIALTIES.choose(rng).copied().unwrap_or(SPECIALTIES[0]);

    ProviderRecord {
        id: format!("{job_id}-rec-{index:04}"),
        name: name.to_string(),
        npi: rng.gen_range(1_000_000_000u64..=9_999_999_999).to_string(),
        address: format!("{} {street}, {city}, {state}", rng.gen_range(1..=999)),
        phone: format!(
            "+91-{}{}",
            rng.gen_range(70_000..=99_999),
            rng.gen_range(10_000..=99_999)
        ),
        specialty: specialty.to_string(),
        license_status: if rng.gen::<f64>() > 0.05 {
            "Active".to_string()
        } else {
            "Pending".to_string()
        },
        original_confidence,
        overall_confidence: round2(overall),
        // Sub-scores are intentionally unclamped; a 0.99 overall can yield a
        // 1.02 npi score (cosmetic demo data, matching the original).
        npi_confidence: round2(overall + rng.gen_range(-0.05..0.05)),
        address_confidence: round2(overall + rng.gen_range(-0.08..0.03)),
        license_confidence: round2(overall + rng.gen_range(-0.03..0.05)),
        recommendation,
        severity,
        validated_at: chrono::Utc::now().to_rfc3339(),
        agents_involved: VALIDATION_AGENTS.iter().map(|a| a.to_string()).collect(),
    }
}
