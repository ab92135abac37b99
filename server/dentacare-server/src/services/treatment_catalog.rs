//! Treatments offered by the clinic, with list prices

use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Treatment {
    pub name: &'static str,
    pub default_price: f64,
}

pub const TREATMENTS: &[Treatment] = &[
    Treatment { name: "Consultation", default_price: 300.0 },
    Treatment { name: "Scaling & Polishing", default_price: 1200.0 },
    Treatment { name: "Tooth Filling", default_price: 1000.0 },
    Treatment { name: "Root Canal Treatment", default_price: 5000.0 },
    Treatment { name: "Tooth Extraction", default_price: 800.0 },
    Treatment { name: "Wisdom Tooth Extraction", default_price: 3500.0 },
    Treatment { name: "Dental Crown", default_price: 6000.0 },
    Treatment { name: "Dental Bridge", default_price: 15000.0 },
    Treatment { name: "Dental Implant", default_price: 30000.0 },
    Treatment { name: "Teeth Whitening", default_price: 7000.0 },
    Treatment { name: "Braces", default_price: 40000.0 },
    Treatment { name: "Clear Aligners", default_price: 90000.0 },
    Treatment { name: "Dentures", default_price: 20000.0 },
    Treatment { name: "Fluoride Treatment", default_price: 600.0 },
    Treatment { name: "Dental X-Ray", default_price: 250.0 },
];

pub fn find(name: &str) -> Option<&'static Treatment> {
    let name = name.trim();
    TREATMENTS.iter().find(|t| t.name.eq_ignore_ascii_case(name))
}

/// Sum of list prices for the treatments named in a reason; unknown names count as zero
pub fn estimate(treatments: &[String]) -> f64 {
    treatments.iter().filter_map(|t| find(t)).map(|t| t.default_price).sum()
}
