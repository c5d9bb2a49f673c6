//! Strict parsing of the advisor's JSON reply.
//!
//! One bad entry rejects the whole reply; the engine then answers from the
//! rule table instead of showing a partial list.

use crate::error::{KrishiError, Result};
use crate::models::{CropInputs, CropRecommendation, DayRange, Level, Rupees};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRecommendation {
    name: String,
    profitability: String,
    estimated_earnings: WireEarnings,
    suitability: f64,
    growth_period: String,
    water_requirement: String,
    inputs: WireInputs,
    market_demand: String,
    tips: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEarnings {
    per_acre: f64,
    #[allow(dead_code)]
    total: f64,
}

#[derive(Debug, Deserialize)]
struct WireInputs {
    seeds: String,
    fertilizers: Vec<String>,
    pesticides: Vec<String>,
}

/// Drops a surrounding markdown code fence, with or without a language tag.
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn level(field: &str, crop: &str, value: &str) -> Result<Level> {
    Level::from_str(value).ok_or_else(|| {
        KrishiError::InvalidData(format!("{}: invalid {} '{}'", crop, field, value))
    })
}

fn convert(wire: WireRecommendation) -> Result<CropRecommendation> {
    let name = wire.name.trim().to_string();
    if name.is_empty() {
        return Err(KrishiError::InvalidData("Recommendation without a name".into()));
    }

    if !(0.0..=100.0).contains(&wire.suitability) {
        return Err(KrishiError::InvalidData(format!(
            "{}: suitability {} outside 0-100",
            name, wire.suitability
        )));
    }

    let per_acre = wire.estimated_earnings.per_acre;
    if !per_acre.is_finite() || per_acre < 0.0 || per_acre > u32::MAX as f64 {
        return Err(KrishiError::InvalidData(format!(
            "{}: invalid earnings {}",
            name, per_acre
        )));
    }

    let growth_period_days = DayRange::parse(&wire.growth_period)
        .map_err(|e| KrishiError::InvalidData(format!("{}: {}", name, e)))?;

    Ok(CropRecommendation {
        profitability_tier: level("profitability", &name, &wire.profitability)?,
        earnings_per_acre: Rupees(per_acre.round() as u32),
        suitability_score: wire.suitability.round() as u8,
        growth_period_days,
        water_requirement: level("waterRequirement", &name, &wire.water_requirement)?,
        inputs: CropInputs {
            seed_rate: wire.inputs.seeds,
            fertilizers: wire.inputs.fertilizers,
            pesticides: wire.inputs.pesticides,
        },
        market_demand: level("marketDemand", &name, &wire.market_demand)?,
        tips: wire.tips,
        name,
    })
}

/// Parses the advisor reply into recommendations, unsorted.
pub fn parse_recommendations(reply: &str) -> Result<Vec<CropRecommendation>> {
    let body = strip_code_fence(reply);
    let wire: Vec<WireRecommendation> = serde_json::from_str(body)
        .map_err(|e| KrishiError::InvalidData(format!("Advisor reply is not valid JSON: {}", e)))?;

    if wire.is_empty() {
        return Err(KrishiError::InvalidData("Advisor returned no recommendations".into()));
    }

    wire.into_iter().map(convert).collect()
}
