//! Static crop templates used whenever the AI advisor is absent or unusable.

use crate::models::{
    CropInputs, CropRecommendation, DayRange, FarmContext, Level, Rupees, Season,
};

pub(crate) struct CropTemplate {
    pub season: Season,
    pub name: &'static str,
    pub profitability: Level,
    pub earnings_per_acre: u32,
    pub suitability: u8,
    pub growth_period: DayRange,
    pub water: Level,
    pub seed_rate: &'static str,
    pub fertilizers: &'static [&'static str],
    pub pesticides: &'static [&'static str],
    pub market_demand: Level,
    pub tips: &'static [&'static str],
    pub preferred_soils: &'static [&'static str],
    /// Comfortable current temperature in °C, inclusive
    pub comfort_range: (f64, f64),
}

pub(crate) static CROP_TEMPLATES: [CropTemplate; 3] = [
    CropTemplate {
        season: Season::Kharif,
        name: "Rice",
        profitability: Level::High,
        earnings_per_acre: 45_000,
        suitability: 85,
        growth_period: DayRange::new(120, 140),
        water: Level::High,
        seed_rate: "20-25 kg per acre",
        fertilizers: &["NPK 10:26:26", "Urea", "DAP"],
        pesticides: &["Carbendazim", "Chlorpyrifos"],
        market_demand: Level::High,
        tips: &[
            "Ensure proper water management during flowering stage",
            "Apply phosphorus during land preparation",
            "Monitor for brown plant hopper",
        ],
        preferred_soils: &["alluvial", "clay", "laterite"],
        comfort_range: (20.0, 37.0),
    },
    CropTemplate {
        season: Season::Rabi,
        name: "Wheat",
        profitability: Level::High,
        earnings_per_acre: 40_000,
        suitability: 90,
        growth_period: DayRange::new(120, 150),
        water: Level::Medium,
        seed_rate: "100-125 kg per acre",
        fertilizers: &["NPK 12:32:16", "Urea", "Zinc"],
        pesticides: &["Mancozeb", "Propiconazole"],
        market_demand: Level::High,
        tips: &[
            "Sow by end of November for best results",
            "Maintain proper seed depth (3-5 cm)",
            "Apply nitrogen in 3 split doses",
        ],
        preferred_soils: &["alluvial", "loam", "black"],
        comfort_range: (10.0, 27.0),
    },
    CropTemplate {
        season: Season::Zaid,
        name: "Summer Vegetables",
        profitability: Level::Medium,
        earnings_per_acre: 35_000,
        suitability: 80,
        growth_period: DayRange::new(60, 90),
        water: Level::High,
        seed_rate: "2-3 kg per acre",
        fertilizers: &["NPK 19:19:19", "Micronutrients"],
        pesticides: &["Neem oil", "Bacillus thuringiensis"],
        market_demand: Level::Medium,
        tips: &[
            "Provide adequate shade during peak summer",
            "Ensure consistent water supply",
            "Use mulching to conserve moisture",
        ],
        preferred_soils: &["alluvial", "loam", "red", "sandy"],
        comfort_range: (20.0, 40.0),
    },
];

struct RegionalCandidates {
    min_latitude: f64,
    kharif: &'static [&'static str],
    rabi: &'static [&'static str],
}

// Checked top to bottom; the last band catches everything south of 20°N.
static REGIONAL_CANDIDATES: [RegionalCandidates; 3] = [
    RegionalCandidates {
        min_latitude: 28.0,
        kharif: &["Rice", "Sugarcane", "Cotton"],
        rabi: &["Wheat", "Barley", "Mustard"],
    },
    RegionalCandidates {
        min_latitude: 20.0,
        kharif: &["Cotton", "Soybean", "Maize"],
        rabi: &["Wheat", "Gram", "Linseed"],
    },
    RegionalCandidates {
        min_latitude: f64::NEG_INFINITY,
        kharif: &["Rice", "Ragi", "Groundnut"],
        rabi: &["Rice", "Millets", "Pulses"],
    },
];

pub(crate) fn template_for(season: Season) -> Option<&'static CropTemplate> {
    CROP_TEMPLATES.iter().find(|t| t.season == season)
}

/// Crop names suited to a latitude band. Zaid has no regional list.
pub(crate) fn regional_names(season: Season, latitude: f64) -> Option<&'static [&'static str]> {
    let band = REGIONAL_CANDIDATES
        .iter()
        .find(|band| latitude >= band.min_latitude)?;

    match season {
        Season::Kharif => Some(band.kharif),
        Season::Rabi => Some(band.rabi),
        Season::Zaid => None,
    }
}

/// First number in text like "28°C" or "around 31 C". A minus sign counts
/// only when it starts a word and a digit follows it.
fn leading_temperature(text: &str) -> Option<f64> {
    let first_digit = text.find(|c: char| c.is_ascii_digit())?;
    let before = &text[..first_digit];
    let negative = before.ends_with('-')
        && before[..before.len() - 1]
            .chars()
            .next_back()
            .map_or(true, char::is_whitespace);

    let number: String = text[first_digit..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let value: f64 = number.parse().ok()?;
    Some(if negative { -value } else { value })
}

fn known_temperature(context: &FarmContext) -> Option<f64> {
    context
        .weather
        .as_ref()
        .map(|w| w.temperature_current)
        .or_else(|| leading_temperature(&context.temperature_text))
}

/// Template suitability adjusted for regional rank, soil and current temperature.
pub(crate) fn score(template: &CropTemplate, rank: usize, context: &FarmContext) -> u8 {
    let mut score = i32::from(template.suitability) - 5 * rank as i32;

    let soil = context.soil_type.to_lowercase();
    if !soil.is_empty() && template.preferred_soils.iter().any(|s| soil.contains(s)) {
        score += 5;
    }

    if let Some(temp) = known_temperature(context) {
        let (low, high) = template.comfort_range;
        if temp < low || temp > high {
            score -= 5;
        }
    }

    score.clamp(0, 100) as u8
}

pub(crate) fn instantiate(
    template: &CropTemplate,
    name: &str,
    suitability_score: u8,
) -> CropRecommendation {
    CropRecommendation {
        name: name.to_string(),
        profitability_tier: template.profitability,
        earnings_per_acre: Rupees(template.earnings_per_acre),
        suitability_score,
        growth_period_days: template.growth_period,
        water_requirement: template.water,
        inputs: CropInputs {
            seed_rate: template.seed_rate.to_string(),
            fertilizers: template.fertilizers.iter().map(|s| s.to_string()).collect(),
            pesticides: template.pesticides.iter().map(|s| s.to_string()).collect(),
        },
        market_demand: template.market_demand,
        tips: template.tips.iter().map(|s| s.to_string()).collect(),
    }
}
