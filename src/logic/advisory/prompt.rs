use crate::config::AdvisorMode;
use crate::models::FarmContext;
use std::fmt::Write;

const SYSTEM_PROMPT: &str = "You are an expert agricultural advisor with deep knowledge of Indian \
farming practices, crop suitability, and market conditions. Provide accurate, location-specific \
crop recommendations based on scientific agricultural principles.";

const STRUCTURED_FORMAT: &str = r#"Please respond with a JSON array of 2-3 crop recommendations in this exact format:
[
  {
    "name": "Crop Name",
    "profitability": "high/medium/low",
    "estimatedEarnings": {
      "perAcre": 45000,
      "total": 45000
    },
    "suitability": 92,
    "growthPeriod": "120-140 days",
    "waterRequirement": "high/medium/low",
    "inputs": {
      "seeds": "20-25 kg per acre",
      "fertilizers": ["NPK 10:26:26", "Urea", "DAP"],
      "pesticides": ["Carbendazim", "Chlorpyrifos"]
    },
    "marketDemand": "high/medium/low",
    "tips": [
      "Specific cultivation tip 1",
      "Specific cultivation tip 2",
      "Specific cultivation tip 3"
    ]
  }
]

Consider the season, soil type, climate, and location to provide region-specific recommendations with accurate market prices in INR. Focus on crops that are well-suited to the given conditions and have good market demand. Make sure earnings are realistic based on current Indian agricultural market prices.

Respond ONLY with the JSON array, no additional text."#;

const NARRATIVE_FORMAT: &str = "Suggest two or three crops for these conditions in plain \
language a farmer can act on. Mention expected earnings per acre in INR, water needs and the \
most important cultivation practices. Do not use JSON or tables.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisorPrompt {
    pub system: String,
    pub user: String,
}

/// Renders every populated context field into the advisor's user message.
pub fn build_prompt(context: &FarmContext, mode: AdvisorMode) -> AdvisorPrompt {
    let mut user = String::from(
        "Based on the following farming conditions, recommend the most profitable and suitable \
         crops to cultivate.",
    );
    if mode == AdvisorMode::Structured {
        user.push_str(" Provide detailed information in the exact JSON format specified.");
    }

    // Writing to a String cannot fail
    let _ = writeln!(user, "\n\nFarming Conditions:");
    let _ = writeln!(user, "- Location: {}", context.location);
    let _ = writeln!(user, "- Season: {}", context.season);
    let _ = writeln!(user, "- Soil Type: {}", context.soil_type);
    let _ = writeln!(user, "- Climate: {}", context.climate_type);
    let _ = writeln!(user, "- Temperature: {}", context.temperature_text);
    let _ = writeln!(user, "- Additional Info: {}", context.additional_notes);

    if let Some(coords) = context.coordinates {
        let _ = writeln!(
            user,
            "- GPS Coordinates: {}, {}",
            coords.latitude, coords.longitude
        );
    }

    if let Some(resolved) = &context.resolved_location {
        if let Some(district) = &resolved.district {
            let _ = writeln!(user, "- District: {}", district);
        }
    }

    if let Some(weather) = &context.weather {
        let _ = writeln!(
            user,
            "- Current Weather: {}, {:.0}°C (range {:.0}-{:.0}°C), humidity {:.0}%",
            weather.conditions,
            weather.temperature_current,
            weather.temperature_min,
            weather.temperature_max,
            weather.humidity
        );
        let _ = writeln!(
            user,
            "- Expected Rainfall (next 5 days): {:.1} mm",
            weather.rainfall_next_5_days_mm
        );
    }

    user.push('\n');
    user.push_str(match mode {
        AdvisorMode::Structured => STRUCTURED_FORMAT,
        AdvisorMode::Narrative => NARRATIVE_FORMAT,
    });

    AdvisorPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
    }
}
