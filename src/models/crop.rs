use crate::error::{KrishiError, Result};
use serde::{Deserialize, Serialize};

/// Three-step scale used for profitability, water requirement and market demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    High,
    Medium,
    Low,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::High => "high",
            Level::Medium => "medium",
            Level::Low => "low",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" => Some(Level::High),
            "medium" | "moderate" => Some(Level::Medium),
            "low" => Some(Level::Low),
            _ => None,
        }
    }

    /// Higher is better when used as a tie-breaker.
    pub fn rank(&self) -> u8 {
        match self {
            Level::High => 3,
            Level::Medium => 2,
            Level::Low => 1,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whole rupees. Displays with Indian digit grouping (lakh, crore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rupees(pub u32);

impl std::fmt::Display for Rupees {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digits = self.0.to_string();
        if digits.len() <= 3 {
            return write!(f, "₹{}", digits);
        }

        // Last three digits, then pairs
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 2);
        for (i, ch) in head.chars().enumerate() {
            if i > 0 && (head.len() - i) % 2 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        write!(f, "₹{},{}", grouped, tail)
    }
}

/// Days from sowing to harvest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRange {
    pub min: u16,
    pub max: u16,
}

impl DayRange {
    pub const fn new(min: u16, max: u16) -> Self {
        Self { min, max }
    }

    /// Parses "120-140 days", "120 - 140", "120–140 days" or a single "90 days".
    pub fn parse(s: &str) -> Result<Self> {
        let re = regex_lite::Regex::new(r"^\s*(\d+)\s*(?:(?:-|–|to)\s*(\d+))?\s*(?:days?)?\s*$")
            .map_err(|e| KrishiError::InvalidData(e.to_string()))?;
        let caps = re
            .captures(s)
            .ok_or_else(|| KrishiError::InvalidData(format!("unrecognized growth period '{}'", s)))?;

        let min: u16 = caps[1]
            .parse()
            .map_err(|_| KrishiError::InvalidData(format!("growth period '{}' out of range", s)))?;
        let max: u16 = match caps.get(2) {
            Some(m) => m.as_str().parse().map_err(|_| {
                KrishiError::InvalidData(format!("growth period '{}' out of range", s))
            })?,
            None => min,
        };

        if min == 0 || max < min {
            return Err(KrishiError::InvalidData(format!(
                "growth period '{}' is not a valid range",
                s
            )));
        }
        Ok(Self { min, max })
    }
}

impl std::fmt::Display for DayRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.min == self.max {
            write!(f, "{} days", self.min)
        } else {
            write!(f, "{}-{} days", self.min, self.max)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropInputs {
    pub seed_rate: String,
    pub fertilizers: Vec<String>,
    pub pesticides: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropRecommendation {
    pub name: String,
    pub profitability_tier: Level,
    pub earnings_per_acre: Rupees,
    /// Rank signal in 0..=100, not a probability.
    pub suitability_score: u8,
    pub growth_period_days: DayRange,
    pub water_requirement: Level,
    pub inputs: CropInputs,
    pub market_demand: Level,
    pub tips: Vec<String>,
}

/// Descending suitability, then profitability tier. The sort is stable, so
/// remaining ties keep insertion order.
pub fn sort_recommendations(recommendations: &mut [CropRecommendation]) {
    recommendations.sort_by(|a, b| {
        b.suitability_score
            .cmp(&a.suitability_score)
            .then_with(|| b.profitability_tier.rank().cmp(&a.profitability_tier.rank()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crop(name: &str, score: u8, tier: Level) -> CropRecommendation {
        CropRecommendation {
            name: name.to_string(),
            profitability_tier: tier,
            earnings_per_acre: Rupees(40000),
            suitability_score: score,
            growth_period_days: DayRange::new(90, 120),
            water_requirement: Level::Medium,
            inputs: CropInputs {
                seed_rate: "10 kg per acre".into(),
                fertilizers: vec![],
                pesticides: vec![],
            },
            market_demand: Level::High,
            tips: vec![],
        }
    }

    #[test]
    fn level_from_str_valid() {
        assert_eq!(Level::from_str("high"), Some(Level::High));
        assert_eq!(Level::from_str("Medium"), Some(Level::Medium));
        assert_eq!(Level::from_str(" LOW "), Some(Level::Low));
    }

    #[test]
    fn level_from_str_invalid() {
        assert_eq!(Level::from_str("high/medium/low"), None);
        assert_eq!(Level::from_str(""), None);
    }

    #[test]
    fn day_range_parse_valid() {
        assert_eq!(DayRange::parse("120-140 days").unwrap(), DayRange::new(120, 140));
        assert_eq!(DayRange::parse("60 - 90").unwrap(), DayRange::new(60, 90));
        assert_eq!(DayRange::parse("90 days").unwrap(), DayRange::new(90, 90));
        assert_eq!(DayRange::parse("100 to 110 days").unwrap(), DayRange::new(100, 110));
    }

    #[test]
    fn day_range_parse_invalid() {
        assert!(DayRange::parse("").is_err());
        assert!(DayRange::parse("about four months").is_err());
        assert!(DayRange::parse("140-120 days").is_err());
        assert!(DayRange::parse("0 days").is_err());
    }

    #[test]
    fn day_range_display() {
        assert_eq!(DayRange::new(120, 140).to_string(), "120-140 days");
        assert_eq!(DayRange::new(90, 90).to_string(), "90 days");
    }

    #[test]
    fn rupees_display_uses_lakh_grouping() {
        assert_eq!(Rupees(45000).to_string(), "₹45,000");
        assert_eq!(Rupees(1250000).to_string(), "₹12,50,000");
        assert_eq!(Rupees(125000).to_string(), "₹1,25,000");
        assert_eq!(Rupees(31250000).to_string(), "₹3,12,50,000");
        assert_eq!(Rupees(1000).to_string(), "₹1,000");
        assert_eq!(Rupees(900).to_string(), "₹900");
    }

    #[test]
    fn sort_by_score_then_tier_then_insertion() {
        let mut crops = vec![
            crop("Maize", 80, Level::Low),
            crop("Cotton", 90, Level::Medium),
            crop("Soybean", 80, Level::High),
            crop("Gram", 80, Level::Low),
        ];
        sort_recommendations(&mut crops);
        let names: Vec<&str> = crops.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Cotton", "Soybean", "Maize", "Gram"]);
    }

    #[test]
    fn recommendation_serializes_camel_case() {
        let json = serde_json::to_value(crop("Rice", 85, Level::High)).unwrap();
        assert_eq!(json["profitabilityTier"], "high");
        assert_eq!(json["suitabilityScore"], 85);
        assert_eq!(json["earningsPerAcre"], 40000);
        assert_eq!(json["growthPeriodDays"]["min"], 90);
        assert_eq!(json["inputs"]["seedRate"], "10 kg per acre");
    }
}
