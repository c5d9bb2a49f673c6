//! Soil and climate defaults for places the farmer left unspecified.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SoilType {
    Black,
    Alluvial,
    Red,
    Laterite,
    Desert,
    Mountain,
}

impl SoilType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoilType::Black => "black",
            SoilType::Alluvial => "alluvial",
            SoilType::Red => "red",
            SoilType::Laterite => "laterite",
            SoilType::Desert => "desert",
            SoilType::Mountain => "mountain",
        }
    }
}

impl std::fmt::Display for SoilType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClimateType {
    Coastal,
    Arid,
    Temperate,
    Subtropical,
    Tropical,
}

impl ClimateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClimateType::Coastal => "coastal",
            ClimateType::Arid => "arid",
            ClimateType::Temperate => "temperate",
            ClimateType::Subtropical => "subtropical",
            ClimateType::Tropical => "tropical",
        }
    }
}

impl std::fmt::Display for ClimateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

struct PlaceRule<T: 'static> {
    value: T,
    states: &'static [&'static str],
    cities: &'static [&'static str],
}

impl<T: Copy> PlaceRule<T> {
    fn matches(&self, city: &str, state: &str) -> bool {
        self.states.iter().any(|s| state.contains(&s.to_lowercase()))
            || self.cities.iter().any(|c| city.contains(&c.to_lowercase()))
    }
}

// Order matters: first match wins.
static SOIL_RULES: [PlaceRule<SoilType>; 6] = [
    PlaceRule {
        value: SoilType::Black,
        states: &["Maharashtra", "Gujarat"],
        cities: &["Pune", "Mumbai", "Nagpur", "Aurangabad"],
    },
    PlaceRule {
        value: SoilType::Alluvial,
        states: &["Punjab", "Haryana", "Uttar Pradesh", "Bihar"],
        cities: &["Chandigarh", "Delhi"],
    },
    PlaceRule {
        value: SoilType::Red,
        states: &["Tamil Nadu", "Karnataka", "Andhra Pradesh", "Telangana"],
        cities: &["Bangalore", "Chennai", "Hyderabad"],
    },
    PlaceRule {
        value: SoilType::Laterite,
        states: &["Kerala", "Goa"],
        cities: &["Kochi", "Panaji"],
    },
    PlaceRule {
        value: SoilType::Desert,
        states: &["Rajasthan"],
        cities: &["Jaipur", "Jodhpur"],
    },
    PlaceRule {
        value: SoilType::Mountain,
        states: &["Himachal", "Uttarakhand"],
        cities: &["Shimla", "Manali", "Dharamshala", "Dehradun"],
    },
];

static CLIMATE_RULES: [PlaceRule<ClimateType>; 4] = [
    PlaceRule {
        value: ClimateType::Coastal,
        states: &["Kerala", "Goa", "Karnataka", "Tamil Nadu"],
        cities: &["Mumbai", "Chennai", "Kochi", "Mangalore"],
    },
    PlaceRule {
        value: ClimateType::Arid,
        states: &["Rajasthan", "Gujarat"],
        cities: &["Jaipur", "Jodhpur", "Ahmedabad"],
    },
    PlaceRule {
        value: ClimateType::Temperate,
        states: &["Himachal", "Uttarakhand", "Kashmir"],
        cities: &["Shimla", "Manali", "Dehradun"],
    },
    PlaceRule {
        value: ClimateType::Subtropical,
        states: &["Punjab", "Haryana", "Uttar Pradesh", "Bihar"],
        cities: &["Delhi", "Chandigarh"],
    },
];

fn first_match<T: Copy>(rules: &[PlaceRule<T>], city: &str, state: &str, default: T) -> T {
    let city = city.to_lowercase();
    let state = state.to_lowercase();

    rules
        .iter()
        .find(|rule| rule.matches(&city, &state))
        .map(|rule| rule.value)
        .unwrap_or(default)
}

/// Dominant soil for a place. Falls back to alluvial.
pub fn soil_type_for(city: &str, state: &str) -> SoilType {
    first_match(&SOIL_RULES, city, state, SoilType::Alluvial)
}

/// Broad climate for a place. Falls back to tropical.
pub fn climate_type_for(city: &str, state: &str) -> ClimateType {
    first_match(&CLIMATE_RULES, city, state, ClimateType::Tropical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soil_by_city() {
        assert_eq!(soil_type_for("Pune", ""), SoilType::Black);
        assert_eq!(soil_type_for("Bangalore", ""), SoilType::Red);
        assert_eq!(soil_type_for("Jodhpur", ""), SoilType::Desert);
        assert_eq!(soil_type_for("Manali", ""), SoilType::Mountain);
    }

    #[test]
    fn soil_by_state_is_case_insensitive() {
        assert_eq!(soil_type_for("Ludhiana", "PUNJAB"), SoilType::Alluvial);
        assert_eq!(soil_type_for("Thrissur", "kerala"), SoilType::Laterite);
        assert_eq!(soil_type_for("Warangal", "Telangana"), SoilType::Red);
    }

    #[test]
    fn soil_matches_substrings_of_free_text() {
        assert_eq!(soil_type_for("Pune, Maharashtra", ""), SoilType::Black);
        assert_eq!(soil_type_for("Location Area", "Maharashtra"), SoilType::Black);
    }

    #[test]
    fn first_matching_rule_wins() {
        // Mumbai is black soil before anything else
        assert_eq!(soil_type_for("Mumbai", "Goa"), SoilType::Black);
        // Mumbai is coastal before Gujarat is arid
        assert_eq!(climate_type_for("Mumbai", "Gujarat"), ClimateType::Coastal);
    }

    #[test]
    fn unknown_places_get_defaults() {
        assert_eq!(soil_type_for("Unknown City", "Unknown State"), SoilType::Alluvial);
        assert_eq!(climate_type_for("", ""), ClimateType::Tropical);
        assert_eq!(climate_type_for("Kolkata", "West Bengal"), ClimateType::Tropical);
    }

    #[test]
    fn climate_tables() {
        assert_eq!(climate_type_for("Kochi", ""), ClimateType::Coastal);
        assert_eq!(climate_type_for("Ahmedabad", ""), ClimateType::Arid);
        assert_eq!(climate_type_for("Srinagar", "Jammu and Kashmir"), ClimateType::Temperate);
        assert_eq!(climate_type_for("Patna", "Bihar"), ClimateType::Subtropical);
    }

    #[test]
    fn labels_are_lowercase() {
        assert_eq!(SoilType::Black.to_string(), "black");
        assert_eq!(ClimateType::Subtropical.as_str(), "subtropical");
    }
}
