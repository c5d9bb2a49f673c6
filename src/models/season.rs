use serde::{Deserialize, Serialize};

/// Indian agricultural seasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Kharif,
    Rabi,
    Zaid,
}

impl Season {
    pub fn all() -> &'static [Season] {
        &[Season::Kharif, Season::Rabi, Season::Zaid]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Kharif => "Kharif",
            Season::Rabi => "Rabi",
            Season::Zaid => "Zaid",
        }
    }

    /// Case-insensitive; accepts the English season names too.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "kharif" | "monsoon" => Some(Season::Kharif),
            "rabi" | "winter" => Some(Season::Rabi),
            "zaid" | "zayad" | "summer" => Some(Season::Zaid),
            _ => None,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Season::Kharif => Season::Rabi,
            Season::Rabi => Season::Zaid,
            Season::Zaid => Season::Kharif,
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonInfo {
    pub season: Season,
    pub months: &'static str,
    pub description: &'static str,
    pub typical_crops: Vec<&'static str>,
}
