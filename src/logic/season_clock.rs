use crate::models::{Season, SeasonInfo};
use chrono::{Datelike, NaiveDate};

struct SeasonProfile {
    season: Season,
    months: &'static str,
    description: &'static str,
    typical_crops: &'static [&'static str],
}

static SEASON_PROFILES: [SeasonProfile; 3] = [
    SeasonProfile {
        season: Season::Kharif,
        months: "June - October",
        description: "Monsoon season - ideal for rain-fed crops",
        typical_crops: &["Rice", "Cotton", "Sugarcane", "Pulses"],
    },
    SeasonProfile {
        season: Season::Rabi,
        months: "November - March",
        description: "Winter season - perfect for cool weather crops",
        typical_crops: &["Wheat", "Barley", "Peas", "Gram"],
    },
    SeasonProfile {
        season: Season::Zaid,
        months: "April - May",
        description: "Summer season - suitable for irrigated crops",
        typical_crops: &["Watermelon", "Cucumber", "Fodder crops"],
    },
];

/// Season owning a calendar month (1-12).
///
/// - Kharif: June-October
/// - Rabi: November-March
/// - Zaid: April-May
pub fn season_for_month(month: u32) -> Season {
    match month {
        6..=10 => Season::Kharif,
        4 | 5 => Season::Zaid,
        _ => Season::Rabi,
    }
}

pub fn season_info(season: Season) -> SeasonInfo {
    let profile = SEASON_PROFILES
        .iter()
        .find(|p| p.season == season)
        .unwrap_or(&SEASON_PROFILES[0]);

    SeasonInfo {
        season: profile.season,
        months: profile.months,
        description: profile.description,
        typical_crops: profile.typical_crops.to_vec(),
    }
}

pub fn current_season(date: NaiveDate) -> SeasonInfo {
    season_info(season_for_month(date.month()))
}

pub fn next_season(date: NaiveDate) -> SeasonInfo {
    season_info(season_for_month(date.month()).next())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, 15).unwrap()
    }

    #[test]
    fn every_month_has_exactly_one_season() {
        let mut counts = std::collections::HashMap::new();
        for month in 1..=12 {
            *counts.entry(current_season(date(month)).season).or_insert(0) += 1;
        }
        assert_eq!(counts[&Season::Kharif], 5);
        assert_eq!(counts[&Season::Rabi], 5);
        assert_eq!(counts[&Season::Zaid], 2);
    }

    #[test]
    fn month_boundaries() {
        assert_eq!(season_for_month(5), Season::Zaid);
        assert_eq!(season_for_month(6), Season::Kharif);
        assert_eq!(season_for_month(10), Season::Kharif);
        assert_eq!(season_for_month(11), Season::Rabi);
        assert_eq!(season_for_month(1), Season::Rabi);
        assert_eq!(season_for_month(3), Season::Rabi);
        assert_eq!(season_for_month(4), Season::Zaid);
    }

    #[test]
    fn first_and_last_day_of_month_agree() {
        assert_eq!(
            current_season(NaiveDate::from_ymd_opt(2024, 5, 31).unwrap()).season,
            Season::Zaid
        );
        assert_eq!(
            current_season(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()).season,
            Season::Kharif
        );
    }

    #[test]
    fn next_season_cycles_through_all_three() {
        assert_eq!(next_season(date(7)).season, Season::Rabi);
        assert_eq!(next_season(date(12)).season, Season::Zaid);
        assert_eq!(next_season(date(4)).season, Season::Kharif);
    }

    #[test]
    fn season_info_carries_metadata() {
        let info = season_info(Season::Rabi);
        assert_eq!(info.months, "November - March");
        assert_eq!(info.typical_crops.first(), Some(&"Wheat"));
    }
}
