//! Result Formatter
//!
//! Maps ranked candidates to the stable output schema consumed by the
//! presentation layer.

use crate::config::FormatterConfig;
use crate::similarity::{RankedHit, Score};
use crate::trail::{Coordinates, Trail};
use serde::{Deserialize, Serialize};

/// Split fractional hours into whole hours and minutes
///
/// Minutes are `round(fraction * 60)`, half away from zero. A result of 60
/// carries into the hour, so 1.999 gives (2, 0) rather than (1, 60).
pub fn decompose_duration(time_h: f64) -> (u32, u32) {
    let hours = time_h.trunc();
    let minutes = ((time_h - hours) * 60.0).round();

    let (hours, minutes) = if minutes >= 60.0 {
        (hours + 1.0, minutes - 60.0)
    } else {
        (hours, minutes)
    };

    (hours as u32, minutes as u32)
}

/// One row of output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailResult {
    pub name: String,
    pub region: String,
    #[serde(rename = "type")]
    pub route_type: String,
    pub duration_hours: u32,
    pub duration_minutes_component: u32,
    pub length_km: f64,
    pub total_ascent_m: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_profile: Option<Vec<f64>>,
    /// Cosine score (name mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
    /// Euclidean distance (attribute mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl TrailResult {
    pub fn from_trail(trail: &Trail, score: Score, config: &FormatterConfig) -> Self {
        let (duration_hours, duration_minutes_component) = decompose_duration(trail.time_h);

        let (similarity_score, distance) = match score {
            Score::Similarity(s) => (Some(s), None),
            Score::Distance(d) => (None, Some(d)),
            Score::Unranked => (None, None),
        };

        Self {
            name: trail.name.clone(),
            region: trail.region.clone(),
            route_type: trail.route_type.clone(),
            duration_hours,
            duration_minutes_component,
            length_km: trail.length_km,
            total_ascent_m: trail.total_ascent_m,
            elevation_profile: if config.include_elevation_profile {
                trail.elevation_profile.clone()
            } else {
                None
            },
            similarity_score,
            distance,
            coordinates: if config.include_coordinates {
                trail.coordinates
            } else {
                None
            },
        }
    }
}

/// Format hits against the candidate set they index into
pub fn format_hits(trails: &[Trail], hits: &[RankedHit], config: &FormatterConfig) -> Vec<TrailResult> {
    hits.iter()
        .filter_map(|hit| {
            trails
                .get(hit.index)
                .map(|trail| TrailResult::from_trail(trail, hit.score, config))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decompose_representative_values() {
        assert_eq!(decompose_duration(1.50), (1, 30));
        assert_eq!(decompose_duration(0.25), (0, 15));
        assert_eq!(decompose_duration(2.99), (2, 59));
        assert_eq!(decompose_duration(1.30), (1, 18));
        assert_eq!(decompose_duration(3.0), (3, 0));
    }

    #[test]
    fn test_decompose_carries_sixty_minutes() {
        assert_eq!(decompose_duration(1.999), (2, 0));
        assert_eq!(decompose_duration(0.9999), (1, 0));
    }

    #[test]
    fn test_decompose_rounds_rather_than_truncates() {
        // 0.0083h = 0.498 min, 0.0092h = 0.552 min
        assert_eq!(decompose_duration(0.0083), (0, 0));
        assert_eq!(decompose_duration(0.0092), (0, 1));
    }

    #[test]
    fn test_result_schema_field_names() {
        let mut trail = Trail::new("Roys Peak Track", "Otago", "Return", 6.0, 16.0, 1258.0);
        trail.elevation_profile = Some(vec![300.0, 1578.0]);
        trail.coordinates = Some(Coordinates { lat: -44.6, lng: 169.0 });

        let result = TrailResult::from_trail(&trail, Score::Similarity(0.5), &FormatterConfig::default());
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["name"], "Roys Peak Track");
        assert_eq!(json["type"], "Return");
        assert_eq!(json["durationHours"], 6);
        assert_eq!(json["durationMinutesComponent"], 0);
        assert_eq!(json["lengthKm"], 16.0);
        assert_eq!(json["totalAscentM"], 1258.0);
        assert_eq!(json["similarityScore"], 0.5);
        assert!(json.get("distance").is_none());
        assert_eq!(json["elevationProfile"][1], 1578.0);
        assert_eq!(json["coordinates"]["lat"], -44.6);
    }

    #[test]
    fn test_optional_sections_follow_config() {
        let mut trail = Trail::new("A", "Otago", "Loop", 1.0, 2.0, 3.0);
        trail.elevation_profile = Some(vec![1.0]);

        let config = FormatterConfig {
            include_elevation_profile: false,
            include_coordinates: false,
        };
        let result = TrailResult::from_trail(&trail, Score::Unranked, &config);
        assert!(result.elevation_profile.is_none());
        assert!(result.similarity_score.is_none());
        assert!(result.distance.is_none());
    }
}
