//! Trail record types
//!
//! One `Trail` per row of the (possibly filtered) trail table. Records are
//! extracted from a polars frame by `data::trails_from_frame` and live only as
//! long as the query that produced them.

use serde::{Deserialize, Serialize};

/// Latitude / longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A single hiking route and its attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Trail {
    pub name: String,
    pub region: String,
    pub route_type: String,
    /// Fractional hours (1.5 = 1h30m)
    pub time_h: f64,
    pub length_km: f64,
    pub total_ascent_m: f64,
    pub net_elevation_m: Option<f64>,
    pub min_elevation_m: Option<f64>,
    pub max_elevation_m: Option<f64>,
    /// Fixed-interval elevation samples, never empty when present
    pub elevation_profile: Option<Vec<f64>>,
    pub coordinates: Option<Coordinates>,
    /// Combined coordinate string exactly as stored in the source file
    pub coordinate_text: Option<String>,
}

impl Trail {
    /// Minimal record with only the required attributes set
    pub fn new(
        name: impl Into<String>,
        region: impl Into<String>,
        route_type: impl Into<String>,
        time_h: f64,
        length_km: f64,
        total_ascent_m: f64,
    ) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            route_type: route_type.into(),
            time_h,
            length_km,
            total_ascent_m,
            net_elevation_m: None,
            min_elevation_m: None,
            max_elevation_m: None,
            elevation_profile: None,
            coordinates: None,
            coordinate_text: None,
        }
    }
}

/// Parse a comma-separated elevation sequence such as `"[12.0, 14.5, 20]"`
///
/// Surrounding brackets and whitespace are tolerated. An empty sequence or any
/// non-numeric sample is an error (the message names the offending token).
pub fn parse_elevation_profile(raw: &str) -> Result<Vec<f64>, String> {
    let trimmed = raw
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim();

    if trimmed.is_empty() {
        return Err("elevation profile is empty".to_string());
    }

    trimmed
        .split(',')
        .map(|token| {
            let token = token.trim();
            token
                .parse::<f64>()
                .map_err(|_| format!("invalid elevation sample '{}'", token))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_profile_with_brackets() {
        let profile = parse_elevation_profile("[12.0, 14.5, 20]").unwrap();
        assert_eq!(profile, vec![12.0, 14.5, 20.0]);
    }

    #[test]
    fn test_parse_profile_single_sample() {
        assert_eq!(parse_elevation_profile("310").unwrap(), vec![310.0]);
    }

    #[test]
    fn test_parse_profile_rejects_empty() {
        assert!(parse_elevation_profile("[]").is_err());
        assert!(parse_elevation_profile("   ").is_err());
    }

    #[test]
    fn test_parse_profile_rejects_garbage() {
        let err = parse_elevation_profile("10, abc, 12").unwrap_err();
        assert!(err.contains("abc"));
    }
}
