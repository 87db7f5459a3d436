//! Filter Stage
//!
//! Narrows the trail table by region and by duration / length / ascent
//! bucket. Buckets are half-open ranges; `all` disables a dimension.
//! Predicates are ANDed into one Polars expression and evaluated on a clone
//! of the source frame, so the source table is never modified.

use crate::data::columns;
use crate::error::{RecommendError, RecommendResult};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentinel label meaning "no restriction"
pub const ALL: &str = "all";

fn is_all(label: &str) -> bool {
    label.trim().eq_ignore_ascii_case(ALL)
}

/// Half-open numeric range `[lower, upper)`; `upper = None` is unbounded
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub lower: f64,
    pub upper: Option<f64>,
}

impl Range {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && self.upper.map_or(true, |upper| value < upper)
    }

    fn predicate(&self, column: &str) -> Expr {
        let lower = col(column).gt_eq(lit(self.lower));
        match self.upper {
            Some(upper) => lower.and(col(column).lt(lit(upper))),
            None => lower,
        }
    }
}

macro_rules! bucket_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $what:literal {
            $($variant:ident => $label:literal, $lower:literal, $upper:expr;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum $name {
            #[default]
            All,
            $($variant,)+
        }

        impl $name {
            /// Every label accepted by `FromStr`, sentinel first
            pub const LABELS: &'static [&'static str] = &[ALL, $($label,)+];

            pub fn label(&self) -> &'static str {
                match self {
                    $name::All => ALL,
                    $($name::$variant => $label,)+
                }
            }

            /// `None` for the `all` sentinel
            pub fn range(&self) -> Option<Range> {
                match self {
                    $name::All => None,
                    $($name::$variant => Some(Range { lower: $lower, upper: $upper }),)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = RecommendError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if is_all(s) {
                    return Ok($name::All);
                }
                match s.trim() {
                    $($label => Ok($name::$variant),)+
                    other => Err(RecommendError::invalid(format!(
                        "unknown {} bucket '{}' (expected one of {:?})",
                        $what,
                        other,
                        $name::LABELS
                    ))),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.label())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let label = String::deserialize(deserializer)?;
                label.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

bucket_enum! {
    /// Duration buckets over `time_h` (hours)
    DurationBucket, "duration" {
        UnderOneHour => "<1h", 0.0, Some(1.0);
        OneToFiveHours => "1-5h", 1.0, Some(5.0);
        FiveHoursPlus => ">=5h", 5.0, None;
    }
}

bucket_enum! {
    /// Length buckets over `length_km`
    LengthBucket, "length" {
        UnderFiveKm => "<5km", 0.0, Some(5.0);
        FiveToFifteenKm => "5-15km", 5.0, Some(15.0);
        FifteenKmPlus => ">=15km", 15.0, None;
    }
}

bucket_enum! {
    /// Total ascent buckets over `totalAscent` (metres)
    AscentBucket, "ascent" {
        Under300m => "<300m", 0.0, Some(300.0);
        From300To1000m => "300-1000m", 300.0, Some(1000.0);
        Over1000m => ">=1000m", 1000.0, None;
    }
}

/// Region + bucket selections for one query
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TrailFilters {
    /// Exact region match; `None` means all regions
    #[serde(default, deserialize_with = "deserialize_region")]
    pub region: Option<String>,
    #[serde(default)]
    pub duration: DurationBucket,
    #[serde(default)]
    pub length: LengthBucket,
    #[serde(default)]
    pub ascent: AscentBucket,
}

fn deserialize_region<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let region: Option<String> = Option::deserialize(deserializer)?;
    Ok(region.and_then(normalize_region))
}

fn normalize_region(region: String) -> Option<String> {
    if region.trim().is_empty() || is_all(&region) {
        None
    } else {
        Some(region)
    }
}

impl TrailFilters {
    /// Parse UI labels; each dimension accepts `all`
    pub fn from_labels(
        region: Option<&str>,
        duration: Option<&str>,
        length: Option<&str>,
        ascent: Option<&str>,
    ) -> RecommendResult<Self> {
        Ok(Self {
            region: region.map(str::to_string).and_then(normalize_region),
            duration: duration
                .map(|s| s.parse::<DurationBucket>())
                .transpose()?
                .unwrap_or_default(),
            length: length
                .map(|s| s.parse::<LengthBucket>())
                .transpose()?
                .unwrap_or_default(),
            ascent: ascent
                .map(|s| s.parse::<AscentBucket>())
                .transpose()?
                .unwrap_or_default(),
        })
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = normalize_region(region.into());
        self
    }

    pub fn with_duration(mut self, bucket: DurationBucket) -> Self {
        self.duration = bucket;
        self
    }

    pub fn with_length(mut self, bucket: LengthBucket) -> Self {
        self.length = bucket;
        self
    }

    pub fn with_ascent(mut self, bucket: AscentBucket) -> Self {
        self.ascent = bucket;
        self
    }

    /// True when every dimension is `all`
    pub fn is_unrestricted(&self) -> bool {
        self.predicate().is_none()
    }

    /// Conjunction of all active dimensions
    fn predicate(&self) -> Option<Expr> {
        let mut conditions: Vec<Expr> = Vec::new();

        if let Some(region) = &self.region {
            conditions.push(col(columns::REGION).eq(lit(region.as_str())));
        }
        if let Some(range) = self.duration.range() {
            conditions.push(range.predicate(columns::TIME_H));
        }
        if let Some(range) = self.length.range() {
            conditions.push(range.predicate(columns::LENGTH_KM));
        }
        if let Some(range) = self.ascent.range() {
            conditions.push(range.predicate(columns::TOTAL_ASCENT));
        }

        conditions.into_iter().reduce(|acc, cond| acc.and(cond))
    }

    /// Filtered view of `trails`; row order is preserved
    pub fn apply(&self, trails: &DataFrame) -> RecommendResult<DataFrame> {
        let Some(predicate) = self.predicate() else {
            return Ok(trails.clone());
        };

        let filtered = trails.clone().lazy().filter(predicate).collect()?;

        tracing::debug!(
            "Filters {:?} kept {}/{} trails",
            self,
            filtered.height(),
            trails.height()
        );

        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trails() -> DataFrame {
        df![
            "name" => &["Short Walk", "Day Hike", "Alpine Route", "Long Valley"],
            "region" => &["Otago", "Otago", "Canterbury", "Otago"],
            "type" => &["Loop", "Return", "Return", "One way"],
            "time_h" => &[0.5, 1.0, 6.0, 5.0],
            "length_km" => &[2.0, 5.0, 20.0, 15.0],
            "totalAscent" => &[50.0, 300.0, 1500.0, 999.0],
        ]
        .unwrap()
    }

    fn names(df: &DataFrame) -> Vec<String> {
        df.column("name")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_bucket_labels_round_trip() {
        for label in DurationBucket::LABELS {
            let bucket: DurationBucket = label.parse().unwrap();
            assert_eq!(bucket.label(), *label);
        }
        assert_eq!("ALL".parse::<AscentBucket>().unwrap(), AscentBucket::All);
    }

    #[test]
    fn test_unknown_bucket_label_rejected() {
        let err = "2-3h".parse::<DurationBucket>().unwrap_err();
        assert!(matches!(err, RecommendError::InvalidParameter(_)));
        assert!(TrailFilters::from_labels(None, None, Some("huge"), None).is_err());
    }

    #[test]
    fn test_half_open_boundaries() {
        let range = DurationBucket::OneToFiveHours.range().unwrap();
        assert!(range.contains(1.0));
        assert!(!range.contains(5.0));
        assert!(DurationBucket::FiveHoursPlus.range().unwrap().contains(5.0));
    }

    #[test]
    fn test_unrestricted_is_identity() {
        let df = trails();
        let filters = TrailFilters::default();
        assert!(filters.is_unrestricted());
        assert!(filters.apply(&df).unwrap().equals(&df));
    }

    #[test]
    fn test_region_all_sentinel() {
        let filters = TrailFilters::from_labels(Some("All"), Some("all"), None, None).unwrap();
        assert!(filters.is_unrestricted());
    }

    #[test]
    fn test_duration_bucket() {
        let filters = TrailFilters::default().with_duration(DurationBucket::OneToFiveHours);
        assert_eq!(names(&filters.apply(&trails()).unwrap()), vec!["Day Hike"]);
    }

    #[test]
    fn test_conjunction_of_dimensions() {
        let filters = TrailFilters::default()
            .with_region("Otago")
            .with_length(LengthBucket::FifteenKmPlus)
            .with_ascent(AscentBucket::From300To1000m);
        assert_eq!(names(&filters.apply(&trails()).unwrap()), vec!["Long Valley"]);
    }

    #[test]
    fn test_filter_is_idempotent_and_pure() {
        let df = trails();
        let filters = TrailFilters::default()
            .with_region("Otago")
            .with_duration(DurationBucket::UnderOneHour);

        let once = filters.apply(&df).unwrap();
        let twice = filters.apply(&once).unwrap();
        assert!(once.equals(&twice));
        assert_eq!(df.height(), 4);
    }

    #[test]
    fn test_filters_deserialize_from_labels() {
        let filters: TrailFilters = serde_json::from_str(
            r#"{"region": "all", "duration": ">=5h", "length": "all"}"#,
        )
        .unwrap();
        assert_eq!(filters.region, None);
        assert_eq!(filters.duration, DurationBucket::FiveHoursPlus);
        assert_eq!(filters.ascent, AscentBucket::All);
    }
}
