//! Data Loading and Management
//!
//! Loads the trail snapshot from CSV with Polars, normalizes column types,
//! collapses duplicate trail names and extracts typed `Trail` records for the
//! similarity engines.
//!
//! The loaded `TrailData` is immutable. Filters build new frames from it and
//! never touch the source.

use crate::error::{RecommendError, RecommendResult};
use crate::trail::{parse_elevation_profile, Coordinates, Trail};
use anyhow::{Context, Result};
use polars::prelude::*;
use rustc_hash::{FxHashSet, FxHasher};
use std::hash::{Hash, Hasher};
use std::path::Path;

/// Column names of the trail table
pub mod columns {
    pub const NAME: &str = "name";
    pub const REGION: &str = "region";
    pub const ROUTE_TYPE: &str = "type";
    pub const TIME_H: &str = "time_h";
    pub const LENGTH_KM: &str = "length_km";
    pub const TOTAL_ASCENT: &str = "totalAscent";
    pub const NET_ELEVATION: &str = "netElevation";
    pub const MIN_ELEVATION: &str = "minElevation";
    pub const MAX_ELEVATION: &str = "maxElevation";
    pub const ELEVATION_PROFILE: &str = "trackElevation";
    pub const LAT: &str = "lat";
    pub const LNG: &str = "lng";
    pub const COORDINATES: &str = "coordinates";
}

/// Loaded trail snapshot
#[derive(Debug, Clone)]
pub struct TrailData {
    /// One row per unique trail name, source file order preserved
    trails: DataFrame,

    /// Content fingerprint, used as the dataset identity in cache keys
    version: u64,
}

impl TrailData {
    /// Load the trail table from a CSV file with a header row
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!("Loading trail dataset from {:?}", path);

        let raw = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .with_context(|| format!("Failed to create CSV reader: {:?}", path))?
            .finish()
            .with_context(|| format!("Failed to load trails CSV: {:?}", path))?;

        Self::from_frame(raw)
    }

    /// Build from an already materialized frame
    ///
    /// Every row is validated up front so queries never meet a half-formed
    /// record.
    pub fn from_frame(raw: DataFrame) -> Result<Self> {
        let normalized = normalize_columns(raw)?;
        let trails = collapse_duplicate_names(&normalized)
            .with_context(|| "Failed to collapse duplicate trail names")?;

        let records = trails_from_frame(&trails)
            .with_context(|| "Trail table failed validation")?;
        let version = fingerprint(&records);

        tracing::info!("  Trails: {}", trails.height());
        tracing::debug!("  Dataset version: {:016x}", version);

        Ok(Self { trails, version })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.trails
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.trails.height()
    }

    pub fn is_empty(&self) -> bool {
        self.trails.height() == 0
    }

    /// All trail records in table order
    pub fn trails(&self) -> RecommendResult<Vec<Trail>> {
        trails_from_frame(&self.trails)
    }

    /// Distinct regions, sorted (for populating filter choices)
    pub fn regions(&self) -> RecommendResult<Vec<String>> {
        let regions = self.trails.column(columns::REGION)?.str()?;
        let unique: FxHashSet<&str> = regions.into_iter().flatten().collect();

        let mut sorted: Vec<String> = unique.into_iter().map(|s| s.to_string()).collect();
        sorted.sort();
        Ok(sorted)
    }
}

/// Project the known columns with fixed types
///
/// Required columns must be present. Optional ones are carried only when the
/// source has them. Anything else (index column, url) is dropped.
fn normalize_columns(raw: DataFrame) -> Result<DataFrame> {
    let required = [
        (columns::NAME, DataType::String),
        (columns::REGION, DataType::String),
        (columns::ROUTE_TYPE, DataType::String),
        (columns::TIME_H, DataType::Float64),
        (columns::LENGTH_KM, DataType::Float64),
        (columns::TOTAL_ASCENT, DataType::Float64),
    ];
    let optional = [
        (columns::NET_ELEVATION, DataType::Float64),
        (columns::MIN_ELEVATION, DataType::Float64),
        (columns::MAX_ELEVATION, DataType::Float64),
        (columns::ELEVATION_PROFILE, DataType::String),
        (columns::LAT, DataType::Float64),
        (columns::LNG, DataType::Float64),
        (columns::COORDINATES, DataType::String),
    ];

    let present: FxHashSet<String> = raw
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    let mut exprs: Vec<Expr> = Vec::with_capacity(required.len() + optional.len());

    for (name, dtype) in required {
        if !present.contains(name) {
            anyhow::bail!(
                "Trail table is missing required column '{}'. Available columns: {:?}",
                name,
                present
            );
        }
        exprs.push(col(name).cast(dtype));
    }

    for (name, dtype) in optional {
        if present.contains(name) {
            exprs.push(col(name).cast(dtype));
        } else {
            tracing::debug!("Optional column '{}' not present", name);
        }
    }

    raw.lazy()
        .select(exprs)
        .collect()
        .with_context(|| "Failed to normalize trail columns")
}

/// Keep the first row for every trail name
fn collapse_duplicate_names(df: &DataFrame) -> RecommendResult<DataFrame> {
    let names = df.column(columns::NAME)?.str()?;

    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mask: BooleanChunked = names
        .into_iter()
        .map(|opt| opt.map_or(true, |name| seen.insert(name)))
        .collect();

    let deduped = df.filter(&mask)?;
    let dropped = df.height() - deduped.height();
    if dropped > 0 {
        tracing::warn!("Collapsed {} duplicate trail name(s) to first occurrence", dropped);
    }

    Ok(deduped)
}

fn optional_f64<'a>(df: &'a DataFrame, name: &str) -> RecommendResult<Option<&'a Float64Chunked>> {
    match df.column(name) {
        Ok(column) => Ok(Some(column.f64()?)),
        Err(_) => Ok(None),
    }
}

fn optional_str<'a>(df: &'a DataFrame, name: &str) -> RecommendResult<Option<&'a StringChunked>> {
    match df.column(name) {
        Ok(column) => Ok(Some(column.str()?)),
        Err(_) => Ok(None),
    }
}

fn required<T>(value: Option<T>, row: usize, field: &str) -> RecommendResult<T> {
    value.ok_or_else(|| RecommendError::malformed(row, format!("missing {}", field)))
}

fn non_negative(value: f64, row: usize, field: &str) -> RecommendResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(RecommendError::malformed(
            row,
            format!("{} must be a non-negative number, got {}", field, value),
        ))
    }
}

/// Extract typed records from a normalized trail frame, in row order
pub fn trails_from_frame(df: &DataFrame) -> RecommendResult<Vec<Trail>> {
    let name = df.column(columns::NAME)?.str()?;
    let region = df.column(columns::REGION)?.str()?;
    let route_type = df.column(columns::ROUTE_TYPE)?.str()?;
    let time_h = df.column(columns::TIME_H)?.f64()?;
    let length_km = df.column(columns::LENGTH_KM)?.f64()?;
    let ascent = df.column(columns::TOTAL_ASCENT)?.f64()?;

    let net = optional_f64(df, columns::NET_ELEVATION)?;
    let min = optional_f64(df, columns::MIN_ELEVATION)?;
    let max = optional_f64(df, columns::MAX_ELEVATION)?;
    let profile = optional_str(df, columns::ELEVATION_PROFILE)?;
    let lat = optional_f64(df, columns::LAT)?;
    let lng = optional_f64(df, columns::LNG)?;
    let coordinate_text = optional_str(df, columns::COORDINATES)?;

    let mut trails = Vec::with_capacity(df.height());

    for row in 0..df.height() {
        let mut trail = Trail::new(
            required(name.get(row), row, columns::NAME)?,
            required(region.get(row), row, columns::REGION)?,
            required(route_type.get(row), row, columns::ROUTE_TYPE)?,
            non_negative(required(time_h.get(row), row, columns::TIME_H)?, row, columns::TIME_H)?,
            non_negative(
                required(length_km.get(row), row, columns::LENGTH_KM)?,
                row,
                columns::LENGTH_KM,
            )?,
            non_negative(
                required(ascent.get(row), row, columns::TOTAL_ASCENT)?,
                row,
                columns::TOTAL_ASCENT,
            )?,
        );

        trail.net_elevation_m = net.and_then(|c| c.get(row));
        trail.min_elevation_m = min.and_then(|c| c.get(row));
        trail.max_elevation_m = max.and_then(|c| c.get(row));

        if let Some(raw) = profile.and_then(|c| c.get(row)) {
            let samples = parse_elevation_profile(raw)
                .map_err(|reason| RecommendError::malformed(row, reason))?;
            trail.elevation_profile = Some(samples);
        }

        if let (Some(lat), Some(lng)) = (lat.and_then(|c| c.get(row)), lng.and_then(|c| c.get(row))) {
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
                return Err(RecommendError::malformed(
                    row,
                    format!("coordinates out of range: ({}, {})", lat, lng),
                ));
            }
            trail.coordinates = Some(Coordinates { lat, lng });
        }

        trail.coordinate_text = coordinate_text
            .and_then(|c| c.get(row))
            .map(|s| s.to_string());

        trails.push(trail);
    }

    Ok(trails)
}

/// Order-sensitive content hash over every record's identity and attributes
fn fingerprint(trails: &[Trail]) -> u64 {
    let mut hasher = FxHasher::default();
    trails.len().hash(&mut hasher);

    for trail in trails {
        trail.name.hash(&mut hasher);
        trail.region.hash(&mut hasher);
        trail.route_type.hash(&mut hasher);
        trail.time_h.to_bits().hash(&mut hasher);
        trail.length_km.to_bits().hash(&mut hasher);
        trail.total_ascent_m.to_bits().hash(&mut hasher);
    }

    hasher.finish()
}
