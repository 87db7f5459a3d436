//! Feature Builder
//!
//! Turns the current candidate set into either name documents (for the
//! name engine) or a numeric feature matrix (for the attribute engine).
//!
//! The one-hot columns are derived from the categories present in the
//! candidate set handed in. A filtered set therefore yields a different
//! feature space than the full table, and distances computed over two
//! different candidate sets are not comparable.

use crate::error::{RecommendError, RecommendResult};
use crate::trail::Trail;

/// Dense row-major feature matrix with named columns
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    values: Vec<f64>,
    n_rows: usize,
}

impl FeatureMatrix {
    pub fn new(columns: Vec<String>, values: Vec<f64>) -> RecommendResult<Self> {
        let width = columns.len();
        if width == 0 || values.len() % width != 0 {
            return Err(RecommendError::invalid(format!(
                "feature values ({}) do not fill {} columns",
                values.len(),
                width
            )));
        }

        Ok(Self {
            n_rows: values.len() / width,
            columns,
            values,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn row(&self, i: usize) -> &[f64] {
        let width = self.n_cols();
        &self.values[i * width..(i + 1) * width]
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.n_cols() + j]
    }

    pub(crate) fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }
}

/// Numeric columns, in matrix order
pub const NUMERIC_FEATURES: [&str; 3] = ["time_h", "length_km", "totalAscent"];

/// Trail names as documents for the count vectorizer
pub fn name_documents(trails: &[Trail]) -> RecommendResult<Vec<&str>> {
    if trails.is_empty() {
        return Err(RecommendError::EmptyDataset);
    }
    Ok(trails.iter().map(|t| t.name.as_str()).collect())
}

/// Build the attribute feature matrix for the candidate set
///
/// Column layout: numeric features, then `type=<value>` one-hot columns,
/// then `region=<value>` one-hot columns. Category values are sorted so the
/// layout depends only on the set of values present, not on row order.
pub fn attribute_matrix(trails: &[Trail]) -> RecommendResult<FeatureMatrix> {
    if trails.is_empty() {
        return Err(RecommendError::EmptyDataset);
    }

    let route_types = distinct_sorted(trails.iter().map(|t| t.route_type.as_str()));
    let regions = distinct_sorted(trails.iter().map(|t| t.region.as_str()));

    let mut columns: Vec<String> = NUMERIC_FEATURES.iter().map(|c| c.to_string()).collect();
    columns.extend(route_types.iter().map(|v| format!("type={}", v)));
    columns.extend(regions.iter().map(|v| format!("region={}", v)));

    let width = columns.len();
    let mut values = Vec::with_capacity(trails.len() * width);

    for trail in trails {
        values.push(trail.time_h);
        values.push(trail.length_km);
        values.push(trail.total_ascent_m);
        values.extend(one_hot(&route_types, &trail.route_type));
        values.extend(one_hot(&regions, &trail.region));
    }

    tracing::debug!(
        "Attribute features: {} trails x {} columns ({} types, {} regions)",
        trails.len(),
        width,
        route_types.len(),
        regions.len()
    );

    FeatureMatrix::new(columns, values)
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut distinct: Vec<&str> = values.collect();
    distinct.sort_unstable();
    distinct.dedup();
    distinct
}

fn one_hot<'a>(categories: &'a [&'a str], value: &'a str) -> impl Iterator<Item = f64> + 'a {
    categories
        .iter()
        .map(move |c| if *c == value { 1.0 } else { 0.0 })
}
