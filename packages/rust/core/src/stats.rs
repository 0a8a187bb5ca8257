//! Chart aggregations over stored records.

use std::collections::BTreeMap;

use serde::Serialize;

use edutrack_shared::{Educated, Official};

/// Counts per education location, most common first, then by name.
pub fn location_distribution<T: Educated>(records: &[T]) -> Vec<(String, usize)> {
    let counts = count_by(records.iter().map(|r| r.education().education_location.as_str()));
    let mut pairs: Vec<(String, usize)> =
        counts.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    pairs
}

/// Joining year → education location → count.
pub fn yearly_trends(officials: &[Official]) -> BTreeMap<i32, BTreeMap<String, usize>> {
    let mut trends: BTreeMap<i32, BTreeMap<String, usize>> = BTreeMap::new();
    for o in officials {
        *trends
            .entry(o.joining_year)
            .or_default()
            .entry(o.education.education_location.clone())
            .or_default() += 1;
    }
    trends
}

/// Department → education location → count.
pub fn department_location_matrix(
    officials: &[Official],
) -> BTreeMap<String, BTreeMap<String, usize>> {
    let mut matrix: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
    for o in officials {
        *matrix
            .entry(o.department.clone())
            .or_default()
            .entry(o.education.education_location.clone())
            .or_default() += 1;
    }
    matrix
}

/// Summary of Western-educated records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WesternStats {
    pub total: usize,
    pub western: usize,
    /// `western / total * 100`, `0.0` for an empty input.
    pub percentage: f64,
    pub top_country: Option<String>,
    /// Most common degree level among Western-educated records.
    pub most_common_degree: Option<String>,
}

pub fn western_education_stats<T: Educated>(
    records: &[T],
    western_countries: &[String],
) -> WesternStats {
    let western: Vec<&T> = records
        .iter()
        .filter(|r| {
            western_countries
                .iter()
                .any(|c| *c == r.education().education_location)
        })
        .collect();

    let percentage = if records.is_empty() {
        0.0
    } else {
        western.len() as f64 / records.len() as f64 * 100.0
    };

    WesternStats {
        total: records.len(),
        western: western.len(),
        percentage,
        top_country: mode(western.iter().map(|r| r.education().education_location.as_str())),
        most_common_degree: mode(western.iter().map(|r| r.education().degree_level.as_str())),
    }
}

fn count_by<'a>(values: impl Iterator<Item = &'a str>) -> BTreeMap<&'a str, usize> {
    let mut counts = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    counts
}

/// Most frequent value; ties go to the smallest.
fn mode<'a>(values: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for (value, count) in count_by(values) {
        if best.is_none_or(|(_, n)| count > n) {
            best = Some((value, count));
        }
    }
    best.map(|(v, _)| v.to_string())
}
