//! Confluence zones: price areas where several Fibonacci levels cluster.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::{FibonacciExtension, FibonacciLevel, FibonacciRetracement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelSource {
    Retracement,
    Extension,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfluenceLevel {
    pub source: LevelSource,
    pub level: FibonacciLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfluenceZone {
    /// Mean price of the clustered levels.
    pub price: f64,
    /// Number of clustered levels.
    pub strength: usize,
    pub levels: Vec<ConfluenceLevel>,
}

/// Clusters all levels that sit within `tolerance_percent` of each other.
///
/// Levels are sorted by price, then grouped greedily: a level joins the
/// current cluster while it stays within tolerance of the cluster's *first*
/// level. Clusters of two or more become zones, strongest first.
pub fn find_confluence(
    retracements: &[FibonacciRetracement],
    extensions: &[FibonacciExtension],
    tolerance_percent: f64,
) -> Vec<ConfluenceZone> {
    let mut all: Vec<ConfluenceLevel> = retracements
        .iter()
        .flat_map(|r| r.levels.iter().map(|l| (LevelSource::Retracement, l)))
        .chain(
            extensions
                .iter()
                .flat_map(|e| e.levels.iter().map(|l| (LevelSource::Extension, l))),
        )
        .map(|(source, level)| ConfluenceLevel {
            source,
            level: level.clone(),
        })
        .collect();
    all.sort_by(|a, b| {
        a.level
            .price
            .partial_cmp(&b.level.price)
            .unwrap_or(Ordering::Equal)
    });

    let mut zones = Vec::new();
    let mut i = 0;
    while i < all.len() {
        let anchor = all[i].level.price;
        let mut j = i + 1;
        while j < all.len() && (all[j].level.price - anchor).abs() / anchor * 100.0 <= tolerance_percent {
            j += 1;
        }

        if j - i >= 2 {
            let cluster = all[i..j].to_vec();
            let price = cluster.iter().map(|c| c.level.price).sum::<f64>() / cluster.len() as f64;
            zones.push(ConfluenceZone {
                price,
                strength: cluster.len(),
                levels: cluster,
            });
        }
        i = j;
    }

    zones.sort_by(|a, b| b.strength.cmp(&a.strength));
    zones
}
