//! Static trend data for the dashboard

use crate::studio::types::{DataPoint, TrendMetric};

/// Headline metrics shown on the intelligence hub
pub fn mock_trends() -> Vec<TrendMetric> {
    [
        ("Polymarket: Trump Odds", 62.4, 2.1, "Politics"),
        ("OSINT: COL Sentiment", -12.0, -4.5, "Social"),
        ("COP Liquidity", 4105.0, 0.8, "Economy"),
        ("Viral Alpha (X)", 98.2, 15.4, "Social"),
    ]
    .into_iter()
    .map(|(name, value, delta, category)| TrendMetric {
        name: name.to_string(),
        value,
        delta,
        category: category.to_string(),
    })
    .collect()
}

/// Weekly projection for two candidates
pub fn election_projection() -> Vec<DataPoint> {
    [(42.0, 38.0), (45.0, 35.0), (41.0, 39.0), (48.0, 32.0), (52.0, 30.0), (55.0, 28.0)]
        .into_iter()
        .enumerate()
        .map(|(week, (value, value2))| DataPoint {
            time: format!("Week {}", week + 1),
            value,
            value2: Some(value2),
        })
        .collect()
}
