//! Stats aggregator.
//!
//! Merges per-platform stats records for one artist into the canonical
//! derived values. Pure: no I/O, no failure path. Records whose upstream
//! fetch failed never reach this function; the caller omits them.

/// Stats of one platform as input to aggregation.
///
/// Both values are optional because a platform may not report them.
/// `None` means unknown, which is deliberately distinct from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformStats {
    pub followers: Option<i64>,
    pub popularity: Option<i32>,
}

/// Canonical merged stats for one artist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregatedStats {
    /// Sum of followers across platforms that report them.
    pub total_followers: i64,
    /// Mean popularity across platforms that report one, one decimal.
    /// `None` when no platform reports popularity.
    pub average_popularity: Option<f32>,
}

/// Merge zero or more per-platform stats records.
///
/// Followers: absent values count as 0 for the sum. Popularity: the mean
/// is taken only over present values and is absent when none are, so an
/// unknown popularity is never reported as 0.
#[must_use]
pub fn aggregate(stats: &[PlatformStats]) -> AggregatedStats {
    let total_followers = stats.iter().filter_map(|s| s.followers).sum();

    let popularity_values: Vec<i32> = stats.iter().filter_map(|s| s.popularity).collect();
    let average_popularity = if popularity_values.is_empty() {
        None
    } else {
        let sum: i32 = popularity_values.iter().sum();
        let mean = f64::from(sum) / popularity_values.len() as f64;
        // one decimal: platform display precision
        Some(((mean * 10.0).round() / 10.0) as f32)
    };

    AggregatedStats {
        total_followers,
        average_popularity,
    }
}
