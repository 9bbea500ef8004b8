//! Founder dashboard
//!
//! Startup count from the list cache, plus placeholder analytics derived
//! from a fixed seed so they stay stable between runs.

use serde::Serialize;

use crate::cache::StartupCache;

/// Deterministic value in `[min, max]` for `key`.
///
/// The key is hashed with a 31-multiplier over its UTF-16 units in 32-bit
/// wrapping arithmetic, and `|sin(hash)|` picks the point in the range.
pub fn seeded_metric(min: f64, max: f64, key: &str, is_float: bool) -> f64 {
    let hash = key
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as i32));

    let r = (hash as f64).sin().abs() % 1.0;
    let value = min + r * (max - min);

    if is_float {
        (value * 10.0).round() / 10.0
    } else {
        value.round()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    /// `None` until the cache has answered
    pub total_startups: Option<usize>,
    pub project_views: u32,
    /// Percent
    pub engagement_rate: f64,
    /// Seconds
    pub avg_time_on_page: u32,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    pub fn new() -> Self {
        Self {
            total_startups: None,
            project_views: seeded_metric(1500.0, 4500.0, "views", false) as u32,
            engagement_rate: seeded_metric(2.3, 8.7, "engagement", true),
            avg_time_on_page: seeded_metric(45.0, 210.0, "time", false) as u32,
        }
    }

    /// Fill the startup count from the cache
    pub async fn load(&mut self, cache: &StartupCache) {
        let startups = cache.get_all().await;
        self.total_startups = Some(startups.len());
    }
}
