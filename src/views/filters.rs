//! List filters
//!
//! Query, category and date ordering for the startup, news and event lists.

use chrono::{DateTime, NaiveDateTime};
use std::collections::BTreeSet;

use crate::api::dto::{Event, News, StartupSummary};
use crate::cache::compare_names;
use crate::calendar::{parse_day, DatedRecord};

// ============================================
// STARTUPS
// ============================================

/// Free-text query plus an optional maturity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartupFilter {
    pub query: String,
    pub maturity: String,
}

impl StartupFilter {
    pub fn new(query: impl Into<String>, maturity: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            maturity: maturity.into(),
        }
    }

    /// Name, email or sector contains the query; maturity matches exactly
    pub fn matches(&self, startup: &StartupSummary) -> bool {
        let query = self.query.trim().to_lowercase();
        let maturity = self.maturity.trim().to_lowercase();

        let matches_query = query.is_empty()
            || startup.name.to_lowercase().contains(&query)
            || startup.email.to_lowercase().contains(&query)
            || startup
                .sector
                .as_deref()
                .map(|s| s.to_lowercase().contains(&query))
                .unwrap_or(false);

        let matches_maturity = maturity.is_empty()
            || startup
                .maturity
                .as_deref()
                .map(|m| m.trim().to_lowercase() == maturity)
                .unwrap_or(false);

        matches_query && matches_maturity
    }

    pub fn apply<'a>(&self, startups: &'a [StartupSummary]) -> Vec<&'a StartupSummary> {
        startups.iter().filter(|s| self.matches(s)).collect()
    }
}

/// Distinct maturity values for the filter dropdown
pub fn maturities(startups: &[StartupSummary]) -> Vec<String> {
    distinct_sorted(startups.iter().filter_map(|s| s.maturity.as_deref()))
}

// ============================================
// NEWS / EVENTS
// ============================================

/// A record that can appear in a dated, categorized list
pub trait ListedRecord: DatedRecord {
    fn title(&self) -> &str;
    fn category(&self) -> Option<&str>;
}

impl ListedRecord for News {
    fn title(&self) -> &str {
        &self.title
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

impl ListedRecord for Event {
    fn title(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Option<&str> {
        self.event_type.as_deref()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Newest first
    #[default]
    Desc,
    Asc,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "desc" => Ok(SortOrder::Desc),
            "asc" => Ok(SortOrder::Asc),
            _ => Err(format!("Unknown sort order: {}", s)),
        }
    }
}

/// Title query, category and date ordering for news and events
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatedListFilter {
    pub query: String,
    pub category: String,
    pub order: SortOrder,
}

impl DatedListFilter {
    pub fn matches<R: ListedRecord>(&self, record: &R) -> bool {
        let query = self.query.trim().to_lowercase();
        let category = self.category.trim().to_lowercase();

        let matches_query = query.is_empty() || record.title().to_lowercase().contains(&query);
        let matches_category = category.is_empty()
            || record
                .category()
                .map(|c| c.trim().to_lowercase() == category)
                .unwrap_or(false);

        matches_query && matches_category
    }

    /// Matching records, ordered by date. Undated records sort as the oldest.
    pub fn apply<'a, R: ListedRecord>(&self, records: &'a [R]) -> Vec<&'a R> {
        let mut matched: Vec<&R> = records.iter().filter(|r| self.matches(*r)).collect();
        matched.sort_by(|a, b| {
            let ordering = sort_key(*a).cmp(&sort_key(*b));
            match self.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
        matched
    }
}

/// Distinct categories for the filter dropdown
pub fn categories<R: ListedRecord>(records: &[R]) -> Vec<String> {
    distinct_sorted(records.iter().filter_map(|r| r.category()))
}

fn sort_key<R: DatedRecord>(record: &R) -> Option<NaiveDateTime> {
    record.date_str().and_then(parse_timestamp)
}

const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Full timestamp of a raw date string. Offsets are normalised to UTC;
/// date-only values sort at midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| parse_day(raw).and_then(|day| day.and_hms_opt(0, 0, 0)))
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let set: BTreeSet<String> = values
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    let mut out: Vec<String> = set.into_iter().collect();
    out.sort_by(|a, b| compare_names(a, b));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn startup(name: &str, sector: Option<&str>, maturity: Option<&str>) -> StartupSummary {
        StartupSummary {
            id: 1,
            name: name.to_string(),
            email: format!("{}@mail.io", name.to_lowercase()),
            legal_status: None,
            address: None,
            phone: None,
            sector: sector.map(str::to_string),
            maturity: maturity.map(str::to_string),
        }
    }

    fn news(id: u64, title: &str, date: Option<&str>, category: Option<&str>) -> News {
        News {
            id,
            title: title.to_string(),
            news_date: date.map(str::to_string),
            location: None,
            category: category.map(str::to_string),
            startup_id: None,
        }
    }

    #[test]
    fn test_startup_query_and_maturity() {
        let list = vec![
            startup("GreenGrid", Some("Energy"), Some(" Seed ")),
            startup("Medly", Some("Health"), Some("Series A")),
            startup("Orbit", None, None),
        ];

        let by_sector = StartupFilter::new("health", "");
        assert_eq!(by_sector.apply(&list).len(), 1);

        let by_email = StartupFilter::new("orbit@", "");
        assert_eq!(by_email.apply(&list)[0].name, "Orbit");

        let by_maturity = StartupFilter::new("", "seed");
        assert_eq!(by_maturity.apply(&list)[0].name, "GreenGrid");

        assert_eq!(StartupFilter::default().apply(&list).len(), 3);
        assert_eq!(maturities(&list), vec!["Seed", "Series A"]);
    }

    #[test]
    fn test_dated_list_sorting() {
        let items = vec![
            news(1, "Old", Some("2023-01-10"), Some("Funding")),
            news(2, "Undated", None, Some("funding")),
            news(3, "New", Some("2024-05-01"), Some("Launch")),
        ];

        let desc = DatedListFilter::default().apply(&items);
        let ids: Vec<u64> = desc.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);

        let asc = DatedListFilter {
            order: SortOrder::Asc,
            ..Default::default()
        }
        .apply(&items);
        let ids: Vec<u64> = asc.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_same_day_items_follow_their_time() {
        let items = vec![
            news(1, "Morning", Some("2024-03-05T09:00:00"), None),
            news(2, "Evening", Some("2024-03-05T18:30:00Z"), None),
            news(3, "Noon", Some("2024-03-05 12:00"), None),
            news(4, "Day only", Some("2024-03-05"), None),
        ];

        let desc = DatedListFilter::default().apply(&items);
        let ids: Vec<u64> = desc.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 3, 1, 4]);
    }

    #[test]
    fn test_parse_timestamp_fallbacks() {
        let midnight = parse_timestamp("2024-03-05").unwrap();
        assert_eq!(midnight.to_string(), "2024-03-05 00:00:00");

        let shifted = parse_timestamp("2024-03-05T10:00:00+02:00").unwrap();
        assert_eq!(shifted.to_string(), "2024-03-05 08:00:00");

        assert!(parse_timestamp("next week").is_none());
    }

    #[test]
    fn test_dated_list_category_and_query() {
        let items = vec![
            news(1, "Seed round closed", Some("2023-01-10"), Some("Funding")),
            news(2, "Another round", None, Some("funding")),
            news(3, "Product launch", Some("2024-05-01"), Some("Launch")),
        ];

        let filter = DatedListFilter {
            category: "FUNDING".to_string(),
            query: "round".to_string(),
            order: SortOrder::Desc,
        };
        assert_eq!(filter.apply(&items).len(), 2);
        assert_eq!(categories(&items), vec!["funding", "Funding", "Launch"]);
    }

    #[test]
    fn test_event_category_is_event_type() {
        let event = Event {
            id: 1,
            name: "Demo Day".to_string(),
            dates: Some("2024-06-01".to_string()),
            location: None,
            description: None,
            event_type: Some("Pitch".to_string()),
            target_audience: None,
        };
        let filter = DatedListFilter {
            category: "pitch".to_string(),
            ..Default::default()
        };
        assert!(filter.matches(&event));
        assert_eq!("asc".parse::<SortOrder>(), Ok(SortOrder::Asc));
    }
}
