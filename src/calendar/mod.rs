//! Calendar View-Model
//!
//! Buckets dated records (news, events) by day and lays a month out as
//! complete Monday-first weeks.
//!
//! ## Grid
//!
//! ```text
//!  Mo Tu We Th Fr Sa Su
//!  26 27 28 29  1  2  3    <- leading days from the previous month
//!   4  5  6  7  8  9 10
//!  ...
//!  25 26 27 28 29 30 31
//! ```
//!
//! The first cell is the Monday on or before the 1st, the last cell the
//! Sunday on or after the last day of the month.

use chrono::{Datelike, Local, Months, NaiveDate};
use std::collections::HashMap;

use crate::api::dto::{Event, News};

/// ISO day format used for keys
pub const DAY_FORMAT: &str = "%Y-%m-%d";

// ============================================
// DATED RECORDS
// ============================================

/// A record carrying an optional date-like string
pub trait DatedRecord {
    fn date_str(&self) -> Option<&str>;
}

impl DatedRecord for News {
    fn date_str(&self) -> Option<&str> {
        self.news_date.as_deref()
    }
}

impl DatedRecord for Event {
    fn date_str(&self) -> Option<&str> {
        self.dates.as_deref()
    }
}

impl<T: DatedRecord> DatedRecord for &T {
    fn date_str(&self) -> Option<&str> {
        (*self).date_str()
    }
}

/// Day key of a raw date string: its first 10 characters, if they parse
/// as `YYYY-MM-DD`
pub fn day_key(raw: &str) -> Option<String> {
    parse_day(raw).map(|date| date.format(DAY_FORMAT).to_string())
}

/// Date of a raw date string, using the same prefix rule as `day_key`
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let prefix = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(prefix, DAY_FORMAT).ok()
}

/// Count records per day key; undated and unparseable records are skipped
pub fn index_by_day<R: DatedRecord>(records: &[R]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for key in records.iter().filter_map(|r| r.date_str().and_then(day_key)) {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

/// Records whose date falls on `iso`
pub fn records_on<'a, R: DatedRecord>(records: &'a [R], iso: &str) -> Vec<&'a R> {
    records
        .iter()
        .filter(|r| r.date_str().and_then(day_key).as_deref() == Some(iso))
        .collect()
}

// ============================================
// MONTH CURSOR
// ============================================

/// A displayed month, held as its first day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthCursor {
    first: NaiveDate,
}

impl MonthCursor {
    /// `month0` is zero-based (0 = January)
    pub fn new(year: i32, month0: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month0.checked_add(1)?, 1).map(|first| Self { first })
    }

    /// Month containing `date`
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    /// Month of today's local date
    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    /// Parse `YYYY-MM`
    pub fn parse(input: &str) -> Option<Self> {
        let (year, month) = input.trim().split_once('-')?;
        let year: i32 = year.parse().ok()?;
        let month: u32 = month.parse().ok()?;
        if !(1..=12).contains(&month) {
            return None;
        }
        Self::new(year, month - 1)
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month0(&self) -> u32 {
        self.first.month0()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .first
            .pred_opt()
            .unwrap_or(self.first)
    }

    /// Following month; stays put at the end of the representable range
    pub fn next(&self) -> Self {
        self.first
            .checked_add_months(Months::new(1))
            .map(|first| Self { first })
            .unwrap_or(*self)
    }

    /// Preceding month; stays put at the start of the representable range
    pub fn prev(&self) -> Self {
        self.first
            .checked_sub_months(Months::new(1))
            .map(|first| Self { first })
            .unwrap_or(*self)
    }

    /// e.g. "March 2024"
    pub fn label(&self) -> String {
        self.first.format("%B %Y").to_string()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month0() == self.month0()
    }
}

impl std::fmt::Display for MonthCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.first.format("%Y-%m"))
    }
}

// ============================================
// CELLS AND GRID
// ============================================

/// One day of the grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub in_current_month: bool,
    pub iso: String,
    pub has_event: bool,
    pub count: usize,
}

/// Build the weeks covering `month`, with per-day counts from `counts`
pub fn build_weeks(month: MonthCursor, counts: &HashMap<String, usize>) -> Vec<Vec<CalendarCell>> {
    let first = month.first_day();
    let last = month.last_day();

    let lead = first.weekday().num_days_from_monday() as u64;
    let trail = 6 - last.weekday().num_days_from_monday() as u64;

    let start = first
        .checked_sub_days(chrono::Days::new(lead))
        .unwrap_or(first);
    let end = last
        .checked_add_days(chrono::Days::new(trail))
        .unwrap_or(last);

    let cells: Vec<CalendarCell> = start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|date| {
            let iso = date.format(DAY_FORMAT).to_string();
            let count = counts.get(&iso).copied().unwrap_or(0);
            CalendarCell {
                date,
                in_current_month: month.contains(date),
                iso,
                has_event: count > 0,
                count,
            }
        })
        .collect();

    cells.chunks(7).map(|week| week.to_vec()).collect()
}

// ============================================
// VIEW
// ============================================

type DateSelectedHandler = Box<dyn Fn(&str) + Send + Sync>;

/// Month view over a set of dated records
pub struct CalendarView {
    month: MonthCursor,
    counts: HashMap<String, usize>,
    weeks: Vec<Vec<CalendarCell>>,
    selected: Option<String>,
    handlers: Vec<DateSelectedHandler>,
}

impl CalendarView {
    /// View of `month`, or of the current month when none is given
    pub fn new<R: DatedRecord>(records: &[R], month: Option<MonthCursor>) -> Self {
        let month = month.unwrap_or_else(MonthCursor::current);
        let counts = index_by_day(records);
        let weeks = build_weeks(month, &counts);
        Self {
            month,
            counts,
            weeks,
            selected: None,
            handlers: Vec::new(),
        }
    }

    /// View starting at `initial` (`YYYY-MM`); an unparseable value falls
    /// back to the current month
    pub fn with_initial_month<R: DatedRecord>(records: &[R], initial: Option<&str>) -> Self {
        let month = initial.and_then(|raw| {
            let parsed = MonthCursor::parse(raw);
            if parsed.is_none() {
                tracing::warn!(input = raw, "Ignoring invalid initial month");
            }
            parsed
        });
        Self::new(records, month)
    }

    /// Re-index and rebuild, keeping the displayed month
    pub fn set_records<R: DatedRecord>(&mut self, records: &[R]) {
        self.counts = index_by_day(records);
        self.rebuild();
    }

    pub fn month(&self) -> MonthCursor {
        self.month
    }

    pub fn month_label(&self) -> String {
        self.month.label()
    }

    pub fn weeks(&self) -> &[Vec<CalendarCell>] {
        &self.weeks
    }

    pub fn cells(&self) -> impl Iterator<Item = &CalendarCell> {
        self.weeks.iter().flatten()
    }

    pub fn count_for(&self, iso: &str) -> usize {
        self.counts.get(iso).copied().unwrap_or(0)
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn next_month(&mut self) {
        self.month = self.month.next();
        self.rebuild();
    }

    pub fn prev_month(&mut self) {
        self.month = self.month.prev();
        self.rebuild();
    }

    pub fn go_to(&mut self, month: MonthCursor) {
        self.month = month;
        self.rebuild();
    }

    /// Register a callback fired with the ISO key of each in-month selection
    pub fn on_date_selected<F>(&mut self, handler: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.handlers.push(Box::new(handler));
    }

    /// Select a cell. Cells outside the displayed month are ignored.
    pub fn select(&mut self, cell: &CalendarCell) -> Option<String> {
        if !cell.in_current_month {
            return None;
        }

        for handler in &self.handlers {
            handler(&cell.iso);
        }
        self.selected = Some(cell.iso.clone());
        Some(cell.iso.clone())
    }

    /// Select by date; `None` when the date is not in the displayed month
    pub fn select_date(&mut self, date: NaiveDate) -> Option<String> {
        let cell = self.cells().find(|c| c.date == date)?.clone();
        self.select(&cell)
    }

    fn rebuild(&mut self) {
        self.weeks = build_weeks(self.month, &self.counts);
    }
}
