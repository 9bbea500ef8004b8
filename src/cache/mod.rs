//! Startup List Cache
//!
//! Presents "all startups" as one cached, name-sorted list while the backend
//! only serves fixed-size pages.
//!
//! ## Load sequence
//!
//! 1. Fetch page 0 with limit P
//! 2. While the last page held exactly P items, fetch the next one at
//!    `skip = pages_fetched * P`
//! 3. A failed page counts as an empty page: the loop stops and earlier
//!    pages are kept
//! 4. Concatenate in fetch order, then sort by name
//!
//! All callers that arrive while a load is running await the same shared
//! future, so one pagination sequence serves every one of them.

use async_trait::async_trait;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::cmp::Ordering;
use std::sync::{Arc, Mutex, MutexGuard};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::api::dto::StartupSummary;
use crate::transport::ApiResult;

/// Default page size used by the portal
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// The cached aggregate. Cheap to clone; clones point at the same list.
pub type StartupList = Arc<Vec<StartupSummary>>;

type SharedLoad = Shared<BoxFuture<'static, StartupList>>;

/// Anything that can serve one page of startups
#[async_trait]
pub trait StartupSource: Send + Sync {
    async fn fetch_page(&self, skip: u32, limit: u32) -> ApiResult<Vec<StartupSummary>>;
}

/// Read-through cache over a paginated startup source
pub struct StartupCache {
    source: Arc<dyn StartupSource>,
    page_size: u32,
    slot: Mutex<Option<SharedLoad>>,
}

impl StartupCache {
    /// Create a cache. A page size of 0 is treated as 1.
    pub fn new(source: Arc<dyn StartupSource>, page_size: u32) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            slot: Mutex::new(None),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// All startups, sorted by name.
    ///
    /// Starts the load on a miss; otherwise joins the running load or returns
    /// the completed one. Never fails: failed pages only shorten the list.
    pub async fn get_all(&self) -> StartupList {
        let load = {
            let mut slot = self.lock_slot();
            slot.get_or_insert_with(|| self.start_load()).clone()
        };
        load.await
    }

    /// Drop the cached aggregate and install a fresh load.
    ///
    /// A load already running is not cancelled. Whoever awaits it still gets
    /// its result, but the cache slot belongs to the newest load.
    pub fn refresh(&self) {
        let load = self.start_load();
        *self.lock_slot() = Some(load);
        tracing::debug!("Startup cache refreshed");
    }

    /// `refresh` followed by `get_all`
    pub async fn reload(&self) -> StartupList {
        self.refresh();
        self.get_all().await
    }

    /// Completed aggregate, if any, without starting or awaiting a load
    pub fn cached(&self) -> Option<StartupList> {
        self.lock_slot().as_ref().and_then(|load| load.peek().cloned())
    }

    fn start_load(&self) -> SharedLoad {
        load_all(Arc::clone(&self.source), self.page_size)
            .boxed()
            .shared()
    }

    // Only held to clone or swap the shared future, never across an await
    fn lock_slot(&self) -> MutexGuard<'_, Option<SharedLoad>> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

async fn load_all(source: Arc<dyn StartupSource>, page_size: u32) -> StartupList {
    let mut all = Vec::new();
    let mut pages: u32 = 0;

    loop {
        let skip = pages.saturating_mul(page_size);
        let page = match source.fetch_page(skip, page_size).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(skip, limit = page_size, error = %e, "Startup page failed, keeping partial list");
                Vec::new()
            }
        };
        pages += 1;

        let full = page.len() == page_size as usize;
        tracing::debug!(skip, items = page.len(), "Fetched startup page");
        all.extend(page);

        if !full {
            break;
        }
    }

    sort_by_name(&mut all);
    tracing::info!(count = all.len(), pages, "Startup list loaded");
    Arc::new(all)
}

/// Locale-style ascending order.
///
/// Letters compare first without accents or case (`École` sits with `E`),
/// then unaccented before accented, then lowercase before uppercase. Ties
/// fall back to the raw name.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(&base_letters(b))
        .then_with(|| folded(a).cmp(&folded(b)))
        .then_with(|| case_mask(a).cmp(case_mask(b)))
        .then_with(|| a.cmp(b))
}

/// Lowercased, with combining marks removed after canonical decomposition
fn base_letters(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Lowercased, accents kept as combining marks
fn folded(name: &str) -> String {
    name.nfd().flat_map(char::to_lowercase).collect()
}

fn case_mask(name: &str) -> impl Iterator<Item = bool> + '_ {
    name.chars().map(char::is_uppercase)
}

/// Stable sort of startups by display name
pub fn sort_by_name(startups: &mut [StartupSummary]) {
    startups.sort_by(|a, b| compare_names(&a.name, &b.name));
}
