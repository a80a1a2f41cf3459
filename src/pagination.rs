//! Conversion of `page` / `perPage` query parameters into bounded offset/limit pairs.
//!
//! Raw values arrive as strings and are coerced, never rejected: anything that is not a
//! finite number falls back to the default, fractions are floored and the result is
//! clamped into `page >= 1`, `1 <= perPage <= cap`.

/// Per-endpoint pagination defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageLimits {
    pub default_per_page: i64,
    pub max_per_page: i64,
}

impl PageLimits {
    pub const fn new(default_per_page: i64, max_per_page: i64) -> Self {
        Self {
            default_per_page,
            max_per_page,
        }
    }
}

/// Resolved pagination bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn resolve(page: Option<&str>, per_page: Option<&str>, limits: PageLimits) -> Self {
        let page = coerce(page).unwrap_or(1).max(1);
        let per_page = coerce(per_page)
            .unwrap_or(limits.default_per_page)
            .clamp(1, limits.max_per_page.max(1));
        Self { page, per_page }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    /// Number of pages needed for `count` rows; zero rows yield zero pages.
    pub fn total_pages(&self, count: i64) -> i64 {
        if count <= 0 {
            0
        } else {
            (count + self.per_page - 1) / self.per_page
        }
    }
}

/// Lenient numeric parse: trims, accepts decimals and floors them.
pub fn coerce(raw: Option<&str>) -> Option<i64> {
    let value = raw?.trim().parse::<f64>().ok()?;
    if !value.is_finite() {
        return None;
    }
    // `as` saturates at the i64 bounds.
    Some(value.floor() as i64)
}
