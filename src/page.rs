//! Page request/result types carried through a paginated statement.

/// A logical pagination request attached to one SELECT.
///
/// Created per call and consumed once by the interceptor; never persisted.
/// Pages are 1-based, matching `offset = (current - 1) * size`.
///
/// # Example
///
/// ```
/// use sqlx_query_rewrite::PageRequest;
///
/// let page = PageRequest::new(3, 20);
/// assert_eq!(page.offset(), 40);
/// assert_eq!(page.limit(), 20);
/// assert!(page.search_count);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Current page, 1-based. Values below 1 are clamped to 1.
    pub current: i64,
    /// Rows per page. Values below 1 are clamped to 1.
    pub size: i64,
    /// Whether to run the count round trip before the main query.
    pub search_count: bool,
    /// Whether the count SQL may be derived by rewriting the select list
    /// instead of wrapping the statement in a subquery.
    pub optimize_count: bool,
}

impl PageRequest {
    /// Creates a request that counts the total with the optimized count path.
    pub fn new(current: i64, size: i64) -> Self {
        Self {
            current: current.max(1),
            size: size.max(1),
            search_count: true,
            optimize_count: true,
        }
    }

    /// Creates a request that skips the count round trip entirely.
    pub fn without_count(current: i64, size: i64) -> Self {
        Self {
            search_count: false,
            ..Self::new(current, size)
        }
    }

    /// Row offset of the first row on this page.
    pub fn offset(&self) -> i64 {
        (self.current - 1) * self.size
    }

    /// Row limit for this page.
    pub fn limit(&self) -> i64 {
        self.size
    }
}

/// Outcome of the count step for one paginated statement.
///
/// `total` stays at -1 until a count query succeeds; a failed count leaves it
/// unknown rather than reporting a stale zero. Mutated exactly once by the
/// count step, then read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    total: i64,
    request: PageRequest,
}

impl PageResult {
    pub fn new(request: PageRequest) -> Self {
        Self { total: -1, request }
    }

    /// Records the count result. If the requested page now lies past the last
    /// page and `overflow_reset` is set, the request restarts from page 1
    /// with the total re-attached.
    pub fn record_total(&mut self, total: i64, overflow_reset: bool) {
        self.total = total;
        if overflow_reset && self.request.current > self.pages() {
            self.request = PageRequest {
                current: 1,
                ..self.request.clone()
            };
        }
    }

    /// Total row count, -1 while unknown.
    pub fn total(&self) -> i64 {
        self.total
    }

    /// Whether a count query has completed successfully.
    pub fn total_known(&self) -> bool {
        self.total >= 0
    }

    /// Total page count derived from the total; 0 while the total is unknown
    /// or zero.
    pub fn pages(&self) -> i64 {
        if self.total <= 0 {
            return 0;
        }
        (self.total + self.request.size - 1) / self.request.size
    }

    /// The request this result answers, after any overflow reset.
    pub fn request(&self) -> &PageRequest {
        &self.request
    }
}
