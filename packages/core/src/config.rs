//! Resolver configuration.

/// Limits applied by a [`Resolver`](crate::resolve::Resolver).
///
/// Built in code; the core reads no environment variables.
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `max_pages` | `1000` | Pages one list traversal may fetch before failing with `PageLimitExceeded` |
/// | `max_concurrent_edges` | `8` | Edges `expand_all` traverses at once |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Upper bound on pages fetched by a single traversal. Guards against
    /// producers that mint fresh page URIs forever, which the visited set
    /// cannot catch.
    pub max_pages: usize,

    /// How many edges [`DocumentGraph::expand_all`](crate::resolve::DocumentGraph::expand_all)
    /// traverses concurrently. Values below 1 are treated as 1.
    pub max_concurrent_edges: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_pages: 1000,
            max_concurrent_edges: 8,
        }
    }
}

impl ResolverConfig {
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_max_concurrent_edges(mut self, n: usize) -> Self {
        self.max_concurrent_edges = n;
        self
    }
}
