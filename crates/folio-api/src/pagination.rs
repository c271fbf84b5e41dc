//! Pagination request parameters
//!
//! Two incompatible protocols are supported:
//! - page-based: `page` (1-based) + `size`, optional `sortBy`
//! - token-based: opaque server-issued `pageToken` + string `pageSize`, optional `orderBy`
//!
//! A resource uses exactly one of them for the lifetime of an engine.

use std::collections::BTreeMap;

/// Extra query filters (e.g. `isFavorite=true`), rendered in key order.
pub type Filters = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationParams {
    Page {
        page: u32,
        size: u32,
        sort_by: Option<String>,
        filters: Filters,
    },
    Token {
        page_token: Option<String>,
        page_size: String,
        order_by: Option<String>,
        filters: Filters,
    },
}

impl PaginationParams {
    /// Page-based params. `page` and `size` are clamped to at least 1.
    pub fn page(page: u32, size: u32) -> Self {
        PaginationParams::Page {
            page: page.max(1),
            size: size.max(1),
            sort_by: None,
            filters: Filters::new(),
        }
    }

    /// Token-based params for the first page.
    pub fn token(page_size: u32) -> Self {
        PaginationParams::Token {
            page_token: None,
            page_size: page_size.max(1).to_string(),
            order_by: None,
            filters: Filters::new(),
        }
    }

    /// Set `sortBy` (page-based) or `orderBy` (token-based).
    pub fn with_ordering(mut self, ordering: Option<String>) -> Self {
        match &mut self {
            PaginationParams::Page { sort_by, .. } => *sort_by = ordering,
            PaginationParams::Token { order_by, .. } => *order_by = ordering,
        }
        self
    }

    pub fn with_page_token(mut self, token: Option<String>) -> Self {
        if let PaginationParams::Token { page_token, .. } = &mut self {
            *page_token = token;
        }
        self
    }

    pub fn with_filters(mut self, new_filters: Filters) -> Self {
        match &mut self {
            PaginationParams::Page { filters, .. } | PaginationParams::Token { filters, .. } => {
                *filters = new_filters
            }
        }
        self
    }

    pub fn is_page_based(&self) -> bool {
        matches!(self, PaginationParams::Page { .. })
    }

    pub fn filters(&self) -> &Filters {
        match self {
            PaginationParams::Page { filters, .. } | PaginationParams::Token { filters, .. } => {
                filters
            }
        }
    }

    /// Query pairs in wire order: protocol params first, then filters.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        match self {
            PaginationParams::Page {
                page,
                size,
                sort_by,
                ..
            } => {
                pairs.push(("page".to_string(), page.to_string()));
                pairs.push(("size".to_string(), size.to_string()));
                if let Some(sort_by) = sort_by {
                    pairs.push(("sortBy".to_string(), sort_by.clone()));
                }
            }
            PaginationParams::Token {
                page_token,
                page_size,
                order_by,
                ..
            } => {
                if let Some(token) = page_token {
                    pairs.push(("pageToken".to_string(), token.clone()));
                }
                pairs.push(("pageSize".to_string(), page_size.clone()));
                if let Some(order_by) = order_by {
                    pairs.push(("orderBy".to_string(), order_by.clone()));
                }
            }
        }
        pairs.extend(
            self.filters()
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        pairs
    }
}
