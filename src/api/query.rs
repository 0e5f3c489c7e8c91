//! OData query descriptor
//!
//! Options are passed to the server verbatim; nothing here parses or
//! validates filter expressions.

/// Query options for listing a resource collection
///
/// Every option is optional; an absent (or empty) option means no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ODataQuery {
    pub expand: Option<String>,
    pub filter: Option<String>,
    pub select: Option<String>,
    pub order_by: Option<String>,
    pub top: Option<u64>,
    pub skip: Option<u64>,
    pub count: Option<bool>,
    /// Free-text keywords. Carried for callers but never sent; the backend
    /// exposes no keyword parameter.
    pub keywords: Option<String>,
}

impl ODataQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query carrying only a `$select`
    pub fn select_only(select: Option<&str>) -> Self {
        Self {
            select: select.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn expand(mut self, expand: impl Into<String>) -> Self {
        self.expand = Some(expand.into());
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn select(mut self, select: impl Into<String>) -> Self {
        self.select = Some(select.into());
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    pub fn top(mut self, top: u64) -> Self {
        self.top = Some(top);
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn count(mut self, count: bool) -> Self {
        self.count = Some(count);
        self
    }

    pub fn keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = Some(keywords.into());
        self
    }

    /// Translate into URL query parameters
    ///
    /// Order is fixed: `$select`, `$orderby`, `$expand`, `$filter`, `$top`,
    /// `$skip`, `$count`.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();

        let text_options = [
            ("$select", &self.select),
            ("$orderby", &self.order_by),
            ("$expand", &self.expand),
            ("$filter", &self.filter),
        ];
        for (name, value) in text_options {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                params.push((name, v.to_string()));
            }
        }

        if let Some(top) = self.top {
            params.push(("$top", top.to_string()));
        }
        if let Some(skip) = self.skip {
            params.push(("$skip", skip.to_string()));
        }
        if let Some(count) = self.count {
            params.push(("$count", count.to_string()));
        }

        params
    }

    pub fn is_empty(&self) -> bool {
        self.to_params().is_empty()
    }
}
