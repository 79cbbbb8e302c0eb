//! Query parameter builders for list and get operations.

use std::fmt;

/// VDOM scope for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Apply to a single virtual domain (`vdom=<name>`).
    Vdom(String),

    /// Apply to the global configuration (`global=1`).
    Global,
}

impl Scope {
    pub(crate) fn pair(&self) -> (&'static str, String) {
        match self {
            Scope::Vdom(v) => ("vdom", v.clone()),
            Scope::Global => ("global", "1".to_string()),
        }
    }
}

/// Comparison operator in a FortiOS `filter` expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Case-insensitive equality (`==`).
    Eq,
    /// Negated equality (`!=`).
    Ne,
    /// Pattern containment (`=@`).
    Contains,
    /// Negated containment (`!@`).
    NotContains,
    /// Less than or equal (`<=`).
    Le,
    /// Greater than or equal (`>=`).
    Ge,
    /// Less than (`<`).
    Lt,
    /// Greater than (`>`).
    Gt,
}

impl FilterOp {
    fn as_str(self) -> &'static str {
        match self {
            FilterOp::Eq => "==",
            FilterOp::Ne => "!=",
            FilterOp::Contains => "=@",
            FilterOp::NotContains => "!@",
            FilterOp::Le => "<=",
            FilterOp::Ge => ">=",
            FilterOp::Lt => "<",
            FilterOp::Gt => ">",
        }
    }
}

/// A single `filter` expression (`<field><op><value>`).
///
/// Commas separate OR-branches on the wire, so literal commas in the
/// value are escaped with a backslash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    field: String,
    op: FilterOp,
    value: String,
}

impl Filter {
    /// Build a filter from its parts.
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// `field == value`
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    /// `field != value`
    pub fn ne(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOp::Ne, value)
    }

    /// `field` contains `value`
    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOp::Contains, value)
    }

    /// `field` does not contain `value`
    pub fn not_contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOp::NotContains, value)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let escaped = self.value.replace('\\', "\\\\").replace(',', "\\,");
        write!(f, "{}{}{}", self.field, self.op.as_str(), escaped)
    }
}

/// Query parameters for list and get operations.
///
/// # Example
///
/// ```rust
/// use fortirest::{Filter, Query};
///
/// let query = Query::new()
///     .filter(Filter::eq("type", "ipmask"))
///     .format(["name", "subnet"])
///     .count(100);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Query {
    filters: Vec<Filter>,
    format: Vec<String>,
    start: Option<u64>,
    count: Option<u64>,
    with_meta: bool,
    skip: bool,
    action: Option<String>,
    scope: Option<Scope>,
    extra: Vec<(String, String)>,
}

impl Query {
    /// Create an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `filter` expression. Repeatable; multiple filters AND together.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Restrict returned fields (`format=f1|f2|...`).
    pub fn format<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.format = fields.into_iter().map(Into::into).collect();
        self
    }

    /// First entry to return (`start`).
    pub fn start(mut self, start: u64) -> Self {
        self.start = Some(start);
        self
    }

    /// Maximum number of entries to return (`count`).
    pub fn count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    /// Include object metadata in the results (`with_meta=1`).
    pub fn with_meta(mut self) -> Self {
        self.with_meta = true;
        self
    }

    /// Strip skipped properties from the results (`skip=1`).
    pub fn skip(mut self) -> Self {
        self.skip = true;
        self
    }

    /// Set the `action` parameter (e.g. "schema", "default").
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Scope the request to a VDOM, overriding the client default.
    pub fn vdom(mut self, vdom: impl Into<String>) -> Self {
        self.scope = Some(Scope::Vdom(vdom.into()));
        self
    }

    /// Scope the request to the global configuration.
    pub fn global(mut self) -> Self {
        self.scope = Some(Scope::Global);
        self
    }

    /// Add an arbitrary query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }

    pub(crate) fn scope(&self) -> Option<&Scope> {
        self.scope.as_ref()
    }

    /// Render the query as URL parameter pairs, in stable order.
    pub(crate) fn pairs(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for f in &self.filters {
            out.push(("filter".to_string(), f.to_string()));
        }
        if !self.format.is_empty() {
            out.push(("format".to_string(), self.format.join("|")));
        }
        if let Some(start) = self.start {
            out.push(("start".to_string(), start.to_string()));
        }
        if let Some(count) = self.count {
            out.push(("count".to_string(), count.to_string()));
        }
        if self.with_meta {
            out.push(("with_meta".to_string(), "1".to_string()));
        }
        if self.skip {
            out.push(("skip".to_string(), "1".to_string()));
        }
        if let Some(action) = &self.action {
            out.push(("action".to_string(), action.clone()));
        }
        out.extend(self.extra.iter().cloned());
        out
    }
}
