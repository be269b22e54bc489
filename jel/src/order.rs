//! ORDER BY directives
//!
//! Parses client orderings such as `["externalName asc", "internal.internalTime desc"]`
//! into structured [`Order`] items, resolving every path against the record
//! schema, and renders them as
//! `order by "external_name" asc, ("internal")."internal_time" desc`.
//!
//! Direction keywords are case-insensitive. Anything else (`nulls last`,
//! extra words, missing direction) is rejected.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::de::{self, Deserialize, DeserializeSeed, Deserializer};

use crate::core::CompileLimits;
use crate::error::{JelError, Result};
use crate::schema::{DOTTED_PATH, Record, RecordDescriptor, resolve};
use crate::sql::{FieldPath, SqlBuilder, SqlExpr};

/// Single ordering term: `"col" asc` or `("a")."b" desc`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub path: FieldPath,
    pub desc: bool,
}

impl Order {
    pub fn asc(path: FieldPath) -> Self {
        Self { path, desc: false }
    }

    pub fn desc(path: FieldPath) -> Self {
        Self { path, desc: true }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}",
            self.path,
            if self.desc { "desc" } else { "asc" }
        )
    }
}

/// Ordered sequence of [`Order`] terms. Empty renders as no ordering.
#[derive(Clone)]
pub struct Orders<'s> {
    items: Vec<Order>,
    schema: Option<&'s dyn RecordDescriptor>,
    max_orderings: usize,
}

impl<'s> Orders<'s> {
    /// Empty orderings that parse against `schema`
    pub fn new(schema: Option<&'s dyn RecordDescriptor>) -> Self {
        Self {
            items: Vec::new(),
            schema,
            max_orderings: CompileLimits::default().max_orderings,
        }
    }

    pub fn for_record<R: Record>() -> Orders<'static> {
        Orders::new(Some(R::descriptor()))
    }

    /// Orderings built in code, without a schema
    pub fn from_items(items: impl IntoIterator<Item = Order>) -> Orders<'static> {
        let mut orders = Orders::new(None);
        orders.items.extend(items);
        orders
    }

    pub fn with_limits(mut self, limits: CompileLimits) -> Self {
        self.max_orderings = limits.max_orderings;
        self
    }

    /// Replaces the items with the parsed directives. On error the items
    /// are left unchanged.
    pub fn parse_slice<S: AsRef<str>>(&mut self, directives: &[S]) -> Result<()> {
        if directives.len() > self.max_orderings {
            return Err(JelError::TooManyOrderings {
                count: directives.len(),
                max: self.max_orderings,
            });
        }

        let items = directives
            .iter()
            .map(|directive| self.parse_order(directive.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(count = items.len(), "Parsed orderings");
        self.items = items;
        Ok(())
    }

    /// Parses a JSON array of directive strings, e.g. from a request body
    pub fn parse_json(&mut self, json: &str) -> Result<()> {
        let directives: Vec<String> =
            serde_json::from_str(json).map_err(|e| JelError::invalid_input(e.to_string()))?;
        self.parse_slice(directives.as_slice())
    }

    fn parse_order(&self, directive: &str) -> Result<Order> {
        let captures = ordering_regex()
            .captures(directive)
            .ok_or_else(|| JelError::InvalidOrderingSyntax {
                input: directive.to_string(),
            })?;

        let resolved = resolve(self.schema, &captures[1])?;
        Ok(Order {
            path: resolved.path,
            desc: captures[2].eq_ignore_ascii_case("desc"),
        })
    }

    pub fn push(&mut self, order: Order) {
        self.items.push(order);
    }

    /// Uses `fallback` when no orderings were given
    pub fn or_else(mut self, fallback: impl IntoIterator<Item = Order>) -> Self {
        if self.items.is_empty() {
            self.items = fallback.into_iter().collect();
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Order] {
        &self.items
    }
}

impl fmt::Debug for Orders<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orders")
            .field("items", &self.items)
            .field("schema", &self.schema.map(|s| s.type_name()))
            .field("max_orderings", &self.max_orderings)
            .finish()
    }
}

impl fmt::Display for Orders<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, order) in self.items.iter().enumerate() {
            if i == 0 {
                f.write_str("order by ")?;
            } else {
                f.write_str(", ")?;
            }
            write!(f, "{}", order)?;
        }
        Ok(())
    }
}

/// Parses a JSON array of directives straight from a deserializer, so a
/// configured `Orders` can decode a field of a larger payload.
impl<'de, 's> DeserializeSeed<'de> for Orders<'s> {
    type Value = Orders<'s>;

    fn deserialize<D>(mut self, deserializer: D) -> std::result::Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        let directives = Vec::<String>::deserialize(deserializer)?;
        self.parse_slice(directives.as_slice()).map_err(de::Error::custom)?;
        Ok(self)
    }
}

impl SqlExpr for Orders<'_> {
    fn append_to(&self, bui: &mut SqlBuilder) -> Result<()> {
        bui.append_literal(&self.to_string());
        Ok(())
    }
}

fn ordering_regex() -> &'static Regex {
    static RE_ORDERING: OnceLock<Regex> = OnceLock::new();
    RE_ORDERING.get_or_init(|| {
        Regex::new(&format!(
            r"^({})[\t\n\x0C\r ]+(?i-u:(asc|desc))$",
            DOTTED_PATH
        ))
        .expect("Invalid regex")
    })
}
