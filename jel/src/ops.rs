//! Whitelist of allowed SQL operations
//!
//! Describes how Lisp-style calls are turned into SQL expressions (prefix,
//! infix, etc.). The set is closed: anything not listed here is not an
//! operator, and the decoder treats such a list head as a cast target.

use std::fmt;

use serde::Serialize;

/// Syntax used to render a whitelisted operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlOpSyntax {
    Prefix,
    Postfix,
    Infix,
    Function,
    Any,
    Between,
}

impl SqlOpSyntax {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Prefix => "prefix",
            Self::Postfix => "postfix",
            Self::Infix => "infix",
            Self::Function => "function",
            Self::Any => "any",
            Self::Between => "between",
        }
    }
}

impl fmt::Display for SqlOpSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whitelisted SQL operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SqlOp {
    #[serde(rename = "and")]
    And,
    #[serde(rename = "or")]
    Or,
    #[serde(rename = "not")]
    Not,
    #[serde(rename = "is null")]
    IsNull,
    #[serde(rename = "is not null")]
    IsNotNull,
    #[serde(rename = "is true")]
    IsTrue,
    #[serde(rename = "is not true")]
    IsNotTrue,
    #[serde(rename = "is false")]
    IsFalse,
    #[serde(rename = "is not false")]
    IsNotFalse,
    #[serde(rename = "is unknown")]
    IsUnknown,
    #[serde(rename = "is not unknown")]
    IsNotUnknown,
    #[serde(rename = "is distinct from")]
    IsDistinctFrom,
    #[serde(rename = "is not distinct from")]
    IsNotDistinctFrom,
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "~")]
    Match,
    #[serde(rename = "~*")]
    MatchInsensitive,
    #[serde(rename = "~=")]
    SameAs,
    #[serde(rename = "<>")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "@@")]
    TextSearch,
    #[serde(rename = "any")]
    Any,
    #[serde(rename = "between")]
    Between,
}

impl SqlOp {
    /// Every whitelisted operation, in documentation order
    pub const ALL: [SqlOp; 25] = [
        Self::And,
        Self::Or,
        Self::Not,
        Self::IsNull,
        Self::IsNotNull,
        Self::IsTrue,
        Self::IsNotTrue,
        Self::IsFalse,
        Self::IsNotFalse,
        Self::IsUnknown,
        Self::IsNotUnknown,
        Self::IsDistinctFrom,
        Self::IsNotDistinctFrom,
        Self::Eq,
        Self::Match,
        Self::MatchInsensitive,
        Self::SameAs,
        Self::Ne,
        Self::Lt,
        Self::Gt,
        Self::Gte,
        Self::Lte,
        Self::TextSearch,
        Self::Any,
        Self::Between,
    ];

    /// Exact, case-sensitive lookup. `None` means "not an operator".
    pub fn from_name(name: &str) -> Option<Self> {
        let op = match name {
            "and" => Self::And,
            "or" => Self::Or,
            "not" => Self::Not,
            "is null" => Self::IsNull,
            "is not null" => Self::IsNotNull,
            "is true" => Self::IsTrue,
            "is not true" => Self::IsNotTrue,
            "is false" => Self::IsFalse,
            "is not false" => Self::IsNotFalse,
            "is unknown" => Self::IsUnknown,
            "is not unknown" => Self::IsNotUnknown,
            "is distinct from" => Self::IsDistinctFrom,
            "is not distinct from" => Self::IsNotDistinctFrom,
            "=" => Self::Eq,
            "~" => Self::Match,
            "~*" => Self::MatchInsensitive,
            "~=" => Self::SameAs,
            "<>" => Self::Ne,
            "<" => Self::Lt,
            ">" => Self::Gt,
            ">=" => Self::Gte,
            "<=" => Self::Lte,
            "@@" => Self::TextSearch,
            "any" => Self::Any,
            "between" => Self::Between,
            _ => return None,
        };
        Some(op)
    }

    /// SQL spelling of the operation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::IsNull => "is null",
            Self::IsNotNull => "is not null",
            Self::IsTrue => "is true",
            Self::IsNotTrue => "is not true",
            Self::IsFalse => "is false",
            Self::IsNotFalse => "is not false",
            Self::IsUnknown => "is unknown",
            Self::IsNotUnknown => "is not unknown",
            Self::IsDistinctFrom => "is distinct from",
            Self::IsNotDistinctFrom => "is not distinct from",
            Self::Eq => "=",
            Self::Match => "~",
            Self::MatchInsensitive => "~*",
            Self::SameAs => "~=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lte => "<=",
            Self::TextSearch => "@@",
            Self::Any => "any",
            Self::Between => "between",
        }
    }

    pub fn syntax(&self) -> SqlOpSyntax {
        match self {
            Self::Not => SqlOpSyntax::Prefix,
            Self::IsNull
            | Self::IsNotNull
            | Self::IsTrue
            | Self::IsNotTrue
            | Self::IsFalse
            | Self::IsNotFalse
            | Self::IsUnknown
            | Self::IsNotUnknown => SqlOpSyntax::Postfix,
            Self::Any => SqlOpSyntax::Any,
            Self::Between => SqlOpSyntax::Between,
            Self::And
            | Self::Or
            | Self::IsDistinctFrom
            | Self::IsNotDistinctFrom
            | Self::Eq
            | Self::Match
            | Self::MatchInsensitive
            | Self::SameAs
            | Self::Ne
            | Self::Lt
            | Self::Gt
            | Self::Gte
            | Self::Lte
            | Self::TextSearch => SqlOpSyntax::Infix,
        }
    }
}

impl fmt::Display for SqlOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Syntax form for an operator name, if whitelisted
pub fn lookup(name: &str) -> Option<SqlOpSyntax> {
    SqlOp::from_name(name).map(|op| op.syntax())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitelist_round_trips_names() {
        for op in SqlOp::ALL {
            assert_eq!(SqlOp::from_name(op.as_str()), Some(op));
        }
    }

    #[test]
    fn test_whitelist_syntax_forms() {
        assert_eq!(lookup("and"), Some(SqlOpSyntax::Infix));
        assert_eq!(lookup("or"), Some(SqlOpSyntax::Infix));
        assert_eq!(lookup("not"), Some(SqlOpSyntax::Prefix));
        assert_eq!(lookup("is not unknown"), Some(SqlOpSyntax::Postfix));
        assert_eq!(lookup("is not distinct from"), Some(SqlOpSyntax::Infix));
        assert_eq!(lookup("@@"), Some(SqlOpSyntax::Infix));
        assert_eq!(lookup("any"), Some(SqlOpSyntax::Any));
        assert_eq!(lookup("between"), Some(SqlOpSyntax::Between));
    }

    #[test]
    fn test_unknown_names_are_not_operators() {
        assert_eq!(lookup("AND"), None);
        assert_eq!(lookup("is  null"), None);
        assert_eq!(lookup("like"), None);
        assert_eq!(lookup("someField"), None);
        assert_eq!(lookup(""), None);
    }

    #[test]
    fn test_no_function_entries() {
        assert!(
            SqlOp::ALL
                .iter()
                .all(|op| op.syntax() != SqlOpSyntax::Function)
        );
    }

    #[test]
    fn test_serialize_uses_sql_names() {
        let json = serde_json::to_string(&SqlOp::IsNotDistinctFrom).unwrap();
        assert_eq!(json, r#""is not distinct from""#);
        let json = serde_json::to_string(&SqlOpSyntax::Postfix).unwrap();
        assert_eq!(json, r#""postfix""#);
    }
}
