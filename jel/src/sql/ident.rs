//! Quoted SQL identifier paths

use std::fmt;

use crate::error::{JelError, Result};

/// Non-empty path of storage identifiers addressing a (possibly nested) column.
///
/// Every segment is checked on construction: it must be non-empty and must
/// not contain a double quote. Rendering is therefore infallible:
///
/// ```text
/// ["one"]               -> "one"
/// ["one", "two"]        -> ("one")."two"
/// ["one", "two", "six"] -> ("one")."two"."six"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn new<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(JelError::invalid_path(""));
        }
        for segment in &segments {
            validate_ident(segment)?;
        }
        Ok(Self(segments))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Appends the quoted path to `out`
    pub fn write_sql(&self, out: &mut String) {
        let Some((first, rest)) = self.0.split_first() else {
            return;
        };
        if rest.is_empty() {
            push_quoted(out, first);
            return;
        }
        out.push('(');
        push_quoted(out, first);
        out.push(')');
        for segment in rest {
            out.push('.');
            push_quoted(out, segment);
        }
    }

    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

fn validate_ident(ident: &str) -> Result<()> {
    if ident.is_empty() || ident.contains('"') {
        return Err(JelError::InvalidIdentifier {
            ident: ident.to_string(),
        });
    }
    Ok(())
}

fn push_quoted(out: &mut String, ident: &str) {
    out.push('"');
    out.push_str(ident);
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singular_path() {
        let path = FieldPath::new(["one"]).unwrap();
        assert_eq!(path.to_sql(), r#""one""#);
    }

    #[test]
    fn test_binary_path() {
        let path = FieldPath::new(["one", "two"]).unwrap();
        assert_eq!(path.to_sql(), r#"("one")."two""#);
    }

    #[test]
    fn test_plural_path_parenthesizes_first_segment_only() {
        let path = FieldPath::new(["one", "two", "three"]).unwrap();
        assert_eq!(path.to_string(), r#"("one")."two"."three""#);
    }

    #[test]
    fn test_rejects_quote_in_identifier() {
        let err = FieldPath::new(["ok", "bad\"col"]).unwrap_err();
        assert_eq!(
            err,
            JelError::InvalidIdentifier {
                ident: "bad\"col".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_empty() {
        assert!(FieldPath::new(Vec::<String>::new()).is_err());
        assert!(matches!(
            FieldPath::new([""]),
            Err(JelError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn test_segments_preserved() {
        let path = FieldPath::new(vec!["internal".to_string(), "internal_time".to_string()]).unwrap();
        assert_eq!(path.segments(), ["internal", "internal_time"]);
    }
}
