//! Recursive descent over the JSON AST
//!
//! Each node is dispatched on its JSON shape:
//!
//! - list: operation (head is a whitelisted operator) or cast (any other head)
//! - string: field reference, resolved against the schema
//! - number, bool, null: literal, bound as a parameter
//! - object: rejected

use serde_json::Value as JsonValue;

use crate::error::{JelError, Result};
use crate::ops::{SqlOp, SqlOpSyntax};
use crate::schema::{RecordDescriptor, decode_record, resolve};
use crate::sql::{SqlBuilder, SqlExpr, SqlValue};

/// Compiles one root node against an optional schema
pub(crate) struct Decoder<'a> {
    pub(crate) schema: Option<&'a dyn RecordDescriptor>,
    pub(crate) node: &'a JsonValue,
    pub(crate) max_depth: usize,
}

impl SqlExpr for Decoder<'_> {
    fn append_to(&self, bui: &mut SqlBuilder) -> Result<()> {
        self.decode(bui, self.node, 0)
    }
}

impl Decoder<'_> {
    fn decode(&self, bui: &mut SqlBuilder, node: &JsonValue, depth: usize) -> Result<()> {
        match node {
            JsonValue::Object(_) => Err(JelError::UnexpectedObject {
                input: node.to_string(),
            }),
            JsonValue::Array(items) => self.decode_list(bui, items, depth + 1),
            JsonValue::String(name) => self.decode_string(bui, name),
            _ => {
                bui.append_param(SqlValue::from_json_literal(node));
                Ok(())
            }
        }
    }

    fn decode_list(&self, bui: &mut SqlBuilder, items: &[JsonValue], depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(JelError::TooDeep {
                max_depth: self.max_depth,
            });
        }

        let Some((head, args)) = items.split_first() else {
            return Err(JelError::EmptyList);
        };
        let JsonValue::String(name) = head else {
            return Err(JelError::invalid_input(format!(
                "first list element must be a string, found {}",
                head
            )));
        };

        match SqlOp::from_name(name) {
            Some(op) => self.decode_op(bui, op.as_str(), op.syntax(), args, depth),
            None => self.decode_cast(bui, name, args),
        }
    }

    fn decode_op(
        &self,
        bui: &mut SqlBuilder,
        name: &str,
        syntax: SqlOpSyntax,
        args: &[JsonValue],
        depth: usize,
    ) -> Result<()> {
        tracing::trace!(operator = name, syntax = %syntax, args = args.len(), "Decoding operation");

        match syntax {
            SqlOpSyntax::Prefix => {
                let [arg] = args else {
                    return Err(JelError::arity(name, "exactly 1", args.len()));
                };
                bui.append_literal("(");
                bui.append_literal(name);
                self.decode(bui, arg, depth)?;
                bui.append_literal(")");
            }

            SqlOpSyntax::Postfix => {
                let [arg] = args else {
                    return Err(JelError::arity(name, "exactly 1", args.len()));
                };
                bui.append_literal("(");
                self.decode(bui, arg, depth)?;
                bui.append_literal(name);
                bui.append_literal(")");
            }

            SqlOpSyntax::Infix => {
                if args.len() < 2 {
                    return Err(JelError::arity(name, "at least 2", args.len()));
                }
                bui.append_literal("(");
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        bui.append_literal(name);
                    }
                    self.decode(bui, arg, depth)?;
                }
                bui.append_literal(")");
            }

            // No arity check: any number of arguments, including none
            SqlOpSyntax::Function => {
                bui.append_literal(&format!("{}(", name));
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        bui.append_literal(",");
                    }
                    self.decode(bui, arg, depth)?;
                }
                bui.append_literal(")");
            }

            SqlOpSyntax::Any => {
                let [value, array] = args else {
                    return Err(JelError::arity(name, "exactly 2", args.len()));
                };
                bui.append_literal("(");
                self.decode(bui, value, depth)?;
                bui.append_literal("=");
                bui.append_literal("any(");
                self.decode(bui, array, depth)?;
                bui.append_literal(")");
                bui.append_literal(")");
            }

            SqlOpSyntax::Between => {
                let [value, lower, upper] = args else {
                    return Err(JelError::arity(name, "exactly 3", args.len()));
                };
                bui.append_literal("(");
                self.decode(bui, value, depth)?;
                bui.append_literal("between");
                self.decode(bui, lower, depth)?;
                bui.append_literal("and");
                self.decode(bui, upper, depth)?;
                bui.append_literal(")");
            }
        }
        Ok(())
    }

    /// `["field", literal]`: decodes the literal as the field's type
    fn decode_cast(&self, bui: &mut SqlBuilder, name: &str, args: &[JsonValue]) -> Result<()> {
        let [literal] = args else {
            return Err(JelError::CastArityMismatch {
                field: name.to_string(),
                found: args.len(),
            });
        };

        let resolved = resolve(self.schema, name)?;
        let field = resolved.field;
        let value = match (field.decode, field.nested) {
            (Some(decode), _) => decode(literal),
            (None, Some(record)) => decode_record(record, literal),
            (None, None) => {
                return Err(JelError::cast_decode(
                    name,
                    field.type_name,
                    "field does not accept literals",
                ));
            }
        }
        .map_err(|e| JelError::cast_decode(name, field.type_name, e))?;

        bui.append_param(value);
        Ok(())
    }

    fn decode_string(&self, bui: &mut SqlBuilder, name: &str) -> Result<()> {
        let resolved = resolve(self.schema, name)?;
        bui.append_literal(&resolved.path.to_sql());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::Record;
    use crate::schema::fixtures::External;

    fn compile(node: &JsonValue) -> Result<(String, Vec<SqlValue>)> {
        let decoder = Decoder {
            schema: Some(External::descriptor()),
            node,
            max_depth: 100,
        };
        let mut bui = SqlBuilder::new();
        decoder.append_to(&mut bui)?;
        Ok(bui.finish())
    }

    fn compile_function(args: JsonValue) -> (String, Vec<SqlValue>) {
        let decoder = Decoder {
            schema: Some(External::descriptor()),
            node: &JsonValue::Null,
            max_depth: 100,
        };
        let args = args.as_array().cloned().unwrap_or_default();
        let mut bui = SqlBuilder::new();
        decoder
            .decode_op(&mut bui, "coalesce", SqlOpSyntax::Function, &args, 1)
            .unwrap();
        bui.finish()
    }

    #[test]
    fn test_literals_in_order() {
        let (text, args) = compile(&json!(["and", true, 1, 2.5, null])).unwrap();
        assert_eq!(text, "($1 and $2 and $3 and $4)");
        assert_eq!(
            args,
            vec![
                SqlValue::Bool(true),
                SqlValue::Int(1),
                SqlValue::Float(2.5),
                SqlValue::Null
            ]
        );
    }

    #[test]
    fn test_prefix_and_postfix() {
        let (text, _) = compile(&json!(["not", ["is null", "externalName"]])).unwrap();
        assert_eq!(text, r#"(not ("external_name" is null))"#);

        let (text, _) = compile(&json!(["is not distinct from", "score", 1])).unwrap();
        assert_eq!(text, r#"("score" is not distinct from $1)"#);
    }

    #[test]
    fn test_any_and_between() {
        let (text, args) = compile(&json!(["any", "externalName", ["tags", ["a", "b"]]])).unwrap();
        assert_eq!(text, r#"("external_name" = any($1))"#);
        assert_eq!(
            args,
            vec![SqlValue::Array(vec!["a".into(), "b".into()])]
        );

        let (text, args) = compile(&json!(["between", "score", 1, 10])).unwrap();
        assert_eq!(text, r#"("score" between $1 and $2)"#);
        assert_eq!(args, vec![SqlValue::Int(1), SqlValue::Int(10)]);
    }

    #[test]
    fn test_function_form_without_arity_check() {
        let (text, args) = compile_function(json!(["externalName", 1]));
        assert_eq!(text, r#"coalesce("external_name", $1)"#);
        assert_eq!(args, vec![SqlValue::Int(1)]);

        let (text, args) = compile_function(json!([]));
        assert_eq!(text, "coalesce()");
        assert!(args.is_empty());
    }

    #[test]
    fn test_arity_errors() {
        assert_eq!(
            compile(&json!(["not", true, false])).unwrap_err(),
            JelError::arity("not", "exactly 1", 2)
        );
        assert_eq!(
            compile(&json!(["is null"])).unwrap_err(),
            JelError::arity("is null", "exactly 1", 0)
        );
        assert_eq!(
            compile(&json!(["=", 1])).unwrap_err(),
            JelError::arity("=", "at least 2", 1)
        );
        assert_eq!(
            compile(&json!(["any", 1, 2, 3])).unwrap_err(),
            JelError::arity("any", "exactly 2", 3)
        );
        assert_eq!(
            compile(&json!(["between", 1, 2])).unwrap_err(),
            JelError::arity("between", "exactly 3", 2)
        );
    }

    #[test]
    fn test_shape_errors() {
        assert_eq!(compile(&json!([])).unwrap_err(), JelError::EmptyList);
        assert_eq!(
            compile(&json!({"a": 1})).unwrap_err().code(),
            "UNEXPECTED_OBJECT"
        );
        assert_eq!(
            compile(&json!(["=", {"a": 1}, 1])).unwrap_err().code(),
            "UNEXPECTED_OBJECT"
        );
        assert_eq!(
            compile(&json!([1, 2])).unwrap_err().code(),
            "INVALID_INPUT"
        );
        assert_eq!(
            compile(&json!([["and", true, true]])).unwrap_err().code(),
            "INVALID_INPUT"
        );
    }

    #[test]
    fn test_cast_errors() {
        assert_eq!(
            compile(&json!(["externalName", "a", "b"])).unwrap_err(),
            JelError::CastArityMismatch {
                field: "externalName".into(),
                found: 2
            }
        );
        // Arity is checked before the field is resolved
        assert_eq!(
            compile(&json!(["doesNotExist"])).unwrap_err().code(),
            "CAST_ARITY_MISMATCH"
        );
        assert_eq!(
            compile(&json!(["like", "a"])).unwrap_err(),
            JelError::unknown_field("like", "External")
        );
        assert_eq!(
            compile(&json!(["score", "high"])).unwrap_err().code(),
            "CAST_DECODE_FAILURE"
        );
        assert!(matches!(
            compile(&json!(["internal", {"internalTime": "yesterday"}])).unwrap_err(),
            JelError::CastDecodeFailure { type_name, .. } if type_name == "Internal"
        ));
    }

    #[test]
    fn test_cast_uses_field_type() {
        let (text, args) = compile(&json!(["id", 7])).unwrap();
        assert_eq!(text, "$1");
        assert_eq!(args, vec![SqlValue::Int(7)]);

        let (_, args) = compile(&json!(["internal.internalTime", null])).unwrap();
        assert_eq!(args, vec![SqlValue::Null]);
    }

    #[test]
    fn test_cast_to_record_field() {
        let literal = json!({"internalTime": "2024-01-01T00:00:00Z"});
        let (text, args) = compile(&json!(["=", "internal", ["internal", literal]])).unwrap();
        assert_eq!(text, r#"("internal" = $1)"#);
        assert_eq!(args, vec![SqlValue::Json(literal)]);

        let (_, args) = compile(&json!(["internal", null])).unwrap();
        assert_eq!(args, vec![SqlValue::Null]);

        let history = json!([{"internalTime": null}, {}]);
        let (_, args) = compile(&json!(["history", history])).unwrap();
        assert_eq!(args, vec![SqlValue::Json(history)]);
    }

    #[test]
    fn test_cast_to_record_field_rejects_unknown_members() {
        for literal in [
            json!({"internal_time": null}),
            json!({"internalTime": 5}),
            json!("2024-01-01T00:00:00Z"),
        ] {
            let err = compile(&json!(["internal", literal])).unwrap_err();
            assert!(
                matches!(&err, JelError::CastDecodeFailure { field, type_name, .. }
                    if field == "internal" && type_name == "Internal"),
                "{:?}",
                err
            );
        }
    }

    #[test]
    fn test_depth_limit_during_decode() {
        let decoder = Decoder {
            schema: None,
            node: &json!(["not", ["not", ["not", true]]]),
            max_depth: 2,
        };
        let mut bui = SqlBuilder::new();
        assert_eq!(
            decoder.append_to(&mut bui).unwrap_err(),
            JelError::TooDeep { max_depth: 2 }
        );
    }

    #[test]
    fn test_untyped_literals_only() {
        let decoder = Decoder {
            schema: None,
            node: &json!(["<", 1, 2]),
            max_depth: 100,
        };
        let mut bui = SqlBuilder::new();
        decoder.append_to(&mut bui).unwrap();
        assert_eq!(bui.text(), "($1 < $2)");
    }
}
