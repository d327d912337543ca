//! Built-in function library.
//!
//! Names and arities come from `acta_ir::builtins`, which the analyzer
//! checks against too. Only `print` needs the interpreter; everything else
//! is a pure function of its arguments.

use std::rc::Rc;

use acta_ir::builtins::lookup_builtin;
use acta_ir::Span;

use super::Interpreter;
use crate::errors::{fail, EvalErrorKind, EvalResult, WithSpan};
use crate::relational::{HierarchicalTree, NodeId};
use crate::temporal;
use crate::value::{NodeRef, ValueKind};
use crate::Value;

type BuiltinResult = Result<Value, EvalErrorKind>;

impl Interpreter<'_> {
    pub(crate) fn call_builtin(&mut self, name: &'static str, args: Vec<Value>, span: Span) -> EvalResult {
        let Some(builtin) = lookup_builtin(name) else {
            return fail(EvalErrorKind::UndefinedFunction(name.to_string()), span);
        };
        if !builtin.accepts(args.len()) {
            return fail(
                EvalErrorKind::ArityMismatch {
                    name: name.to_string(),
                    expected: builtin.min_args,
                    found: args.len(),
                },
                span,
            );
        }

        if name == "print" {
            let line = args
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" ");
            self.print_handler.println(&line);
            return Ok(Value::Null);
        }
        call_pure(name, args).at(span)
    }
}

fn argument_error(name: &'static str, message: impl Into<String>) -> EvalErrorKind {
    EvalErrorKind::BuiltinArgument {
        name,
        message: message.into(),
    }
}

fn expected(name: &'static str, what: &str, found: &Value) -> EvalErrorKind {
    argument_error(name, format!("expected {what}, found {}", found.kind()))
}

fn count(n: usize) -> Value {
    Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

fn node_list(tree: &Rc<HierarchicalTree>, ids: impl IntoIterator<Item = NodeId>) -> Value {
    Value::array(
        ids.into_iter()
            .map(|id| {
                Value::Node(NodeRef {
                    tree: Rc::clone(tree),
                    id,
                })
            })
            .collect(),
    )
}

fn call_pure(name: &'static str, args: Vec<Value>) -> BuiltinResult {
    let mut args = args.into_iter();
    let mut next = || args.next().unwrap_or(Value::Null);

    match name {
        "len" => match next() {
            Value::Array(array) => Ok(count(array.elements.len())),
            Value::Str(text) => Ok(count(text.chars().count())),
            Value::SqlResult(result) => Ok(count(result.len())),
            Value::Table(table) => Ok(count(table.borrow().len())),
            Value::Tree(tree) => Ok(count(tree.len())),
            Value::Null => Ok(Value::Int(0)),
            other => Err(argument_error(
                name,
                format!("cannot take the length of {}", other.kind()),
            )),
        },
        "append" => {
            let (target, element) = (next(), next());
            match target {
                Value::Array(mut array) => {
                    if let Some(size) = array.size {
                        if array.elements.len() >= size {
                            return Err(EvalErrorKind::FixedSizeArray { size });
                        }
                    }
                    array.elements.push(element);
                    Ok(Value::Array(array))
                }
                Value::Null => Ok(Value::array(vec![element])),
                other => Err(expected(name, "an array", &other)),
            }
        }
        "now" => Ok(Value::Time(temporal::now())),
        "today" => Ok(Value::Date(temporal::today())),
        "string" => Ok(Value::Str(next().to_string())),
        "abs" => match next() {
            Value::Int(n) => n
                .checked_abs()
                .map(Value::Int)
                .ok_or(EvalErrorKind::IntegerOverflow("abs")),
            Value::Float(x) => Ok(Value::Float(x.abs())),
            Value::Duration(d) => Ok(Value::Duration(d.abs())),
            Value::Null => Ok(Value::Null),
            other => Err(expected(name, "a number or duration", &other)),
        },
        "columns" => {
            let columns = match next() {
                Value::Table(table) => table.borrow().column_names(),
                Value::SqlResult(result) => result.columns.clone(),
                other => return Err(expected(name, "a table or query result", &other)),
            };
            Ok(Value::array(columns.into_iter().map(Value::Str).collect()))
        }
        "hierarchy" => {
            let (source, key, parent) = (next(), next(), next());
            let (Value::Str(key), Value::Str(parent)) = (&key, &parent) else {
                return Err(argument_error(name, "key and parent columns must be strings"));
            };
            let (label, result) = match &source {
                Value::Table(table) => {
                    let table = table.borrow();
                    (table.name().to_string(), table.to_result_set())
                }
                Value::SqlResult(result) => ("query result".to_string(), (**result).clone()),
                other => return Err(expected(name, "a table or query result", other)),
            };
            let tree = HierarchicalTree::build(&label, &result.columns, &result.rows, key, parent)?;
            Ok(Value::Tree(Rc::new(tree)))
        }
        "roots" => match next() {
            Value::Tree(tree) => Ok(node_list(&tree, tree.roots().iter().copied())),
            other => Err(expected(name, "a tree", &other)),
        },
        "children" => match next() {
            Value::Node(node) => Ok(node_list(&node.tree, node.tree.children(node.id).iter().copied())),
            Value::Tree(tree) => Ok(node_list(&tree, tree.roots().iter().copied())),
            other => Err(expected(name, "a node", &other)),
        },
        "parent" => match next() {
            Value::Node(node) => Ok(match node.tree.parent(node.id) {
                Some(id) => Value::Node(NodeRef { tree: node.tree, id }),
                None => Value::Null,
            }),
            other => Err(expected(name, "a node", &other)),
        },
        "level" => match next() {
            Value::Node(node) => Ok(count(node.tree.level(node.id))),
            other => Err(expected(name, "a node", &other)),
        },
        "traverse" => match next() {
            Value::Tree(tree) => Ok(node_list(&tree, tree.traverse())),
            Value::Node(node) => Ok(node_list(&node.tree, node.tree.preorder(node.id))),
            other => Err(expected(name, "a tree or node", &other)),
        },
        _ => Err(EvalErrorKind::NotCallable(ValueKind::Builtin)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_len_counts_characters() {
        assert_eq!(call_pure("len", vec![Value::string("héllo")]), Ok(Value::Int(5)));
    }

    #[test]
    fn test_append_respects_fixed_size() {
        let fixed = Value::Array(crate::value::ArrayValue {
            elements: vec![Value::Int(1)],
            element_type: Some("integer".to_string()),
            size: Some(1),
        });
        assert_eq!(
            call_pure("append", vec![fixed, Value::Int(2)]),
            Err(EvalErrorKind::FixedSizeArray { size: 1 })
        );
        assert_eq!(
            call_pure("append", vec![Value::array(vec![]), Value::Int(2)]),
            Ok(Value::array(vec![Value::Int(2)]))
        );
    }

    #[test]
    fn test_abs_of_minimum_integer_overflows() {
        assert_eq!(
            call_pure("abs", vec![Value::Int(i64::MIN)]),
            Err(EvalErrorKind::IntegerOverflow("abs"))
        );
    }

    #[test]
    fn test_string_renders_display_form() {
        assert_eq!(
            call_pure("string", vec![Value::Float(2.0)]),
            Ok(Value::string("2.0"))
        );
    }
}
