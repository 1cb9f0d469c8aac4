use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::{Error, ToSpanner, Value};

/// A SQL statement along with the values bound to its named parameters.
///
/// A parameter `@name` in the SQL text is bound under the key `name`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    sql: String,
    params: BTreeMap<String, Value>,
}

impl Statement {
    /// A statement without any parameters.
    pub fn of(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: BTreeMap::new(),
        }
    }

    /// Binds `value` to the parameter `name`, replacing any previous binding.
    pub fn bind(mut self, name: &str, value: &dyn ToSpanner) -> Result<Self, Error> {
        self.params.insert(name.to_string(), value.to_spanner()?);
        Ok(self)
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &BTreeMap<String, Value> {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }
}

/// A call argument destined to a query parameter.
///
/// Arguments carrying a name bind the placeholder of that name wherever it appears;
/// unnamed arguments bind placeholders by position.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: Option<String>,
    pub value: Value,
}

impl Argument {
    pub fn positional(value: Value) -> Self {
        Self { name: None, value }
    }

    pub fn named(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }
}

/// Binds `args` to the placeholders of `sql`, described by `tags` in order of appearance.
///
/// Occurrence `i` of tag `t` takes the argument named `t` when there is one, otherwise the
/// `i`-th argument if it is unnamed. When every argument is positional there must be exactly
/// one argument per tag occurrence. Every argument must bind at least one occurrence.
pub fn build_statement(sql: &str, tags: &[String], args: &[Argument]) -> Result<Statement, Error> {
    let has_named = args.iter().any(|arg| arg.name.is_some());
    if !has_named && args.len() != tags.len() {
        return Err(Error::Binding(format!(
            "the number of tags ({}) does not match the number of arguments ({})",
            tags.len(),
            args.len()
        )));
    }

    let mut params = BTreeMap::new();
    let mut consumed = vec![false; args.len()];
    for (idx, tag) in tags.iter().enumerate() {
        let arg_idx = args
            .iter()
            .position(|arg| arg.name.as_deref() == Some(tag.as_str()))
            .or_else(|| {
                args.get(idx)
                    .filter(|arg| arg.name.is_none())
                    .map(|_| idx)
            })
            .ok_or_else(|| {
                Error::Binding(format!(
                    "no argument can be bound to parameter @{} (occurrence {})",
                    tag, idx
                ))
            })?;
        consumed[arg_idx] = true;
        let value = &args[arg_idx].value;

        match params.entry(tag.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(value.clone());
            }
            Entry::Occupied(entry) if entry.get() != value => {
                return Err(Error::Binding(format!(
                    "parameter @{} is bound to conflicting values {:?} and {:?}",
                    tag,
                    entry.get(),
                    value
                )));
            }
            Entry::Occupied(_) => {}
        }
    }

    if let Some(unused) = consumed.iter().position(|used| !used) {
        return Err(Error::Binding(match &args[unused].name {
            Some(name) => format!("argument '{}' does not match any parameter", name),
            None => format!("argument {} does not match any parameter", unused),
        }));
    }

    Ok(Statement {
        sql: sql.to_string(),
        params,
    })
}

#[cfg(feature = "grpc")]
mod wire {
    use super::Statement;
    use google_api_proto::google::spanner::v1 as proto;

    impl Statement {
        pub(crate) fn proto_params(&self) -> prost_types::Struct {
            prost_types::Struct {
                fields: self
                    .params
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone().into()))
                    .collect(),
            }
        }

        pub(crate) fn proto_param_types<C>(&self) -> C
        where
            C: FromIterator<(String, proto::Type)>,
        {
            self.params
                .iter()
                .map(|(name, value)| (name.clone(), (&value.spanner_type()).into()))
                .collect()
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn tags(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_positional_binding() {
        let statement = build_statement(
            "SELECT * FROM trades WHERE action=@action",
            &tags(&["action"]),
            &[Argument::positional(Value::from("BUY"))],
        )
        .unwrap();
        assert_eq!(statement.sql(), "SELECT * FROM trades WHERE action=@action");
        assert_eq!(statement.params().len(), 1);
        assert_eq!(statement.param("action"), Some(&Value::from("BUY")));
    }

    #[test]
    fn test_no_tags_no_args() {
        let statement = build_statement("SELECT 1", &[], &[]).unwrap();
        assert!(statement.params().is_empty());
    }

    #[test]
    fn test_count_mismatch() {
        let result = build_statement(
            "SELECT * FROM trades WHERE action=@action",
            &tags(&["action"]),
            &[],
        );
        assert!(matches!(result, Err(Error::Binding(_))));

        let result = build_statement(
            "SELECT 1",
            &[],
            &[Argument::positional(Value::Int64(1))],
        );
        assert!(matches!(result, Err(Error::Binding(_))));
    }

    #[test]
    fn test_repeated_tag() {
        let sql = "SELECT * FROM t WHERE a=@a OR b=@b OR c=@a";
        let statement = build_statement(
            sql,
            &tags(&["a", "b", "a"]),
            &[
                Argument::positional(Value::Int64(1)),
                Argument::positional(Value::Int64(2)),
                Argument::positional(Value::Int64(1)),
            ],
        )
        .unwrap();
        assert_eq!(statement.params().len(), 2);
        assert_eq!(statement.param("a"), Some(&Value::Int64(1)));
        assert_eq!(statement.param("b"), Some(&Value::Int64(2)));

        let result = build_statement(
            sql,
            &tags(&["a", "b", "a"]),
            &[
                Argument::positional(Value::Int64(1)),
                Argument::positional(Value::Int64(2)),
                Argument::positional(Value::Int64(3)),
            ],
        );
        assert!(matches!(result, Err(Error::Binding(_))));
    }

    #[test]
    fn test_named_binding() {
        // named arguments bind every occurrence regardless of position
        let statement = build_statement(
            "SELECT * FROM t WHERE a=@a OR b=@b OR c=@a",
            &tags(&["a", "b", "a"]),
            &[
                Argument::named("b", Value::from("two")),
                Argument::named("a", Value::from("one")),
            ],
        )
        .unwrap();
        assert_eq!(statement.param("a"), Some(&Value::from("one")));
        assert_eq!(statement.param("b"), Some(&Value::from("two")));
    }

    #[test]
    fn test_unresolved_named_tag() {
        let result = build_statement(
            "SELECT * FROM t WHERE a=@a AND m=@missing",
            &tags(&["a", "missing"]),
            &[Argument::named("a", Value::Int64(1))],
        );
        assert!(matches!(result, Err(Error::Binding(_))));
    }

    #[test]
    fn test_unused_named_argument() {
        let result = build_statement(
            "SELECT * FROM trades WHERE action = @action",
            &tags(&["action"]),
            &[
                Argument::named("action", Value::from("BUY")),
                Argument::named("symbol", Value::from("stock1")),
            ],
        );
        match result {
            Err(Error::Binding(message)) => assert!(message.contains("symbol"), "{}", message),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_unused_positional_argument() {
        // the positional argument sits where the named one already bound @a
        let result = build_statement(
            "SELECT * FROM t WHERE a=@a",
            &tags(&["a"]),
            &[
                Argument::positional(Value::Int64(1)),
                Argument::named("a", Value::Int64(2)),
            ],
        );
        assert!(matches!(result, Err(Error::Binding(_))));
    }

    #[test]
    fn test_mixed_binding() {
        let statement = build_statement(
            "SELECT * FROM t WHERE a=@a AND b=@b",
            &tags(&["a", "b"]),
            &[
                Argument::positional(Value::Int64(1)),
                Argument::named("b", Value::Int64(2)),
            ],
        )
        .unwrap();
        assert_eq!(statement.param("a"), Some(&Value::Int64(1)));
        assert_eq!(statement.param("b"), Some(&Value::Int64(2)));
    }

    #[test]
    fn test_bind() {
        let statement = Statement::of("SELECT * FROM t WHERE a=@a")
            .bind("a", &42)
            .unwrap();
        assert_eq!(statement.param("a"), Some(&Value::Int64(42)));
    }
}
