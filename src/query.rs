use std::borrow::Cow;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use derive_builder::Builder;
use log::debug;

use crate::expression::{EvaluationContext, ParserContext, Template, TemplateParser};
use crate::statement::{build_statement, Argument};
use crate::tags::{extract_tags, TagLexing};
use crate::{Error, SpannerEntity, SpannerOperations, ToSpanner};

/// Describes the repository method a query is attached to.
///
/// ```
/// use spanner_query::QueryMethod;
///
/// let method = QueryMethod::builder()
///     .name("find_by_action")
///     .parameters(vec![Some("action".to_string())])
///     .build()
///     .unwrap();
/// assert_eq!(method.parameter_name(0), Some("action"));
/// ```
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
#[builder(setter(into), build_fn(error = "crate::Error"))]
pub struct QueryMethod {
    name: String,
    /// The binding name of each method parameter, `None` for parameters bound by position.
    #[builder(default)]
    parameters: Vec<Option<String>>,
}

impl QueryMethod {
    pub fn builder() -> QueryMethodBuilder {
        QueryMethodBuilder::default()
    }

    /// A method whose arguments are all bound by position.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parameters: vec![],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameter_name(&self, idx: usize) -> Option<&str> {
        self.parameters.get(idx).and_then(|name| name.as_deref())
    }
}

/// Options for parsing a query's text.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub parser_context: ParserContext,
    pub tag_lexing: TagLexing,
}

/// The protocol between a repository and the queries backing its methods.
#[async_trait]
pub trait RepositoryQuery: Send + Sync {
    type Output: Send;

    /// Runs the query with the method's call arguments.
    async fn execute(&self, args: &[&(dyn ToSpanner + Sync)]) -> Result<Self::Output, Error>;

    fn query_method(&self) -> &QueryMethod;
}

#[derive(Debug)]
enum SqlSource {
    Static,
    Dynamic(Template),
}

/// A repository query defined by SQL text with `@name` parameters and `#{...}` expressions.
///
/// Parameters are bound from the call arguments, expressions are evaluated against the
/// [`EvaluationContext`] on every execution.
pub struct SqlSpannerQuery<T, O> {
    query_method: QueryMethod,
    sql: String,
    tags: Vec<String>,
    source: SqlSource,
    evaluation_context: Arc<dyn EvaluationContext>,
    operations: Arc<O>,
    entity: PhantomData<fn() -> T>,
}

impl<T, O> SqlSpannerQuery<T, O>
where
    T: SpannerEntity,
    O: SpannerOperations,
{
    pub fn new(
        query_method: QueryMethod,
        sql: &str,
        operations: Arc<O>,
        evaluation_context: Arc<dyn EvaluationContext>,
    ) -> Result<Self, Error> {
        Self::with_options(
            query_method,
            sql,
            operations,
            evaluation_context,
            &QueryOptions::default(),
        )
    }

    pub fn with_options(
        query_method: QueryMethod,
        sql: &str,
        operations: Arc<O>,
        evaluation_context: Arc<dyn EvaluationContext>,
        options: &QueryOptions,
    ) -> Result<Self, Error> {
        let tags = extract_tags(sql, options.tag_lexing);
        let template = TemplateParser::new(options.parser_context.clone()).parse(sql)?;
        let source = if template.is_literal() {
            SqlSource::Static
        } else {
            SqlSource::Dynamic(template)
        };
        debug!(
            "created query for {} on {}: {} template with {} parameter(s)",
            query_method.name(),
            T::TABLE,
            if matches!(source, SqlSource::Static) {
                "static"
            } else {
                "dynamic"
            },
            tags.len()
        );

        Ok(Self {
            query_method,
            sql: sql.to_string(),
            tags,
            source,
            evaluation_context,
            operations,
            entity: PhantomData,
        })
    }

    /// The SQL to run now: the query text itself, or the evaluation of its template.
    pub fn sql(&self) -> Result<Cow<'_, str>, Error> {
        match &self.source {
            SqlSource::Static => Ok(Cow::Borrowed(&self.sql)),
            SqlSource::Dynamic(template) => template
                .evaluate(self.evaluation_context.as_ref())
                .map(Cow::Owned),
        }
    }

    /// The parameter names found in the query text, one per occurrence.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self.source, SqlSource::Dynamic(_))
    }

    fn arguments(&self, args: &[&(dyn ToSpanner + Sync)]) -> Result<Vec<Argument>, Error> {
        args.iter()
            .enumerate()
            .map(|(idx, arg)| {
                Ok(Argument {
                    name: self.query_method.parameter_name(idx).map(str::to_string),
                    value: arg.to_spanner()?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl<T, O> RepositoryQuery for SqlSpannerQuery<T, O>
where
    T: SpannerEntity,
    O: SpannerOperations,
{
    type Output = Vec<T>;

    async fn execute(&self, args: &[&(dyn ToSpanner + Sync)]) -> Result<Vec<T>, Error> {
        let statement = {
            let sql = self.sql()?;
            build_statement(&sql, &self.tags, &self.arguments(args)?)?
        };
        debug!(
            "executing {}: {} with {} parameter(s)",
            self.query_method.name(),
            statement.sql(),
            statement.params().len()
        );
        self.operations.find::<T>(&statement).await
    }

    fn query_method(&self) -> &QueryMethod {
        &self.query_method
    }
}

impl<T, O> std::fmt::Debug for SqlSpannerQuery<T, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlSpannerQuery")
            .field("query_method", &self.query_method)
            .field("sql", &self.sql)
            .field("tags", &self.tags)
            .field("source", &self.source)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_query_method_builder() {
        let method = QueryMethod::builder()
            .name("find_by_symbol_and_action")
            .parameters(vec![None, Some("action".to_string())])
            .build()
            .unwrap();
        assert_eq!(method.name(), "find_by_symbol_and_action");
        assert_eq!(method.parameter_name(0), None);
        assert_eq!(method.parameter_name(1), Some("action"));
        assert_eq!(method.parameter_name(2), None);
    }

    #[test]
    fn test_query_method_requires_name() {
        let result = QueryMethod::builder().build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_named() {
        let method = QueryMethod::named("count_by_action");
        assert_eq!(method.name(), "count_by_action");
        assert_eq!(method.parameter_name(0), None);
    }
}
