//! Templated SQL repository queries for the Cloud Spanner database.
//!
//! A [`SqlSpannerQuery`] turns SQL text written for a repository method into a bound
//! [`Statement`] on every call:
//!
//! * `@name` placeholders are bound from the method's call arguments, either by position or by
//!   the parameter names recorded in the [`QueryMethod`];
//! * `#{...}` segments are expressions evaluated against an [`EvaluationContext`] on every
//!   execution, which allows e.g.: the table name to be chosen at runtime.
//!
//! The statement is then handed to a store implementing [`SpannerOperations`].
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "grpc")]
//! # mod example {
//! use std::sync::Arc;
//! use spanner_query::*;
//!
//! struct Trade {
//!     symbol: String,
//!     action: String,
//! }
//!
//! impl SpannerEntity for Trade {
//!     const TABLE: &'static str = "trades";
//!
//!     fn columns() -> &'static [&'static str] {
//!         &["symbol", "action"]
//!     }
//!
//!     fn key_columns() -> &'static [&'static str] {
//!         &["symbol", "action"]
//!     }
//!
//!     fn to_values(&self) -> Result<Vec<Value>, Error> {
//!         Ok(vec![self.symbol.as_str().into(), self.action.as_str().into()])
//!     }
//!
//!     fn from_row(row: &Row) -> Result<Self, Error> {
//!         Ok(Trade {
//!             symbol: row.get("symbol")?,
//!             action: row.get("action")?,
//!         })
//!     }
//! }
//!
//! async fn buys() -> Result<Vec<Trade>, Error> {
//!     let template = Config::builder()
//!         .project("my-gcp-project")
//!         .instance("my-instance")
//!         .database("my-database")
//!         .connect()
//!         .await?;
//!
//!     let context = Arc::new(StandardEvaluationContext::new());
//!     context.set_variable("table", "trades");
//!
//!     let query: SqlSpannerQuery<Trade, _> = SqlSpannerQuery::new(
//!         QueryMethod::named("find_by_action"),
//!         "SELECT * FROM #{#table} WHERE action = @action",
//!         Arc::new(template),
//!         context,
//!     )?;
//!
//!     query.execute(&[&"BUY"]).await
//! }
//! # }
//! ```
//!
//! # Templates
//!
//! Expressions support string, number and boolean literals, `#variable` references, `#function(...)`
//! calls, bare root properties, indexing, arithmetic, comparison, boolean operators, the ternary
//! operator and the elvis operator (`a ?: b`). See [`TemplateParser`].
//!
//! ## Placeholders inside quotes
//!
//! By default, `@` inside quoted literals (e.g.: `'admin@example.com'`) is not a placeholder. Use
//! [`TagLexing::Naive`] through [`QueryOptions`] to treat every `@` as a placeholder.
//!
//! # Cloud Spanner
//!
//! The `grpc` feature provides [`SpannerTemplate`], a [`SpannerOperations`] implementation
//! talking to Cloud Spanner or its emulator. Authentication uses the `gcp_auth` crate which
//! supports several authentication methods.

pub use crate::error::Error;
pub use crate::expression::*;
pub use crate::from_spanner::*;
pub use crate::keys::*;
pub use crate::operations::*;
pub use crate::query::*;
pub use crate::result_set::*;
pub use crate::statement::*;
pub use crate::tags::*;
pub use crate::to_spanner::*;
pub use crate::types::*;
pub use crate::value::*;

#[cfg(feature = "grpc")]
pub use crate::config::*;
#[cfg(feature = "grpc")]
pub(crate) use crate::connection::Connection;
#[cfg(feature = "grpc")]
pub use crate::resource::*;
#[cfg(feature = "grpc")]
pub(crate) use crate::session::*;
#[cfg(feature = "grpc")]
pub use crate::template::*;
#[cfg(feature = "grpc")]
pub use crate::transaction::TimestampBound;
#[cfg(feature = "grpc")]
pub(crate) use crate::transaction::TransactionSelector;

mod error;
mod expression;
mod from_spanner;
mod keys;
mod operations;
mod query;
mod result_set;
mod statement;
mod tags;
mod to_spanner;
mod types;
mod value;

#[cfg(feature = "grpc")]
mod auth;
#[cfg(feature = "grpc")]
mod config;
#[cfg(feature = "grpc")]
mod connection;
#[cfg(feature = "grpc")]
mod resource;
#[cfg(feature = "grpc")]
mod session;
#[cfg(feature = "grpc")]
mod template;
#[cfg(feature = "grpc")]
mod transaction;
