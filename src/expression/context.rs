use std::sync::Arc;

use dashmap::DashMap;

use crate::{Error, Value};

/// Resolves the names referenced by template expressions.
///
/// Implementations are shared between concurrent query executions and must not assume
/// exclusive access.
pub trait EvaluationContext: Send + Sync {
    /// Resolves `#name`.
    fn variable(&self, name: &str) -> Option<Value>;

    /// Resolves a bare `name` against the root object.
    #[allow(unused_variables)]
    fn property(&self, name: &str) -> Option<Value> {
        None
    }

    /// Invokes `#name(args...)`.
    fn call_function(&self, name: &str, args: &[Value]) -> Result<Value, Error> {
        Err(Error::Evaluation(format!(
            "function '#{}' with {} argument(s) cannot be resolved",
            name,
            args.len()
        )))
    }
}

/// A function callable from template expressions.
pub type Function = Arc<dyn Fn(&[Value]) -> Result<Value, Error> + Send + Sync>;

/// An [`EvaluationContext`] backed by maps that can be updated between query executions.
#[derive(Default)]
pub struct StandardEvaluationContext {
    variables: DashMap<String, Value>,
    properties: DashMap<String, Value>,
    functions: DashMap<String, Function>,
}

impl StandardEvaluationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_variable(&self, name: &str, value: impl Into<Value>) {
        self.variables.insert(name.to_string(), value.into());
    }

    pub fn remove_variable(&self, name: &str) -> Option<Value> {
        self.variables.remove(name).map(|(_, value)| value)
    }

    pub fn set_property(&self, name: &str, value: impl Into<Value>) {
        self.properties.insert(name.to_string(), value.into());
    }

    pub fn register_function<F>(&self, name: &str, function: F)
    where
        F: Fn(&[Value]) -> Result<Value, Error> + Send + Sync + 'static,
    {
        self.functions.insert(name.to_string(), Arc::new(function));
    }
}

impl EvaluationContext for StandardEvaluationContext {
    fn variable(&self, name: &str) -> Option<Value> {
        self.variables.get(name).map(|entry| entry.value().clone())
    }

    fn property(&self, name: &str) -> Option<Value> {
        self.properties.get(name).map(|entry| entry.value().clone())
    }

    fn call_function(&self, name: &str, args: &[Value]) -> Result<Value, Error> {
        // release the map guard before calling, functions may use the context themselves
        let function = self
            .functions
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::Evaluation(format!("function '#{}' cannot be resolved", name)))?;
        function(args)
    }
}

impl std::fmt::Debug for StandardEvaluationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardEvaluationContext")
            .field("variables", &self.variables)
            .field("properties", &self.properties)
            .field("functions", &self.functions.len())
            .finish()
    }
}
