//! Tool registry handed to an agent runtime.
//!
//! A tool is either provider-executed (run inside the model provider, nothing
//! local) or local (an async handler over typed input). Local tools are
//! executed by the runtime, never by the harness itself.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ProbeError, Result};

/// Typed access to tool call arguments.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: Value,
}

impl ToolArguments {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    pub fn raw(&self) -> &Value {
        &self.value
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str> {
        self.value
            .get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| ProbeError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    /// Deserialize the whole argument object into the tool's input type.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.value.clone())
            .map_err(|e| ProbeError::InvalidArgument(format!("Invalid tool arguments: {e}")))
    }
}

/// JSON Schema describing a local tool's input.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolParameters {
    pub schema: Value,
}

impl ToolParameters {
    pub fn empty() -> Self {
        Self::object().build()
    }

    /// Start an object schema.
    pub fn object() -> ParameterBuilder {
        ParameterBuilder {
            properties: serde_json::Map::new(),
            required: Vec::new(),
        }
    }
}

/// Builder for object schemas.
pub struct ParameterBuilder {
    properties: serde_json::Map<String, Value>,
    required: Vec<String>,
}

impl ParameterBuilder {
    pub fn string(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        self.property(name.into(), "string", description.into(), required);
        self
    }

    pub fn number(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        self.property(name.into(), "number", description.into(), required);
        self
    }

    fn property(&mut self, name: String, ty: &str, description: String, required: bool) {
        self.properties.insert(
            name.clone(),
            serde_json::json!({ "type": ty, "description": description }),
        );
        if required {
            self.required.push(name);
        }
    }

    pub fn build(self) -> ToolParameters {
        ToolParameters {
            schema: serde_json::json!({
                "type": "object",
                "properties": self.properties,
                "required": self.required,
            }),
        }
    }
}

/// A locally-executed tool.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (must match what the model calls).
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters(&self) -> &ToolParameters;

    async fn execute(&self, args: &ToolArguments) -> Result<Value>;
}

type ToolHandler =
    dyn Fn(ToolArguments) -> Pin<Box<dyn Future<Output = Result<Value>> + Send>> + Send + Sync;

/// Closure-backed [`Tool`].
pub struct LocalTool {
    name: String,
    description: String,
    parameters: ToolParameters,
    handler: Arc<ToolHandler>,
}

impl LocalTool {
    pub fn new<F, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: ToolParameters,
        handler: F,
    ) -> Self
    where
        F: Fn(ToolArguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler: Arc::new(move |args| Box::pin(handler(args))),
        }
    }
}

#[async_trait]
impl Tool for LocalTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &ToolParameters {
        &self.parameters
    }

    async fn execute(&self, args: &ToolArguments) -> Result<Value> {
        (self.handler)(args.clone()).await
    }
}

impl fmt::Debug for LocalTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

/// How a registered tool is executed.
#[derive(Clone)]
pub enum ToolSpec {
    /// Executed by the model provider; the caller only sees its result event.
    ProviderExecuted {
        provider_id: String,
        max_uses: Option<u32>,
    },
    Local(Arc<dyn Tool>),
}

impl ToolSpec {
    pub fn is_provider_executed(&self) -> bool {
        matches!(self, Self::ProviderExecuted { .. })
    }
}

impl fmt::Debug for ToolSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProviderExecuted {
                provider_id,
                max_uses,
            } => f
                .debug_struct("ProviderExecuted")
                .field("provider_id", provider_id)
                .field("max_uses", max_uses)
                .finish(),
            Self::Local(tool) => f.debug_tuple("Local").field(&tool.name()).finish(),
        }
    }
}

/// Tool name to [`ToolSpec`], iterated in name order.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, ToolSpec>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider-executed tool under `name`.
    pub fn with_provider_tool(
        mut self,
        name: impl Into<String>,
        provider_id: impl Into<String>,
        max_uses: Option<u32>,
    ) -> Self {
        self.tools.insert(
            name.into(),
            ToolSpec::ProviderExecuted {
                provider_id: provider_id.into(),
                max_uses,
            },
        );
        self
    }

    /// Register a local tool under its own name.
    pub fn with_local(mut self, tool: impl Tool + 'static) -> Self {
        self.tools
            .insert(tool.name().to_string(), ToolSpec::Local(Arc::new(tool)));
        self
    }

    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.keys().map(String::as_str)
    }

    pub fn is_provider_executed(&self, name: &str) -> bool {
        self.get(name).is_some_and(ToolSpec::is_provider_executed)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run a local tool. Provider-executed and unknown tools are errors.
    pub async fn execute_local(&self, name: &str, args: &ToolArguments) -> Result<Value> {
        match self.get(name) {
            Some(ToolSpec::Local(tool)) => tool.execute(args).await,
            Some(ToolSpec::ProviderExecuted { .. }) => Err(ProbeError::ToolExecution {
                tool_name: name.to_string(),
                message: "provider-executed tools have no local execute".to_string(),
            }),
            None => Err(ProbeError::ToolExecution {
                tool_name: name.to_string(),
                message: "tool is not registered".to_string(),
            }),
        }
    }
}
