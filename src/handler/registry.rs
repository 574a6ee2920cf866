use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::foundation::error::{CardError, CardResult};
use crate::handler::chain::{Handler, SharedHandler, handler_fn};
use crate::handler::request::Request;
use crate::handler::response::Response;

/// Monomorphized "deserialize the payload into a fresh handler" constructor.
pub type HandlerFactory = fn(&[u8]) -> serde_json::Result<SharedHandler>;

#[derive(Clone)]
enum Factory {
    /// One handler shared by every widget of the type.
    Direct(SharedHandler),
    /// A new handler decoded from each widget's payload.
    Typed(HandlerFactory),
}

/// Everything registered for one widget type.
#[derive(Clone)]
pub struct Registration {
    schema: Arc<Value>,
    factory: Factory,
}

impl Registration {
    pub fn schema(&self) -> &Arc<Value> {
        &self.schema
    }

    /// Produce the handler for one widget invocation.
    pub fn instantiate(&self, payload: &[u8], full_name: &str) -> CardResult<SharedHandler> {
        match &self.factory {
            Factory::Direct(handler) => Ok(Arc::clone(handler)),
            Factory::Typed(make) => make(payload).map_err(|e| {
                CardError::dispatch(format!(
                    "decoding widget {full_name:?} into its handler: {e}"
                ))
            }),
        }
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.factory {
            Factory::Direct(_) => "direct",
            Factory::Typed(_) => "typed",
        };
        f.debug_struct("Registration")
            .field("schema", &self.schema)
            .field("factory", &kind)
            .finish()
    }
}

fn decode<T>(payload: &[u8]) -> serde_json::Result<SharedHandler>
where
    T: Handler + serde::de::DeserializeOwned + 'static,
{
    Ok(Arc::new(serde_json::from_slice::<T>(payload)?))
}

/// Widget type name -> registration. Filled before a run, read-only during it.
#[derive(Clone, Debug, Default)]
pub struct HandlerRegistry {
    entries: HashMap<String, Registration>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler type decoded fresh from every widget payload.
    ///
    /// # Panics
    /// When `widget_type` is already registered.
    pub fn register_type<T>(&mut self, widget_type: &str, schema: Value)
    where
        T: Handler + serde::de::DeserializeOwned + 'static,
    {
        self.insert(widget_type, schema, Factory::Typed(decode::<T>));
    }

    /// Register one shared handler for every widget of `widget_type`.
    ///
    /// # Panics
    /// When `widget_type` is already registered.
    pub fn register_handler(&mut self, widget_type: &str, schema: Value, handler: SharedHandler) {
        self.insert(widget_type, schema, Factory::Direct(handler));
    }

    /// Register a plain function with an empty (accept-all) schema.
    ///
    /// # Panics
    /// When `widget_type` is already registered.
    pub fn register_func<F>(&mut self, widget_type: &str, f: F)
    where
        F: Fn(&mut dyn Response, &Request) + Send + Sync + 'static,
    {
        self.register_handler(widget_type, Value::Object(Default::default()), handler_fn(f));
    }

    fn insert(&mut self, widget_type: &str, schema: Value, factory: Factory) {
        if self.entries.contains_key(widget_type) {
            panic!("widget type {widget_type:?} is already registered");
        }
        self.entries.insert(
            widget_type.to_string(),
            Registration {
                schema: Arc::new(schema),
                factory,
            },
        );
    }

    pub fn get(&self, widget_type: &str) -> Option<&Registration> {
        self.entries.get(widget_type)
    }

    /// Look up and instantiate the handler for one widget.
    pub fn dispatch(
        &self,
        widget_type: &str,
        full_name: &str,
        payload: &[u8],
    ) -> CardResult<(SharedHandler, Arc<Value>)> {
        let reg = self.get(widget_type).ok_or_else(|| {
            CardError::dispatch(format!(
                "no handler found for widgets of type \"{widget_type}\" for widget path \"{full_name}\""
            ))
        })?;
        let handler = reg.instantiate(payload, full_name)?;
        Ok((handler, Arc::clone(&reg.schema)))
    }

    pub fn contains(&self, widget_type: &str) -> bool {
        self.entries.contains_key(widget_type)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered type names, sorted.
    pub fn types(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        out.sort_unstable();
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/handler/registry.rs"]
mod tests;
