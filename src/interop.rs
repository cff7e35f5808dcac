//! Named entry points invoked as `Class.Method` from the command line.
//!
//! The registry is built once at startup from a static list, so lookup is a
//! plain map access.

use indexmap::IndexMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;
use tracing::{error, info};

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = anyhow::Result<T>>>>;

/// A zero-argument entry point and the kind of result it produces. Integer
/// results become the process exit code, which Unix truncates to 8 bits.
#[derive(Clone, Copy)]
pub enum Method {
    Unit(fn() -> anyhow::Result<()>),
    Int(fn() -> anyhow::Result<i32>),
    AsyncUnit(fn() -> BoxFuture<()>),
    AsyncInt(fn() -> BoxFuture<i32>),
}

impl Method {
    /// Run to completion and map the result to an exit code.
    fn call(self) -> anyhow::Result<i32> {
        match self {
            Method::Unit(f) => f().map(|_| 0),
            Method::Int(f) => f(),
            Method::AsyncUnit(f) => pollster::block_on(f()).map(|_| 0),
            Method::AsyncInt(f) => pollster::block_on(f()),
        }
    }
}

/// Icon shown next to a method in listings: a collection's type name and the
/// icon's raw value in that collection's generated enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodIcon {
    pub collection: String,
    pub raw_value: u32,
}

impl MethodIcon {
    pub fn new(collection: impl Into<String>, raw_value: u32) -> Self {
        Self {
            collection: collection.into(),
            raw_value,
        }
    }
}

/// A registered method plus its display metadata.
#[derive(Clone)]
pub struct MethodEntry {
    pub method: Method,
    pub title: Option<String>,
    pub icon: Option<MethodIcon>,
}

impl MethodEntry {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            title: None,
            icon: None,
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_icon(mut self, icon: MethodIcon) -> Self {
        self.icon = Some(icon);
        self
    }
}

impl From<Method> for MethodEntry {
    fn from(method: Method) -> Self {
        Self::new(method)
    }
}

/// One line of a registry listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub key: String,
    pub title: Option<String>,
    pub icon: Option<MethodIcon>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvokeError {
    #[error("No method specified")]
    Missing,

    #[error("Method should be given as 'Class.Method', got '{0}'")]
    BadFormat(String),

    #[error("Class not found: {class} (available: {})", .available.join(", "))]
    UnknownClass {
        class: String,
        available: Vec<String>,
    },

    #[error("Method '{method}' not found on class '{class}' (available: {})", .available.join(", "))]
    UnknownMethod {
        class: String,
        method: String,
        available: Vec<String>,
    },

    #[error("Method '{0}' registered twice")]
    Duplicate(String),
}

#[derive(Default)]
pub struct MethodRegistry {
    classes: IndexMap<String, IndexMap<String, MethodEntry>>,
}

fn split_key(key: &str) -> Result<(&str, &str), InvokeError> {
    match key.split('.').collect::<Vec<_>>().as_slice() {
        [class, method] if !class.is_empty() && !method.is_empty() => Ok((*class, *method)),
        _ => Err(InvokeError::BadFormat(key.to_string())),
    }
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a static `(key, entry)` list.
    pub fn from_entries<E>(entries: impl IntoIterator<Item = (&'static str, E)>) -> Result<Self, InvokeError>
    where
        E: Into<MethodEntry>,
    {
        let mut registry = Self::new();
        for (key, entry) in entries {
            registry.register(key, entry)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, key: &str, entry: impl Into<MethodEntry>) -> Result<(), InvokeError> {
        let (class, name) = split_key(key)?;
        let methods = self.classes.entry(class.to_string()).or_default();
        if methods.contains_key(name) {
            return Err(InvokeError::Duplicate(key.to_string()));
        }
        methods.insert(name.to_string(), entry.into());
        Ok(())
    }

    /// Every registered key, in registration order.
    pub fn keys(&self) -> Vec<String> {
        self.classes
            .iter()
            .flat_map(|(class, methods)| methods.keys().map(move |m| format!("{class}.{m}")))
            .collect()
    }

    /// Every registered method with its title and icon, in registration order.
    pub fn listing(&self) -> Vec<MethodInfo> {
        self.classes
            .iter()
            .flat_map(|(class, methods)| {
                methods.iter().map(move |(name, entry)| MethodInfo {
                    key: format!("{class}.{name}"),
                    title: entry.title.clone(),
                    icon: entry.icon.clone(),
                })
            })
            .collect()
    }

    pub fn resolve(&self, key: &str) -> Result<Method, InvokeError> {
        let (class, name) = split_key(key)?;
        let methods = self
            .classes
            .get(class)
            .ok_or_else(|| InvokeError::UnknownClass {
                class: class.to_string(),
                available: self.classes.keys().cloned().collect(),
            })?;

        methods
            .get(name)
            .map(|entry| entry.method)
            .ok_or_else(|| InvokeError::UnknownMethod {
                class: class.to_string(),
                method: name.to_string(),
                available: methods.keys().cloned().collect(),
            })
    }

    /// Resolve `args[0]` and run it. Lookup failures are `Err`; a failing
    /// method is `Ok(Err(..))`.
    pub fn invoke(&self, args: &[String]) -> Result<anyhow::Result<i32>, InvokeError> {
        let key = args.first().ok_or(InvokeError::Missing)?;
        if key.starts_with('-') {
            return Err(InvokeError::BadFormat(key.clone()));
        }
        let method = self.resolve(key)?;
        Ok(method.call())
    }

    /// `invoke` with logging; returns the process exit code.
    pub fn run(&self, args: &[String]) -> i32 {
        let started = Instant::now();
        info!("Invoking: {}", args.join(" "));

        let code = match self.invoke(args) {
            Ok(Ok(code)) => code,
            Ok(Err(e)) => {
                error!("Method invocation failed");
                for (depth, cause) in e.chain().enumerate() {
                    error!("  {}: {}", depth, cause);
                }
                1
            }
            Err(e) => {
                error!("{}", e);
                error!("Methods are zero-argument entry points returning (), i32, or a future of either");
                1
            }
        };

        info!(
            "Completed in {} ms with exit code {}: {}",
            started.elapsed().as_millis(),
            code,
            args.join(" ")
        );
        code
    }
}
