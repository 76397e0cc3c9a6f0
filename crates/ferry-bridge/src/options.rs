//! Bridge configuration

use std::fmt;
use std::sync::Arc;

use ferry_sdk::{Exception, Fault, Value};

/// Default bound on how deeply nested values are translated
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Receives a rebuilt exception in the caller's context; its return value
/// becomes the outcome of the intercepted call
pub type ExceptionHook = Arc<dyn Fn(Exception) -> Result<Value, Fault> + Send + Sync>;

/// Options for creating a proxy
#[derive(Clone)]
pub struct BridgeOptions {
    /// Maximum nesting depth of translated values
    pub max_depth: usize,

    /// Optional handler for exceptions escaping the delegate
    pub exception_hook: Option<ExceptionHook>,

    /// Whether proxies created while translating arguments and return values
    /// inherit `exception_hook`
    pub propagate_hook: bool,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            exception_hook: None,
            propagate_hook: false,
        }
    }
}

impl BridgeOptions {
    /// Create options with an exception hook
    pub fn with_hook<F>(hook: F) -> Self
    where
        F: Fn(Exception) -> Result<Value, Fault> + Send + Sync + 'static,
    {
        Self {
            exception_hook: Some(Arc::new(hook)),
            ..Default::default()
        }
    }

    /// Create options with a translation depth limit
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Default::default()
        }
    }

    /// Let nested proxies inherit the exception hook
    pub fn propagating(mut self) -> Self {
        self.propagate_hook = true;
        self
    }

    /// Options handed to proxies created during translation
    pub(crate) fn nested(&self) -> Self {
        Self {
            max_depth: self.max_depth,
            exception_hook: if self.propagate_hook {
                self.exception_hook.clone()
            } else {
                None
            },
            propagate_hook: self.propagate_hook,
        }
    }
}

impl fmt::Debug for BridgeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeOptions")
            .field("max_depth", &self.max_depth)
            .field("exception_hook", &self.exception_hook.is_some())
            .field("propagate_hook", &self.propagate_hook)
            .finish()
    }
}
