//! Objects and the dynamic call interface
//!
//! Every object, whether a plain [`Object`] built from a class's registered
//! method table or a bridge proxy, is reached through the [`Instance`] trait.
//! `Instance::call` is the one dispatch entry point; `invoke` and
//! `invoke_any` select a signature by name and arguments first.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::context::Context;
use crate::error::{BridgeError, BridgeResult, Fault};
use crate::exception::TraceFrame;
use crate::types::{MethodSig, TypeRef};
use crate::value::{FromValue, Value};

/// Shared handle to any object
pub type ObjectRef = Arc<dyn Instance>;

/// Registered method body
pub type MethodBody = Arc<dyn Fn(&CallFrame<'_>) -> Result<Value, Fault> + Send + Sync>;

/// An object living in one context.
///
/// Implementations must be safe to call from several threads at once.
pub trait Instance: Send + Sync {
    /// Runtime type of the object
    fn runtime_type(&self) -> &TypeRef;

    /// Context the object lives in
    fn context(&self) -> &Arc<Context>;

    /// Call the method with exactly this signature
    fn call(&self, method: &MethodSig, args: Vec<Value>) -> Result<Value, Fault>;

    /// Downcast support
    fn as_any(&self) -> &dyn Any;

    /// Call a public method, selecting the overload by name and arguments
    fn invoke(&self, name: &str, args: Vec<Value>) -> Result<Value, Fault> {
        let sig = self
            .context()
            .select_method(self.runtime_type(), name, &args, false)?;
        self.call(&sig, args)
    }

    /// Call any method, private ones included, selecting the overload by
    /// name and arguments
    fn invoke_any(&self, name: &str, args: Vec<Value>) -> Result<Value, Fault> {
        let sig = self
            .context()
            .select_method(self.runtime_type(), name, &args, true)?;
        self.call(&sig, args)
    }
}

impl fmt::Debug for dyn Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Instance({} in {})",
            self.runtime_type().name(),
            self.context().name()
        )
    }
}

// ============================================================================
// CallFrame
// ============================================================================

/// What a method body sees while it runs
pub struct CallFrame<'a> {
    this: &'a Object,
    method: &'a MethodSig,
    args: &'a [Value],
}

impl<'a> CallFrame<'a> {
    /// The receiver
    pub fn this(&self) -> &'a Object {
        self.this
    }

    /// The receiver's context
    pub fn context(&self) -> &'a Arc<Context> {
        &self.this.context
    }

    /// Signature being executed
    pub fn method(&self) -> &'a MethodSig {
        self.method
    }

    /// All arguments
    pub fn args(&self) -> &'a [Value] {
        self.args
    }

    /// Argument at index
    pub fn arg(&self, index: usize) -> BridgeResult<&'a Value> {
        self.args.get(index).ok_or_else(|| {
            BridgeError::ArgumentError(format!(
                "{} has no argument {}",
                self.method.name(),
                index
            ))
        })
    }

    /// Argument at index converted to a Rust type
    pub fn arg_as<T: FromValue>(&self, index: usize) -> BridgeResult<T> {
        T::from_value(self.arg(index)?)
    }

    /// Build a fault raising an exception of the named type in this context
    pub fn raise(&self, type_name: &str, message: impl Into<String>) -> Fault {
        match self.context().exception(type_name, message) {
            Ok(e) => Fault::Thrown(e),
            Err(err) => Fault::Bridge(err),
        }
    }
}

// ============================================================================
// Object
// ============================================================================

/// Instance of a registered class
pub struct Object {
    class: TypeRef,
    context: Arc<Context>,
    fields: RwLock<FxHashMap<String, Value>>,
}

impl Object {
    /// Create an instance of the named class with every declared field null
    pub fn new(context: &Arc<Context>, class_name: &str) -> BridgeResult<Self> {
        let class = context.resolve_type(class_name)?;
        if class.as_class().is_none() {
            return Err(BridgeError::mismatch(
                format!("class '{}'", class_name),
                class.kind().label(),
            ));
        }
        let fields = context
            .fields_of(&class)?
            .into_iter()
            .map(|name| (name, Value::Null))
            .collect();
        Ok(Self {
            class,
            context: context.clone(),
            fields: RwLock::new(fields),
        })
    }

    /// Create a shared instance of the named class
    pub fn instantiate(context: &Arc<Context>, class_name: &str) -> BridgeResult<Arc<Self>> {
        Self::new(context, class_name).map(Arc::new)
    }

    /// Set a field while building
    pub fn with_field(self, name: &str, value: impl Into<Value>) -> BridgeResult<Self> {
        self.set_field(name, value)?;
        Ok(self)
    }

    /// Wrap into a value
    pub fn into_value(self) -> Value {
        Value::Object(Arc::new(self))
    }

    /// Read a field, whatever its visibility
    pub fn field(&self, name: &str) -> BridgeResult<Value> {
        self.fields
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| self.no_such_field(name))
    }

    /// Write a field, whatever its visibility
    pub fn set_field(&self, name: &str, value: impl Into<Value>) -> BridgeResult<()> {
        let mut fields = self.fields.write();
        match fields.get_mut(name) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(self.no_such_field(name)),
        }
    }

    fn no_such_field(&self, name: &str) -> BridgeError {
        BridgeError::NoSuchField {
            type_name: self.class.name().to_string(),
            field: name.to_string(),
        }
    }
}

impl Instance for Object {
    fn runtime_type(&self) -> &TypeRef {
        &self.class
    }

    fn context(&self) -> &Arc<Context> {
        &self.context
    }

    fn call(&self, method: &MethodSig, args: Vec<Value>) -> Result<Value, Fault> {
        if args.len() != method.arity() {
            return Err(BridgeError::ArityMismatch {
                method: method.name().to_string(),
                type_name: self.class.name().to_string(),
                expected: vec![method.arity()],
                got: args.len(),
            }
            .into());
        }
        let body = self
            .context
            .find_impl(&self.class, method.name(), method.params())
            .ok_or_else(|| BridgeError::MethodResolution {
                method: method.to_string(),
                type_name: self.class.name().to_string(),
            })?;

        let frame = CallFrame {
            this: self,
            method: body.sig(),
            args: &args,
        };
        body.run(&frame).map_err(|fault| match fault {
            Fault::Thrown(mut e) => {
                e.unwind_through(TraceFrame {
                    context: self.context.name().to_string(),
                    type_name: self.class.name().to_string(),
                    method: method.name().to_string(),
                });
                Fault::Thrown(e)
            }
            other => other,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("class", &self.class)
            .field("context", &self.context.name())
            .field("fields", &*self.fields.read())
            .finish()
    }
}
