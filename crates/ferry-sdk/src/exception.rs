//! Exceptions raised by code running inside a context
//!
//! An [`Exception`] carries its type (a [`TypeRef`] of exception kind), an
//! optional message, an optional cause and a diagnostic trace. Every object
//! method an exception escapes from appends a [`TraceFrame`], so the trace
//! reads innermost call first.

use std::fmt;

use crate::types::TypeRef;

/// Constructor shape used to rebuild an exception in another context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterializationStrategy {
    /// Constructor taking the cause
    CauseArg,
    /// Constructor taking a message string
    MessageArg,
    /// No-argument constructor
    NoArg,
}

impl MaterializationStrategy {
    /// Order in which constructor shapes are tried
    pub const PREFERENCE: [MaterializationStrategy; 3] = [
        MaterializationStrategy::CauseArg,
        MaterializationStrategy::MessageArg,
        MaterializationStrategy::NoArg,
    ];
}

/// One entry of a diagnostic trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceFrame {
    /// Name of the context the method ran in
    pub context: String,
    /// Runtime type the method belongs to
    pub type_name: String,
    /// Method name
    pub method: String,
}

impl fmt::Display for TraceFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at {}.{} [{}]", self.type_name, self.method, self.context)
    }
}

/// An exception instance
#[derive(Debug, Clone)]
pub struct Exception {
    ty: TypeRef,
    message: Option<String>,
    cause: Option<Box<Exception>>,
    trace: Vec<TraceFrame>,
}

impl Exception {
    /// Create an exception. Use [`crate::Context::exception`] to resolve the
    /// type by name.
    pub fn new(ty: TypeRef, message: Option<String>) -> Self {
        Self {
            ty,
            message,
            cause: None,
            trace: Vec::new(),
        }
    }

    /// Attach a cause
    pub fn with_cause(mut self, cause: Exception) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Replace the trace
    pub fn with_trace(mut self, trace: Vec<TraceFrame>) -> Self {
        self.trace = trace;
        self
    }

    /// Exception type
    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    /// Qualified type name
    pub fn type_name(&self) -> &str {
        self.ty.name()
    }

    /// Message, if any
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Direct cause, if any
    pub fn cause(&self) -> Option<&Exception> {
        self.cause.as_deref()
    }

    /// Diagnostic trace, innermost frame first
    pub fn trace(&self) -> &[TraceFrame] {
        &self.trace
    }

    /// Replace the trace in place
    pub fn set_trace(&mut self, trace: Vec<TraceFrame>) {
        self.trace = trace;
    }

    /// Append a frame as the exception unwinds out of a method
    pub fn push_frame(&mut self, frame: TraceFrame) {
        self.trace.push(frame);
    }

    /// Append a frame to this exception and, if it wraps a cause, to the
    /// root of the chain as well
    pub fn unwind_through(&mut self, frame: TraceFrame) {
        if let Some(cause) = self.cause.as_deref_mut() {
            cause.root_cause_mut().trace.push(frame.clone());
        }
        self.trace.push(frame);
    }

    fn root_cause_mut(&mut self) -> &mut Exception {
        match self.cause {
            Some(ref mut cause) => cause.root_cause_mut(),
            None => self,
        }
    }

    /// Deepest exception of the causal chain
    pub fn root_cause(&self) -> &Exception {
        let mut root = self;
        while let Some(cause) = root.cause() {
            root = cause;
        }
        root
    }

    /// Number of exceptions in the causal chain, this one included
    pub fn chain_len(&self) -> usize {
        let mut len = 1;
        let mut current = self;
        while let Some(cause) = current.cause() {
            len += 1;
            current = cause;
        }
        len
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.ty.name(), message),
            None => f.write_str(self.ty.name()),
        }
    }
}

impl std::error::Error for Exception {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{core_type, names};

    fn error(name: &str, message: &str) -> Exception {
        Exception::new(core_type(name).unwrap(), Some(message.to_string()))
    }

    #[test]
    fn test_root_cause() {
        let root = error(names::ARGUMENT_ERROR, "bad id");
        let chain = error(names::ERROR, "outer")
            .with_cause(error(names::STATE_ERROR, "middle").with_cause(root));

        assert_eq!(chain.chain_len(), 3);
        assert_eq!(chain.root_cause().type_name(), names::ARGUMENT_ERROR);
        assert_eq!(chain.root_cause().message(), Some("bad id"));

        let single = error(names::ERROR, "alone");
        assert_eq!(single.root_cause().message(), Some("alone"));
        assert_eq!(single.chain_len(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(error(names::ERROR, "boom").to_string(), "core.Error: boom");
        let bare = Exception::new(core_type(names::ERROR).unwrap(), None);
        assert_eq!(bare.to_string(), "core.Error");
    }

    #[test]
    fn test_error_source_follows_cause() {
        use std::error::Error;

        let chain = error(names::ERROR, "outer").with_cause(error(names::STATE_ERROR, "inner"));
        let source = chain.source().unwrap();
        assert_eq!(source.to_string(), "core.StateError: inner");
        assert!(source.source().is_none());
    }

    #[test]
    fn test_unwind_reaches_root_cause() {
        let frame = |method: &str| TraceFrame {
            context: "host".to_string(),
            type_name: "app.Repo".to_string(),
            method: method.to_string(),
        };
        let root = error(names::ERROR, "root").with_trace(vec![frame("find")]);
        let mut e = error(names::STATE_ERROR, "outer")
            .with_cause(error(names::ERROR, "middle").with_cause(root));
        e.unwind_through(frame("load"));

        assert_eq!(e.trace(), &[frame("load")]);
        assert!(e.cause().unwrap().trace().is_empty());
        assert_eq!(e.root_cause().trace(), &[frame("find"), frame("load")]);

        let mut single = error(names::ERROR, "alone");
        single.unwind_through(frame("load"));
        assert_eq!(single.trace(), &[frame("load")]);
    }

    #[test]
    fn test_trace_frames() {
        let mut e = error(names::ERROR, "boom");
        e.push_frame(TraceFrame {
            context: "host".to_string(),
            type_name: "app.Repo".to_string(),
            method: "load".to_string(),
        });
        assert_eq!(e.trace().len(), 1);
        assert_eq!(e.trace()[0].to_string(), "at app.Repo.load [host]");
    }
}
