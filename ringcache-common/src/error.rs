// Copyright 2026 ringcache Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{
    backtrace::Backtrace,
    fmt::{Debug, Display},
    sync::Arc,
};

/// Classifies an [`Error`] by what failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Misconfiguration detected while building a group, a registry entry or a peer pool.
    Config,
    /// The request is malformed, e.g. an empty key.
    InvalidRequest,
    /// The authoritative data source failed to load a key.
    Source,
    /// A remote peer failed to serve a key.
    ///
    /// Recovered by the group with a local load, only surfaced by peer getters.
    Peer,
    /// The coalesced recovery function panicked.
    Panicked,
    /// A socket or file operation failed.
    Io,
    /// Encoding or decoding of a wire message failed.
    Codec,
}

impl ErrorKind {
    /// Short human readable name of the kind.
    pub fn into_static(self) -> &'static str {
        self.into()
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.into_static())
    }
}

impl From<ErrorKind> for &'static str {
    fn from(v: ErrorKind) -> &'static str {
        match v {
            ErrorKind::Config => "Config error",
            ErrorKind::InvalidRequest => "Invalid request",
            ErrorKind::Source => "Source error",
            ErrorKind::Peer => "Peer error",
            ErrorKind::Panicked => "Panicked",
            ErrorKind::Io => "I/O error",
            ErrorKind::Codec => "Codec error",
        }
    }
}

/// The error of every fallible ringcache operation.
///
/// An error carries its [`ErrorKind`], a message, an ordered list of context pairs, an optional source error
/// and a backtrace (captured only when enabled by `RUST_BACKTRACE`).
///
/// Errors are cheap to clone: the source and the backtrace are shared. A single failed recovery is handed to every
/// coalesced waiter as a clone of the same error.
///
/// `Display` prints a single line:
///
/// ```shell
/// Source error, context: { key: unknown, group: scores } => load from source failed, source: unknown not exist
/// ```
///
/// `Debug` prints a multi-line report with the backtrace, `{:#?}` prints the struct.
#[derive(Clone)]
pub struct Error {
    kind: ErrorKind,
    message: String,

    context: Vec<(&'static str, String)>,

    source: Option<Arc<anyhow::Error>>,
    backtrace: Option<Arc<Backtrace>>,
}

impl Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            let mut de = f.debug_struct("Error");
            de.field("kind", &self.kind);
            de.field("message", &self.message);
            de.field("context", &self.context);
            de.field("source", &self.source);
            de.field("backtrace", &self.backtrace);
            return de.finish();
        }

        write!(f, "{}", self.kind)?;
        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }
        writeln!(f)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            writeln!(f, "Context:")?;
            for (k, v) in self.context.iter() {
                writeln!(f, "  {k}: {v}")?;
            }
        }

        if let Some(source) = &self.source {
            writeln!(f)?;
            writeln!(f, "Source:")?;
            writeln!(f, "  {source:#}")?;
        }

        if let Some(backtrace) = &self.backtrace {
            writeln!(f)?;
            writeln!(f, "Backtrace:")?;
            writeln!(f, "{backtrace}")?;
        }

        Ok(())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;

        if !self.context.is_empty() {
            write!(f, ", context: {{ ")?;
            let mut iter = self.context.iter().peekable();
            while let Some((k, v)) = iter.next() {
                write!(f, "{k}: {v}")?;
                if iter.peek().is_some() {
                    write!(f, ", ")?;
                }
            }
            write!(f, " }}")?;
        }

        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }

        if let Some(source) = &self.source {
            write!(f, ", source: {source}")?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|v| v.as_ref().as_ref())
    }
}

impl Error {
    /// An error of `kind` described by `message`. Attach the cause with [`Error::with_source`].
    ///
    /// ```rust
    /// # use ringcache_common::error::{Error, ErrorKind};
    /// let io_error = std::io::Error::other("connection reset");
    /// Error::new(ErrorKind::Peer, "fetch from peer failed").with_source(io_error);
    /// ```
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: Vec::new(),
            source: None,
            backtrace: Some(Arc::new(Backtrace::capture())),
        }
    }

    /// Append a `key: value` pair, printed in insertion order.
    pub fn with_context(mut self, key: &'static str, value: impl ToString) -> Self {
        self.context.push((key, value.to_string()));
        self
    }

    /// Attach the underlying cause. An error has at most one cause, debug builds assert it.
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        debug_assert!(self.source.is_none(), "the source error has been set");
        self.source = Some(Arc::new(source.into()));
        self
    }

    /// What went wrong.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Message given at construction.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Context pairs in insertion order.
    pub fn context(&self) -> &[(&'static str, String)] {
        &self.context
    }

    /// Backtrace captured at construction, if `RUST_BACKTRACE` enables it.
    pub fn backtrace(&self) -> Option<&Backtrace> {
        self.backtrace.as_deref()
    }

    /// Underlying cause, if any.
    pub fn source(&self) -> Option<&anyhow::Error> {
        self.source.as_deref()
    }

    /// The underlying cause as `E`, if it is one.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source.as_deref().and_then(|e| e.downcast_ref::<E>())
    }
}

/// Result of a ringcache operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Constructors of the errors raised across ringcache.
impl Error {
    /// A misconfiguration.
    pub fn config(message: impl Into<String>) -> Self {
        Error::new(ErrorKind::Config, message)
    }

    /// Rejection of an empty key.
    pub fn empty_key() -> Self {
        Error::new(ErrorKind::InvalidRequest, "key is required")
    }

    /// A failed data source load of `key`.
    pub fn source_load(key: &str, source: impl Into<anyhow::Error>) -> Self {
        Error::new(ErrorKind::Source, "load from source failed")
            .with_context("key", key)
            .with_source(source)
    }

    /// A failed remote fetch.
    pub fn peer(message: impl Into<String>) -> Self {
        Error::new(ErrorKind::Peer, message)
    }

    /// An [`ErrorKind::Io`] error caused by `source`.
    pub fn io_error(source: std::io::Error) -> Self {
        Error::new(ErrorKind::Io, "i/o error").with_source(source)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::io_error(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_send_sync_static<T: Send + Sync + 'static>() {}

    #[test]
    fn test_send_sync_static() {
        is_send_sync_static::<Error>();
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct NotFound(String);

    impl std::fmt::Display for NotFound {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{} not exist", self.0)
        }
    }

    impl std::error::Error for NotFound {}

    #[test]
    fn test_error_display() {
        let err = Error::source_load("unknown", NotFound("unknown".to_string())).with_context("group", "scores");

        assert_eq!(
            "Source error, context: { key: unknown, group: scores } => load from source failed, source: unknown not exist",
            err.to_string()
        );
    }

    #[test]
    fn test_error_downcast() {
        let inner = NotFound("Tom".to_string());
        let err = Error::new(ErrorKind::Source, "").with_source(inner.clone());

        let downcasted = err.downcast_ref::<NotFound>().unwrap();
        assert_eq!(downcasted, &inner);
    }

    #[test]
    fn test_error_clone_shares_source() {
        let err = Error::peer("server returned 500").with_source(NotFound("Jack".to_string()));
        let cloned = err.clone();

        assert_eq!(cloned.kind(), ErrorKind::Peer);
        assert_eq!(cloned.message(), "server returned 500");
        assert!(std::ptr::eq(
            err.source().unwrap() as *const anyhow::Error,
            cloned.source().unwrap() as *const anyhow::Error
        ));
    }

    #[test]
    fn test_io_error_conversion() {
        let err: Error = std::io::Error::other("broken pipe").into();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.downcast_ref::<std::io::Error>().is_some());
    }
}
