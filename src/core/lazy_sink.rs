//! A sink whose destination is chosen later
//!
//! Libraries often need a logger before the application has decided where
//! logs go. A [`LazySink`] can be used right away: it starts out discarding
//! everything, while remembering the name, values and call depth of every
//! sink derived from it. [`LazySink::set_sink`] binds the whole derivation
//! tree to a real sink, replaying each node's buffered parameters on top of
//! its parent's real sink. It may be called again to rebind.
//!
//! Entries logged before the first `set_sink` are dropped, not buffered.
//!
//! # Example
//!
//! ```
//! use rust_logsink::{new_logger, LazySink, Logger};
//! use rust_logsink::appenders::BufferAppender;
//! use rust_logsink::core::config;
//! use std::sync::Arc;
//!
//! let lazy = Arc::new(LazySink::new());
//! let logger = Logger::new(lazy.clone()).with_name("worker");
//! logger.info("lost", &[]);
//!
//! let buffer = BufferAppender::new();
//! let (_, sink) = new_logger(&[config::with_appender(buffer.clone())]);
//! lazy.set_sink(sink);
//!
//! logger.info("kept", &[]);
//! assert_eq!(buffer.lines().len(), 1);
//! assert!(buffer.contents().contains("\"logger\":\"worker\""));
//! ```

use super::engine::EngineLogger;
use super::entry::Caller;
use super::error::Result;
use super::field::Arg;
use super::sink::{discard, LogSink, RuntimeInfo};
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::error::Error;
use std::fmt;
use std::sync::{Arc, Weak};

#[derive(Default)]
struct LazyState {
    info: RuntimeInfo,
    attached: bool,
    name: Option<String>,
    values: Vec<Arg>,
    depth: i32,
    children: Vec<Weak<LazyNode>>,
}

impl LazyState {
    fn prune(&mut self) {
        self.children.retain(|child| child.strong_count() > 0);
    }
}

/// One node of the derivation tree.
///
/// Parents only hold weak references to their children, while each child
/// keeps its parent alive. A node is freed once no handle and no live
/// descendant refers to it.
struct LazyNode {
    backing: ArcSwap<Arc<dyn LogSink>>,
    state: Mutex<LazyState>,
    _parent: Option<Arc<LazyNode>>,
}

impl LazyNode {
    fn new(parent: Option<Arc<LazyNode>>) -> Self {
        Self {
            backing: ArcSwap::from_pointee(discard()),
            state: Mutex::new(LazyState::default()),
            _parent: parent,
        }
    }

    fn set_sink(&self, sink: Arc<dyn LogSink>) {
        let mut state = self.state.lock();

        sink.init(state.info);
        let mut sink = sink;
        if let Some(ref name) = state.name {
            sink = sink.with_name(name);
        }
        if !state.values.is_empty() {
            sink = sink.with_values(&state.values);
        }
        if state.depth != 0 {
            sink = sink.with_call_depth(state.depth);
        }

        self.backing.store(Arc::new(Arc::clone(&sink)));
        state.attached = true;

        state.children.retain(|child| match child.upgrade() {
            Some(child) => {
                child.set_sink(Arc::clone(&sink));
                true
            }
            None => false,
        });
    }

    fn current(&self) -> Arc<dyn LogSink> {
        Arc::clone(&**self.backing.load())
    }
}

/// A [`LogSink`] that forwards to a sink attached after construction
pub struct LazySink {
    node: Arc<LazyNode>,
}

impl LazySink {
    pub fn new() -> Self {
        Self {
            node: Arc::new(LazyNode::new(None)),
        }
    }

    /// Bind this sink and everything derived from it to `sink`
    pub fn set_sink(&self, sink: Arc<dyn LogSink>) {
        self.node.set_sink(sink);
    }

    /// Whether `set_sink` has been called
    pub fn is_attached(&self) -> bool {
        self.node.state.lock().attached
    }

    /// The sink currently receiving entries
    pub fn current(&self) -> Arc<dyn LogSink> {
        self.node.current()
    }

    fn derive(&self, buffer: impl FnOnce(&mut LazyState)) -> Arc<dyn LogSink> {
        let mut state = self.node.state.lock();

        let child = Arc::new(LazyNode::new(Some(Arc::clone(&self.node))));
        {
            let mut child_state = child.state.lock();
            child_state.info = state.info;
            buffer(&mut child_state);
        }
        state.prune();
        state.children.push(Arc::downgrade(&child));

        if state.attached {
            child.set_sink(self.node.current());
        }
        Arc::new(LazySink { node: child })
    }
}

impl Default for LazySink {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LazySink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.node.state.lock();
        f.debug_struct("LazySink")
            .field("info", &state.info)
            .field("attached", &state.attached)
            .field("name", &state.name)
            .field("values", &state.values)
            .field("depth", &state.depth)
            .field("children", &state.children.len())
            .finish()
    }
}

impl LogSink for LazySink {
    fn init(&self, mut info: RuntimeInfo) {
        let mut state = self.node.state.lock();
        info.call_depth += 1;
        state.info = info;
        self.node.backing.load().init(info);
    }

    fn enabled(&self, level: i32) -> bool {
        self.node.backing.load().enabled(level)
    }

    fn info(&self, level: i32, msg: &str, kvs: &[Arg], caller: Option<Caller<'_>>) {
        self.node.backing.load().info(level, msg, kvs, caller)
    }

    fn error(&self, err: Option<&dyn Error>, msg: &str, kvs: &[Arg], caller: Option<Caller<'_>>) {
        self.node.backing.load().error(err, msg, kvs, caller)
    }

    fn with_values(&self, kvs: &[Arg]) -> Arc<dyn LogSink> {
        let kvs = kvs.to_vec();
        self.derive(move |child| child.values = kvs)
    }

    fn with_name(&self, name: &str) -> Arc<dyn LogSink> {
        let name = name.to_string();
        self.derive(move |child| child.name = Some(name))
    }

    fn with_call_depth(&self, depth: i32) -> Arc<dyn LogSink> {
        self.derive(move |child| child.depth = depth)
    }

    fn underlying(&self) -> Option<EngineLogger> {
        self.node.backing.load().underlying()
    }

    fn flush(&self) -> Result<()> {
        self.node.backing.load().flush()
    }
}
