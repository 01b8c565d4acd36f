//! Node identifiers and the injectable id-generation service.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

const START: &str = "START";
const END: &str = "END";

/// An opaque, orderable node identifier.
///
/// `START` and `END` are reserved sentinel values produced only by
/// [`NodeId::start`] / [`NodeId::end`]; every process model has exactly one
/// node bearing each.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    /// Build a node id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The reserved Start sentinel.
    pub fn start() -> Self {
        Self(START.to_string())
    }

    /// The reserved End sentinel.
    pub fn end() -> Self {
        Self(END.to_string())
    }

    /// Whether this id is the Start sentinel.
    pub fn is_start(&self) -> bool {
        self.0 == START
    }

    /// Whether this id is the End sentinel.
    pub fn is_end(&self) -> bool {
        self.0 == END
    }

    /// The underlying string representation.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Injectable fresh-id service, used by the parallel/loop combinators to
/// mint ids for the Or/And/Join nodes they introduce.
///
/// Never a hidden global: combinators take `&dyn IdGenerator` explicitly.
pub trait IdGenerator: Send + Sync {
    /// Produce a node id that is distinct from every id previously returned
    /// by this generator.
    fn new_id(&self) -> NodeId;
}

/// Production id generator, backed by UUID v4.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn new_id(&self) -> NodeId {
        NodeId::new(Uuid::new_v4().to_string())
    }
}

/// Deterministic id generator for tests and reproducible examples.
#[derive(Debug, Default)]
pub struct CounterIdGenerator {
    next: std::sync::atomic::AtomicU64,
}

impl CounterIdGenerator {
    /// Start a counter generator at zero.
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for CounterIdGenerator {
    fn new_id(&self) -> NodeId {
        let n = self.next.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        NodeId::new(format!("n{n}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_and_end_are_reserved() {
        assert!(NodeId::start().is_start());
        assert!(NodeId::end().is_end());
        assert!(!NodeId::new("activity-1").is_start());
    }

    #[test]
    fn counter_generator_is_deterministic_and_distinct() {
        let gen = CounterIdGenerator::new();
        let a = gen.new_id();
        let b = gen.new_id();
        assert_ne!(a, b);
        assert_eq!(a.as_str(), "n0");
        assert_eq!(b.as_str(), "n1");
    }

    #[test]
    fn uuid_generator_produces_distinct_ids() {
        let gen = UuidGenerator;
        assert_ne!(gen.new_id(), gen.new_id());
    }
}
