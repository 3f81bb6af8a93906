//! Identifier types for syntax tree nodes.
//!
//! Every node in the syntax tree carries a [`NodeId`]. The compiler passes
//! annotate the tree through side tables keyed by these ids instead of
//! mutating the tree or relying on reference identity.

use std::fmt;

/// Stable identity of one syntax tree node.
///
/// Ids are handed out sequentially by the tree builder, so they are unique
/// within one tree and cheap to hash.
///
/// # Example
///
/// ```
/// use bsharp_core::NodeId;
///
/// let id = NodeId::new(3);
/// assert_eq!(id.index(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Create a node id with the given index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the underlying index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node_{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(index: u32) -> Self {
        Self::new(index)
    }
}
