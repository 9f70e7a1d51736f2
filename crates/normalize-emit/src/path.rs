//! Node paths used to locate failures inside the declaration tree.

use serde::Serialize;
use std::fmt;

/// Kind of a path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    Project,
    Module,
    Package,
    File,
    Struct,
    Interface,
    Field,
    Func,
    Method,
    Param,
    Block,
    Macro,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Project => "Project",
            NodeKind::Module => "Module",
            NodeKind::Package => "Package",
            NodeKind::File => "File",
            NodeKind::Struct => "Struct",
            NodeKind::Interface => "Interface",
            NodeKind::Field => "Field",
            NodeKind::Func => "Func",
            NodeKind::Method => "Method",
            NodeKind::Param => "Param",
            NodeKind::Block => "Block",
            NodeKind::Macro => "Macro",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered `{Kind:Name}` segments from the project root down to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NodePath {
    segments: Vec<(NodeKind, String)>,
}

impl NodePath {
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            segments: vec![(NodeKind::Project, name.into())],
        }
    }

    /// Extend a copy of this path with one more segment.
    pub fn child(&self, kind: NodeKind, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push((kind, name.into()));
        Self { segments }
    }

    pub fn push(&mut self, kind: NodeKind, name: impl Into<String>) {
        self.segments.push((kind, name.into()));
    }

    pub fn segments(&self) -> &[(NodeKind, String)] {
        &self.segments
    }

    /// The innermost segment.
    pub fn leaf(&self) -> Option<&(NodeKind, String)> {
        self.segments.last()
    }

    /// Whether this path passes through (or ends at) the given segment.
    pub fn contains(&self, kind: NodeKind, name: &str) -> bool {
        self.segments.iter().any(|(k, n)| *k == kind && n == name)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (kind, name)) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{{{}:{}}}", kind, name)?;
        }
        Ok(())
    }
}
