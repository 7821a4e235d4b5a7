//! Edge types and per-edge input shaping.
//!
//! An edge is one dependency arrow plus optional shaping options that
//! decide how the producer's output contributes to the consumer's input
//! mapping: a value transform, an inclusion predicate, and a key rename.
//! Shaping runs on the consumer's task, once per inbound message.

use serde_json::Value;
use std::sync::Arc;

use crate::types::NodeId;

/// Value transform applied to an upstream value before anything else.
///
/// # Examples
///
/// ```rust
/// use dagflow::graphs::Transform;
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let double: Transform = Arc::new(|v| json!(v.as_i64().unwrap_or(0) * 2));
/// ```
pub type Transform = Arc<dyn Fn(Value) -> Value + Send + Sync + 'static>;

/// Inclusion predicate evaluated on the post-transform value.
///
/// When present and false, the edge's contribution is omitted from the
/// consumer's input mapping entirely; the consumer still runs.
pub type Filter = Arc<dyn Fn(&Value) -> bool + Send + Sync + 'static>;

/// Optional shaping applied to one edge's contribution.
///
/// Order is observable and fixed: `transform` runs first, `filter` second
/// on the transformed value, and the `name` override decides the key under
/// which the surviving value appears (defaulting to the producer's id).
///
/// # Examples
///
/// ```rust
/// use dagflow::graphs::EdgeOptions;
/// use serde_json::json;
///
/// let options = EdgeOptions::new()
///     .with_name("n1")
///     .with_transform(|v| json!(v.as_i64().unwrap_or(0) + 1))
///     .with_filter(|v| v.as_i64().map(|n| n % 2 == 1).unwrap_or(false));
///
/// // 4 -> transform -> 5 -> filter (odd) -> kept under "n1"
/// assert_eq!(options.shape(&"a".into(), json!(4)), Some(("n1".into(), json!(5))));
/// // 3 -> transform -> 4 -> filter (even) -> omitted
/// assert_eq!(options.shape(&"a".into(), json!(3)), None);
/// ```
#[derive(Clone, Default)]
pub struct EdgeOptions {
    /// Override for the key under which the value appears downstream.
    pub name: Option<String>,
    /// Transform applied to the upstream value before the filter.
    pub transform: Option<Transform>,
    /// Predicate deciding whether the (transformed) value is included.
    pub filter: Option<Filter>,
}

impl EdgeOptions {
    /// Create empty options: no rename, no transform, no filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the key under which the upstream value appears.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Apply a transform to the upstream value before the filter runs.
    #[must_use]
    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Include the contribution only when the predicate holds.
    #[must_use]
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Shape one inbound contribution.
    ///
    /// Applies transform, then filter, then key resolution. Returns `None`
    /// when the filter rejects the transformed value, meaning the key is
    /// absent from the consumer's input mapping.
    pub fn shape(&self, producer: &NodeId, value: Value) -> Option<(String, Value)> {
        let value = match &self.transform {
            Some(transform) => transform(value),
            None => value,
        };
        if let Some(filter) = &self.filter {
            if !filter(&value) {
                return None;
            }
        }
        let key = self
            .name
            .clone()
            .unwrap_or_else(|| producer.as_str().to_string());
        Some((key, value))
    }
}

impl std::fmt::Debug for EdgeOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgeOptions")
            .field("name", &self.name)
            .field("transform", &self.transform.as_ref().map(|_| "<fn>"))
            .field("filter", &self.filter.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// One dependency arrow of the graph.
#[derive(Clone, Debug)]
pub struct Edge {
    /// Producer node.
    pub from: NodeId,
    /// Consumer node.
    pub to: NodeId,
    /// Shaping applied to this edge's contribution.
    pub options: EdgeOptions,
}

impl Edge {
    /// Create an unshaped edge.
    #[must_use]
    pub fn new(from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        Edge {
            from: from.into(),
            to: to.into(),
            options: EdgeOptions::default(),
        }
    }

    /// Create an edge with shaping options.
    #[must_use]
    pub fn with_options(
        from: impl Into<NodeId>,
        to: impl Into<NodeId>,
        options: EdgeOptions,
    ) -> Self {
        Edge {
            from: from.into(),
            to: to.into(),
            options,
        }
    }
}
