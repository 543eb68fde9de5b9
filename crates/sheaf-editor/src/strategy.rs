//! Per-kind editing behaviour.
//!
//! Each collection declares the kind of its elements. A
//! [`StrategyRegistry`] maps kinds to [`EditStrategy`] objects; it is filled
//! once when the editor is configured and only read afterwards. Kinds with
//! no registered strategy fall back to [`DefaultStrategy`].

use std::collections::HashMap;

use sheaf_types::AssetObject;

/// How rows of one element kind are labelled and which candidates they take.
///
/// Object-safe and `Send + Sync` so strategies can live in a
/// `Box<dyn EditStrategy>`.
pub trait EditStrategy: Send + Sync {
    /// Name of this strategy, for diagnostics.
    fn name(&self) -> &str;

    /// Label for row `index`. `member` is `None` for empty and orphaned rows.
    fn label(&self, index: usize, member: Option<&AssetObject>) -> String {
        match member {
            Some(obj) => obj.name.clone(),
            None => format!("Element {index} (none)"),
        }
    }

    /// Whether `candidate` may be added to a collection of `element_kind`.
    fn accepts(&self, element_kind: &str, candidate: &AssetObject) -> bool {
        candidate.kind == element_kind
    }
}

/// Strategy used for kinds nobody registered.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultStrategy;

impl EditStrategy for DefaultStrategy {
    fn name(&self) -> &str {
        "default"
    }
}

/// Element kind to strategy mapping.
pub struct StrategyRegistry {
    strategies: HashMap<String, Box<dyn EditStrategy>>,
    fallback: Box<dyn EditStrategy>,
}

impl StrategyRegistry {
    /// An empty registry that resolves every kind to [`DefaultStrategy`].
    pub fn new() -> Self {
        Self::with_fallback(Box::new(DefaultStrategy))
    }

    pub fn with_fallback(fallback: Box<dyn EditStrategy>) -> Self {
        Self {
            strategies: HashMap::new(),
            fallback,
        }
    }

    /// Register `strategy` for `kind`, returning the one it replaced.
    pub fn register(
        &mut self,
        kind: impl Into<String>,
        strategy: Box<dyn EditStrategy>,
    ) -> Option<Box<dyn EditStrategy>> {
        self.strategies.insert(kind.into(), strategy)
    }

    /// The strategy for `kind`.
    pub fn resolve(&self, kind: &str) -> &dyn EditStrategy {
        self.strategies
            .get(kind)
            .map(|s| s.as_ref())
            .unwrap_or(self.fallback.as_ref())
    }

    pub fn is_registered(&self, kind: &str) -> bool {
        self.strategies.contains_key(kind)
    }

    /// Number of explicitly registered kinds.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<&String> = self.strategies.keys().collect();
        kinds.sort();
        f.debug_struct("StrategyRegistry")
            .field("kinds", &kinds)
            .field("fallback", &self.fallback.name())
            .finish()
    }
}
