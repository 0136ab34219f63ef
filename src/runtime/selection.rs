use std::sync::{Arc, RwLock};

use super::RuntimeContext;
use super::shared_state::SharedStateError;

/// The single active item of an exclusive group (dock icons, for now).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEntry {
    pub owner: String,
    pub item_id: String,
}

/// System-wide "at most one active" bookkeeping. Activating an item replaces
/// whatever was active before, whoever owned it.
#[derive(Default)]
pub struct SelectionRegistry {
    inner: RwLock<Option<SelectionEntry>>,
}

impl SelectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activate(&self, owner: impl Into<String>, item_id: impl Into<String>) {
        let entry = SelectionEntry {
            owner: owner.into(),
            item_id: item_id.into(),
        };
        if let Ok(mut guard) = self.inner.write() {
            *guard = Some(entry);
        }
    }

    /// Clear the selection, but only if the given owner holds it.
    pub fn clear(&self, owner: &str) {
        if let Ok(mut guard) = self.inner.write() {
            if guard.as_ref().map(|e| e.owner.as_str()) == Some(owner) {
                *guard = None;
            }
        }
    }

    pub fn current(&self) -> Option<SelectionEntry> {
        self.inner.read().ok().and_then(|guard| guard.clone())
    }

    pub fn is_active(&self, item_id: &str) -> bool {
        self.current().map(|e| e.item_id == item_id).unwrap_or(false)
    }
}

pub type SharedSelection = Arc<SelectionRegistry>;

pub fn ensure_selection_registry(
    ctx: &RuntimeContext<'_>,
) -> Result<SharedSelection, SharedStateError> {
    ctx.shared_init::<SelectionRegistry, _>(SelectionRegistry::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activate_and_read_back() {
        let registry = SelectionRegistry::new();
        registry.activate("dock", "projects");
        let entry = registry.current().unwrap();
        assert_eq!(entry.owner, "dock");
        assert_eq!(entry.item_id, "projects");
        assert!(registry.is_active("projects"));
    }

    #[test]
    fn activation_is_exclusive() {
        let registry = SelectionRegistry::new();
        registry.activate("dock", "projects");
        registry.activate("dock", "terminal");
        assert!(!registry.is_active("projects"));
        assert!(registry.is_active("terminal"));
    }

    #[test]
    fn clear_respects_owner() {
        let registry = SelectionRegistry::new();
        registry.activate("dock", "projects");
        registry.clear("other");
        assert!(registry.current().is_some());
        registry.clear("dock");
        assert!(registry.current().is_none());
    }
}
