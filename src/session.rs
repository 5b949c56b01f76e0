//! Per-session context.
//!
//! One [`SessionContext`] exists per logical session and is passed by
//! reference into each component call. Single-writer: the CLI runs one
//! pipeline at a time, so no turn or handle update ever races another.

use crate::conversation::ConversationState;
use crate::material::IngestedMaterial;
use crate::store::StoreHandle;

/// All mutable state of one study session.
#[derive(Debug, Default)]
pub struct SessionContext {
    material: Option<IngestedMaterial>,
    store: Option<StoreHandle>,
    pub conversation: ConversationState,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the session's material wholesale. Any store handle keyed
    /// to the previous material is dropped with it.
    pub fn set_material(&mut self, material: IngestedMaterial) {
        self.material = Some(material);
        self.store = None;
    }

    pub fn material(&self) -> Option<&IngestedMaterial> {
        self.material.as_ref()
    }

    pub fn store(&self) -> Option<&StoreHandle> {
        self.store.as_ref()
    }

    /// Install a new store handle, replacing any stale one. Callers only
    /// invoke this once the store is fully indexed, so there is no window
    /// where two handles both claim validity.
    pub fn set_store(&mut self, handle: StoreHandle) {
        self.store = Some(handle);
    }

    pub fn clear_store(&mut self) {
        self.store = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreHandle;

    #[test]
    fn test_new_material_drops_store_handle() {
        let mut session = SessionContext::new();
        let first = IngestedMaterial::text("first lecture").unwrap();
        let first_id = first.id;
        session.set_material(first);
        session.set_store(StoreHandle::new("vs_1".to_string(), first_id));
        assert!(session.store().is_some());

        session.set_material(IngestedMaterial::text("second lecture").unwrap());
        assert!(session.store().is_none());
    }
}
