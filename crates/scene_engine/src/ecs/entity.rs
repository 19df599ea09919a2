//! Game object identifiers

slotmap::new_key_type! {
    /// Opaque game object identifier, stable for the object's lifetime.
    ///
    /// Generational: an id of a destroyed object never aliases a newer one.
    pub struct GameObjectId;
}

/// Non-owning back-reference from a component to the object it is attached to.
///
/// Set exactly once, when the component is attached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OwnerRef(Option<GameObjectId>);

impl OwnerRef {
    /// The owning object, if attached
    pub const fn get(&self) -> Option<GameObjectId> {
        self.0
    }

    /// Whether the component has been attached
    pub const fn is_bound(&self) -> bool {
        self.0.is_some()
    }

    /// Bind to `owner`. Fails if already bound.
    pub(crate) fn bind(&mut self, owner: GameObjectId) -> bool {
        if self.0.is_some() {
            return false;
        }
        self.0 = Some(owner);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn test_owner_binds_once() {
        let mut keys = SlotMap::<GameObjectId, ()>::with_key();
        let a = keys.insert(());
        let b = keys.insert(());

        let mut owner = OwnerRef::default();
        assert!(!owner.is_bound());
        assert!(owner.bind(a));
        assert!(!owner.bind(b));
        assert_eq!(owner.get(), Some(a));
    }

    #[test]
    fn test_removed_ids_are_not_reused() {
        let mut keys = SlotMap::<GameObjectId, ()>::with_key();
        let a = keys.insert(());
        keys.remove(a);
        let b = keys.insert(());
        assert_ne!(a, b);
        assert!(!keys.contains_key(a));
    }
}
