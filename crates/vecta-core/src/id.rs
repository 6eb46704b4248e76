//! Stable item identifiers.
//!
//! Items are edited by document index, but parent links and layer-bounds
//! queries name their target by ID so they survive reordering. IDs are
//! interned once and compared as a 4-byte key afterwards.

use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

static NAMES: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);
static NEXT_SERIAL: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ItemId(Spur);

impl ItemId {
    /// The ID for `name`, shared with every other ID of the same name.
    pub fn named(name: &str) -> Self {
        ItemId(NAMES.get_or_intern(name))
    }

    /// A fresh ID for an item of type `kind`, e.g. `ellipse-7`. The serial
    /// is process-wide, so IDs never repeat across kinds.
    pub fn fresh(kind: &str) -> Self {
        let serial = NEXT_SERIAL.fetch_add(1, Ordering::Relaxed);
        Self::named(&format!("{kind}-{serial}"))
    }

    pub fn name(&self) -> &str {
        NAMES.resolve(&self.0)
    }
}

impl From<String> for ItemId {
    fn from(name: String) -> Self {
        ItemId::named(&name)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.name().to_owned()
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ItemId").field(&self.name()).finish()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_same_id() {
        assert_eq!(ItemId::named("layer-main"), ItemId::named("layer-main"));
        assert_ne!(ItemId::named("layer-main"), ItemId::named("layer-side"));
    }

    #[test]
    fn fresh_ids_carry_their_kind() {
        let a = ItemId::fresh("rectangle");
        let b = ItemId::fresh("rectangle");
        assert_ne!(a, b);
        assert!(a.name().starts_with("rectangle-"));
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ItemId::named("group-42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"group-42\"");
        let back: ItemId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
