//! Dirty tracking.

use std::sync::atomic::{AtomicU8, Ordering};

use bitflags::bitflags;

bitflags! {
    /// What changed on a node since it was last laid out and drawn.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DirtyFlags: u8 {
        /// A style field, the type or the props changed.
        const STYLE = 1 << 0;
        /// The layout boxes of this subtree are stale.
        const LAYOUT = 1 << 1;
    }
}

/// Dirty flags stored in an atomic so they can be read and set without
/// taking the node lock.
#[derive(Debug, Default)]
pub(crate) struct AtomicDirty(AtomicU8);

impl AtomicDirty {
    pub(crate) fn new(flags: DirtyFlags) -> Self {
        Self(AtomicU8::new(flags.bits()))
    }

    pub(crate) fn get(&self) -> DirtyFlags {
        DirtyFlags::from_bits_truncate(self.0.load(Ordering::SeqCst))
    }

    pub(crate) fn insert(&self, flags: DirtyFlags) {
        self.0.fetch_or(flags.bits(), Ordering::SeqCst);
    }

    pub(crate) fn remove(&self, flags: DirtyFlags) {
        self.0.fetch_and(!flags.bits(), Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_remove() {
        let dirty = AtomicDirty::new(DirtyFlags::empty());
        dirty.insert(DirtyFlags::STYLE | DirtyFlags::LAYOUT);
        dirty.remove(DirtyFlags::LAYOUT);
        assert_eq!(dirty.get(), DirtyFlags::STYLE);
    }
}
