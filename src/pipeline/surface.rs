//! Display surfaces - where recorded pictures are published.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::renderer::Picture;

/// The external surface a render loop presents to.
///
/// `present` is called from the render context.
pub trait DisplaySurface: Send + Sync {
    fn present(&self, picture: Arc<Picture>);
}

/// Keeps the most recent picture for whoever reads it next.
#[derive(Debug, Default)]
pub struct LatestPicture {
    picture: RwLock<Option<Arc<Picture>>>,
    presented: AtomicU64,
}

impl LatestPicture {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn latest(&self) -> Option<Arc<Picture>> {
        self.picture.read().clone()
    }

    /// Number of pictures presented so far.
    pub fn presented(&self) -> u64 {
        self.presented.load(Ordering::Acquire)
    }

    pub fn clear(&self) {
        *self.picture.write() = None;
    }
}

impl DisplaySurface for LatestPicture {
    fn present(&self, picture: Arc<Picture>) {
        *self.picture.write() = Some(picture);
        self.presented.fetch_add(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    #[test]
    fn test_keeps_latest() {
        let surface = LatestPicture::new();
        assert!(surface.latest().is_none());

        let picture = Arc::new(Picture::empty(Rect::from_xywh(0.0, 0.0, 10.0, 10.0)));
        surface.present(picture.clone());
        surface.present(picture);

        assert_eq!(surface.presented(), 2);
        assert!(surface.latest().is_some());
        surface.clear();
        assert!(surface.latest().is_none());
    }
}
