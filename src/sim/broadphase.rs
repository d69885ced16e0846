//! Broad-phase spatial hash
//!
//! Uniform grid over the playable area. Every collider is registered in each
//! cell its bounds touch; candidate pairs are the colliders sharing a cell
//! whose bounds touch. Pairs are returned sorted and deduplicated so the
//! resolver visits them in a stable order, each unordered pair once.

use std::collections::HashMap;

use super::body::BodyId;
use super::shape::Rect;

/// Non-owning reference to a collider registered in the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColliderRef {
    /// Index into the current room's static colliders
    Static(usize),
    Body(BodyId),
}

impl ColliderRef {
    pub fn is_static(&self) -> bool {
        matches!(self, ColliderRef::Static(_))
    }
}

type Cell = (i32, i32);

#[derive(Debug, Clone)]
struct Entry {
    bounds: Rect,
    min: Cell,
    max: Cell,
}

/// Grid-based spatial index
#[derive(Debug, Clone)]
pub struct SpatialHash {
    cell_size: f32,
    cells: HashMap<Cell, Vec<ColliderRef>>,
    entries: HashMap<ColliderRef, Entry>,
}

impl SpatialHash {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(1.0),
            cells: HashMap::new(),
            entries: HashMap::new(),
        }
    }

    #[inline]
    fn cell_of(&self, x: f32, y: f32) -> Cell {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    fn cell_range(&self, bounds: &Rect) -> (Cell, Cell) {
        (
            self.cell_of(bounds.left(), bounds.top()),
            self.cell_of(bounds.right(), bounds.bottom()),
        )
    }

    /// Replace the indexed set entirely
    pub fn rebuild(&mut self, colliders: impl IntoIterator<Item = (ColliderRef, Rect)>) {
        self.cells.clear();
        self.entries.clear();
        for (collider, bounds) in colliders {
            self.insert(collider, bounds);
        }
    }

    /// Register a collider (re-registering replaces its bounds)
    pub fn insert(&mut self, collider: ColliderRef, bounds: Rect) {
        if self.entries.contains_key(&collider) {
            self.remove(collider);
        }
        let (min, max) = self.cell_range(&bounds);
        for cx in min.0..=max.0 {
            for cy in min.1..=max.1 {
                self.cells.entry((cx, cy)).or_default().push(collider);
            }
        }
        self.entries.insert(collider, Entry { bounds, min, max });
    }

    /// Unregister a collider; returns false if it was not indexed
    pub fn remove(&mut self, collider: ColliderRef) -> bool {
        let Some(entry) = self.entries.remove(&collider) else {
            return false;
        };
        for cx in entry.min.0..=entry.max.0 {
            for cy in entry.min.1..=entry.max.1 {
                if let Some(cell) = self.cells.get_mut(&(cx, cy)) {
                    cell.retain(|c| *c != collider);
                    if cell.is_empty() {
                        self.cells.remove(&(cx, cy));
                    }
                }
            }
        }
        true
    }

    /// Refresh the bounds of a moved collider, touching cells only if they changed
    pub fn update(&mut self, collider: ColliderRef, bounds: Rect) {
        let (min, max) = self.cell_range(&bounds);
        if let Some(entry) = self.entries.get_mut(&collider) {
            if entry.min == min && entry.max == max {
                entry.bounds = bounds;
                return;
            }
        }
        self.insert(collider, bounds);
    }

    pub fn contains(&self, collider: ColliderRef) -> bool {
        self.entries.contains_key(&collider)
    }

    pub fn bounds(&self, collider: ColliderRef) -> Option<Rect> {
        self.entries.get(&collider).map(|e| e.bounds)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collect colliders whose bounds touch `area` into `buf` (cleared first)
    pub fn query_rect_into(&self, area: &Rect, buf: &mut Vec<ColliderRef>) {
        buf.clear();
        let (min, max) = self.cell_range(area);
        for cx in min.0..=max.0 {
            for cy in min.1..=max.1 {
                let Some(cell) = self.cells.get(&(cx, cy)) else {
                    continue;
                };
                for collider in cell {
                    if let Some(entry) = self.entries.get(collider) {
                        if entry.bounds.touches(area) {
                            buf.push(*collider);
                        }
                    }
                }
            }
        }
        buf.sort_unstable();
        buf.dedup();
    }

    /// All candidate pairs `(a, b)` with `a < b` whose bounds touch
    ///
    /// Static-static pairs are never reported: level geometry does not
    /// interact with itself.
    pub fn query_pairs(&self) -> Vec<(ColliderRef, ColliderRef)> {
        let mut pairs = Vec::new();
        for cell in self.cells.values() {
            for (i, &a) in cell.iter().enumerate() {
                for &b in &cell[i + 1..] {
                    if a.is_static() && b.is_static() {
                        continue;
                    }
                    let (Some(ea), Some(eb)) = (self.entries.get(&a), self.entries.get(&b)) else {
                        continue;
                    };
                    if ea.bounds.touches(&eb.bounds) {
                        pairs.push(if a < b { (a, b) } else { (b, a) });
                    }
                }
            }
        }
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn body(n: u64) -> ColliderRef {
        ColliderRef::Body(BodyId(n))
    }

    #[test]
    fn test_pairs_are_unique_and_ordered() {
        let mut hash = SpatialHash::new(16.0);
        // Large floor spanning many cells, two bodies standing on it
        hash.insert(ColliderRef::Static(0), Rect::new(0.0, 100.0, 200.0, 20.0));
        hash.insert(body(2), Rect::new(10.0, 80.0, 40.0, 24.0));
        hash.insert(body(1), Rect::new(30.0, 80.0, 40.0, 24.0));

        let pairs = hash.query_pairs();
        assert_eq!(
            pairs,
            vec![
                (ColliderRef::Static(0), body(1)),
                (ColliderRef::Static(0), body(2)),
                (body(1), body(2)),
            ]
        );
    }

    #[test]
    fn test_static_pairs_skipped() {
        let mut hash = SpatialHash::new(32.0);
        hash.insert(ColliderRef::Static(0), Rect::new(0.0, 0.0, 50.0, 50.0));
        hash.insert(ColliderRef::Static(1), Rect::new(10.0, 10.0, 50.0, 50.0));
        assert!(hash.query_pairs().is_empty());
    }

    #[test]
    fn test_remove_drops_pairs() {
        let mut hash = SpatialHash::new(32.0);
        hash.insert(body(1), Rect::new(0.0, 0.0, 10.0, 10.0));
        hash.insert(body(2), Rect::new(5.0, 5.0, 10.0, 10.0));
        assert_eq!(hash.query_pairs().len(), 1);

        assert!(hash.remove(body(2)));
        assert!(!hash.remove(body(2)));
        assert!(!hash.contains(body(2)));
        assert!(hash.query_pairs().is_empty());
        assert_eq!(hash.len(), 1);
    }

    #[test]
    fn test_update_moves_between_cells() {
        let mut hash = SpatialHash::new(32.0);
        hash.insert(body(1), Rect::new(0.0, 0.0, 10.0, 10.0));
        hash.insert(body(2), Rect::new(200.0, 200.0, 10.0, 10.0));
        assert!(hash.query_pairs().is_empty());

        hash.update(body(1), Rect::new(195.0, 195.0, 10.0, 10.0));
        assert_eq!(hash.query_pairs(), vec![(body(1), body(2))]);
        assert_eq!(hash.bounds(body(1)), Some(Rect::new(195.0, 195.0, 10.0, 10.0)));
    }

    #[test]
    fn test_rebuild_replaces_everything() {
        let mut hash = SpatialHash::new(32.0);
        hash.insert(body(1), Rect::new(0.0, 0.0, 10.0, 10.0));
        hash.rebuild(vec![(body(7), Rect::new(0.0, 0.0, 5.0, 5.0))]);
        assert!(!hash.contains(body(1)));
        assert!(hash.contains(body(7)));
        assert_eq!(hash.len(), 1);
    }

    #[test]
    fn test_query_rect_into() {
        let mut hash = SpatialHash::new(32.0);
        hash.insert(body(1), Rect::new(0.0, 0.0, 10.0, 10.0));
        hash.insert(body(2), Rect::new(100.0, 0.0, 10.0, 10.0));
        let mut buf = vec![body(99)];
        hash.query_rect_into(&Rect::new(-5.0, -5.0, 20.0, 20.0), &mut buf);
        assert_eq!(buf, vec![body(1)]);
    }

    fn arb_rect() -> impl Strategy<Value = Rect> {
        (-200.0f32..600.0, -200.0f32..600.0, 1.0f32..150.0, 1.0f32..150.0)
            .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn test_no_false_negatives(
            rects in prop::collection::vec(arb_rect(), 0..40),
            cell in 8.0f32..128.0,
        ) {
            let mut hash = SpatialHash::new(cell);
            hash.rebuild(rects.iter().enumerate().map(|(i, r)| (body(i as u64), *r)));
            let pairs = hash.query_pairs();

            for i in 0..rects.len() {
                for j in (i + 1)..rects.len() {
                    if rects[i].intersects(&rects[j]) {
                        prop_assert!(pairs.contains(&(body(i as u64), body(j as u64))));
                    }
                }
            }

            let mut deduped = pairs.clone();
            deduped.dedup();
            prop_assert_eq!(deduped.len(), pairs.len());
            prop_assert!(pairs.iter().all(|(a, b)| a < b));
        }
    }
}
