//! Ordered segment storage (§4.2): lookup by `segment_id`, iteration in
//! `(first_seen_at, segment_id)` order for emission.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use interlingo_core::Segment;

#[derive(Debug, Default)]
pub struct SegmentMap {
    by_id: HashMap<u64, Segment>,
    order: BTreeSet<(DateTime<Utc>, u64)>,
}

impl SegmentMap {
    pub fn insert(&mut self, segment: Segment) {
        self.order.insert((segment.first_seen_at, segment.segment_id));
        self.by_id.insert(segment.segment_id, segment);
    }

    pub fn get(&self, segment_id: u64) -> Option<&Segment> {
        self.by_id.get(&segment_id)
    }

    pub fn get_mut(&mut self, segment_id: u64) -> Option<&mut Segment> {
        self.by_id.get_mut(&segment_id)
    }

    /// The oldest segment by ordering, regardless of its status.
    pub fn head(&self) -> Option<&Segment> {
        self.order
            .iter()
            .next()
            .and_then(|(_, id)| self.by_id.get(id))
    }

    pub fn remove_head(&mut self) -> Option<Segment> {
        let key = *self.order.iter().next()?;
        self.order.remove(&key);
        self.by_id.remove(&key.1)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_respects_first_seen_ordering_not_insertion_order() {
        let mut map = SegmentMap::default();
        let mut later = Segment::new(2, "spk", "second");
        let mut earlier = Segment::new(1, "spk", "first");
        earlier.first_seen_at = later.first_seen_at - chrono::Duration::milliseconds(50);
        map.insert(later.clone());
        map.insert(earlier.clone());
        assert_eq!(map.head().unwrap().segment_id, earlier.segment_id);
        let _ = &mut later;
    }

    #[test]
    fn remove_head_pops_in_order() {
        let mut map = SegmentMap::default();
        let mut a = Segment::new(1, "spk", "a");
        let mut b = Segment::new(2, "spk", "b");
        a.first_seen_at = Utc::now() - chrono::Duration::milliseconds(100);
        b.first_seen_at = Utc::now();
        map.insert(b);
        map.insert(a);
        assert_eq!(map.remove_head().unwrap().segment_id, 1);
        assert_eq!(map.remove_head().unwrap().segment_id, 2);
        assert!(map.is_empty());
    }
}
