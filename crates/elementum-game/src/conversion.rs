//! Item auto-conversion task
//!
//! Metal players with the first upgrade passively convert qualifying raw
//! items in their inventory. Inventories belong to the host, so each pass
//! reports which players qualify and the host performs the actual swap. This
//! runs as its own interval task rather than piggybacking on the mana regen
//! loop.

use elementum_core::PlayerId;

use crate::element::Element;
use crate::store::DataStore;

/// Periodic conversion sweep
#[derive(Debug)]
pub struct ConversionTask {
    interval_ticks: u64,
    next_run: u64,
}

impl ConversionTask {
    pub fn new(interval_ticks: u64) -> Self {
        Self {
            interval_ticks,
            next_run: interval_ticks,
        }
    }

    /// Run at most once per interval. Returns the players whose inventories
    /// the host should convert this pass; empty between intervals.
    pub fn tick(&mut self, now: u64, store: &mut DataStore, online: &[PlayerId]) -> Vec<PlayerId> {
        if now < self.next_run {
            return Vec::new();
        }
        self.next_run = now + self.interval_ticks;

        online
            .iter()
            .copied()
            .filter(|&p| {
                let data = store.load(p);
                data.current_element() == Some(Element::Metal) && data.upgrade_level() >= 1
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (tempfile::TempDir, DataStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::open(dir.path(), 3);
        (dir, store)
    }

    #[test]
    fn test_only_upgraded_metal_qualifies() {
        let (_dir, mut store) = setup();
        let metal = PlayerId::new();
        let metal_base = PlayerId::new();
        let fire = PlayerId::new();

        store.load_mut(metal).set_current_element(Some(Element::Metal));
        store.load_mut(metal).set_upgrade_level(1);
        store.load_mut(metal_base).set_current_element(Some(Element::Metal));
        store.load_mut(fire).set_current_element(Some(Element::Fire));
        store.load_mut(fire).set_upgrade_level(2);

        let mut task = ConversionTask::new(100);
        let due = task.tick(100, &mut store, &[metal, metal_base, fire]);
        assert_eq!(due, vec![metal]);
    }

    #[test]
    fn test_respects_interval() {
        let (_dir, mut store) = setup();
        let p = PlayerId::new();
        store.load_mut(p).set_current_element(Some(Element::Metal));
        store.load_mut(p).set_upgrade_level(2);

        let mut task = ConversionTask::new(100);
        assert!(task.tick(50, &mut store, &[p]).is_empty());
        assert_eq!(task.tick(100, &mut store, &[p]).len(), 1);
        // Immediately after a pass, nothing is due
        assert!(task.tick(101, &mut store, &[p]).is_empty());
        assert_eq!(task.tick(200, &mut store, &[p]).len(), 1);
    }
}
