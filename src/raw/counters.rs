use core::cell::Cell;

/// Operation counters owned by a single tree.
///
/// Kept in `Cell`s so that lookups, which only borrow the tree, can still be
/// measured.
#[derive(Clone, Debug, Default)]
pub(crate) struct Counters {
    insert_comparisons: Cell<u64>,
    search_comparisons: Cell<u64>,
    rotations: Cell<u64>,
}

impl Counters {
    pub(crate) const fn new() -> Self {
        Self {
            insert_comparisons: Cell::new(0),
            search_comparisons: Cell::new(0),
            rotations: Cell::new(0),
        }
    }

    #[inline]
    pub(crate) fn count_insert_comparison(&self) {
        bump(&self.insert_comparisons);
    }

    #[inline]
    pub(crate) fn count_search_comparison(&self) {
        bump(&self.search_comparisons);
    }

    #[inline]
    pub(crate) fn count_rotation(&self) {
        bump(&self.rotations);
    }

    pub(crate) fn insert_comparisons(&self) -> u64 {
        self.insert_comparisons.get()
    }

    pub(crate) fn search_comparisons(&self) -> u64 {
        self.search_comparisons.get()
    }

    pub(crate) fn rotations(&self) -> u64 {
        self.rotations.get()
    }

    pub(crate) fn reset(&self) {
        self.insert_comparisons.set(0);
        self.search_comparisons.set(0);
        self.rotations.set(0);
    }
}

#[inline]
fn bump(counter: &Cell<u64>) {
    counter.set(counter.get().saturating_add(1));
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn counters_are_independent() {
        let counters = Counters::new();
        counters.count_insert_comparison();
        counters.count_insert_comparison();
        counters.count_search_comparison();
        counters.count_rotation();

        assert_eq!(counters.insert_comparisons(), 2);
        assert_eq!(counters.search_comparisons(), 1);
        assert_eq!(counters.rotations(), 1);
    }

    #[test]
    fn reset_zeroes_everything() {
        let counters = Counters::default();
        counters.count_insert_comparison();
        counters.count_search_comparison();
        counters.count_rotation();
        counters.reset();

        assert_eq!(counters.insert_comparisons(), 0);
        assert_eq!(counters.search_comparisons(), 0);
        assert_eq!(counters.rotations(), 0);
    }
}
