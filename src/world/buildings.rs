use serde::{Deserialize, Serialize};

use crate::rules::BuildingKind;

/// Count of each building kind. Counts only ever grow.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Buildings {
    counts: [u32; BuildingKind::COUNT],
}

impl Buildings {
    pub fn count(&self, kind: BuildingKind) -> u32 {
        self.counts[kind.index()]
    }

    pub fn add(&mut self, kind: BuildingKind) {
        self.counts[kind.index()] = self.counts[kind.index()].saturating_add(1);
    }

    /// Builder used by setup code: `Buildings::default().with(House, 4)`.
    pub fn with(mut self, kind: BuildingKind, count: u32) -> Self {
        self.counts[kind.index()] = count;
        self
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Non-zero counts in table order.
    pub fn iter(&self) -> impl Iterator<Item = (BuildingKind, u32)> + '_ {
        BuildingKind::ALL
            .into_iter()
            .map(|kind| (kind, self.count(kind)))
            .filter(|&(_, n)| n > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_count() {
        let mut b = Buildings::default();
        b.add(BuildingKind::Market);
        b.add(BuildingKind::Market);
        assert_eq!(b.count(BuildingKind::Market), 2);
        assert_eq!(b.count(BuildingKind::House), 0);
        assert_eq!(b.total(), 2);
    }

    #[test]
    fn iter_skips_empty_kinds() {
        let b = Buildings::default()
            .with(BuildingKind::House, 4)
            .with(BuildingKind::Temple, 1);
        let kinds: Vec<_> = b.iter().collect();
        assert_eq!(
            kinds,
            vec![(BuildingKind::House, 4), (BuildingKind::Temple, 1)]
        );
    }
}
