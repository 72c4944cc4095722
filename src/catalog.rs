//! Item catalog: the fixed good/hazard tables and the results fact pool.

/// Which table an item comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Good,
    Bad,
}

/// One collectible or hazard. `impact_delta` is always 0 for hazards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemDef {
    pub kind: ItemKind,
    pub icon: &'static str,
    pub score_delta: i32,
    pub impact_delta: u32,
}

impl ItemDef {
    const fn good(icon: &'static str, score_delta: i32, impact_delta: u32) -> Self {
        Self {
            kind: ItemKind::Good,
            icon,
            score_delta,
            impact_delta,
        }
    }

    const fn bad(icon: &'static str, score_delta: i32) -> Self {
        Self {
            kind: ItemKind::Bad,
            icon,
            score_delta,
            impact_delta: 0,
        }
    }

    #[inline]
    pub fn is_good(&self) -> bool {
        self.kind == ItemKind::Good
    }
}

pub const GOOD_ITEMS: [ItemDef; 3] = [
    ItemDef::good("♻", 15, 6),
    ItemDef::good("✨", 10, 5),
    ItemDef::good("🔧", 12, 7),
];

pub const BAD_ITEMS: [ItemDef; 3] = [
    ItemDef::bad("💥", -15),
    ItemDef::bad("🛢", -12),
    ItemDef::bad("⚠", -10),
];

/// Table for a kind. Both tables are non-empty, so indexing by
/// `rng.random_range(0..table.len())` never fails.
pub fn table(kind: ItemKind) -> &'static [ItemDef] {
    match kind {
        ItemKind::Good => &GOOD_ITEMS,
        ItemKind::Bad => &BAD_ITEMS,
    }
}

/// Shown on the results screen after a normal finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fact {
    pub title: &'static str,
    pub text: &'static str,
}

pub const FACTS: [Fact; 3] = [
    Fact {
        title: "Pipes Matter",
        text: "A single pipe segment can connect a household to a clean water point for years.",
    },
    Fact {
        title: "Filters 101",
        text: "Sand & charcoal layers remove many particulates and improve taste.",
    },
    Fact {
        title: "Time Saved",
        text: "Clean water nearby can save families 1–3 hours a day.",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_non_empty() {
        assert!(!table(ItemKind::Good).is_empty());
        assert!(!table(ItemKind::Bad).is_empty());
        assert!(!FACTS.is_empty());
    }

    #[test]
    fn test_good_items_score_and_fill_impact() {
        for item in GOOD_ITEMS {
            assert!(item.is_good());
            assert!(item.score_delta > 0);
            assert!(item.impact_delta > 0);
        }
    }

    #[test]
    fn test_hazards_cost_points_and_never_impact() {
        for item in BAD_ITEMS {
            assert_eq!(item.kind, ItemKind::Bad);
            assert!(item.score_delta < 0);
            assert_eq!(item.impact_delta, 0);
        }
    }
}
