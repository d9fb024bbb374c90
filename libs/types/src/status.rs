//! Tick status classification.
//!
//! A tick's reserve vector lives inside the box `[0, r]^N` on the sphere
//! `Σ x_i² = k`. Status is always recomputed from the post-mutation reserve
//! vector, never cached stale.

use serde::{Deserialize, Serialize};

/// Position of a tick's reserve vector relative to its spherical cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TickStatus {
    /// No LP shares outstanding; the tick holds no reserves.
    Inactive,
    /// Every reserve component strictly inside `(0, r)`.
    Interior,
    /// At least one reserve component pinned at `0` or `r`.
    Boundary,
}

impl TickStatus {
    /// Whether the tick participates in consolidation at all.
    pub fn is_active(self) -> bool {
        !matches!(self, TickStatus::Inactive)
    }
}

impl std::fmt::Display for TickStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TickStatus::Inactive => "inactive",
            TickStatus::Interior => "interior",
            TickStatus::Boundary => "boundary",
        };
        f.write_str(name)
    }
}
