//! The fixed segment descriptor table.
//!
//! Five hand-authored customer segments, index-aligned with the persisted
//! centroid table on the same ids. The mapping is a process-wide constant,
//! not derived from data.

use crate::N_SEGMENTS;

/// One of the 5 fixed customer segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    LowIncomeLowSpending,
    HighIncomeHighSpending,
    LowIncomeHighSpending,
    HighIncomeLowSpending,
    Average,
}

impl Segment {
    /// All segments, ordered by id. This ordering is the contract shared
    /// with the centroid table.
    pub const ALL: [Segment; N_SEGMENTS] = [
        Segment::LowIncomeLowSpending,
        Segment::HighIncomeHighSpending,
        Segment::LowIncomeHighSpending,
        Segment::HighIncomeLowSpending,
        Segment::Average,
    ];

    /// Segment for a given id (0-4).
    pub fn from_id(id: usize) -> Option<Segment> {
        Segment::ALL.get(id).copied()
    }

    /// Id of this segment (0-4).
    pub fn id(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Segment::LowIncomeLowSpending => "Low Income – Low Spending",
            Segment::HighIncomeHighSpending => "High Income – High Spending",
            Segment::LowIncomeHighSpending => "Low Income – High Spending",
            Segment::HighIncomeLowSpending => "High Income – Low Spending",
            Segment::Average => "Average Customers",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Segment::LowIncomeLowSpending => "Gray",
            Segment::HighIncomeHighSpending => "Green",
            Segment::LowIncomeHighSpending => "Orange",
            Segment::HighIncomeLowSpending => "Red",
            Segment::Average => "Blue",
        }
    }

    /// Hex color used by the scatter plot and the form page.
    pub fn color_hex(self) -> &'static str {
        match self {
            Segment::LowIncomeLowSpending => "#6b7280",
            Segment::HighIncomeHighSpending => "#059669",
            Segment::LowIncomeHighSpending => "#ea580c",
            Segment::HighIncomeLowSpending => "#dc2626",
            Segment::Average => "#2563eb",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Segment::LowIncomeLowSpending => "Low Priority Customers",
            Segment::HighIncomeHighSpending => "Target Customers",
            Segment::LowIncomeHighSpending => "Impulse Buyers",
            Segment::HighIncomeLowSpending => "Potential Customers",
            Segment::Average => "Moderate Value Customers",
        }
    }

    /// Anchor point in scaled feature space used to align fitted K-Means
    /// centroids to segment ids: (income, score) quadrant corners, with the
    /// average segment at the origin.
    pub fn anchor(self) -> [f64; 2] {
        match self {
            Segment::LowIncomeLowSpending => [-1.0, -1.0],
            Segment::HighIncomeHighSpending => [1.0, 1.0],
            Segment::LowIncomeHighSpending => [-1.0, 1.0],
            Segment::HighIncomeLowSpending => [1.0, -1.0],
            Segment::Average => [0.0, 0.0],
        }
    }
}
