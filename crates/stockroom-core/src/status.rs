//! # Purchase Order Status Derivation
//!
//! A PO's receiving status is never stored by hand after creation; it is
//! recomputed from its lines at the end of every receipt and reversal.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lines: (ordered, received)                                             │
//! │                                                                         │
//! │  every line received == 0        ──►  Open                              │
//! │  every line received >= ordered  ──►  Completed                         │
//! │  anything in between             ──►  Partial                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A PO with no lines is Open.

use crate::types::{PoDetail, PoStatus};

/// Derives the receiving status from `(ordered, received)` pairs.
///
/// ## Example
/// ```rust
/// use stockroom_core::status::derive_status;
/// use stockroom_core::PoStatus;
///
/// assert_eq!(derive_status([(10, 10), (1, 0)]), PoStatus::Partial);
/// ```
pub fn derive_status<I>(lines: I) -> PoStatus
where
    I: IntoIterator<Item = (i64, i64)>,
{
    let mut any_line = false;
    let mut all_full = true;
    let mut all_zero = true;

    for (ordered, received) in lines {
        any_line = true;
        if received < ordered {
            all_full = false;
        }
        if received != 0 {
            all_zero = false;
        }
    }

    if !any_line || all_zero {
        PoStatus::Open
    } else if all_full {
        PoStatus::Completed
    } else {
        PoStatus::Partial
    }
}

/// Convenience wrapper over [`derive_status`] for loaded lines.
pub fn derive_for_lines(lines: &[PoDetail]) -> PoStatus {
    derive_status(lines.iter().map(PoDetail::quantities))
}

// =============================================================================
// Unit Tests
// =============================================================================
