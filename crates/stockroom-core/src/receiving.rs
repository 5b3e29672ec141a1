//! # Receipt Planning
//!
//! Turns the items on a delivery into per-line quantities before anything is
//! written. The database engine executes the plan inside one transaction and
//! re-checks each quantity with a guarded update.
//!
//! ## Matching Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  for each delivered item                                                │
//! │       │                                                                 │
//! │       ├── qty <= 0 ─────────────────────────────► skipped              │
//! │       │                                                                 │
//! │       ├── detail_id given ──► that line of this PO, or NotFound         │
//! │       │                                                                 │
//! │       └── product_id given ─► spread over the lines bound to the       │
//! │                               product, in line order, filling each     │
//! │                               line's remaining room; NotFound if the   │
//! │                               product is on no line                    │
//! │                                                                         │
//! │  quantities for the same line add up; the total may not exceed         │
//! │  qty_ordered - qty_received  (else OverReceipt)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{PoDetail, ReceiveItem};

/// Quantity to book onto one PO line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedLine {
    pub detail_id: String,
    pub qty: i64,
}

/// Builds the per-line receipt plan for a purchase order.
///
/// Lines appear in the order they were first referenced.
///
/// ## Arguments
/// * `lines` - Current lines of the purchase order
/// * `items` - Delivered items from the invoice
///
/// ## Returns
/// * `Ok(plan)` - Possibly empty if every item had `qty <= 0`
/// * `Err(CoreError::NotFound)` - An item matched no line
/// * `Err(CoreError::OverReceipt)` - A line would exceed its ordered quantity
pub fn plan_receipt(lines: &[PoDetail], items: &[ReceiveItem]) -> CoreResult<Vec<PlannedLine>> {
    let mut plan: Vec<PlannedLine> = Vec::new();

    for item in items {
        if item.qty <= 0 {
            continue;
        }

        if let Some(detail_id) = non_blank(&item.detail_id) {
            let line = lines
                .iter()
                .find(|l| l.detail_id == detail_id)
                .ok_or_else(|| CoreError::not_found("Purchase order line", detail_id))?;
            check_room(&plan, line, item.qty)?;
            book(&mut plan, line, item.qty);
        } else if let Some(product_id) = non_blank(&item.product_id) {
            spread_over_product(&mut plan, lines, product_id, item.qty)?;
        } else {
            return Err(ValidationError::Required {
                field: "DetailID or ProductID".to_string(),
            }
            .into());
        }
    }

    Ok(plan)
}

/// Fills the product's lines in order. Whatever does not fit is reported
/// as an over-receipt on the product's last line.
fn spread_over_product(
    plan: &mut Vec<PlannedLine>,
    lines: &[PoDetail],
    product_id: &str,
    qty: i64,
) -> CoreResult<()> {
    let candidates: Vec<&PoDetail> = lines
        .iter()
        .filter(|l| l.product_id.as_deref() == Some(product_id))
        .collect();
    let last = *candidates
        .last()
        .ok_or_else(|| CoreError::not_found("Purchase order line for product", product_id))?;

    let mut left = qty;
    for line in &candidates {
        let room = line.remaining() - planned_qty(plan, &line.detail_id);
        if room <= 0 {
            continue;
        }
        let take = room.min(left);
        book(plan, line, take);
        left -= take;
        if left == 0 {
            return Ok(());
        }
    }

    check_room(plan, last, left)
}

fn check_room(plan: &[PlannedLine], line: &PoDetail, qty: i64) -> CoreResult<()> {
    let requested = planned_qty(plan, &line.detail_id).saturating_add(qty);
    if requested > line.remaining() {
        return Err(CoreError::OverReceipt {
            detail_id: line.detail_id.clone(),
            ordered: line.qty_ordered,
            received: line.qty_received,
            requested,
        });
    }
    Ok(())
}

fn book(plan: &mut Vec<PlannedLine>, line: &PoDetail, qty: i64) {
    match plan.iter_mut().find(|p| p.detail_id == line.detail_id) {
        Some(entry) => entry.qty += qty,
        None => plan.push(PlannedLine {
            detail_id: line.detail_id.clone(),
            qty,
        }),
    }
}

fn planned_qty(plan: &[PlannedLine], detail_id: &str) -> i64 {
    plan.iter()
        .filter(|p| p.detail_id == detail_id)
        .map(|p| p.qty)
        .sum()
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn line(id: &str, product: Option<&str>, ordered: i64, received: i64) -> PoDetail {
        PoDetail {
            detail_id: id.to_string(),
            po_id: "PO-1".to_string(),
            product_id: product.map(str::to_string),
            item_name: format!("item {}", id),
            qty_ordered: ordered,
            qty_received: received,
            unit_cost_cents: 100,
            line_no: 1,
        }
    }

    fn by_detail(id: &str, qty: i64) -> ReceiveItem {
        ReceiveItem {
            detail_id: Some(id.to_string()),
            product_id: None,
            qty,
        }
    }

    fn by_product(id: &str, qty: i64) -> ReceiveItem {
        ReceiveItem {
            detail_id: None,
            product_id: Some(id.to_string()),
            qty,
        }
    }

    #[test]
    fn test_matches_by_detail_id() {
        let lines = vec![line("d1", None, 10, 0), line("d2", None, 5, 0)];
        let plan = plan_receipt(&lines, &[by_detail("d2", 3)]).unwrap();
        assert_eq!(
            plan,
            vec![PlannedLine {
                detail_id: "d2".to_string(),
                qty: 3
            }]
        );
    }

    #[test]
    fn test_matches_by_product_id() {
        let lines = vec![line("d1", Some("p1"), 10, 0)];
        let plan = plan_receipt(&lines, &[by_product("p1", 4)]).unwrap();
        assert_eq!(plan[0].detail_id, "d1");
        assert_eq!(plan[0].qty, 4);
    }

    #[test]
    fn test_product_match_prefers_line_with_room() {
        let lines = vec![line("d1", Some("p1"), 5, 5), line("d2", Some("p1"), 5, 0)];
        let plan = plan_receipt(&lines, &[by_product("p1", 2)]).unwrap();
        assert_eq!(plan[0].detail_id, "d2");
    }

    #[test]
    fn test_product_quantity_spreads_across_lines() {
        let lines = vec![
            line("d1", Some("p1"), 5, 3),
            line("d2", Some("p2"), 4, 0),
            line("d3", Some("p1"), 5, 0),
        ];
        let plan = plan_receipt(&lines, &[by_product("p1", 6)]).unwrap();
        assert_eq!(
            plan,
            vec![
                PlannedLine {
                    detail_id: "d1".to_string(),
                    qty: 2
                },
                PlannedLine {
                    detail_id: "d3".to_string(),
                    qty: 4
                },
            ]
        );

        let err = plan_receipt(&lines, &[by_product("p1", 8)]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::OverReceipt { ref detail_id, requested: 6, .. } if detail_id == "d3"
        ));
    }

    #[test]
    fn test_skips_non_positive_quantities() {
        let lines = vec![line("d1", None, 10, 0)];
        let plan = plan_receipt(&lines, &[by_detail("d1", 0), by_detail("d1", -3)]).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_unknown_line_is_not_found() {
        let lines = vec![line("d1", None, 10, 0)];
        let err = plan_receipt(&lines, &[by_detail("nope", 1)]).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));

        let err = plan_receipt(&lines, &[by_product("p9", 1)]).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn test_over_receipt_rejected() {
        // ordered 10, already received 8, invoice brings 5
        let lines = vec![line("d1", None, 10, 8)];
        let err = plan_receipt(&lines, &[by_detail("d1", 5)]).unwrap_err();
        match err {
            CoreError::OverReceipt {
                ordered,
                received,
                requested,
                ..
            } => {
                assert_eq!((ordered, received, requested), (10, 8, 5));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_items_aggregate_before_check() {
        let lines = vec![line("d1", None, 10, 0)];
        let plan = plan_receipt(&lines, &[by_detail("d1", 4), by_detail("d1", 6)]).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].qty, 10);

        let err = plan_receipt(&lines, &[by_detail("d1", 6), by_detail("d1", 6)]).unwrap_err();
        assert!(matches!(err, CoreError::OverReceipt { requested: 12, .. }));
    }

    #[test]
    fn test_item_without_reference_is_validation_error() {
        let lines = vec![line("d1", None, 10, 0)];
        let item = ReceiveItem {
            detail_id: None,
            product_id: Some("  ".to_string()),
            qty: 1,
        };
        let err = plan_receipt(&lines, &[item]).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_huge_quantity_is_over_receipt() {
        let lines = vec![line("d1", None, 10, 1)];
        let err = plan_receipt(&lines, &[by_detail("d1", i64::MAX)]).unwrap_err();
        assert!(matches!(err, CoreError::OverReceipt { requested: i64::MAX, .. }));

        let err = plan_receipt(&lines, &[by_detail("d1", 2), by_detail("d1", i64::MAX)]).unwrap_err();
        assert!(matches!(err, CoreError::OverReceipt { requested: i64::MAX, .. }));
    }

    proptest! {
        #[test]
        fn plan_never_exceeds_remaining(
            ordered in 1i64..40,
            received_pct in 0i64..=100,
            qtys in prop::collection::vec(-5i64..20, 1..6),
        ) {
            let received = ordered * received_pct / 100;
            let lines = vec![line("d1", None, ordered, received)];
            let items: Vec<ReceiveItem> = qtys.iter().map(|q| by_detail("d1", *q)).collect();

            let positive: i64 = qtys.iter().filter(|q| **q > 0).sum();
            match plan_receipt(&lines, &items) {
                Ok(plan) => {
                    let total: i64 = plan.iter().map(|p| p.qty).sum();
                    prop_assert_eq!(total, positive);
                    prop_assert!(received + total <= ordered);
                }
                Err(CoreError::OverReceipt { .. }) => {
                    prop_assert!(received + positive > ordered);
                }
                Err(other) => prop_assert!(false, "unexpected error: {:?}", other),
            }
        }
    }
}
