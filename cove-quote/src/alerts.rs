use cove_catalog::{Resource, ResourceCategory};

use crate::models::CartLine;

/// Static advisory rules evaluated against the priced cart. Output is
/// informational only; nothing here changes a total or blocks admission.
pub fn advisory_alerts(lines: &[(CartLine, Resource)]) -> Vec<String> {
    let mut alerts = Vec::new();

    let has = |category: ResourceCategory| {
        lines.iter().any(|(_, r)| r.category == category)
    };

    if has(ResourceCategory::Motorized) {
        alerts.push(
            "Motorized rentals require a safety briefing at pickup; plan to arrive 15 minutes early."
                .to_string(),
        );
    }

    if has(ResourceCategory::Aquatic) && !has(ResourceCategory::Beach) {
        alerts.push(
            "Add beach gear to your aquatic rental - coupon PADDLE5 takes 5.00 off aquatic carts."
                .to_string(),
        );
    }

    let total_units: i32 = lines.iter().map(|(l, _)| l.quantity).sum();
    if total_units >= 4 {
        alerts.push(
            "Parties renting 4 or more units qualify for the GROUP15 coupon.".to_string(),
        );
    }

    if lines.iter().any(|(l, _)| l.hours >= 6) {
        alerts.push(
            "Rentals of 6+ hours often fit better as an advance booking for the next open day."
                .to_string(),
        );
    }

    alerts
}
