//! Order approval
//!
//! Approving an order is the one place an invitation's link quota is granted.
//! The plan's allowance is copied at that moment; later plan edits do not
//! reach invitations that were already approved.

use chrono::Utc;
use tracing::info;

use crate::{
    errors::{OrderError, Result},
    events::OrderApproved,
    quota::QuotaStore,
    state::{LinkGrant, Order, OrderStatus, Plan},
};

/// Approve a pending order and grant its plan's links to the invitation
///
/// `override_grant` replaces the plan's allowance when an admin negotiated a
/// different number of links for this order.
///
/// # Errors
/// Returns an error if:
/// - The order is not pending (`InvalidOrderState`)
/// - `plan` is not the plan the order was placed for (`PlanMismatch`)
/// - The invitation already holds a grant (`AlreadyGranted`)
pub fn approve_order<S: QuotaStore + ?Sized>(
    store: &S,
    order: &mut Order,
    plan: &Plan,
    override_grant: Option<LinkGrant>,
) -> Result<OrderApproved> {
    if order.status != OrderStatus::Pending {
        return Err(OrderError::InvalidOrderState {
            order: order.id.to_string(),
            status: order.status,
        }
        .into());
    }

    if !order.plan_code.eq_ignore_ascii_case(&plan.code) {
        return Err(OrderError::PlanMismatch {
            order: order.id.to_string(),
            expected: order.plan_code.clone(),
            found: plan.code.clone(),
        }
        .into());
    }

    let grant = override_grant.unwrap_or_else(|| plan.link_grant());
    store.grant(&order.invitation, grant)?;
    order.status = OrderStatus::Approved;

    info!(
        order = %order.id,
        invitation = %order.invitation,
        plan = plan.code.as_str(),
        overridden = override_grant.is_some(),
        "order approved"
    );

    Ok(OrderApproved {
        order: order.id.clone(),
        invitation: order.invitation.clone(),
        plan_code: plan.code.clone(),
        grant,
        overridden: override_grant.is_some(),
        timestamp: Utc::now(),
    })
}

/// Reject a pending order; no links are granted
pub fn reject_order(order: &mut Order) -> Result<()> {
    if order.status != OrderStatus::Pending {
        return Err(OrderError::InvalidOrderState {
            order: order.id.to_string(),
            status: order.status,
        }
        .into());
    }
    order.status = OrderStatus::Rejected;
    info!(order = %order.id, "order rejected");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{InvitelyError, QuotaError};
    use crate::quota::InMemoryQuotaStore;
    use crate::state::{LinkKind, PlanTier};

    fn premium() -> Plan {
        Plan::new(PlanTier::Premium, "Premium", 150, 5)
    }

    #[test]
    fn test_approve_grants_plan_links() {
        let store = InMemoryQuotaStore::new();
        let mut order = Order::new("ord-1", "inv-1", "PREMIUM");

        let event = approve_order(&store, &mut order, &premium(), None).unwrap();

        assert_eq!(order.status, OrderStatus::Approved);
        assert_eq!(event.grant, LinkGrant::new(150, 5));
        assert!(!event.overridden);
        assert_eq!(store.remaining(&order.invitation, LinkKind::Regular), 150);
        assert_eq!(store.remaining(&order.invitation, LinkKind::Test), 5);
    }

    #[test]
    fn test_approve_with_override() {
        let store = InMemoryQuotaStore::new();
        let mut order = Order::new("ord-2", "inv-2", "PREMIUM");

        let event =
            approve_order(&store, &mut order, &premium(), Some(LinkGrant::new(300, 10))).unwrap();

        assert!(event.overridden);
        assert_eq!(store.remaining(&order.invitation, LinkKind::Regular), 300);
    }

    #[test]
    fn test_approve_twice_rejected() {
        let store = InMemoryQuotaStore::new();
        let mut order = Order::new("ord-3", "inv-3", "PREMIUM");
        approve_order(&store, &mut order, &premium(), None).unwrap();

        let err = approve_order(&store, &mut order, &premium(), None).unwrap_err();
        assert!(matches!(
            err,
            InvitelyError::Order(OrderError::InvalidOrderState {
                status: OrderStatus::Approved,
                ..
            })
        ));
    }

    #[test]
    fn test_second_order_for_same_invitation() {
        let store = InMemoryQuotaStore::new();
        let mut first = Order::new("ord-4", "inv-4", "PREMIUM");
        let mut second = Order::new("ord-5", "inv-4", "PREMIUM");
        approve_order(&store, &mut first, &premium(), None).unwrap();

        let err = approve_order(&store, &mut second, &premium(), None).unwrap_err();
        assert!(matches!(
            err,
            InvitelyError::Quota(QuotaError::AlreadyGranted(_))
        ));
        assert_eq!(second.status, OrderStatus::Pending);
    }

    #[test]
    fn test_plan_mismatch() {
        let store = InMemoryQuotaStore::new();
        let mut order = Order::new("ord-6", "inv-6", "LUXURY");

        let err = approve_order(&store, &mut order, &premium(), None).unwrap_err();
        assert!(matches!(
            err,
            InvitelyError::Order(OrderError::PlanMismatch { .. })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_reject_order() {
        let mut order = Order::new("ord-7", "inv-7", "BASIC");
        reject_order(&mut order).unwrap();
        assert_eq!(order.status, OrderStatus::Rejected);
        assert!(reject_order(&mut order).is_err());
    }
}
