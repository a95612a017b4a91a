//! Subscription plans and the payment seam.
//!
//! Charging real money happens in an external processor. This crate only
//! needs to know which plan a user holds and to request a charge when they
//! change it.

use crate::error::BillingError;
use async_trait::async_trait;
use cardsmith_config::{BillingConfig, PlanLimits};
use cardsmith_protocol::{Plan, Receipt, UserId};
use chrono::Utc;
use log::info;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// Resolves plans and charges for plan changes.
#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// Plan currently held by `user_id`.
    async fn plan_for(&self, user_id: &str) -> Result<Plan, BillingError>;

    /// Move `user_id` to `plan`, returning the receipt for the charge.
    async fn charge(&self, user_id: &str, plan: Plan) -> Result<Receipt, BillingError>;
}

/// Billing backed by config, with plan changes kept in memory.
#[derive(Debug)]
pub struct StaticBillingProvider {
    config: BillingConfig,
    changes: RwLock<HashMap<UserId, Plan>>,
}

impl StaticBillingProvider {
    pub fn new(config: BillingConfig) -> Self {
        Self {
            config,
            changes: RwLock::new(HashMap::new()),
        }
    }

    pub fn limits(&self, plan: Plan) -> &PlanLimits {
        self.config.plans.limits(plan)
    }

    fn current_plan(&self, user_id: &str) -> Plan {
        self.changes
            .read()
            .get(user_id)
            .or_else(|| self.config.subscribers.get(user_id))
            .copied()
            .unwrap_or(self.config.default_plan)
    }
}

#[async_trait]
impl BillingProvider for StaticBillingProvider {
    async fn plan_for(&self, user_id: &str) -> Result<Plan, BillingError> {
        Ok(self.current_plan(user_id))
    }

    async fn charge(&self, user_id: &str, plan: Plan) -> Result<Receipt, BillingError> {
        if user_id.trim().is_empty() {
            return Err(BillingError::Rejected("user id must not be empty".to_string()));
        }
        let current = self.current_plan(user_id);
        if current == plan {
            return Err(BillingError::AlreadySubscribed {
                user_id: user_id.to_string(),
                plan,
            });
        }
        let receipt = Receipt {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            plan,
            amount_cents: self.limits(plan).price_cents,
            created_at: Utc::now(),
        };
        self.changes.write().insert(user_id.to_string(), plan);
        info!(
            "changed plan (user_id={}, from={}, to={}, amount_cents={})",
            user_id, current, plan, receipt.amount_cents
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn provider() -> StaticBillingProvider {
        let mut config = BillingConfig::default();
        config.subscribers.insert("paying".to_string(), Plan::Pro);
        StaticBillingProvider::new(config)
    }

    #[tokio::test]
    async fn resolves_default_and_configured_plans() {
        let billing = provider();
        assert_eq!(billing.plan_for("someone").await.expect("plan"), Plan::Free);
        assert_eq!(billing.plan_for("paying").await.expect("plan"), Plan::Pro);
    }

    #[tokio::test]
    async fn charge_upgrades_and_prices_from_config() {
        let billing = provider();
        let receipt = billing.charge("someone", Plan::Pro).await.expect("receipt");
        assert_eq!(receipt.user_id, "someone");
        assert_eq!(receipt.plan, Plan::Pro);
        assert_eq!(receipt.amount_cents, 900);
        assert_eq!(billing.plan_for("someone").await.expect("plan"), Plan::Pro);
    }

    #[tokio::test]
    async fn downgrade_overrides_configured_plan() {
        let billing = provider();
        let receipt = billing.charge("paying", Plan::Free).await.expect("receipt");
        assert_eq!(receipt.amount_cents, 0);
        assert_eq!(billing.plan_for("paying").await.expect("plan"), Plan::Free);
    }

    #[tokio::test]
    async fn charging_for_current_plan_is_refused() {
        let err = provider().charge("paying", Plan::Pro).await.unwrap_err();
        assert!(matches!(err, BillingError::AlreadySubscribed { plan: Plan::Pro, .. }));
    }

    #[tokio::test]
    async fn blank_user_is_rejected() {
        let err = provider().charge(" ", Plan::Pro).await.unwrap_err();
        assert!(matches!(err, BillingError::Rejected(_)));
    }
}
