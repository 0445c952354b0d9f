use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Feature {
    CardGeneration,
    UnlimitedGames,
    PremiumThemes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    Free,
    Active,
    Canceled,
    PastDue,
}

/// Free-tier allowances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UsageLimits {
    pub cards_per_month: u32,
    pub games_per_day: u32,
}

impl Default for UsageLimits {
    fn default() -> Self {
        Self {
            cards_per_month: 3,
            games_per_day: 20,
        }
    }
}

/// Usage counters for the signed-in user, as last reported by the host page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Account {
    pub user_id: String,
    pub subscription: SubscriptionStatus,
    pub cards_generated: u32,
    pub games_played: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "access", rename_all = "camelCase")]
pub enum Access {
    Allowed,
    Denied { reason: String },
}

impl Access {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Access::Allowed)
    }
}

pub trait EntitlementGate {
    fn check_access(&self, feature: Feature) -> Access;
}

/// Gate backed by local counters and the free-tier limits.
#[derive(Debug, Clone, Default)]
pub struct UsageGate {
    account: Account,
    limits: UsageLimits,
}

impl UsageGate {
    pub fn new(account: Account, limits: UsageLimits) -> Self {
        Self { account, limits }
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn set_account(&mut self, account: Account) {
        self.account = account;
    }

    pub fn record_card(&mut self) {
        self.account.cards_generated = self.account.cards_generated.saturating_add(1);
    }

    pub fn record_game(&mut self) {
        self.account.games_played = self.account.games_played.saturating_add(1);
    }
}

impl EntitlementGate for UsageGate {
    fn check_access(&self, feature: Feature) -> Access {
        if self.account.subscription == SubscriptionStatus::Active {
            return Access::Allowed;
        }
        match feature {
            Feature::CardGeneration if self.account.cards_generated >= self.limits.cards_per_month => {
                Access::Denied {
                    reason: format!(
                        "Free plan includes {} cards per month",
                        self.limits.cards_per_month
                    ),
                }
            }
            Feature::UnlimitedGames if self.account.games_played >= self.limits.games_per_day => {
                Access::Denied {
                    reason: format!("Free plan includes {} games per day", self.limits.games_per_day),
                }
            }
            Feature::PremiumThemes => Access::Denied {
                reason: "Premium themes need an active subscription".to_string(),
            },
            _ => Access::Allowed,
        }
    }
}

/// Gate that allows everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenGate;

impl EntitlementGate for OpenGate {
    fn check_access(&self, _: Feature) -> Access {
        Access::Allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_limits_apply() {
        let mut gate = UsageGate::default();
        for _ in 0..3 {
            assert!(gate.check_access(Feature::CardGeneration).is_allowed());
            gate.record_card();
        }
        assert!(!gate.check_access(Feature::CardGeneration).is_allowed());

        for _ in 0..20 {
            gate.record_game();
        }
        assert!(!gate.check_access(Feature::UnlimitedGames).is_allowed());
        assert!(!gate.check_access(Feature::PremiumThemes).is_allowed());
    }

    #[test]
    fn active_subscription_passes_everything() {
        let account = Account {
            subscription: SubscriptionStatus::Active,
            cards_generated: 99,
            games_played: 99,
            ..Default::default()
        };
        let gate = UsageGate::new(account, UsageLimits::default());
        assert!(gate.check_access(Feature::CardGeneration).is_allowed());
        assert!(gate.check_access(Feature::UnlimitedGames).is_allowed());
        assert!(gate.check_access(Feature::PremiumThemes).is_allowed());
    }

    #[test]
    fn lapsed_subscription_is_free_tier() {
        let account: Account =
            serde_json::from_str(r#"{"userId":"u1","subscription":"past_due","gamesPlayed":20}"#).unwrap();
        let gate = UsageGate::new(account, UsageLimits::default());
        assert!(!gate.check_access(Feature::UnlimitedGames).is_allowed());
    }
}
