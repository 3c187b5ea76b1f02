//! Yield Strategy Constants

use alloy_primitives::U256;
use chrono::Duration;

/// Scale used for fixed point arithmetic
pub const SCALE: u128 = 1_000_000_000_000_000_000; // e18
pub fn scale() -> U256 {
    U256::from(SCALE)
}

/// Price reported while shares are zero but the external position already holds value.
/// Callers must not divide by it.
pub fn max_price() -> U256 {
    U256::MAX
}

/// Seconds added to the current timestamp to form the swap deadline during harvests
pub const SWAP_DEADLINE_WINDOW: u64 = 1800;

/// Referral code forwarded on lending pool deposits
pub const LENDING_POOL_REFERRAL_CODE: u16 = 0;

/// Compound-style money markets report success with a zero status code
pub const MONEY_MARKET_SUCCESS: u64 = 0;

/// Cooldown of the staked reward token before it can be redeemed
pub fn staked_reward_cooldown() -> Duration {
    Duration::days(10)
}

/// Window after the cooldown during which the staked reward token can be redeemed
pub fn staked_reward_unstake_window() -> Duration {
    Duration::days(2)
}

/// Max number of entries kept in a strategy journal. Oldest entries are pruned first.
pub const MAX_JOURNAL_ENTRIES: usize = 1_000;

/// Target used by the `log` facade
pub const LOG_TARGET: &str = "yield-strategy";
