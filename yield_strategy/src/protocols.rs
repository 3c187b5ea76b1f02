//! External protocol contracts consumed by the strategies.
//!
//! Every state-changing call names its `sender`, the account the external contract sees
//! as the immediate caller. A single failing call is expected to leave its own contract
//! untouched. Effects of earlier calls in the same strategy operation are undone through
//! [`Transactional`].

use alloy_primitives::{Address, U256};

#[cfg(test)]
use mockall::automock;

use crate::utils::error::ManagerResult;

/// Snapshot and rollback of the external state a strategy operation touches.
///
/// A checkpoint covers every contract the host serves through the same chain view, so
/// rolling back undoes pulled transfers, deposits, withdrawals, claims and swaps alike.
/// Checkpoints nest: reverting to or releasing a checkpoint also discards every
/// checkpoint taken after it.
pub trait Transactional {
    /// Opens a checkpoint and returns its id.
    fn checkpoint(&mut self) -> ManagerResult<u64>;

    /// Restores the state captured by `checkpoint` and closes it.
    fn revert_to(&mut self, checkpoint: u64) -> ManagerResult<()>;

    /// Keeps every change made since `checkpoint` and closes it.
    fn release(&mut self, checkpoint: u64);
}

/// Fungible token contracts, addressed by token.
/// Boolean results mirror the ERC20 return value; `false` means the call did not go through.
#[cfg_attr(test, automock)]
pub trait Erc20 {
    fn balance_of(&self, token: Address, owner: Address) -> ManagerResult<U256>;

    fn transfer(
        &mut self,
        token: Address,
        sender: Address,
        to: Address,
        amount: U256,
    ) -> ManagerResult<bool>;

    fn transfer_from(
        &mut self,
        token: Address,
        sender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> ManagerResult<bool>;

    fn approve(
        &mut self,
        token: Address,
        sender: Address,
        spender: Address,
        amount: U256,
    ) -> ManagerResult<bool>;
}

/// Lending pool that mints interest-bearing tokens 1:1 with the supplied asset
#[cfg_attr(test, automock)]
pub trait LendingPool {
    fn deposit(
        &mut self,
        sender: Address,
        asset: Address,
        amount: U256,
        on_behalf_of: Address,
        referral_code: u16,
    ) -> ManagerResult<()>;

    /// Returns the amount withdrawn
    fn withdraw(
        &mut self,
        sender: Address,
        asset: Address,
        amount: U256,
        to: Address,
    ) -> ManagerResult<U256>;
}

/// Incentives controller of a lending pool together with its staked reward token
#[cfg_attr(test, automock)]
pub trait AaveIncentives {
    /// Claims up to `amount` rewards accrued by `assets`, paid in the staked reward token.
    /// Returns the claimed amount.
    fn claim_rewards(
        &mut self,
        sender: Address,
        assets: Vec<Address>,
        amount: U256,
        to: Address,
    ) -> ManagerResult<U256>;

    /// Timestamp the staker's cooldown was activated at, zero if inactive
    fn stakers_cooldown(&self, staker: Address) -> ManagerResult<u64>;

    fn cooldown(&mut self, sender: Address) -> ManagerResult<()>;

    /// Burns staked reward tokens and pays out the underlying reward token
    fn redeem(&mut self, sender: Address, to: Address, amount: U256) -> ManagerResult<()>;
}

/// Money market token reporting status codes
#[cfg_attr(test, automock)]
pub trait CToken {
    /// Returns a status code, zero on success
    fn mint(&mut self, sender: Address, amount: U256) -> ManagerResult<U256>;

    /// Returns a status code, zero on success
    fn redeem_underlying(&mut self, sender: Address, amount: U256) -> ManagerResult<U256>;

    fn balance_of_underlying(&self, owner: Address) -> ManagerResult<U256>;
}

/// Money market reward distributor
#[cfg_attr(test, automock)]
pub trait Comptroller {
    fn claim_comp(&mut self, holder: Address) -> ManagerResult<()>;
}

/// Stable swap liquidity pool
#[cfg_attr(test, automock)]
pub trait StableSwapPool {
    /// Value of one LP token in 18 decimals
    fn get_virtual_price(&self) -> ManagerResult<U256>;

    /// Returns the LP tokens minted
    fn add_liquidity(
        &mut self,
        sender: Address,
        amounts: Vec<U256>,
        min_mint_amount: U256,
    ) -> ManagerResult<U256>;

    /// Returns the coin amount received
    fn remove_liquidity_one_coin(
        &mut self,
        sender: Address,
        token_amount: U256,
        i: i128,
        min_amount: U256,
    ) -> ManagerResult<U256>;
}

/// Gauge staking LP tokens, paired with its reward minter
#[cfg_attr(test, automock)]
pub trait LiquidityGauge {
    fn balance_of(&self, owner: Address) -> ManagerResult<U256>;

    fn deposit(&mut self, sender: Address, value: U256) -> ManagerResult<()>;

    fn withdraw(&mut self, sender: Address, value: U256) -> ManagerResult<()>;

    /// Mints the rewards accrued by `sender` in the gauge
    fn mint_rewards(&mut self, sender: Address) -> ManagerResult<()>;
}

/// Exchange router
#[cfg_attr(test, automock)]
pub trait SwapRouter {
    /// Swaps `amount_in` of `path[0]` along `path`. Fails once `deadline` has passed.
    /// Returns the amount at each hop.
    fn swap_exact_input(
        &mut self,
        sender: Address,
        amount_in: U256,
        amount_out_min: U256,
        path: Vec<Address>,
        to: Address,
        deadline: u64,
    ) -> ManagerResult<Vec<U256>>;
}
