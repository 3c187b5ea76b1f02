//! In-memory protocol world shared by the strategy tests.
//!
//! One [`SimWorld`] plays every external contract at once: the token contracts, a lending
//! pool with its incentives controller, a money market, a stable swap pool with its gauge
//! and a swap router. Clones share state, so a test keeps a handle to inspect balances
//! while the strategy and its adapter own the others.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use alloy_primitives::{Address, U256};

use crate::{
    adapters::{
        LendingPoolAdapter, LendingPoolConfig, LiquidityPoolAdapter, LiquidityPoolConfig,
        MoneyMarketAdapter, MoneyMarketConfig,
    },
    constants::{scale, staked_reward_cooldown},
    protocols::{
        AaveIncentives, CToken, Comptroller, Erc20, LendingPool, LiquidityGauge, MockErc20,
        StableSwapPool, SwapRouter, Transactional,
    },
    strategy::{ExecutableStrategy, StrategyData, StrategySettings},
    types::CallContext,
    utils::error::{ManagerError, ManagerResult},
};

pub const ASSET: Address = Address::repeat_byte(0xa1);
pub const STRATEGY: Address = Address::repeat_byte(0x51);
pub const CONTROLLER: Address = Address::repeat_byte(0xc0);
pub const OWNER: Address = Address::repeat_byte(0x0e);
pub const KEEPER: Address = Address::repeat_byte(0x4b);
pub const POOL: Address = Address::repeat_byte(0x90);
pub const A_TOKEN: Address = Address::repeat_byte(0xa7);
pub const STK: Address = Address::repeat_byte(0x5a);
pub const REWARD: Address = Address::repeat_byte(0xaa);
pub const ROUTER: Address = Address::repeat_byte(0x77);
pub const CTOKEN: Address = Address::repeat_byte(0xc7);
pub const COMP: Address = Address::repeat_byte(0xc3);
pub const CURVE_POOL: Address = Address::repeat_byte(0xcb);
pub const LP: Address = Address::repeat_byte(0x1b);
pub const GAUGE: Address = Address::repeat_byte(0x6a);
pub const CRV: Address = Address::repeat_byte(0xcc);
pub const WETH: Address = Address::repeat_byte(0xee);

/// Compound's `TOKEN_INSUFFICIENT_ALLOWANCE`
const STATUS_INSUFFICIENT_ALLOWANCE: u64 = 13;
/// Compound's `TOKEN_INSUFFICIENT_CASH`
const STATUS_INSUFFICIENT_CASH: u64 = 14;

/// `n` whole units of an 18 decimal token
pub fn units(n: u64) -> U256 {
    U256::from(n) * scale()
}

/// `n` millionths of an 18 decimal token
pub fn micro(n: u64) -> U256 {
    U256::from(n) * U256::from(1_000_000_000_000_u64)
}

/// Orders are relayed by the controller contract
pub fn controller_call() -> CallContext {
    CallContext::relayed(CONTROLLER, 1_000)
}

#[derive(Clone, Default)]
struct WorldState {
    now: u64,
    balances: HashMap<(Address, Address), U256>,
    allowances: HashMap<(Address, Address, Address), U256>,
    deposit_fee_bps: u64,
    claimable: HashMap<Address, U256>,
    cooldowns: HashMap<Address, u64>,
    c_token_underlying: HashMap<Address, U256>,
    virtual_price: Option<U256>,
    gauge_stakes: HashMap<Address, U256>,
    swap_rates: HashMap<Address, U256>,
    last_swap_path: Option<Vec<Address>>,
}

impl WorldState {
    fn balance(&self, token: Address, owner: Address) -> U256 {
        self.balances
            .get(&(token, owner))
            .copied()
            .unwrap_or_default()
    }

    fn mint(&mut self, token: Address, owner: Address, amount: U256) {
        let balance = self.balance(token, owner);
        self.balances.insert((token, owner), balance + amount);
    }

    fn burn(&mut self, token: Address, owner: Address, amount: U256) -> bool {
        let balance = self.balance(token, owner);
        if balance < amount {
            return false;
        }
        self.balances.insert((token, owner), balance - amount);
        true
    }

    fn move_tokens(&mut self, token: Address, from: Address, to: Address, amount: U256) -> bool {
        if !self.burn(token, from, amount) {
            return false;
        }
        self.mint(token, to, amount);
        true
    }

    /// `spender` moves `amount` of `from`'s tokens, consuming allowance
    fn pull(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> bool {
        let allowance = self
            .allowances
            .get(&(token, from, spender))
            .copied()
            .unwrap_or_default();
        if allowance < amount || self.balance(token, from) < amount {
            return false;
        }
        self.allowances
            .insert((token, from, spender), allowance - amount);
        self.move_tokens(token, from, to, amount)
    }

    fn take_claimable(&mut self, holder: Address) -> U256 {
        self.claimable.remove(&holder).unwrap_or_default()
    }

    fn virtual_price(&self) -> U256 {
        self.virtual_price.unwrap_or_else(scale)
    }
}

#[derive(Clone, Default)]
pub struct SimWorld {
    state: Rc<RefCell<WorldState>>,
    /// Snapshots taken by open checkpoints, oldest first
    checkpoints: Rc<RefCell<Vec<WorldState>>>,
}

impl SimWorld {
    pub fn set_time(&self, now: u64) {
        self.state.borrow_mut().now = now;
    }

    pub fn balance(&self, token: Address, owner: Address) -> U256 {
        self.state.borrow().balance(token, owner)
    }

    pub fn mint(&self, token: Address, owner: Address, amount: U256) {
        self.state.borrow_mut().mint(token, owner, amount);
    }

    pub fn approve_as(&self, token: Address, owner: Address, spender: Address, amount: U256) {
        self.state
            .borrow_mut()
            .allowances
            .insert((token, owner, spender), amount);
    }

    /// Interest earned by the strategy's lending position, backed by pool liquidity
    pub fn accrue_interest(&self, amount: U256) {
        let mut state = self.state.borrow_mut();
        state.mint(A_TOKEN, STRATEGY, amount);
        state.mint(ASSET, POOL, amount);
    }

    pub fn set_deposit_fee_bps(&self, bps: u64) {
        self.state.borrow_mut().deposit_fee_bps = bps;
    }

    /// Rewards paid out on the holder's next claim, whatever the protocol
    pub fn set_claimable(&self, holder: Address, amount: U256) {
        self.state.borrow_mut().claimable.insert(holder, amount);
    }

    /// Supply asset paid per reward token, in 18 decimals
    pub fn set_swap_rate(&self, reward: Address, rate: U256) {
        self.state.borrow_mut().swap_rates.insert(reward, rate);
    }

    pub fn set_virtual_price(&self, virtual_price: U256) {
        self.state.borrow_mut().virtual_price = Some(virtual_price);
    }

    pub fn c_token_underlying(&self, owner: Address) -> U256 {
        self.state
            .borrow()
            .c_token_underlying
            .get(&owner)
            .copied()
            .unwrap_or_default()
    }

    pub fn last_swap_path(&self) -> Option<Vec<Address>> {
        self.state.borrow().last_swap_path.clone()
    }

    pub fn open_checkpoints(&self) -> usize {
        self.checkpoints.borrow().len()
    }
}

impl Transactional for SimWorld {
    fn checkpoint(&mut self) -> ManagerResult<u64> {
        let mut checkpoints = self.checkpoints.borrow_mut();
        checkpoints.push(self.state.borrow().clone());
        Ok(checkpoints.len() as u64 - 1)
    }

    fn revert_to(&mut self, checkpoint: u64) -> ManagerResult<()> {
        let mut checkpoints = self.checkpoints.borrow_mut();
        let index = checkpoint as usize;
        if index >= checkpoints.len() {
            return Err(ManagerError::Custom(format!(
                "Unknown checkpoint {}",
                checkpoint
            )));
        }
        *self.state.borrow_mut() = checkpoints[index].clone();
        checkpoints.truncate(index);
        Ok(())
    }

    fn release(&mut self, checkpoint: u64) {
        self.checkpoints.borrow_mut().truncate(checkpoint as usize);
    }
}

/// Mocked tokens keep no state to roll back
impl Transactional for MockErc20 {
    fn checkpoint(&mut self) -> ManagerResult<u64> {
        Ok(0)
    }

    fn revert_to(&mut self, _checkpoint: u64) -> ManagerResult<()> {
        Ok(())
    }

    fn release(&mut self, _checkpoint: u64) {}
}

impl Erc20 for SimWorld {
    fn balance_of(&self, token: Address, owner: Address) -> ManagerResult<U256> {
        Ok(self.balance(token, owner))
    }

    fn transfer(
        &mut self,
        token: Address,
        sender: Address,
        to: Address,
        amount: U256,
    ) -> ManagerResult<bool> {
        Ok(self.state.borrow_mut().move_tokens(token, sender, to, amount))
    }

    fn transfer_from(
        &mut self,
        token: Address,
        sender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> ManagerResult<bool> {
        Ok(self
            .state
            .borrow_mut()
            .pull(token, sender, from, to, amount))
    }

    fn approve(
        &mut self,
        token: Address,
        sender: Address,
        spender: Address,
        amount: U256,
    ) -> ManagerResult<bool> {
        self.approve_as(token, sender, spender, amount);
        Ok(true)
    }
}

impl LendingPool for SimWorld {
    fn deposit(
        &mut self,
        sender: Address,
        asset: Address,
        amount: U256,
        on_behalf_of: Address,
        _referral_code: u16,
    ) -> ManagerResult<()> {
        let mut state = self.state.borrow_mut();
        if !state.pull(asset, POOL, sender, POOL, amount) {
            return Err(ManagerError::Custom(
                "ERC20: transfer amount exceeds allowance".to_string(),
            ));
        }
        let fee = amount * U256::from(state.deposit_fee_bps) / U256::from(10_000);
        state.mint(A_TOKEN, on_behalf_of, amount - fee);
        Ok(())
    }

    fn withdraw(
        &mut self,
        sender: Address,
        asset: Address,
        amount: U256,
        to: Address,
    ) -> ManagerResult<U256> {
        let mut state = self.state.borrow_mut();
        if !state.burn(A_TOKEN, sender, amount) {
            return Err(ManagerError::Custom(
                "User cannot withdraw more than the available balance".to_string(),
            ));
        }
        if !state.move_tokens(asset, POOL, to, amount) {
            return Err(ManagerError::Custom("Pool liquidity exhausted".to_string()));
        }
        Ok(amount)
    }
}

impl AaveIncentives for SimWorld {
    fn claim_rewards(
        &mut self,
        sender: Address,
        _assets: Vec<Address>,
        amount: U256,
        to: Address,
    ) -> ManagerResult<U256> {
        let mut state = self.state.borrow_mut();
        let claimed = state.take_claimable(sender).min(amount);
        state.mint(STK, to, claimed);
        Ok(claimed)
    }

    fn stakers_cooldown(&self, staker: Address) -> ManagerResult<u64> {
        Ok(self
            .state
            .borrow()
            .cooldowns
            .get(&staker)
            .copied()
            .unwrap_or_default())
    }

    fn cooldown(&mut self, sender: Address) -> ManagerResult<()> {
        let mut state = self.state.borrow_mut();
        if state.balance(STK, sender).is_zero() {
            return Err(ManagerError::Custom("INVALID_BALANCE_ON_COOLDOWN".to_string()));
        }
        let now = state.now;
        state.cooldowns.insert(sender, now);
        Ok(())
    }

    fn redeem(&mut self, sender: Address, to: Address, amount: U256) -> ManagerResult<()> {
        let mut state = self.state.borrow_mut();
        let start = state.cooldowns.get(&sender).copied().unwrap_or_default();
        let cooldown = staked_reward_cooldown().num_seconds() as u64;
        if start == 0 || state.now <= start + cooldown {
            return Err(ManagerError::Custom("INSUFFICIENT_COOLDOWN".to_string()));
        }
        if !state.burn(STK, sender, amount) {
            return Err(ManagerError::Custom("INVALID_ZERO_AMOUNT".to_string()));
        }
        state.mint(REWARD, to, amount);
        state.cooldowns.remove(&sender);
        Ok(())
    }
}

impl CToken for SimWorld {
    fn mint(&mut self, sender: Address, amount: U256) -> ManagerResult<U256> {
        let mut state = self.state.borrow_mut();
        if !state.pull(ASSET, CTOKEN, sender, CTOKEN, amount) {
            return Ok(U256::from(STATUS_INSUFFICIENT_ALLOWANCE));
        }
        let underlying = state
            .c_token_underlying
            .get(&sender)
            .copied()
            .unwrap_or_default();
        state.c_token_underlying.insert(sender, underlying + amount);
        Ok(U256::ZERO)
    }

    fn redeem_underlying(&mut self, sender: Address, amount: U256) -> ManagerResult<U256> {
        let mut state = self.state.borrow_mut();
        let underlying = state
            .c_token_underlying
            .get(&sender)
            .copied()
            .unwrap_or_default();
        if underlying < amount || !state.move_tokens(ASSET, CTOKEN, sender, amount) {
            return Ok(U256::from(STATUS_INSUFFICIENT_CASH));
        }
        state.c_token_underlying.insert(sender, underlying - amount);
        Ok(U256::ZERO)
    }

    fn balance_of_underlying(&self, owner: Address) -> ManagerResult<U256> {
        Ok(self.c_token_underlying(owner))
    }
}

impl Comptroller for SimWorld {
    fn claim_comp(&mut self, holder: Address) -> ManagerResult<()> {
        let mut state = self.state.borrow_mut();
        let claimed = state.take_claimable(holder);
        state.mint(COMP, holder, claimed);
        Ok(())
    }
}

impl StableSwapPool for SimWorld {
    fn get_virtual_price(&self) -> ManagerResult<U256> {
        Ok(self.state.borrow().virtual_price())
    }

    fn add_liquidity(
        &mut self,
        sender: Address,
        amounts: Vec<U256>,
        _min_mint_amount: U256,
    ) -> ManagerResult<U256> {
        let mut state = self.state.borrow_mut();
        let amount = amounts.first().copied().unwrap_or_default();
        if !state.pull(ASSET, CURVE_POOL, sender, CURVE_POOL, amount) {
            return Err(ManagerError::Custom("transfer failed".to_string()));
        }
        let minted = amount * scale() / state.virtual_price();
        state.mint(LP, sender, minted);
        Ok(minted)
    }

    fn remove_liquidity_one_coin(
        &mut self,
        sender: Address,
        token_amount: U256,
        _i: i128,
        _min_amount: U256,
    ) -> ManagerResult<U256> {
        let mut state = self.state.borrow_mut();
        if !state.burn(LP, sender, token_amount) {
            return Err(ManagerError::Custom("insufficient LP balance".to_string()));
        }
        let out = token_amount * state.virtual_price() / scale();
        if !state.move_tokens(ASSET, CURVE_POOL, sender, out) {
            return Err(ManagerError::Custom("pool balance exhausted".to_string()));
        }
        Ok(out)
    }
}

impl LiquidityGauge for SimWorld {
    fn balance_of(&self, owner: Address) -> ManagerResult<U256> {
        Ok(self
            .state
            .borrow()
            .gauge_stakes
            .get(&owner)
            .copied()
            .unwrap_or_default())
    }

    fn deposit(&mut self, sender: Address, value: U256) -> ManagerResult<()> {
        let mut state = self.state.borrow_mut();
        if !state.pull(LP, GAUGE, sender, GAUGE, value) {
            return Err(ManagerError::Custom("LP transfer failed".to_string()));
        }
        let staked = state.gauge_stakes.get(&sender).copied().unwrap_or_default();
        state.gauge_stakes.insert(sender, staked + value);
        Ok(())
    }

    fn withdraw(&mut self, sender: Address, value: U256) -> ManagerResult<()> {
        let mut state = self.state.borrow_mut();
        let staked = state.gauge_stakes.get(&sender).copied().unwrap_or_default();
        if staked < value {
            return Err(ManagerError::Custom("withdraw exceeds stake".to_string()));
        }
        state.gauge_stakes.insert(sender, staked - value);
        state.move_tokens(LP, GAUGE, sender, value);
        Ok(())
    }

    fn mint_rewards(&mut self, sender: Address) -> ManagerResult<()> {
        let mut state = self.state.borrow_mut();
        let claimed = state.take_claimable(sender);
        state.mint(CRV, sender, claimed);
        Ok(())
    }
}

impl SwapRouter for SimWorld {
    fn swap_exact_input(
        &mut self,
        sender: Address,
        amount_in: U256,
        amount_out_min: U256,
        path: Vec<Address>,
        to: Address,
        deadline: u64,
    ) -> ManagerResult<Vec<U256>> {
        let mut state = self.state.borrow_mut();
        if state.now > deadline {
            return Err(ManagerError::Custom("UniswapV2Router: EXPIRED".to_string()));
        }
        let (token_in, token_out) = match (path.first(), path.last()) {
            (Some(first), Some(last)) if path.len() >= 2 => (*first, *last),
            _ => return Err(ManagerError::Custom("INVALID_PATH".to_string())),
        };
        if !state.pull(token_in, ROUTER, sender, ROUTER, amount_in) {
            return Err(ManagerError::Custom("TRANSFER_FROM_FAILED".to_string()));
        }

        let rate = state.swap_rates.get(&token_in).copied().unwrap_or_else(scale);
        let amount_out = amount_in * rate / scale();
        if amount_out < amount_out_min {
            return Err(ManagerError::Custom("INSUFFICIENT_OUTPUT_AMOUNT".to_string()));
        }
        state.mint(token_out, to, amount_out);
        state.last_swap_path = Some(path.clone());

        let mut amounts = vec![amount_out; path.len()];
        amounts[0] = amount_in;
        Ok(amounts)
    }
}

pub type LendingStrategy = ExecutableStrategy<
    LendingPoolAdapter<SimWorld, SimWorld, SimWorld>,
    SimWorld,
    SimWorld,
>;
pub type MoneyMarketStrategy =
    ExecutableStrategy<MoneyMarketAdapter<SimWorld, SimWorld>, SimWorld, SimWorld>;
pub type LiquidityPoolStrategy =
    ExecutableStrategy<LiquidityPoolAdapter<SimWorld, SimWorld, SimWorld>, SimWorld, SimWorld>;

fn settings() -> StrategySettings {
    let mut settings = StrategySettings::default();
    settings
        .key(1)
        .strategy(STRATEGY)
        .asset(ASSET)
        .swap_router(ROUTER);
    settings
}

fn data() -> StrategyData {
    let mut data = StrategyData::default();
    data.controller(CONTROLLER).owner(OWNER);
    data
}

/// Gives the controller a large supply asset balance approved to the strategy
fn fund_controller(world: &SimWorld) {
    world.mint(ASSET, CONTROLLER, units(1_000_000_000));
    world.approve_as(ASSET, CONTROLLER, STRATEGY, U256::MAX);
}

pub fn lending_adapter(world: &SimWorld) -> LendingPoolAdapter<SimWorld, SimWorld, SimWorld> {
    LendingPoolAdapter::new(
        LendingPoolConfig::new(ASSET, POOL, A_TOKEN, STK, REWARD),
        world.clone(),
        world.clone(),
        world.clone(),
    )
}

pub fn lending_strategy(world: &SimWorld) -> LendingStrategy {
    ExecutableStrategy::new(
        settings(),
        data(),
        lending_adapter(world),
        world.clone(),
        world.clone(),
    )
}

pub fn funded_lending_strategy(world: &SimWorld) -> LendingStrategy {
    fund_controller(world);
    lending_strategy(world)
}

pub fn funded_money_market_strategy(world: &SimWorld) -> MoneyMarketStrategy {
    fund_controller(world);
    let adapter = MoneyMarketAdapter::new(
        MoneyMarketConfig {
            c_token: CTOKEN,
            reward_token: COMP,
        },
        world.clone(),
        world.clone(),
    );
    ExecutableStrategy::new(settings(), data(), adapter, world.clone(), world.clone())
}

pub fn funded_liquidity_pool_strategy(world: &SimWorld) -> LiquidityPoolStrategy {
    fund_controller(world);
    // liquidity provided by everyone else
    world.mint(ASSET, CURVE_POOL, units(1_000_000));
    let adapter = LiquidityPoolAdapter::new(
        LiquidityPoolConfig {
            pool: CURVE_POOL,
            lp_token: LP,
            gauge: GAUGE,
            reward_token: CRV,
            coin_index: 0,
            n_coins: 2,
            precision: U256::from(1),
        },
        world.clone(),
        world.clone(),
        world.clone(),
    );
    ExecutableStrategy::new(settings(), data(), adapter, world.clone(), world.clone())
}
