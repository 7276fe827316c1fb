//! The vesting ledger store object.

use crate::error::VestingError;
use crate::event::{EventBus, StakingEvent};
use crate::position::StakePosition;
use crate::state::{AccountLedger, LedgerChange};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use vestlock_delegation::DelegationRegistry;
use vestlock_gateway::AssetGateway;
use vestlock_governance::GovernanceConfig;
use vestlock_store::{meta_keys, StakeBatch, StakeStore};
use vestlock_types::{AccountId, Timestamp};

/// What a plain `stake` does when the account's latest position is still open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StakeMergePolicy {
    /// Merge into the open position, keeping its duration (same as `extend`).
    #[default]
    MergeIntoOpen,
    /// Always open a new position with the requested duration.
    AlwaysNewPosition,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DepositKind {
    Stake,
    Extend,
}

/// The staking ledger store object.
///
/// Owns every account's positions together with the governance record and
/// the delegation registry they are checked against. Mutations take
/// `&mut self`, so operations are applied one at a time in call order.
/// Every mutation is staged, the asset gateway is called, and the staged
/// change is committed only once the transfer succeeded.
pub struct VestingLedger {
    governance: GovernanceConfig,
    delegation: DelegationRegistry,
    accounts: HashMap<AccountId, AccountLedger>,
    merge_policy: StakeMergePolicy,
    /// Sum of every position balance across all accounts.
    total_staked: u128,
    /// Accounts mutated since the last successful save.
    dirty: HashSet<AccountId>,
    events: EventBus,
}

impl VestingLedger {
    pub fn new(governance: GovernanceConfig) -> Self {
        Self {
            governance,
            delegation: DelegationRegistry::new(),
            accounts: HashMap::new(),
            merge_policy: StakeMergePolicy::default(),
            total_staked: 0,
            dirty: HashSet::new(),
            events: EventBus::new(),
        }
    }

    pub fn with_merge_policy(mut self, policy: StakeMergePolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    pub fn merge_policy(&self) -> StakeMergePolicy {
        self.merge_policy
    }

    /// Event bus for subscribing to committed mutations.
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn governance(&self) -> &GovernanceConfig {
        &self.governance
    }

    pub fn delegation(&self) -> &DelegationRegistry {
        &self.delegation
    }

    // ── Governance surface ─────────────────────────────────────────────

    pub fn set_bounds(
        &mut self,
        caller: &AccountId,
        min: u64,
        max: u64,
        default: u64,
    ) -> Result<(), VestingError> {
        self.governance
            .set_bounds(caller, min, max, default)
            .inspect_err(|e| tracing::warn!(%caller, error = %e, "set_bounds rejected"))?;
        self.events
            .emit(&StakingEvent::BoundsUpdated { min, max, default });
        Ok(())
    }

    pub fn set_metadata(
        &mut self,
        caller: &AccountId,
        name: &str,
        symbol: &str,
    ) -> Result<(), VestingError> {
        self.governance
            .set_metadata(caller, name, symbol)
            .inspect_err(|e| tracing::warn!(%caller, error = %e, "set_metadata rejected"))?;
        self.events.emit(&StakingEvent::MetadataUpdated {
            name: name.to_string(),
            symbol: symbol.to_string(),
        });
        Ok(())
    }

    // ── Delegation surface ─────────────────────────────────────────────

    /// Register `delegate` for the calling account. The raw caller is the
    /// account; delegates cannot register further delegates on its behalf.
    pub fn add_delegate(
        &mut self,
        caller: &AccountId,
        delegate: &AccountId,
    ) -> Result<(), VestingError> {
        self.delegation.add_delegate(caller, delegate)?;
        tracing::info!(account = %caller, %delegate, "delegate added");
        self.events.emit(&StakingEvent::DelegateAdded {
            account: caller.clone(),
            delegate: delegate.clone(),
        });
        Ok(())
    }

    pub fn remove_delegate(
        &mut self,
        caller: &AccountId,
        delegate: &AccountId,
    ) -> Result<(), VestingError> {
        self.delegation.remove_delegate(caller, delegate)?;
        tracing::info!(account = %caller, %delegate, "delegate removed");
        self.events.emit(&StakingEvent::DelegateRemoved {
            account: caller.clone(),
            delegate: delegate.clone(),
        });
        Ok(())
    }

    /// The account a caller's ledger operations apply to.
    pub fn resolve(&self, caller: &AccountId) -> AccountId {
        self.delegation.resolve(caller)
    }

    pub fn is_delegate(&self, address: &AccountId) -> bool {
        self.delegation.is_delegate(address)
    }

    pub fn delegate_of(&self, account: &AccountId) -> Option<&AccountId> {
        self.delegation.delegate_of(account)
    }

    pub fn account_of(&self, delegate: &AccountId) -> Option<&AccountId> {
        self.delegation.account_of(delegate)
    }

    // ── Account surface ────────────────────────────────────────────────

    /// Stake `amount` for the caller's effective account with an explicit duration.
    ///
    /// Funds are pulled from the raw caller. Returns the position the deposit
    /// landed in.
    pub fn stake(
        &mut self,
        caller: &AccountId,
        amount: u128,
        duration: u64,
        now: Timestamp,
        gateway: &mut dyn AssetGateway,
    ) -> Result<StakePosition, VestingError> {
        let account = self.delegation.resolve(caller);
        self.stake_into(caller, account, amount, duration, now, gateway)
    }

    /// Stake with the governance default duration.
    pub fn stake_default(
        &mut self,
        caller: &AccountId,
        amount: u128,
        now: Timestamp,
        gateway: &mut dyn AssetGateway,
    ) -> Result<StakePosition, VestingError> {
        let duration = self.governance.default_duration();
        self.stake(caller, amount, duration, now, gateway)
    }

    /// Stake on behalf of `target`: the caller pays, `target` is credited.
    pub fn stake_for(
        &mut self,
        caller: &AccountId,
        target: &AccountId,
        amount: u128,
        duration: Option<u64>,
        now: Timestamp,
        gateway: &mut dyn AssetGateway,
    ) -> Result<StakePosition, VestingError> {
        let duration = duration.unwrap_or_else(|| self.governance.default_duration());
        self.stake_into(caller, target.clone(), amount, duration, now, gateway)
    }

    /// Add `amount` to the caller's effective account's latest position.
    pub fn extend(
        &mut self,
        caller: &AccountId,
        amount: u128,
        now: Timestamp,
        gateway: &mut dyn AssetGateway,
    ) -> Result<StakePosition, VestingError> {
        let account = self.delegation.resolve(caller);
        self.extend_into(caller, account, amount, now, gateway)
    }

    /// Extend `target`'s latest position with funds from the caller.
    pub fn extend_for(
        &mut self,
        caller: &AccountId,
        target: &AccountId,
        amount: u128,
        now: Timestamp,
        gateway: &mut dyn AssetGateway,
    ) -> Result<StakePosition, VestingError> {
        self.extend_into(caller, target.clone(), amount, now, gateway)
    }

    /// Withdraw `amount` vested units from the caller's effective account.
    ///
    /// Positions are drained in creation order. The units are sent to the
    /// raw caller. A zero amount on a staked account succeeds without a
    /// transfer.
    pub fn unstake(
        &mut self,
        caller: &AccountId,
        amount: u128,
        now: Timestamp,
        gateway: &mut dyn AssetGateway,
    ) -> Result<(), VestingError> {
        let account = self.delegation.resolve(caller);
        let ledger = self
            .accounts
            .get(&account)
            .filter(|l| !l.is_empty())
            .ok_or_else(|| VestingError::NotStaked(account.clone()))?;
        if amount == 0 {
            tracing::debug!(%account, "zero unstake ignored");
            return Ok(());
        }
        let change = ledger.plan_withdrawal(amount, now).inspect_err(|e| {
            tracing::debug!(%account, %amount, error = %e, "unstake rejected");
        })?;
        let new_total = self
            .total_staked
            .checked_sub(amount)
            .ok_or(VestingError::Overflow)?;

        gateway.transfer_out(caller, amount).inspect_err(|e| {
            tracing::warn!(%account, recipient = %caller, %amount, reason = %e, "transfer out failed");
        })?;

        if let Some(ledger) = self.accounts.get_mut(&account) {
            ledger.apply(change);
        }
        self.total_staked = new_total;
        self.dirty.insert(account.clone());
        tracing::info!(%account, recipient = %caller, %amount, "unstaked");
        self.events.emit(&StakingEvent::Unstaked {
            account,
            recipient: caller.clone(),
            amount,
        });
        Ok(())
    }

    fn stake_into(
        &mut self,
        payer: &AccountId,
        account: AccountId,
        amount: u128,
        duration: u64,
        now: Timestamp,
        gateway: &mut dyn AssetGateway,
    ) -> Result<StakePosition, VestingError> {
        if amount == 0 {
            return Err(VestingError::AmountInvalid);
        }
        self.governance.check_duration(duration)?;
        let merge = self.merge_policy == StakeMergePolicy::MergeIntoOpen;
        self.deposit(DepositKind::Stake, payer, account, amount, duration, merge, now, gateway)
    }

    fn extend_into(
        &mut self,
        payer: &AccountId,
        account: AccountId,
        amount: u128,
        now: Timestamp,
        gateway: &mut dyn AssetGateway,
    ) -> Result<StakePosition, VestingError> {
        let duration = self
            .accounts
            .get(&account)
            .and_then(AccountLedger::last)
            .map(|last| last.duration)
            .ok_or_else(|| VestingError::NotStaked(account.clone()))?;
        if amount == 0 {
            return Err(VestingError::AmountInvalid);
        }
        self.deposit(DepositKind::Extend, payer, account, amount, duration, true, now, gateway)
    }

    #[allow(clippy::too_many_arguments)]
    fn deposit(
        &mut self,
        kind: DepositKind,
        payer: &AccountId,
        account: AccountId,
        amount: u128,
        duration: u64,
        merge: bool,
        now: Timestamp,
        gateway: &mut dyn AssetGateway,
    ) -> Result<StakePosition, VestingError> {
        let empty = AccountLedger::new();
        let current = self.accounts.get(&account).unwrap_or(&empty);
        let change = current.plan_deposit(amount, duration, merge, now)?;
        let index = change.target_index(current).unwrap_or_default();
        let merged = matches!(change, LedgerChange::Merge { .. });
        let new_total = self
            .total_staked
            .checked_add(amount)
            .ok_or(VestingError::Overflow)?;

        gateway.transfer_in(payer, amount).inspect_err(|e| {
            tracing::warn!(%account, %payer, %amount, reason = %e, "transfer in failed");
        })?;

        let ledger = self.accounts.entry(account.clone()).or_default();
        ledger.apply(change);
        let position = ledger.positions()[index];
        self.total_staked = new_total;
        self.dirty.insert(account.clone());

        tracing::info!(
            %account,
            %payer,
            %amount,
            index,
            merged,
            origin = %position.origin,
            duration = position.duration,
            "{}",
            match kind {
                DepositKind::Stake => "staked",
                DepositKind::Extend => "extended",
            }
        );
        let event = match kind {
            DepositKind::Stake => StakingEvent::Staked {
                account,
                payer: payer.clone(),
                amount,
                index,
                merged,
            },
            DepositKind::Extend => StakingEvent::Extended {
                account,
                payer: payer.clone(),
                amount,
                index,
                merged,
            },
        };
        self.events.emit(&event);
        Ok(position)
    }

    // ── Query surface ──────────────────────────────────────────────────

    /// Units `account` could withdraw at `now`.
    pub fn available(&self, account: &AccountId, now: Timestamp) -> u128 {
        self.accounts
            .get(account)
            .map(|l| l.available(now))
            .unwrap_or(0)
    }

    /// Units held across all of `account`'s positions, vested or not.
    pub fn balance_of(&self, account: &AccountId) -> u128 {
        self.accounts.get(account).map(AccountLedger::balance).unwrap_or(0)
    }

    /// The most recently created position.
    pub fn position_snapshot(&self, account: &AccountId) -> Option<StakePosition> {
        self.accounts.get(account).and_then(|l| l.last().copied())
    }

    /// Full position history in creation order.
    pub fn positions(&self, account: &AccountId) -> &[StakePosition] {
        self.accounts
            .get(account)
            .map(AccountLedger::positions)
            .unwrap_or(&[])
    }

    pub fn total_staked(&self) -> u128 {
        self.total_staked
    }

    pub fn accounts(&self) -> impl Iterator<Item = &AccountId> {
        self.accounts.keys()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }
}

impl VestingLedger {
    /// Persist ledger state to a stake store in one batch.
    ///
    /// The batch holds the governance record, the delegation registry and
    /// every account ledger changed since the last successful save. On
    /// failure nothing is written and the changed accounts stay pending.
    pub fn save_to_store(&mut self, store: &dyn StakeStore) -> Result<(), VestingError> {
        let mut batch = StakeBatch::new();
        let governance = bincode::serialize(&self.governance)
            .map_err(|e| VestingError::Store(e.to_string()))?;
        batch.put_meta(meta_keys::GOVERNANCE, &governance);
        batch.put_meta(meta_keys::DELEGATION, &self.delegation.save_state()?);

        for account in &self.dirty {
            if let Some(ledger) = self.accounts.get(account) {
                let bytes =
                    bincode::serialize(ledger).map_err(|e| VestingError::Store(e.to_string()))?;
                batch.put_account_ledger(account, &bytes);
            }
        }
        let accounts = batch.ledgers().len();
        store.commit(batch).inspect_err(|e| {
            tracing::warn!(accounts, error = %e, "ledger save failed");
        })?;
        self.dirty.clear();
        tracing::debug!(accounts, "ledger saved");
        Ok(())
    }

    /// Accounts changed since the last successful save.
    pub fn pending_accounts(&self) -> usize {
        self.dirty.len()
    }

    /// Restore ledger state from a stake store.
    ///
    /// Returns `None` when the store holds no governance record yet.
    pub fn load_from_store(store: &dyn StakeStore) -> Result<Option<Self>, VestingError> {
        let Some(governance) = store.get_meta(meta_keys::GOVERNANCE)? else {
            return Ok(None);
        };
        let governance: GovernanceConfig =
            bincode::deserialize(&governance).map_err(|e| VestingError::Store(e.to_string()))?;
        governance.validate()?;

        let delegation = match store.get_meta(meta_keys::DELEGATION)? {
            Some(bytes) => DelegationRegistry::load_state(&bytes)?,
            None => DelegationRegistry::new(),
        };

        let mut accounts = HashMap::new();
        let mut total_staked = 0u128;
        for (account, bytes) in store.iter_account_ledgers()? {
            let ledger: AccountLedger =
                bincode::deserialize(&bytes).map_err(|e| VestingError::Store(e.to_string()))?;
            total_staked = total_staked
                .checked_add(ledger.balance())
                .ok_or(VestingError::Overflow)?;
            accounts.insert(account, ledger);
        }
        tracing::debug!(accounts = accounts.len(), %total_staked, "ledger loaded");

        Ok(Some(Self {
            governance,
            delegation,
            accounts,
            merge_policy: StakeMergePolicy::default(),
            total_staked,
            dirty: HashSet::new(),
            events: EventBus::new(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorClass;
    use std::sync::{Arc, Mutex};
    use vestlock_nullables::{NullClock, NullGateway, NullStakeStore};
    use vestlock_types::VestingParams;

    const MIN: u64 = 10;
    const MAX: u64 = 1000;
    const DEFAULT: u64 = 100;
    const T0: u64 = 1_000_000;

    fn acct(name: &str) -> AccountId {
        AccountId::new(name)
    }

    fn owner() -> AccountId {
        acct("deployer")
    }

    fn make_ledger() -> VestingLedger {
        let params = VestingParams {
            min_duration_secs: MIN,
            max_duration_secs: MAX,
            default_duration_secs: DEFAULT,
            name: "Staked AST".to_string(),
            symbol: "sAST".to_string(),
        };
        VestingLedger::new(GovernanceConfig::new(owner(), &params).unwrap())
    }

    fn setup() -> (VestingLedger, NullGateway, NullClock) {
        (make_ledger(), NullGateway::permissive(), NullClock::new(T0))
    }

    fn record_events(ledger: &mut VestingLedger) -> Arc<Mutex<Vec<StakingEvent>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        ledger
            .events_mut()
            .subscribe(Box::new(move |e: &StakingEvent| {
                sink.lock().unwrap().push(e.clone())
            }));
        seen
    }

    // ── Stake ────────────────────────────────────────────────────────────

    #[test]
    fn successful_staking() {
        let (mut ledger, mut gw, clock) = setup();
        let a = acct("account1");
        ledger.stake(&a, 100, DEFAULT, clock.now(), &mut gw).unwrap();

        let snap = ledger.position_snapshot(&a).unwrap();
        assert_eq!(snap.balance, 100);
        assert_eq!(snap.duration, DEFAULT);
        assert_eq!(snap.origin, clock.now());
        assert_eq!(ledger.total_staked(), 100);
    }

    #[test]
    fn successful_staking_for_uses_default_duration() {
        let (mut ledger, mut gw, clock) = setup();
        let (payer, target) = (acct("account1"), acct("account2"));
        ledger
            .stake_for(&payer, &target, 170, None, clock.now(), &mut gw)
            .unwrap();

        let snap = ledger.position_snapshot(&target).unwrap();
        assert_eq!(snap.balance, 170);
        assert_eq!(snap.duration, DEFAULT);
        assert_eq!(snap.origin, clock.now());
        assert_eq!(ledger.balance_of(&payer), 0);
        assert_eq!(gw.transfers()[0].1, payer);
    }

    #[test]
    fn stake_default_uses_governance_default() {
        let (mut ledger, mut gw, clock) = setup();
        let a = acct("a");
        let p = ledger.stake_default(&a, 5, clock.now(), &mut gw).unwrap();
        assert_eq!(p.duration, DEFAULT);
    }

    #[test]
    fn staking_zero_is_invalid() {
        let (mut ledger, mut gw, clock) = setup();
        let err = ledger
            .stake(&acct("a"), 0, DEFAULT, clock.now(), &mut gw)
            .unwrap_err();
        assert_eq!(err.code(), "AMOUNT_INVALID");
        assert_eq!(err.class(), ErrorClass::Validation);
        assert!(gw.transfers().is_empty());
    }

    #[test]
    fn staking_outside_duration_bounds_fails() {
        let (mut ledger, mut gw, clock) = setup();
        let a = acct("a");
        for duration in [MIN - 1, MAX + 1] {
            let err = ledger.stake(&a, 10, duration, clock.now(), &mut gw).unwrap_err();
            assert_eq!(err.code(), "DURATION_OUT_OF_BOUNDS");
        }
        assert!(ledger.positions(&a).is_empty());
    }

    #[test]
    fn unsuccessful_staking_when_gateway_fails() {
        let (mut ledger, mut gw, clock) = setup();
        let events = record_events(&mut ledger);
        gw.fail_with("Insufficient Funds");
        let a = acct("a");

        let err = ledger.stake(&a, 100, DEFAULT, clock.now(), &mut gw).unwrap_err();
        assert_eq!(err.to_string(), "Insufficient Funds");
        assert_eq!(err.class(), ErrorClass::ExternalTransfer);
        assert_eq!(ledger.balance_of(&a), 0);
        assert_eq!(ledger.account_count(), 0);
        assert_eq!(ledger.total_staked(), 0);
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn failed_merge_leaves_origin_untouched() {
        let (mut ledger, mut gw, clock) = setup();
        let a = acct("a");
        ledger.stake(&a, 100, DEFAULT, clock.now(), &mut gw).unwrap();
        clock.advance(20);
        gw.fail_with("paused");

        assert!(ledger.extend(&a, 120, clock.now(), &mut gw).is_err());
        let snap = ledger.position_snapshot(&a).unwrap();
        assert_eq!(snap.balance, 100);
        assert_eq!(snap.origin, Timestamp::new(T0));
    }

    #[test]
    fn stake_merges_into_open_position_keeping_its_duration() {
        let (mut ledger, mut gw, clock) = setup();
        let a = acct("a");
        ledger.stake(&a, 100, DEFAULT, clock.now(), &mut gw).unwrap();
        let p = ledger.stake(&a, 100, MAX, clock.now(), &mut gw).unwrap();
        assert_eq!(ledger.positions(&a).len(), 1);
        assert_eq!(p.balance, 200);
        assert_eq!(p.duration, DEFAULT);
    }

    #[test]
    fn always_new_position_policy_opens_a_position_per_stake() {
        let (ledger, mut gw, clock) = setup();
        let mut ledger = ledger.with_merge_policy(StakeMergePolicy::AlwaysNewPosition);
        let a = acct("a");
        ledger.stake(&a, 100, DEFAULT, clock.now(), &mut gw).unwrap();
        ledger.stake(&a, 100, MAX, clock.now(), &mut gw).unwrap();
        assert_eq!(ledger.positions(&a).len(), 2);
        assert_eq!(ledger.positions(&a)[1].duration, MAX);
        // extend still merges
        ledger.extend(&a, 1, clock.now(), &mut gw).unwrap();
        assert_eq!(ledger.positions(&a).len(), 2);
    }

    // ── Extend ───────────────────────────────────────────────────────────

    #[test]
    fn extend_zero_is_invalid_when_staked() {
        let (mut ledger, mut gw, clock) = setup();
        let a = acct("a");
        ledger.stake(&a, 100, DEFAULT, clock.now(), &mut gw).unwrap();
        let err = ledger.extend(&a, 0, clock.now(), &mut gw).unwrap_err();
        assert_eq!(err.code(), "AMOUNT_INVALID");
    }

    #[test]
    fn extend_without_stakes_is_not_staked() {
        let (mut ledger, mut gw, clock) = setup();
        let err = ledger.extend(&acct("a"), 100, clock.now(), &mut gw).unwrap_err();
        assert_eq!(err.code(), "NOT_STAKED");

        let err = ledger
            .extend_for(&acct("a"), &acct("b"), 0, clock.now(), &mut gw)
            .unwrap_err();
        assert_eq!(err.code(), "NOT_STAKED");
    }

    #[test]
    fn extend_at_same_time_offsets_origin_by_one() {
        let (mut ledger, mut gw, clock) = setup();
        let a = acct("a");
        ledger.stake(&a, 100, DEFAULT, clock.now(), &mut gw).unwrap();
        ledger.extend(&a, 120, clock.now(), &mut gw).unwrap();

        let snap = ledger.position_snapshot(&a).unwrap();
        assert_eq!(snap.balance, 220);
        assert_eq!(snap.duration, DEFAULT);
        assert_eq!(snap.origin, Timestamp::new(T0 + 1));
    }

    #[test]
    fn extend_after_time_recomputes_weighted_origin() {
        let (mut ledger, mut gw, clock) = setup();
        let a = acct("a");
        ledger.stake(&a, 100, DEFAULT, clock.now(), &mut gw).unwrap();
        clock.advance(20);
        ledger.extend(&a, 120, clock.now(), &mut gw).unwrap();

        let snap = ledger.position_snapshot(&a).unwrap();
        assert_eq!(snap.balance, 220);
        assert_eq!(snap.duration, DEFAULT);
        assert_eq!(snap.origin, Timestamp::new(T0 + 11));
    }

    #[test]
    fn extend_for_open_position_merges() {
        let (mut ledger, mut gw, clock) = setup();
        let (a1, a2) = (acct("account1"), acct("account2"));
        ledger.stake(&a2, 100, DEFAULT, clock.now(), &mut gw).unwrap();
        ledger.extend_for(&a1, &a2, 1, clock.now(), &mut gw).unwrap();

        let snap = ledger.position_snapshot(&a2).unwrap();
        assert_eq!(snap.balance, 101);
        assert_eq!(snap.duration, DEFAULT);
        assert_eq!(ledger.positions(&a2).len(), 1);
    }

    #[test]
    fn extend_for_fully_vested_position_opens_a_new_one() {
        let (mut ledger, mut gw, clock) = setup();
        let (a1, a2) = (acct("account1"), acct("account2"));
        ledger.stake(&a2, 100, DEFAULT, clock.now(), &mut gw).unwrap();
        clock.advance(DEFAULT);
        let p = ledger.extend_for(&a1, &a2, 1, clock.now(), &mut gw).unwrap();

        assert_eq!(ledger.positions(&a2).len(), 2);
        assert_eq!(p.balance, 1);
        assert_eq!(p.duration, DEFAULT);
        assert_eq!(p.origin, clock.now());
        assert_eq!(ledger.balance_of(&a2), 101);
        // the vested predecessor stays withdrawable in full
        assert_eq!(ledger.available(&a2, clock.now()), 100);
    }

    #[test]
    fn extend_changes_balance_by_exactly_the_amount() {
        let (mut ledger, mut gw, clock) = setup();
        let a = acct("a");
        ledger.stake(&a, 100, DEFAULT, clock.now(), &mut gw).unwrap();
        for _ in 0..3 {
            clock.advance(7);
            let before = ledger.balance_of(&a);
            ledger.extend(&a, 100, clock.now(), &mut gw).unwrap();
            assert_eq!(ledger.balance_of(&a), before + 100);
        }
        assert_eq!(ledger.balance_of(&a), 400);
    }

    #[test]
    fn bound_changes_do_not_touch_existing_positions() {
        let (mut ledger, mut gw, clock) = setup();
        let a = acct("a");
        ledger.stake(&a, 100, DEFAULT, clock.now(), &mut gw).unwrap();
        ledger.set_bounds(&owner(), 200, 2000, 500).unwrap();

        let p = ledger.extend(&a, 50, clock.now(), &mut gw).unwrap();
        assert_eq!(p.duration, DEFAULT);
        assert!(ledger.stake(&a, 1, DEFAULT, clock.now(), &mut gw).is_err());
    }

    // ── Unstake / available ──────────────────────────────────────────────

    #[test]
    fn available_after_ten_percent_elapsed() {
        let (mut ledger, mut gw, clock) = setup();
        let a = acct("account");
        ledger.stake(&a, 100, 100, clock.now(), &mut gw).unwrap();
        clock.advance(10);
        assert_eq!(ledger.available(&a, clock.now()), 10);
    }

    #[test]
    fn unstake_vested_portion() {
        let (mut ledger, mut gw, clock) = setup();
        let a = acct("account");
        ledger.stake(&a, 100, 100, clock.now(), &mut gw).unwrap();
        clock.advance(10);

        ledger.unstake(&a, 10, clock.now(), &mut gw).unwrap();
        assert_eq!(ledger.balance_of(&a), 90);
        assert_eq!(ledger.available(&a, clock.now()), 0);
        assert_eq!(ledger.total_staked(), 90);
        assert_eq!(gw.transfers().last().unwrap().2, 10);
    }

    #[test]
    fn unstake_more_than_available_fails() {
        let (mut ledger, mut gw, clock) = setup();
        let a = acct("account");
        ledger.stake(&a, 100, 100, clock.now(), &mut gw).unwrap();
        clock.advance(10);

        let err = ledger.unstake(&a, 100, clock.now(), &mut gw).unwrap_err();
        assert_eq!(err.code(), "AMOUNT_EXCEEDS_AVAILABLE");
        assert_eq!(ledger.balance_of(&a), 100);
    }

    #[test]
    fn unstake_without_positions_is_not_staked() {
        let (mut ledger, mut gw, clock) = setup();
        for amount in [0, 1] {
            let err = ledger.unstake(&acct("a"), amount, clock.now(), &mut gw).unwrap_err();
            assert_eq!(err.code(), "NOT_STAKED");
        }
    }

    #[test]
    fn unstake_zero_is_a_no_op() {
        let (mut ledger, mut gw, clock) = setup();
        let a = acct("a");
        ledger.stake(&a, 100, 100, clock.now(), &mut gw).unwrap();
        let events = record_events(&mut ledger);
        let transfers = gw.transfers().len();

        ledger.unstake(&a, 0, clock.now(), &mut gw).unwrap();
        assert_eq!(ledger.balance_of(&a), 100);
        assert_eq!(ledger.total_staked(), 100);
        assert_eq!(gw.transfers().len(), transfers);
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn withdrawal_then_merge_keeps_vesting_on_deposits() {
        let (mut ledger, mut gw, clock) = setup();
        let a = acct("a");
        ledger.stake(&a, 100, 100, clock.now(), &mut gw).unwrap();
        clock.advance(40);
        ledger.unstake(&a, 40, clock.now(), &mut gw).unwrap();
        // origin = t0 + floor(100 * 40 / 160) + 1
        let p = ledger.extend(&a, 100, clock.now(), &mut gw).unwrap();
        assert_eq!(p.origin, Timestamp::new(T0 + 26));
        assert_eq!((p.balance, p.deposited), (160, 200));

        let at = |secs| Timestamp::new(T0 + secs);
        assert_eq!(ledger.available(&a, at(40)), 0);
        assert_eq!(ledger.available(&a, at(50)), 8);
        assert_eq!(ledger.available(&a, at(125)), 158);
        assert_eq!(ledger.available(&a, at(126)), 160);
        assert!(ledger.unstake(&a, 9, at(50), &mut gw).is_err());
        ledger.unstake(&a, 8, at(50), &mut gw).unwrap();
        assert_eq!(ledger.available(&a, at(126)), 152);
    }

    #[test]
    fn huge_extend_after_months_lands_origin_on_now() {
        let (mut ledger, mut gw, _) = setup();
        let year = 365 * 86_400;
        ledger.set_bounds(&owner(), MIN, year, DEFAULT).unwrap();
        let a = acct("a");
        ledger.stake(&a, 1, year, Timestamp::new(T0), &mut gw).unwrap();

        let now = Timestamp::new(T0 + 20_000_000);
        let p = ledger.extend(&a, 1 << 105, now, &mut gw).unwrap();
        assert_eq!(p.origin, now);
        assert_eq!(p.balance, (1 << 105) + 1);
        assert_eq!(ledger.total_staked(), (1 << 105) + 1);
    }

    #[test]
    fn failed_transfer_out_leaves_positions_untouched() {
        let (mut ledger, mut gw, clock) = setup();
        let a = acct("a");
        ledger.stake(&a, 100, 100, clock.now(), &mut gw).unwrap();
        clock.advance(50);
        gw.fail_with("custody locked");

        let err = ledger.unstake(&a, 50, clock.now(), &mut gw).unwrap_err();
        assert_eq!(err.to_string(), "custody locked");
        assert_eq!(ledger.balance_of(&a), 100);
        assert_eq!(ledger.available(&a, clock.now()), 50);
        assert_eq!(ledger.total_staked(), 100);
    }

    #[test]
    fn available_with_updated_vesting_schedule() {
        let (mut ledger, mut gw, clock) = setup();
        let a = acct("a");
        ledger.stake(&a, 100, DEFAULT, clock.now(), &mut gw).unwrap();
        clock.advance(11);
        ledger.extend(&a, 100, clock.now(), &mut gw).unwrap();
        // origin = t0 + floor(100 * 11 / 200) + 1 = t0 + 6
        assert_eq!(ledger.available(&a, clock.now()), 10);
    }

    #[test]
    fn extend_then_unstake() {
        let (mut ledger, mut gw, clock) = setup();
        let a = acct("a");
        ledger.stake(&a, 100, DEFAULT, clock.now(), &mut gw).unwrap();
        ledger.extend(&a, 100, clock.now(), &mut gw).unwrap();
        assert_eq!(ledger.balance_of(&a), 200);
        clock.advance(11);

        ledger.unstake(&a, 10, clock.now(), &mut gw).unwrap();
        assert_eq!(ledger.balance_of(&a), 190);
    }

    #[test]
    fn unstake_drains_positions_in_creation_order() {
        let (mut ledger, mut gw, clock) = setup();
        let a = acct("a");
        ledger.stake(&a, 100, 100, clock.now(), &mut gw).unwrap();
        clock.advance(100);
        ledger.stake(&a, 100, 100, clock.now(), &mut gw).unwrap();
        clock.advance(50);
        assert_eq!(ledger.available(&a, clock.now()), 150);

        ledger.unstake(&a, 120, clock.now(), &mut gw).unwrap();
        let positions = ledger.positions(&a);
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].balance, 0);
        assert_eq!(positions[1].balance, 80);
        assert_eq!(ledger.available(&a, clock.now()), 30);
    }

    // ── Delegation ───────────────────────────────────────────────────────

    #[test]
    fn delegate_links_are_symmetric() {
        let (mut ledger, _, _) = setup();
        let (a, d) = (acct("account1"), acct("account2"));
        ledger.add_delegate(&a, &d).unwrap();
        assert!(ledger.is_delegate(&d));
        assert_eq!(ledger.account_of(&d), Some(&a));
        assert_eq!(ledger.delegate_of(&a), Some(&d));

        ledger.remove_delegate(&a, &d).unwrap();
        assert!(!ledger.is_delegate(&d));
        assert_eq!(ledger.account_of(&d), None);
        assert_eq!(ledger.delegate_of(&a), None);
    }

    #[test]
    fn delegate_stakes_into_account_with_own_funds() {
        let mut ledger = make_ledger();
        let mut gw = NullGateway::new();
        let clock = NullClock::new(T0);
        let (a, d) = (acct("account1"), acct("account2"));
        gw.fund(&d, 500);
        ledger.add_delegate(&a, &d).unwrap();

        ledger.stake(&d, 100, DEFAULT, clock.now(), &mut gw).unwrap();
        assert_eq!(ledger.balance_of(&a), 100);
        assert_eq!(ledger.balance_of(&d), 0);
        assert_eq!(gw.balance_of(&d), 400);
        assert_eq!(gw.balance_of(&a), 0);
        assert_eq!(gw.custody(), 100);
    }

    #[test]
    fn delegate_unstakes_from_account_into_own_custody() {
        let (mut ledger, mut gw, clock) = setup();
        let (a, d) = (acct("account1"), acct("account2"));
        ledger.add_delegate(&a, &d).unwrap();
        ledger.stake(&d, 100, DEFAULT, clock.now(), &mut gw).unwrap();
        clock.advance(10);

        ledger.unstake(&d, 10, clock.now(), &mut gw).unwrap();
        assert_eq!(ledger.balance_of(&a), 90);
        let (_, recipient, amount) = gw.transfers().last().unwrap().clone();
        assert_eq!(recipient, d);
        assert_eq!(amount, 10);
    }

    #[test]
    fn account_and_delegate_share_one_ledger_entry() {
        let (mut ledger, mut gw, clock) = setup();
        let (a, d) = (acct("account1"), acct("account2"));
        ledger.add_delegate(&a, &d).unwrap();
        ledger.stake(&d, 100, DEFAULT, clock.now(), &mut gw).unwrap();
        ledger.extend(&d, 100, clock.now(), &mut gw).unwrap();
        clock.advance(11);

        ledger.unstake(&a, 10, clock.now(), &mut gw).unwrap();
        assert_eq!(ledger.balance_of(&a), 190);
    }

    #[test]
    fn duplicate_delegation_is_rejected() {
        let (mut ledger, _, _) = setup();
        let (a, b, d) = (acct("a"), acct("b"), acct("d"));
        ledger.add_delegate(&a, &d).unwrap();
        let err = ledger.add_delegate(&b, &d).unwrap_err();
        assert_eq!(err.code(), "DELEGATE_TAKEN");
        assert_eq!(err.class(), ErrorClass::Validation);
    }

    // ── Governance through the ledger ────────────────────────────────────

    #[test]
    fn non_owner_governance_is_an_authorization_error() {
        let (mut ledger, _, _) = setup();
        let err = ledger.set_bounds(&acct("account1"), 1, 2, 1).unwrap_err();
        assert_eq!(err.class(), ErrorClass::Authorization);
        let err = ledger.set_metadata(&acct("account1"), "x", "y").unwrap_err();
        assert_eq!(err.class(), ErrorClass::Authorization);
        assert_eq!(ledger.governance().name(), "Staked AST");
    }

    #[test]
    fn committed_mutations_emit_events() {
        let (mut ledger, mut gw, clock) = setup();
        let events = record_events(&mut ledger);
        let (a, d) = (acct("a"), acct("d"));
        ledger.add_delegate(&a, &d).unwrap();
        ledger.stake(&d, 100, DEFAULT, clock.now(), &mut gw).unwrap();
        ledger.extend(&a, 50, clock.now(), &mut gw).unwrap();
        ledger.set_metadata(&owner(), "Staked AST2", "sAST2").unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(
            events[1],
            StakingEvent::Staked {
                account: a.clone(),
                payer: d.clone(),
                amount: 100,
                index: 0,
                merged: false,
            }
        );
        assert!(matches!(
            events[2],
            StakingEvent::Extended { merged: true, index: 0, amount: 50, .. }
        ));
    }

    // ── Persistence ──────────────────────────────────────────────────────

    #[test]
    fn empty_store_loads_nothing() {
        let store = NullStakeStore::new();
        assert!(VestingLedger::load_from_store(&store).unwrap().is_none());
    }

    #[test]
    fn ledger_survives_save_and_load() {
        let (mut ledger, mut gw, clock) = setup();
        let (a, b, d) = (acct("a"), acct("b"), acct("d"));
        ledger.add_delegate(&a, &d).unwrap();
        ledger.stake(&a, 100, DEFAULT, clock.now(), &mut gw).unwrap();
        clock.advance(DEFAULT);
        ledger.extend(&a, 10, clock.now(), &mut gw).unwrap();
        ledger.stake(&b, 7, MIN, clock.now(), &mut gw).unwrap();
        ledger.set_metadata(&owner(), "Staked AST2", "sAST2").unwrap();

        let store = NullStakeStore::new();
        ledger.save_to_store(&store).unwrap();
        assert_eq!(ledger.pending_accounts(), 0);
        let restored = VestingLedger::load_from_store(&store).unwrap().unwrap();

        assert_eq!(restored.positions(&a), ledger.positions(&a));
        assert_eq!(restored.positions(&b), ledger.positions(&b));
        assert_eq!(restored.total_staked(), 117);
        assert_eq!(restored.resolve(&d), a);
        assert_eq!(restored.governance(), ledger.governance());
        assert_eq!(
            restored.available(&a, clock.now()),
            ledger.available(&a, clock.now())
        );
    }

    #[test]
    fn failed_save_leaves_store_at_last_commit() {
        let (mut ledger, mut gw, clock) = setup();
        let (a, b) = (acct("a"), acct("b"));
        let store = NullStakeStore::new();
        ledger.stake(&a, 7, DEFAULT, clock.now(), &mut gw).unwrap();
        ledger.save_to_store(&store).unwrap();

        ledger.stake(&a, 3, DEFAULT, clock.now(), &mut gw).unwrap();
        ledger.stake(&b, 2, DEFAULT, clock.now(), &mut gw).unwrap();
        store.fail_with("disk full");
        let err = ledger.save_to_store(&store).unwrap_err();
        assert_eq!(err.code(), "STORE_FAILED");
        assert_eq!(ledger.pending_accounts(), 2);

        let on_disk = VestingLedger::load_from_store(&store).unwrap().unwrap();
        assert_eq!(on_disk.total_staked(), 7);
        assert_eq!(on_disk.balance_of(&b), 0);

        store.clear_failure();
        ledger.save_to_store(&store).unwrap();
        let on_disk = VestingLedger::load_from_store(&store).unwrap().unwrap();
        assert_eq!(on_disk.total_staked(), 12);
        assert_eq!(on_disk.positions(&a), ledger.positions(&a));
    }

    #[test]
    fn save_writes_only_changed_accounts() {
        let (mut ledger, mut gw, clock) = setup();
        let (a, b) = (acct("a"), acct("b"));
        let store = NullStakeStore::new();
        ledger.stake(&a, 100, DEFAULT, clock.now(), &mut gw).unwrap();
        ledger.stake(&b, 100, DEFAULT, clock.now(), &mut gw).unwrap();
        ledger.save_to_store(&store).unwrap();
        assert_eq!(store.ledger_writes(), 2);

        clock.advance(50);
        ledger.unstake(&b, 10, clock.now(), &mut gw).unwrap();
        ledger.save_to_store(&store).unwrap();
        assert_eq!(store.ledger_writes(), 3);

        // rejected operations and governance changes touch no account
        assert!(ledger.unstake(&a, 1_000, clock.now(), &mut gw).is_err());
        ledger.set_metadata(&owner(), "Staked AST2", "sAST2").unwrap();
        ledger.save_to_store(&store).unwrap();
        assert_eq!(store.ledger_writes(), 3);

        let mut restored = VestingLedger::load_from_store(&store).unwrap().unwrap();
        assert_eq!(restored.pending_accounts(), 0);
        assert_eq!(restored.balance_of(&b), 90);
        assert_eq!(restored.governance().name(), "Staked AST2");
        restored.save_to_store(&store).unwrap();
        assert_eq!(store.ledger_writes(), 3);
    }
}
