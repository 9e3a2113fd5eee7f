use crate::FastMap;
use crate::error::{Error, LedgerError};
use crate::pool::swap::{SwapRequest, SwapResult};
use rust_decimal::Decimal;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace};

/// Tick-indexed liquidity ledger.
///
/// Every entry holds the net liquidity active over the segment starting
/// at that tick. Entries are created on the first deposit and removed
/// as soon as their liquidity drops to zero or below, so the map never
/// holds a non-positive value.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ledger {
    ticks: FastMap<i32, Decimal>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` of liquidity at `tick`, creating the entry if needed.
    ///
    /// Never fails: the sum saturates at the `Decimal` bounds, and a
    /// negative `amount` that leaves the tick at or below zero removes it.
    pub fn add_liquidity(&mut self, tick: i32, amount: Decimal) {
        let current = self.liquidity_at(tick);
        let updated = current.saturating_add(amount);
        trace!(tick, %amount, %updated, "add liquidity");
        self.store(tick, updated);
    }

    /// Removes `amount` of liquidity from `tick`.
    ///
    /// Removing from a tick with no recorded liquidity is a no-op; use
    /// [`Ledger::try_remove_liquidity`] to treat that as an error.
    pub fn remove_liquidity(&mut self, tick: i32, amount: Decimal) {
        if let Err(err) = self.try_remove_liquidity(tick, amount) {
            debug!(tick, %amount, %err, "ignoring removal from unknown tick");
        }
    }

    /// Strict form of [`Ledger::remove_liquidity`]: fails with
    /// `LedgerError::UnknownTick` when `tick` holds no liquidity, and
    /// otherwise returns what is left at the tick (zero once deleted).
    pub fn try_remove_liquidity(&mut self, tick: i32, amount: Decimal) -> Result<Decimal, Error> {
        let current = self
            .ticks
            .get(&tick)
            .copied()
            .ok_or(LedgerError::UnknownTick(tick))?;

        let updated = current.saturating_sub(amount);
        trace!(tick, %amount, %updated, "remove liquidity");
        self.store(tick, updated);

        Ok(updated.max(Decimal::ZERO))
    }

    /// Returns the liquidity recorded at `tick`, or zero if absent.
    #[inline]
    pub fn liquidity_at(&self, tick: i32) -> Decimal {
        self.ticks.get(&tick).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn contains_tick(&self, tick: i32) -> bool {
        self.ticks.contains_key(&tick)
    }

    /// Ticks holding liquidity, in ascending order.
    pub fn ticks(&self) -> Vec<i32> {
        let mut ticks: Vec<i32> = self.ticks.keys().copied().collect();
        ticks.sort_unstable();
        ticks
    }

    /// Iterates `(tick, liquidity)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, Decimal)> + '_ {
        self.ticks.iter().map(|(tick, liquidity)| (*tick, *liquidity))
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// Sum of the liquidity over every tick, saturating at `Decimal::MAX`.
    pub fn total_liquidity(&self) -> Decimal {
        self.ticks
            .values()
            .fold(Decimal::ZERO, |acc, liquidity| acc.saturating_add(*liquidity))
    }

    fn store(&mut self, tick: i32, liquidity: Decimal) {
        if liquidity > Decimal::ZERO {
            self.ticks.insert(tick, liquidity);
        } else {
            self.ticks.remove(&tick);
        }
    }
}

impl FromIterator<(i32, Decimal)> for Ledger {
    fn from_iter<I: IntoIterator<Item = (i32, Decimal)>>(iter: I) -> Self {
        let mut ledger = Ledger::new();
        for (tick, amount) in iter {
            ledger.add_liquidity(tick, amount);
        }
        ledger
    }
}

/// Ledger handle that can be shared between threads.
///
/// Mutations take the write lock; a swap holds the read lock for its
/// whole tick walk, so it always sees one consistent state and swaps
/// run concurrently with each other but never with a mutation.
#[derive(Clone, Debug, Default)]
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    // Each mutation is a single map operation, so a poisoned lock never
    // guards a half-updated ledger.
    fn read(&self) -> RwLockReadGuard<'_, Ledger> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Ledger> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_liquidity(&self, tick: i32, amount: Decimal) {
        self.write().add_liquidity(tick, amount);
    }

    pub fn remove_liquidity(&self, tick: i32, amount: Decimal) {
        self.write().remove_liquidity(tick, amount);
    }

    pub fn try_remove_liquidity(&self, tick: i32, amount: Decimal) -> Result<Decimal, Error> {
        self.write().try_remove_liquidity(tick, amount)
    }

    pub fn liquidity_at(&self, tick: i32) -> Decimal {
        self.read().liquidity_at(tick)
    }

    /// Runs a swap walk against the current state under the read lock.
    pub fn compute_output(&self, request: SwapRequest) -> Result<SwapResult, Error> {
        self.read().compute_output(request)
    }

    /// Returns an owned copy of the current ledger state.
    pub fn snapshot(&self) -> Ledger {
        self.read().clone()
    }
}

impl From<Ledger> for SharedLedger {
    fn from(ledger: Ledger) -> Self {
        Self::new(ledger)
    }
}
