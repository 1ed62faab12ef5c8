// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Transaction coordination.
//!
//! Transfers run inside a [`TransactionScope`]. The first time a scope reads
//! an account for update it records a [`SavePoint`] holding the committed
//! balance, and hands back a working copy. Working copies are published to
//! the [`AccountStore`] on commit; on rollback every save-point is written
//! back instead.
//!
//! Scopes can only be opened through a [`LedgerGuard`], which holds the
//! coordinator's exclusive lock for its whole lifetime:
//!
//! ```text
//! coordinator.lock() ──► LedgerGuard ──begin()──► TransactionScope
//!                             │                         │
//!                             │               commit() / rollback() / drop
//!                             ▼
//!                        drop: lock released
//! ```
//!
//! # Example
//!
//! ```
//! use account_ledger_rs::{Account, AccountId, AccountStore, TransactionCoordinator};
//! use rust_decimal_macros::dec;
//! use std::sync::Arc;
//!
//! let store = Arc::new(AccountStore::new());
//! store.create(Account::new(AccountId::from("A"), dec!(10))).unwrap();
//!
//! let coordinator = TransactionCoordinator::new(Arc::clone(&store));
//! let mut guard = coordinator.lock();
//! let mut scope = guard.begin();
//! let working = scope.read_for_update(&AccountId::from("A")).unwrap();
//! assert_eq!(working.balance(), dec!(10));
//! assert_eq!(scope.save_points().count(), 1);
//! scope.rollback();
//! drop(guard);
//!
//! assert_eq!(store.get(&AccountId::from("A")).unwrap().balance(), dec!(10));
//! ```

use crate::account::Account;
use crate::base::AccountId;
use crate::error::TransferError;
use crate::store::AccountStore;
use parking_lot::{Mutex, MutexGuard};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;

/// Committed balance of an account, captured on its first read in a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePoint {
    account_id: AccountId,
    original_balance: Decimal,
}

impl SavePoint {
    fn capture(account: &Account) -> Self {
        Self {
            account_id: account.id().clone(),
            original_balance: account.balance(),
        }
    }

    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    pub fn original_balance(&self) -> Decimal {
        self.original_balance
    }
}

/// An account touched by the active scope.
#[derive(Debug)]
struct Touched {
    save_point: SavePoint,
    working: Account,
}

/// Serializes transactions against one [`AccountStore`].
///
/// A single exclusive lock covers every transfer from its first account read
/// to commit or rollback. Reads spanning several accounts go through
/// [`LedgerGuard::accounts`] so they never see a half-published commit.
/// Single-account reads through [`AccountStore::get`] do not take it.
#[derive(Debug)]
pub struct TransactionCoordinator {
    store: Arc<AccountStore>,
    lock: Mutex<()>,
}

impl TransactionCoordinator {
    pub fn new(store: Arc<AccountStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &AccountStore {
        &self.store
    }

    /// Acquires the exclusive ledger lock, waiting as long as it takes.
    ///
    /// The lock is released when the returned guard is dropped.
    pub fn lock(&self) -> LedgerGuard<'_> {
        LedgerGuard {
            store: &self.store,
            _guard: self.lock.lock(),
        }
    }
}

/// Exclusive access to the ledger.
///
/// While a guard is alive no other transfer can read or write balances
/// through the coordinator.
pub struct LedgerGuard<'a> {
    store: &'a AccountStore,
    _guard: MutexGuard<'a, ()>,
}

impl LedgerGuard<'_> {
    /// Reads an account without recording a save-point.
    pub fn snapshot(&self, id: &AccountId) -> Option<Account> {
        self.store.snapshot(id)
    }

    /// Snapshots of all accounts, sorted by ID.
    ///
    /// No transfer can commit while the guard is held, so the balances add up
    /// to the same total as after the last commit.
    pub fn accounts(&self) -> Vec<Account> {
        self.store.accounts()
    }

    /// Opens a transaction scope.
    ///
    /// The scope borrows the guard mutably, so a guard has at most one open
    /// scope and the lock outlives it.
    pub fn begin(&mut self) -> TransactionScope<'_> {
        tracing::trace!("transaction begin");
        TransactionScope {
            store: self.store,
            touched: BTreeMap::new(),
            closed: false,
        }
    }

    /// Runs `f` in a fresh scope.
    ///
    /// Commits when `f` returns `Ok`, rolls back when it returns `Err`. A
    /// panic inside `f` unwinds through the scope, which rolls back on drop.
    pub fn transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut TransactionScope<'_>) -> Result<T, E>,
        E: From<TransferError>,
    {
        let mut scope = self.begin();
        match f(&mut scope) {
            Ok(value) => {
                scope.commit()?;
                Ok(value)
            }
            Err(err) => {
                scope.rollback();
                Err(err)
            }
        }
    }
}

/// Save-points and working copies of one transaction.
///
/// Must end in exactly one of [`commit`](Self::commit) or
/// [`rollback`](Self::rollback). A scope dropped without either is rolled
/// back.
#[derive(Debug)]
pub struct TransactionScope<'g> {
    store: &'g AccountStore,
    /// Ordered by account ID so commit and rollback write in a stable order.
    touched: BTreeMap<AccountId, Touched>,
    closed: bool,
}

impl TransactionScope<'_> {
    /// Returns the working copy of an account.
    ///
    /// The first call for an ID snapshots the committed balance into a
    /// save-point. Later calls return the same working copy, including any
    /// change made to it since.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::AccountNotFound`] if the account does not
    /// exist. Nothing is recorded in that case.
    pub fn read_for_update(&mut self, id: &AccountId) -> Result<&mut Account, TransferError> {
        match self.touched.entry(id.clone()) {
            Entry::Occupied(entry) => Ok(&mut entry.into_mut().working),
            Entry::Vacant(entry) => {
                let account = self
                    .store
                    .snapshot(id)
                    .ok_or_else(|| TransferError::AccountNotFound(id.clone()))?;
                let touched = entry.insert(Touched {
                    save_point: SavePoint::capture(&account),
                    working: account,
                });
                Ok(&mut touched.working)
            }
        }
    }

    /// Save-points recorded so far, ordered by account ID.
    pub fn save_points(&self) -> impl Iterator<Item = &SavePoint> {
        self.touched.values().map(|touched| &touched.save_point)
    }

    /// Publishes every working copy to the store and discards the save-points.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError::AccountNotFound`] if a touched account can no
    /// longer be written. Balances already published are restored first.
    pub fn commit(mut self) -> Result<(), TransferError> {
        self.closed = true;
        let touched = std::mem::take(&mut self.touched);

        for (id, entry) in &touched {
            if self.store.update(id, entry.working.balance()).is_err() {
                tracing::warn!(account = %id, "commit failed, restoring save-points");
                restore(self.store, &touched);
                return Err(TransferError::AccountNotFound(id.clone()));
            }
        }

        tracing::trace!(accounts = touched.len(), "transaction committed");
        Ok(())
    }

    /// Writes every save-point back into the store and discards the scope.
    pub fn rollback(mut self) {
        self.closed = true;
        let touched = std::mem::take(&mut self.touched);
        restore(self.store, &touched);
        tracing::trace!(accounts = touched.len(), "transaction rolled back");
    }
}

impl Drop for TransactionScope<'_> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        tracing::warn!(
            accounts = self.touched.len(),
            "transaction scope dropped without commit or rollback, rolling back"
        );
        restore(self.store, &self.touched);
    }
}

fn restore(store: &AccountStore, touched: &BTreeMap<AccountId, Touched>) {
    for (id, entry) in touched {
        if store
            .update(id, entry.save_point.original_balance())
            .is_err()
        {
            tracing::warn!(account = %id, "save-point target no longer exists");
        }
    }
}
