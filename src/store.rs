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

//! Account storage.
//!
//! [`AccountStore`] is the single source of truth for balances. Each entry
//! sits behind a [`DashMap`] shard lock, so a plain read always observes a
//! whole committed balance and never a value halfway through an update.

use crate::account::Account;
use crate::base::AccountId;
use crate::error::AccountError;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;

/// Concurrent map of account ID to balance.
///
/// Callers only ever receive owned [`Account`] snapshots. Balances change
/// through [`AccountStore::update`], which is reserved for the transaction
/// coordinator.
#[derive(Debug, Default)]
pub struct AccountStore {
    accounts: DashMap<AccountId, Decimal>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }

    /// Inserts a new account.
    ///
    /// # Errors
    ///
    /// - [`AccountError::NegativeBalance`] - Initial balance is below zero.
    /// - [`AccountError::DuplicateAccount`] - The ID is already taken; the
    ///   existing balance is left untouched.
    pub fn create(&self, account: Account) -> Result<(), AccountError> {
        if account.balance() < Decimal::ZERO {
            return Err(AccountError::NegativeBalance);
        }

        // Entry API keeps check-and-insert atomic under concurrent creates.
        match self.accounts.entry(account.id().clone()) {
            Entry::Occupied(entry) => Err(AccountError::DuplicateAccount(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(account.balance());
                Ok(())
            }
        }
    }

    /// Returns a snapshot of the account.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::AccountNotFound`] if no account has this ID.
    pub fn get(&self, id: &AccountId) -> Result<Account, AccountError> {
        self.snapshot(id)
            .ok_or_else(|| AccountError::AccountNotFound(id.clone()))
    }

    /// Returns a snapshot of the account, or `None` if it does not exist.
    pub fn snapshot(&self, id: &AccountId) -> Option<Account> {
        self.accounts
            .get(id)
            .map(|balance| Account::new(id.clone(), *balance))
    }

    /// Replaces the stored balance of an existing account.
    pub(crate) fn update(&self, id: &AccountId, balance: Decimal) -> Result<(), AccountError> {
        let mut stored = self
            .accounts
            .get_mut(id)
            .ok_or_else(|| AccountError::AccountNotFound(id.clone()))?;
        *stored = balance;
        Ok(())
    }

    /// Returns snapshots of all accounts, sorted by ID.
    pub fn accounts(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .map(|entry| Account::new(entry.key().clone(), *entry.value()))
            .collect();
        accounts.sort_by(|a, b| a.id().cmp(b.id()));
        accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
