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

//! Ledger facade.
//!
//! The [`Ledger`] wires an [`AccountStore`], a [`TransactionCoordinator`] and
//! a [`TransferService`] together and exposes the three operations callers
//! need: create an account, read an account, transfer between accounts.
//!
//! # Thread Safety
//!
//! All operations take `&self`. Transfers and [`Ledger::accounts`] are
//! serialized by the coordinator's lock. Account creation and single-account
//! reads go straight to the store and never wait on a transfer.

use crate::account::Account;
use crate::base::AccountId;
use crate::error::{AccountError, TransferError};
use crate::notification::{LoggingNotifier, NotificationPort};
use crate::store::AccountStore;
use crate::transaction::TransactionCoordinator;
use crate::transfer::{Transfer, TransferService};
use rust_decimal::Decimal;
use std::sync::Arc;

/// In-memory account ledger.
///
/// # Invariants
///
/// - Account IDs are unique and never change.
/// - Every balance is zero or positive between operations.
/// - A transfer either moves the full amount or changes nothing.
pub struct Ledger {
    store: Arc<AccountStore>,
    transfers: TransferService,
}

impl Ledger {
    /// Creates an empty ledger that logs notifications.
    pub fn new() -> Self {
        Self::with_notifier(Arc::new(LoggingNotifier))
    }

    /// Creates an empty ledger that sends notifications to `notifier`.
    pub fn with_notifier(notifier: Arc<dyn NotificationPort>) -> Self {
        let store = Arc::new(AccountStore::new());
        let coordinator = TransactionCoordinator::new(Arc::clone(&store));
        Self {
            store,
            transfers: TransferService::new(coordinator, notifier),
        }
    }

    /// Opens a new account.
    ///
    /// # Errors
    ///
    /// - [`AccountError::DuplicateAccount`] - The ID is already in use.
    /// - [`AccountError::NegativeBalance`] - Initial balance is below zero.
    pub fn create_account(
        &self,
        id: impl Into<AccountId>,
        initial_balance: Decimal,
    ) -> Result<(), AccountError> {
        let id = id.into();
        self.store
            .create(Account::new(id.clone(), initial_balance))?;
        tracing::info!(account = %id, balance = %initial_balance, "account created");
        Ok(())
    }

    /// Returns the last committed state of an account.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::AccountNotFound`] if no account has this ID.
    pub fn get_account(&self, id: &AccountId) -> Result<Account, AccountError> {
        self.store.get(id)
    }

    /// Moves `amount` from `from` to `to`.
    ///
    /// See [`TransferService::transfer`] for the error cases.
    pub fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Decimal,
    ) -> Result<(), TransferError> {
        self.transfers
            .transfer(&Transfer::new(from.clone(), to.clone(), amount))
    }

    /// Returns snapshots of all accounts, sorted by ID.
    ///
    /// Waits for any running transfer to finish, so the listing never shows a
    /// debit without its matching credit.
    pub fn accounts(&self) -> Vec<Account> {
        self.transfers.coordinator().lock().accounts()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
