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

//! Account snapshots.
//!
//! An [`Account`] is an owned copy of one ledger entry. The ledger never hands
//! out references into its storage; reads return a fresh snapshot and writes
//! go through the transaction coordinator.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use account_ledger_rs::{Account, AccountId};
//!
//! let account = Account::new(AccountId::from("Id-1"), dec!(10.00));
//! assert_eq!(account.balance(), dec!(10.00));
//! ```
//!
//! Balances of a snapshot cannot be changed from outside the crate:
//!
//! ```compile_fail
//! use rust_decimal_macros::dec;
//! use account_ledger_rs::{Account, AccountId};
//!
//! let mut account = Account::new(AccountId::from("Id-1"), dec!(10.00));
//! account.debit(dec!(1.00)).unwrap();
//! ```

use crate::TransferError;
use crate::base::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ledger account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    balance: Decimal,
}

impl Account {
    pub fn new(id: AccountId, balance: Decimal) -> Self {
        Self { id, balance }
    }

    /// Creates an account with a zero balance.
    pub fn empty(id: AccountId) -> Self {
        Self::new(id, Decimal::ZERO)
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.balance >= Decimal::ZERO,
            "Invariant violated: balance of {} went negative: {}",
            self.id,
            self.balance
        );
    }

    /// Decreases the balance of this copy.
    ///
    /// Checked against the balance the copy holds right now, not the snapshot
    /// a transfer was validated against. Only working copies obtained from a
    /// [`TransactionScope`](crate::TransactionScope) reach the store.
    pub(crate) fn debit(&mut self, amount: Decimal) -> Result<(), TransferError> {
        if amount < Decimal::ZERO {
            return Err(TransferError::InvalidAmount);
        }
        if self.balance < amount {
            return Err(TransferError::InsufficientBalance);
        }
        self.balance -= amount;
        self.assert_invariants();
        Ok(())
    }

    /// Increases the balance of this copy.
    pub(crate) fn credit(&mut self, amount: Decimal) -> Result<(), TransferError> {
        if amount < Decimal::ZERO {
            return Err(TransferError::InvalidAmount);
        }
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(TransferError::InvalidAmount)?;
        self.assert_invariants();
        Ok(())
    }
}
