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

//! Ledger public API integration tests.

use account_ledger_rs::{
    AccountError, AccountId, Ledger, NotificationError, NotificationPort, QueueNotifier,
    TransferError,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

fn id(raw: &str) -> AccountId {
    AccountId::from(raw)
}

fn ledger_with(accounts: &[(&str, Decimal)]) -> Ledger {
    let ledger = Ledger::new();
    for (raw, balance) in accounts {
        ledger.create_account(*raw, *balance).unwrap();
    }
    ledger
}

fn balance(ledger: &Ledger, raw: &str) -> Decimal {
    ledger.get_account(&id(raw)).unwrap().balance()
}

// === Account Management ===

#[test]
fn create_and_get_account() {
    let ledger = Ledger::new();
    ledger.create_account("Id-123", dec!(1000)).unwrap();

    let account = ledger.get_account(&id("Id-123")).unwrap();
    assert_eq!(account.id(), &id("Id-123"));
    assert_eq!(account.balance(), dec!(1000));
}

#[test]
fn create_duplicate_account_fails() {
    let ledger = Ledger::new();
    ledger.create_account("Id-1", dec!(0)).unwrap();

    let result = ledger.create_account("Id-1", dec!(0));
    assert_eq!(result, Err(AccountError::DuplicateAccount(id("Id-1"))));
    assert_eq!(
        result.unwrap_err().to_string(),
        "Account id Id-1 already exists!"
    );
}

#[test]
fn create_negative_balance_fails() {
    let ledger = Ledger::new();
    let result = ledger.create_account("Id-1", dec!(-1));
    assert_eq!(result, Err(AccountError::NegativeBalance));
    assert!(ledger.accounts().is_empty());
}

#[test]
fn get_unknown_account_fails() {
    let ledger = Ledger::new();
    assert_eq!(
        ledger.get_account(&id("nobody")),
        Err(AccountError::AccountNotFound(id("nobody")))
    );
}

#[test]
fn repeated_reads_are_identical() {
    let ledger = ledger_with(&[("A", dec!(12.34))]);
    let first = ledger.get_account(&id("A")).unwrap();
    let second = ledger.get_account(&id("A")).unwrap();
    assert_eq!(first, second);
}

// === Transfers ===

#[test]
fn transfer_entire_balance() {
    let ledger = ledger_with(&[("A", dec!(100.00)), ("B", dec!(0.00))]);

    ledger.transfer(&id("A"), &id("B"), dec!(100.00)).unwrap();

    assert_eq!(balance(&ledger, "A"), dec!(0.00));
    assert_eq!(balance(&ledger, "B"), dec!(100.00));
}

#[test]
fn transfer_then_insufficient_balance_leaves_state() {
    let ledger = ledger_with(&[("Id-341", dec!(1000)), ("Id-342", dec!(1000))]);

    ledger.transfer(&id("Id-341"), &id("Id-342"), dec!(1000)).unwrap();
    assert_eq!(balance(&ledger, "Id-341"), dec!(0));
    assert_eq!(balance(&ledger, "Id-342"), dec!(2000));

    let result = ledger.transfer(&id("Id-341"), &id("Id-342"), dec!(500));
    assert_eq!(result, Err(TransferError::InsufficientBalance));
    assert_eq!(balance(&ledger, "Id-341"), dec!(0));
    assert_eq!(balance(&ledger, "Id-342"), dec!(2000));
}

#[test]
fn transfer_to_missing_account_leaves_source() {
    let ledger = ledger_with(&[("X", dec!(1000))]);

    let result = ledger.transfer(&id("X"), &id("Y"), dec!(500));

    assert_eq!(result, Err(TransferError::AccountNotFound(id("Y"))));
    assert_eq!(balance(&ledger, "X"), dec!(1000));
}

#[test]
fn transfer_from_missing_account() {
    let ledger = ledger_with(&[("Y", dec!(0))]);

    let result = ledger.transfer(&id("X"), &id("Y"), dec!(1));

    assert_eq!(result, Err(TransferError::AccountNotFound(id("X"))));
    assert_eq!(balance(&ledger, "Y"), dec!(0));
}

#[test]
fn self_transfer_rejected() {
    let ledger = ledger_with(&[("A", dec!(1000))]);

    let result = ledger.transfer(&id("A"), &id("A"), dec!(10));

    assert_eq!(result, Err(TransferError::SelfTransferNotAllowed));
    assert_eq!(balance(&ledger, "A"), dec!(1000));
}

#[test]
fn self_transfer_rejected_with_empty_balance() {
    let ledger = ledger_with(&[("A", dec!(0))]);
    assert_eq!(
        ledger.transfer(&id("A"), &id("A"), dec!(10)),
        Err(TransferError::SelfTransferNotAllowed)
    );
}

#[test]
fn negative_amount_rejected() {
    let ledger = ledger_with(&[("A", dec!(10)), ("B", dec!(10))]);

    let result = ledger.transfer(&id("A"), &id("B"), dec!(-5));

    assert_eq!(result, Err(TransferError::InvalidAmount));
    assert_eq!(balance(&ledger, "A"), dec!(10));
    assert_eq!(balance(&ledger, "B"), dec!(10));
}

#[test]
fn transfer_with_cents() {
    let ledger = ledger_with(&[("A", dec!(500.99)), ("B", dec!(20.00))]);

    ledger.transfer(&id("A"), &id("B"), dec!(200.99)).unwrap();

    assert_eq!(balance(&ledger, "A"), dec!(300.00));
    assert_eq!(balance(&ledger, "B"), dec!(220.99));
}

#[test]
fn transfer_when_balance_just_enough() {
    let ledger = ledger_with(&[("A", dec!(100.01)), ("B", dec!(20.00))]);

    ledger.transfer(&id("A"), &id("B"), dec!(100.01)).unwrap();

    assert_eq!(balance(&ledger, "A"), dec!(0.00));
    assert_eq!(balance(&ledger, "B"), dec!(120.01));
}

#[test]
fn transfer_keeps_sub_cent_precision() {
    let ledger = ledger_with(&[("A", dec!(0.3)), ("B", dec!(0))]);

    ledger.transfer(&id("A"), &id("B"), dec!(0.1)).unwrap();
    ledger.transfer(&id("A"), &id("B"), dec!(0.2)).unwrap();

    // 0.1 + 0.2 is exact in decimal arithmetic.
    assert_eq!(balance(&ledger, "A"), Decimal::ZERO);
    assert_eq!(balance(&ledger, "B"), dec!(0.3));
}

#[test]
fn transfer_conserves_total() {
    let ledger = ledger_with(&[("A", dec!(73.25)), ("B", dec!(26.75))]);
    let before = balance(&ledger, "A") + balance(&ledger, "B");

    ledger.transfer(&id("A"), &id("B"), dec!(50.50)).unwrap();
    ledger.transfer(&id("B"), &id("A"), dec!(10.01)).unwrap();

    let after = balance(&ledger, "A") + balance(&ledger, "B");
    assert_eq!(before, after);
}

// === Notifications ===

struct FailingNotifier;

impl NotificationPort for FailingNotifier {
    fn notify(
        &self,
        _account: &account_ledger_rs::Account,
        _message: &str,
    ) -> Result<(), NotificationError> {
        Err(NotificationError::Delivery("unreachable".to_string()))
    }
}

#[test]
fn notifications_sent_after_commit() {
    let queue = Arc::new(QueueNotifier::new());
    let ledger = Ledger::with_notifier(queue.clone());
    ledger.create_account("A", dec!(10)).unwrap();
    ledger.create_account("B", dec!(0)).unwrap();

    ledger.transfer(&id("A"), &id("B"), dec!(4)).unwrap();

    let notifications = queue.drain();
    assert_eq!(notifications.len(), 2);
    assert_eq!(notifications[0].account.id(), &id("A"));
    assert_eq!(notifications[1].account.id(), &id("B"));
    assert_eq!(notifications[1].account.balance(), dec!(4));
}

#[test]
fn failed_transfers_do_not_notify() {
    let queue = Arc::new(QueueNotifier::new());
    let ledger = Ledger::with_notifier(queue.clone());
    ledger.create_account("A", dec!(10)).unwrap();

    let _ = ledger.transfer(&id("A"), &id("A"), dec!(1));
    let _ = ledger.transfer(&id("A"), &id("B"), dec!(1));
    let _ = ledger.transfer(&id("A"), &id("B"), dec!(-1));

    assert!(queue.is_empty());
}

#[test]
fn notification_failure_does_not_fail_transfer() {
    let ledger = Ledger::with_notifier(Arc::new(FailingNotifier));
    ledger.create_account("A", dec!(10)).unwrap();
    ledger.create_account("B", dec!(0)).unwrap();

    assert_eq!(ledger.transfer(&id("A"), &id("B"), dec!(10)), Ok(()));
    assert_eq!(balance(&ledger, "A"), dec!(0));
    assert_eq!(balance(&ledger, "B"), dec!(10));
}

// === Listing ===

#[test]
fn accounts_listed_in_id_order() {
    let ledger = ledger_with(&[("b", dec!(2)), ("a", dec!(1))]);
    let ids: Vec<String> = ledger
        .accounts()
        .into_iter()
        .map(|account| account.id().to_string())
        .collect();
    assert_eq!(ids, vec!["a", "b"]);
}
