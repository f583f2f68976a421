use fglpool::domain::LedgerEntry;
use rust_decimal::Decimal;

/// Assert `(weekly, banked, provisional)` of an entry.
pub fn assert_balances(entry: &LedgerEntry, weekly: Decimal, banked: Decimal, provisional: Decimal) {
    assert_eq!(
        (entry.weekly(), entry.banked(), entry.provisional()),
        (weekly, banked, provisional),
        "unexpected balances for {} in gameweek {}",
        entry.player(),
        entry.gameweek()
    );
}

/// `provisional == banked + weekly` when weekly is positive, else `banked`.
pub fn assert_provisional_rule(entry: &LedgerEntry) {
    let expected = if entry.weekly() > Decimal::ZERO {
        entry.banked() + entry.weekly()
    } else {
        entry.banked()
    };
    assert_eq!(entry.provisional(), expected, "provisional rule broken for {}", entry.player());
}
