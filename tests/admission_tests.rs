//! Wager admission: allowance, deadlines, ownership, concurrency.

use std::sync::Arc;

use fglpool::domain::{PlayerId, WagerId};
use fglpool::error::{Error, ValidationError};
use fglpool::port::outbound::store::LedgerStore;
use fglpool::testkit::domain::{evens, legs, player};
use fglpool::testkit::fixture::PoolFixture;
use rust_decimal_macros::dec;

#[tokio::test]
async fn stakes_cannot_exceed_the_allowance() {
    let fx = PoolFixture::new().await;
    fx.gameweek(1, vec![evens("g1", 1), evens("g2", 1)]).await;

    fx.place("ann", 1, dec!(60), &[("g1", "H")]).await.unwrap();
    let err = fx.place("ann", 1, dec!(50), &[("g2", "H")]).await.unwrap_err();
    match err {
        Error::Validation(ValidationError::StakeExceedsAllowance {
            stake,
            remaining,
            allowance,
        }) => {
            assert_eq!(stake, dec!(50));
            assert_eq!(remaining, dec!(40));
            assert_eq!(allowance, dec!(100));
        }
        other => panic!("unexpected error: {other}"),
    }

    // Exactly the remainder still fits.
    fx.place("ann", 1, dec!(40), &[("g2", "H")]).await.unwrap();
    let budget = fx
        .pool
        .admission
        .unused_allowance(&PlayerId::from("ann"), 1)
        .await
        .unwrap();
    assert_eq!(budget.remaining(), dec!(0));
}

#[tokio::test]
async fn positive_weekly_rolls_into_next_allowance() {
    let fx = PoolFixture::new().await;
    fx.gameweek(1, vec![evens("g1", 1)]).await;
    fx.gameweek(2, vec![evens("g2", 2)]).await;

    fx.place("ann", 1, dec!(75), &[("g1", "H")]).await.unwrap();
    fx.post(1, &[("g1", "H")]).await.unwrap();

    let budget = fx
        .pool
        .admission
        .unused_allowance(&PlayerId::from("ann"), 2)
        .await
        .unwrap();
    assert_eq!(budget.allowance, dec!(150.00));
    fx.place("ann", 2, dec!(150), &[("g2", "A")]).await.unwrap();
}

#[tokio::test]
async fn editing_excludes_the_wagers_own_stake() {
    let fx = PoolFixture::new().await;
    fx.gameweek(1, vec![evens("g1", 1), evens("g2", 1)]).await;
    let wager = fx.place("ann", 1, dec!(80), &[("g1", "H")]).await.unwrap();

    let edited = fx
        .pool
        .admission
        .edit_wager(
            wager.id(),
            &PlayerId::from("ann"),
            dec!(100),
            legs(&[("g1", "D"), ("g2", "A")]),
            chrono::Utc::now(),
        )
        .await
        .unwrap();
    assert_eq!(edited.id(), wager.id());
    assert_eq!(edited.stake(), dec!(100));
    assert_eq!(edited.legs().len(), 2);

    let views = fx.pool.admission.wagers(1, None).await.unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].payout, None);
}

#[tokio::test]
async fn only_the_owner_may_edit() {
    let fx = PoolFixture::new().await;
    fx.gameweek(1, vec![evens("g1", 1)]).await;
    let wager = fx.place("ann", 1, dec!(10), &[("g1", "H")]).await.unwrap();

    let err = fx
        .pool
        .admission
        .edit_wager(
            wager.id(),
            &PlayerId::from("bob"),
            dec!(10),
            legs(&[("g1", "A")]),
            chrono::Utc::now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::NotOwner { .. })));

    let err = fx
        .pool
        .admission
        .edit_wager(
            &WagerId::from("missing"),
            &PlayerId::from("ann"),
            dec!(10),
            legs(&[("g1", "A")]),
            chrono::Utc::now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::UnknownWager(_))));
}

#[tokio::test]
async fn closed_gameweeks_refuse_wagers() {
    let fx = PoolFixture::new().await;
    fx.gameweek_with_deadline(1, -1, vec![evens("g1", 1)]).await;

    let err = fx.place("ann", 1, dec!(10), &[("g1", "H")]).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::DeadlinePassed { gameweek: 1, .. })
    ));
}

#[tokio::test]
async fn settled_gameweeks_refuse_wagers() {
    let fx = PoolFixture::new().await;
    fx.gameweek(1, vec![evens("g1", 1)]).await;
    let wager = fx.place("ann", 1, dec!(10), &[("g1", "H")]).await.unwrap();
    fx.post(1, &[("g1", "H")]).await.unwrap();

    let err = fx.place("bob", 1, dec!(10), &[("g1", "H")]).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::GameweekSettled(1))
    ));

    let err = fx
        .pool
        .admission
        .edit_wager(
            wager.id(),
            &PlayerId::from("ann"),
            dec!(20),
            legs(&[("g1", "H")]),
            chrono::Utc::now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::GameweekSettled(1))
    ));

    assert!(fx.store.entry(&player("bob"), 1).await.unwrap().is_none());
    let (weekly, _, _) = fx.balances("ann", 1).await;
    assert_eq!(weekly, dec!(-80.00));
}

#[tokio::test]
async fn legs_must_belong_to_the_gameweek() {
    let fx = PoolFixture::new().await;
    fx.gameweek(1, vec![evens("g1", 1)]).await;
    fx.gameweek(2, vec![evens("g2", 2)]).await;

    let err = fx.place("ann", 1, dec!(10), &[("g2", "H")]).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::GameNotInGameweek { gameweek: 1, .. })
    ));

    let err = fx.place("ann", 5, dec!(10), &[("g1", "H")]).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::UnknownGameweek(5))
    ));
}

#[tokio::test]
async fn malformed_wagers_are_refused() {
    let fx = PoolFixture::new().await;
    fx.gameweek(1, vec![evens("g1", 1)]).await;

    let err = fx.place("ann", 1, dec!(0), &[("g1", "H")]).await.unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::Invalid(_))));
    let err = fx.place("ann", 1, dec!(5), &[]).await.unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::Invalid(_))));
    let err = fx
        .place("ann", 1, dec!(5), &[("g1", "H"), ("g1", "A")])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::Invalid(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_wagers_never_overspend() {
    let fx = Arc::new(PoolFixture::new().await);
    fx.gameweek(1, vec![evens("g1", 1)]).await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let fx = Arc::clone(&fx);
        handles.push(tokio::spawn(async move {
            fx.place("ann", 1, dec!(30), &[("g1", "H")]).await.is_ok()
        }));
    }
    let mut admitted = 0;
    for handle in handles {
        if handle.await.unwrap() {
            admitted += 1;
        }
    }

    assert_eq!(admitted, 3);
    let budget = fx
        .pool
        .admission
        .unused_allowance(&PlayerId::from("ann"), 1)
        .await
        .unwrap();
    assert_eq!(budget.staked, dec!(90));
}
