// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use flowmap_core::{CancellationToken, Subscription};
use futures::FutureExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_new_token_not_cancelled() {
    let token = CancellationToken::new();
    assert!(!token.is_cancelled());
}

#[test]
fn test_cancel_is_idempotent() {
    let token = CancellationToken::new();
    token.cancel();
    token.cancel();
    assert!(token.is_cancelled());
}

#[test]
fn test_clone_shares_state() {
    let token1 = CancellationToken::new();
    let token2 = token1.clone();

    token2.cancel();

    assert!(token1.is_cancelled());
}

#[test]
fn test_cancelled_resolves_immediately_if_already_cancelled() {
    let token = CancellationToken::new();
    token.cancel();

    assert!(token.cancelled().now_or_never().is_some());
}

#[test]
fn test_cancelled_pending_until_cancel() {
    let token = CancellationToken::new();

    assert!(token.cancelled().now_or_never().is_none());
}

#[tokio::test]
async fn test_cancel_wakes_all_waiters() -> anyhow::Result<()> {
    let token = CancellationToken::new();
    let woken = Arc::new(AtomicUsize::new(0));

    let waiters: Vec<_> = (0..5)
        .map(|_| {
            let token = token.clone();
            let woken = woken.clone();
            tokio::spawn(async move {
                token.cancelled().await;
                woken.fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect();

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(woken.load(Ordering::SeqCst), 0);

    token.cancel();
    for waiter in waiters {
        tokio::time::timeout(Duration::from_secs(1), waiter).await??;
    }

    assert_eq!(woken.load(Ordering::SeqCst), 5);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancel_from_another_thread() {
    let token = CancellationToken::new();
    let remote = token.clone();

    std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(5));
        remote.cancel();
    });

    let result = tokio::time::timeout(Duration::from_secs(1), token.cancelled()).await;
    assert!(result.is_ok());
}
