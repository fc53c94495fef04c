// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::support::{evens_only, manual_mapper};
use flowmap_core::{
    empty, from_future, from_iter, just, range, FlowError, Observable, ObservableExt,
    PublishSubject, StreamItem,
};
use flowmap_stream::MapAsyncExt;
use flowmap_test_utils::TestObserver;
use futures::StreamExt;
use std::time::Duration;

#[tokio::test]
async fn test_map_async_emits_first_values_in_source_order() -> anyhow::Result<()> {
    // Arrange
    let observer = TestObserver::<i32>::new();

    // Act
    range(1, 10).map_async(evens_only).subscribe(observer.clone());

    // Assert
    observer.assert_result(&[2, 4, 6, 8, 10]);

    Ok(())
}

#[tokio::test]
async fn test_map_async_emits_sub_stream_values() -> anyhow::Result<()> {
    // Arrange
    let observer = TestObserver::<i32>::new();

    // Act
    range(1, 10)
        .map_async(|v: &i32| {
            Ok(if v % 2 == 0 {
                just(v * 2).boxed()
            } else {
                empty().boxed()
            })
        })
        .subscribe(observer.clone());

    // Assert
    observer.assert_result(&[4, 8, 12, 16, 20]);

    Ok(())
}

#[tokio::test]
async fn test_map_async_keeps_only_the_first_value_of_each_sub_stream() -> anyhow::Result<()> {
    // Arrange
    let observer = TestObserver::<i32>::new();

    // Act
    range(1, 10)
        .map_async(|v: &i32| {
            Ok(if v % 2 == 0 {
                range(*v, 2).boxed()
            } else {
                empty().boxed()
            })
        })
        .subscribe(observer.clone());

    // Assert
    observer.assert_result(&[2, 4, 6, 8, 10]);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_map_async_orders_asynchronous_sub_streams() -> anyhow::Result<()> {
    // Arrange
    let observer = TestObserver::<i32>::new();

    // Act - later values finish first
    range(1, 10)
        .map_async(|v: &i32| {
            let v = *v;
            Ok(if v % 2 == 0 {
                from_future(async move {
                    tokio::time::sleep(Duration::from_millis((20 - 2 * v) as u64)).await;
                    Ok::<_, FlowError>(v)
                })
                .boxed()
            } else {
                empty().boxed()
            })
        })
        .subscribe(observer.clone());

    // Assert
    assert!(observer.await_done(Duration::from_secs(5)).await);
    observer.assert_result(&[2, 4, 6, 8, 10]);

    Ok(())
}

#[tokio::test]
async fn test_map_async_with_combiner() -> anyhow::Result<()> {
    // Arrange
    let observer = TestObserver::<String>::new();

    // Act
    range(1, 3)
        .map_async_with(|v: &i32| Ok(just(v * 10)), |t: i32, u: i32| Ok(format!("{t}:{u}")))
        .subscribe(observer.clone());

    // Assert
    observer.assert_result(&["1:10".to_string(), "2:20".to_string(), "3:30".to_string()]);

    Ok(())
}

#[tokio::test]
async fn test_map_async_empty_source_completes() -> anyhow::Result<()> {
    // Arrange
    let observer = TestObserver::<i32>::new();

    // Act
    empty::<i32>().map_async(evens_only).subscribe(observer.clone());

    // Assert
    observer.assert_result(&[]);

    Ok(())
}

#[tokio::test]
async fn test_map_async_holds_results_until_earlier_slots_finish() -> anyhow::Result<()> {
    // Arrange
    let outer = PublishSubject::<i32>::new();
    let (inners, mapper) = manual_mapper();
    let observer = TestObserver::<i32>::new();
    outer.clone().map_async(mapper).subscribe(observer.clone());

    outer.next(1)?;
    outer.next(2)?;
    outer.next(3)?;
    assert_eq!(inners.len(), 3);

    // Act & Assert - out of order completion is buffered
    inners.get(2).next(30);
    inners.get(1).next(20);
    observer.assert_values(&[]);

    inners.get(0).next(10);
    observer.assert_values(&[10, 20, 30]);

    outer.complete()?;
    observer.assert_result(&[10, 20, 30]);

    Ok(())
}

#[tokio::test]
async fn test_map_async_empty_sub_stream_leaves_a_gap() -> anyhow::Result<()> {
    // Arrange
    let outer = PublishSubject::<i32>::new();
    let (inners, mapper) = manual_mapper();
    let observer = TestObserver::<i32>::new();
    outer.clone().map_async(mapper).subscribe(observer.clone());

    outer.next(1)?;
    outer.next(2)?;

    // Act
    inners.get(1).next(20);
    inners.get(0).complete();

    // Assert
    observer.assert_values(&[20]);
    observer.assert_not_complete();

    Ok(())
}

#[tokio::test]
async fn test_map_async_completion_waits_for_pending_slots() -> anyhow::Result<()> {
    // Arrange
    let outer = PublishSubject::<i32>::new();
    let (inners, mapper) = manual_mapper();
    let observer = TestObserver::<i32>::new();
    outer.clone().map_async(mapper).subscribe(observer.clone());

    outer.next(1)?;

    // Act
    outer.complete()?;

    // Assert
    observer.assert_not_complete();

    inners.get(0).next(7);
    observer.assert_result(&[7]);

    Ok(())
}

#[tokio::test]
async fn test_map_async_cancels_sub_stream_after_first_value() -> anyhow::Result<()> {
    // Arrange
    let outer = PublishSubject::<i32>::new();
    let inner = PublishSubject::<i32>::new();
    let observer = TestObserver::<i32>::new();
    let mapped_inner = inner.clone();
    outer
        .clone()
        .map_async(move |_: &i32| Ok(mapped_inner.clone()))
        .subscribe(observer.clone());

    outer.next(1)?;
    assert!(inner.has_observers());

    // Act
    inner.next(5)?;

    // Assert
    assert!(!inner.has_observers());
    observer.assert_values(&[5]);

    Ok(())
}

#[tokio::test]
async fn test_map_async_is_cold() -> anyhow::Result<()> {
    // Arrange
    let mapped = from_iter(vec![1, 2, 3, 4]).map_async(evens_only);
    let first = TestObserver::<i32>::new();
    let second = TestObserver::<i32>::new();

    // Act
    mapped.subscribe(first.clone());
    mapped.subscribe(second.clone());

    // Assert
    first.assert_result(&[2, 4]);
    second.assert_result(&[2, 4]);

    Ok(())
}

#[tokio::test]
async fn test_map_async_into_stream() -> anyhow::Result<()> {
    // Arrange
    let mapped = range(1, 6).map_async(|v: &i32| Ok(just(v + 100)));

    // Act
    let items: Vec<_> = mapped.into_stream().collect().await;

    // Assert
    let expected: Vec<_> = (101..=106).map(StreamItem::Value).collect();
    assert_eq!(items, expected);

    Ok(())
}
