// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::support::evens_only;
use flowmap_core::{
    just, range, throw, BoxObservable, FlowError, Observable, ObservableExt, PublishSubject,
};
use flowmap_stream::{MapAsyncConfig, MapAsyncExt};
use flowmap_test_utils::{
    ManualSource, ScriptedSource, Step, TestError, TestObserver, UndeliverableRecorder,
};

fn recording_config(recorder: &UndeliverableRecorder) -> MapAsyncConfig {
    MapAsyncConfig::new().with_undeliverable_handler(recorder.handler())
}

#[tokio::test]
async fn test_map_async_outer_error() -> anyhow::Result<()> {
    // Arrange
    let observer = TestObserver::<i32>::new();

    // Act
    throw::<i32>(TestError::flow("outer"))
        .map_async(evens_only)
        .subscribe(observer.clone());

    // Assert
    observer.assert_failure(&[]);
    observer.assert_error_message("outer");

    Ok(())
}

#[tokio::test]
async fn test_map_async_outer_error_cancels_sub_streams() -> anyhow::Result<()> {
    // Arrange
    let outer = PublishSubject::<i32>::new();
    let inner = PublishSubject::<i32>::new();
    let observer = TestObserver::<i32>::new();
    let mapped_inner = inner.clone();
    outer
        .clone()
        .map_async(move |_: &i32| Ok(mapped_inner.clone()))
        .subscribe(observer.clone());

    assert!(!inner.has_observers());
    outer.next(1)?;
    assert!(inner.has_observers());

    // Act
    outer.error(TestError::flow("outer"))?;

    // Assert
    assert!(!inner.has_observers());
    observer.assert_failure(&[]);

    Ok(())
}

#[tokio::test]
async fn test_map_async_sub_stream_error_truncates_output() -> anyhow::Result<()> {
    // Arrange
    let observer = TestObserver::<i32>::new();

    // Act
    range(1, 10)
        .map_async(|v: &i32| {
            Ok(if v % 2 == 0 {
                throw::<i32>(TestError::flow("inner")).boxed()
            } else {
                just(*v).boxed()
            })
        })
        .subscribe(observer.clone());

    // Assert
    observer.assert_failure(&[1]);
    observer.assert_error_message("inner");

    Ok(())
}

#[tokio::test]
async fn test_map_async_sub_stream_error_cancels_outer() -> anyhow::Result<()> {
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
    inner.error(TestError::flow("inner"))?;

    // Assert
    assert!(!outer.has_observers());
    observer.assert_failure(&[]);

    Ok(())
}

#[tokio::test]
async fn test_map_async_mapper_failure() -> anyhow::Result<()> {
    // Arrange
    let observer = TestObserver::<i32>::new();

    // Act
    range(1, 10)
        .map_async(|_: &i32| -> flowmap_core::Result<BoxObservable<i32>> {
            Err(TestError::flow("mapper"))
        })
        .subscribe(observer.clone());

    // Assert
    observer.assert_failure(&[]);
    observer.assert_error_message("mapper");

    Ok(())
}

#[tokio::test]
async fn test_map_async_combiner_failure() -> anyhow::Result<()> {
    // Arrange
    let observer = TestObserver::<i32>::new();

    // Act
    range(1, 10)
        .map_async_with(
            |_: &i32| Ok(just(1)),
            |_, _| -> flowmap_core::Result<i32> { Err(TestError::flow("combiner")) },
        )
        .subscribe(observer.clone());

    // Assert
    observer.assert_failure(&[]);
    observer.assert_error_message("combiner");

    Ok(())
}

#[tokio::test]
async fn test_map_async_sub_stream_ignoring_cancel() -> anyhow::Result<()> {
    // Arrange
    let recorder = UndeliverableRecorder::new();
    let observer = TestObserver::<i32>::new();
    let rogue = ScriptedSource::new(vec![
        Step::Next(2),
        Step::Next(3),
        Step::Error(TestError::flow("late")),
        Step::Complete,
    ]);

    // Act
    just(1)
        .map_async_config(
            move |_: &i32| Ok(rogue.clone()),
            |_, u: i32| Ok(u),
            recording_config(&recorder),
        )
        .subscribe(observer.clone());

    // Assert
    observer.assert_result(&[2]);
    assert_eq!(recorder.len(), 1);
    recorder.assert_test_error(0, "late");

    Ok(())
}

#[tokio::test]
async fn test_map_async_outer_error_after_mapper_failure() -> anyhow::Result<()> {
    // Arrange
    let recorder = UndeliverableRecorder::new();
    let observer = TestObserver::<i32>::new();
    let outer = ScriptedSource::new(vec![Step::Next(1), Step::Error(TestError::flow("outer"))]);

    // Act
    outer
        .map_async_config(
            |_: &i32| -> flowmap_core::Result<BoxObservable<i32>> {
                Err(TestError::flow("inner"))
            },
            |_, u: i32| Ok(u),
            recording_config(&recorder),
        )
        .subscribe(observer.clone());

    // Assert
    observer.assert_failure(&[]);
    observer.assert_error_message("inner");
    assert_eq!(recorder.len(), 1);
    recorder.assert_test_error(0, "outer");

    Ok(())
}

#[tokio::test]
async fn test_map_async_sub_stream_error_after_outer_error() -> anyhow::Result<()> {
    // Arrange
    let recorder = UndeliverableRecorder::new();
    let observer = TestObserver::<i32>::new();
    let outer = ManualSource::<i32>::new();
    let inner = ManualSource::<i32>::new();
    let mapped_inner = inner.clone();
    outer
        .clone()
        .map_async_config(
            move |_: &i32| Ok(mapped_inner.clone()),
            |_, u: i32| Ok(u),
            recording_config(&recorder).with_max_concurrency(10)?,
        )
        .subscribe(observer.clone());

    // Act
    outer.next(1);
    outer.error(TestError::flow("outer"));
    inner.error(TestError::flow("inner"));

    // Assert
    observer.assert_failure(&[]);
    observer.assert_error_message("outer");
    assert_eq!(recorder.len(), 1);
    recorder.assert_test_error(0, "inner");

    Ok(())
}

#[tokio::test]
async fn test_map_async_error_after_completion_is_undeliverable() -> anyhow::Result<()> {
    // Arrange
    let recorder = UndeliverableRecorder::new();
    let observer = TestObserver::<i32>::new();
    let outer = ScriptedSource::new(vec![
        Step::Next(2),
        Step::Complete,
        Step::Next(4),
        Step::Complete,
        Step::Error(TestError::flow("late")),
    ]);

    // Act
    outer
        .map_async_config(evens_only, |_, u: i32| Ok(u), recording_config(&recorder))
        .subscribe(observer.clone());

    // Assert
    observer.assert_result(&[2]);
    assert_eq!(recorder.len(), 1);
    recorder.assert_test_error(0, "late");

    Ok(())
}

#[tokio::test]
async fn test_map_async_drops_values_after_error() -> anyhow::Result<()> {
    // Arrange
    let recorder = UndeliverableRecorder::new();
    let observer = TestObserver::<i32>::new();
    let outer = ScriptedSource::new(vec![
        Step::Error(TestError::flow("first")),
        Step::Next(2),
        Step::Complete,
    ]);

    // Act
    outer
        .map_async_config(evens_only, |_, u: i32| Ok(u), recording_config(&recorder))
        .subscribe(observer.clone());

    // Assert
    observer.assert_failure(&[]);
    observer.assert_error_message("first");
    assert!(recorder.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_map_async_error_discards_buffered_results() -> anyhow::Result<()> {
    // Arrange
    let outer = PublishSubject::<i32>::new();
    let (inners, mapper) = super::support::manual_mapper();
    let observer = TestObserver::<i32>::new();
    outer.clone().map_async(mapper).subscribe(observer.clone());

    outer.next(1)?;
    outer.next(2)?;
    inners.get(1).next(20);

    // Act
    inners.get(0).error(TestError::flow("inner"));

    // Assert
    observer.assert_failure(&[]);
    observer.assert_error_message("inner");

    Ok(())
}

#[tokio::test]
async fn test_map_async_emits_ready_result_before_failing_promotion() -> anyhow::Result<()> {
    // Arrange
    let outer = PublishSubject::<i32>::new();
    let first = ManualSource::<i32>::new();
    let observer = TestObserver::<i32>::new();
    let mapped_first = first.clone();
    outer
        .clone()
        .map_async_config(
            move |v: &i32| -> flowmap_core::Result<ManualSource<i32>> {
                if *v == 1 {
                    Ok(mapped_first.clone())
                } else {
                    Err(TestError::flow("mapper"))
                }
            },
            |_, u: i32| Ok(u),
            MapAsyncConfig::new().with_max_concurrency(1)?,
        )
        .subscribe(observer.clone());

    outer.next(1)?;
    outer.next(2)?;

    // Act - finishing the first slot promotes 2, whose mapper fails
    first.next(10);

    // Assert
    observer.assert_failure(&[10]);
    observer.assert_error_message("mapper");
    assert!(!outer.has_observers());

    Ok(())
}

#[tokio::test]
async fn test_map_async_emits_ready_value_before_failing_sub_stream() -> anyhow::Result<()> {
    // Arrange
    let outer = ManualSource::<i32>::new();
    let first = ManualSource::<i32>::new();
    let observer = TestObserver::<i32>::new();
    let mapped_first = first.clone();
    outer
        .clone()
        .map_async_config(
            move |v: &i32| {
                Ok(if *v == 1 {
                    mapped_first.clone().boxed()
                } else {
                    throw::<i32>(TestError::flow("second")).boxed()
                })
            },
            |t: i32, u: i32| Ok(t * 100 + u),
            MapAsyncConfig::new().with_max_concurrency(1)?,
        )
        .subscribe(observer.clone());

    outer.next(1);
    outer.next(2);

    // Act
    first.next(5);

    // Assert
    observer.assert_failure(&[105]);
    observer.assert_error_message("second");
    assert!(outer.is_cancelled());

    Ok(())
}

#[tokio::test]
async fn test_map_async_rejects_zero_concurrency() -> anyhow::Result<()> {
    // Act
    let result = MapAsyncConfig::new().with_max_concurrency(0);

    // Assert
    assert!(matches!(result, Err(FlowError::InvalidConfig { .. })));

    Ok(())
}
