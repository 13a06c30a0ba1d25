// tests/dispatch_loop.rs

mod common;
use crate::common::{
    CallbackRecorder, FakeSource, LogEntry, RecordingLog, assert_near, init_tracing, ms,
};

use std::sync::{Arc, Mutex};

use tokio::time::{Instant, sleep};

use treewatch::types::ClosePolicy;
use treewatch::watch::{
    ChangeKind, EventFilter, PatternFilter, PatternSpec, RawEvent, StreamEnd, WatchOptions, Watcher,
    event_channel, watch, watch_dedup,
};

fn options(log: &Arc<RecordingLog>) -> WatchOptions {
    WatchOptions::default().with_log(log.clone())
}

#[tokio::test(start_paused = true)]
async fn plain_mode_delivers_every_event_in_order() {
    init_tracing();

    let log = Arc::new(RecordingLog::new());
    let (tx, streams) = event_channel();

    tx.events.send(RawEvent::new("/a", ChangeKind::Create)).unwrap();
    tx.events.send(RawEvent::new("/a", ChangeKind::Write)).unwrap();
    tx.events.send(RawEvent::new("/b", ChangeKind::Remove)).unwrap();
    // Keep the error stream open so only the event stream ends the loop.
    let errors = tx.errors.clone();
    drop(tx);

    let mut seen = Vec::new();
    let end = watch(streams, &options(&log), |event| seen.push(event)).await;

    assert_eq!(end, StreamEnd::Events);
    assert_eq!(
        seen,
        vec![
            RawEvent::new("/a", ChangeKind::Create),
            RawEvent::new("/a", ChangeKind::Write),
            RawEvent::new("/b", ChangeKind::Remove),
        ]
    );
    drop(errors);
}

#[tokio::test(start_paused = true)]
async fn reject_all_filter_means_no_callbacks() {
    init_tracing();

    let log = Arc::new(RecordingLog::new());
    let opts = options(&log).with_filter(EventFilter::new(|_| false));

    // Plain mode.
    let (tx, streams) = event_channel();
    for i in 0..10 {
        tx.events.send(RawEvent::new(format!("/f{i}"), ChangeKind::Write)).unwrap();
    }
    let errors = tx.errors.clone();
    drop(tx);
    let mut plain_calls = 0;
    watch(streams, &opts, |_| plain_calls += 1).await;
    assert_eq!(plain_calls, 0);
    drop(errors);

    // Debounced mode, flushing on close so nothing can hide in a timer.
    let recorder = CallbackRecorder::new();
    let (tx, streams) = event_channel();
    for i in 0..10 {
        tx.events.send(RawEvent::new(format!("/f{i}"), ChangeKind::Write)).unwrap();
    }
    let errors = tx.errors.clone();
    drop(tx);
    let opts = opts.with_on_close(ClosePolicy::Flush);
    watch_dedup(streams, &opts, recorder.callback()).await;
    sleep(ms(500)).await;
    assert!(recorder.calls().is_empty());
    drop(errors);
}

#[tokio::test(start_paused = true)]
async fn pattern_filter_limits_what_reaches_the_callback() {
    init_tracing();

    let log = Arc::new(RecordingLog::new());
    let spec = PatternSpec {
        include: vec!["**/*.rs".to_string()],
        exclude: vec!["target/**".to_string()],
        kinds: vec![],
    };
    let filter = PatternFilter::new("/proj", &spec).unwrap();
    let opts = options(&log).with_filter(filter.into_event_filter());

    let (tx, streams) = event_channel();
    tx.events.send(RawEvent::new("/proj/src/main.rs", ChangeKind::Write)).unwrap();
    tx.events.send(RawEvent::new("/proj/README.md", ChangeKind::Write)).unwrap();
    tx.events.send(RawEvent::new("/proj/target/build.rs", ChangeKind::Write)).unwrap();
    tx.events.send(RawEvent::new("/elsewhere/lib.rs", ChangeKind::Write)).unwrap();
    let errors = tx.errors.clone();
    drop(tx);

    let mut seen = Vec::new();
    watch(streams, &opts, |event| seen.push(event.path)).await;

    assert_eq!(seen, vec![std::path::PathBuf::from("/proj/src/main.rs")]);
    drop(errors);
}

#[tokio::test(start_paused = true)]
async fn upstream_errors_are_logged_and_the_loop_keeps_going() {
    init_tracing();

    let log = Arc::new(RecordingLog::new());
    let opts = options(&log);
    let (tx, streams) = event_channel();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let handle = {
        let seen = Arc::clone(&seen);
        tokio::spawn(async move {
            watch(streams, &opts, move |event| seen.lock().unwrap().push(event)).await
        })
    };

    tx.events.send(RawEvent::new("/a", ChangeKind::Write)).unwrap();
    sleep(ms(10)).await;
    tx.errors.send(notify::Error::generic("queue overflow")).unwrap();
    sleep(ms(10)).await;
    tx.events.send(RawEvent::new("/b", ChangeKind::Write)).unwrap();
    sleep(ms(10)).await;

    let errors = tx.errors.clone();
    drop(tx);
    let end = handle.await.unwrap();

    assert_eq!(end, StreamEnd::Events);
    assert_eq!(seen.lock().unwrap().len(), 2);
    let upstream = log.upstream_errors();
    assert_eq!(upstream.len(), 1);
    assert!(upstream[0].contains("queue overflow"), "got {upstream:?}");
    drop(errors);
}

#[tokio::test(start_paused = true)]
async fn closing_the_error_stream_ends_the_loop() {
    init_tracing();

    let log = Arc::new(RecordingLog::new());
    let (tx, streams) = event_channel();
    let events = tx.events.clone();
    drop(tx);

    let end = watch(streams, &options(&log), |_| {}).await;
    assert_eq!(end, StreamEnd::Errors);
    drop(events);
}

#[tokio::test(start_paused = true)]
async fn idle_intervals_are_reported() {
    init_tracing();

    let log = Arc::new(RecordingLog::new());
    let opts = options(&log).with_idle_interval(ms(2000));
    let (tx, streams) = event_channel();

    let handle = tokio::spawn(async move { watch(streams, &opts, |_| {}).await });

    sleep(ms(5000)).await;
    let errors = tx.errors.clone();
    drop(tx);
    handle.await.unwrap();

    assert_eq!(log.idle_count(), 2);
    assert!(log.entries().iter().all(|e| *e == LogEntry::Idle(ms(2000))));
    drop(errors);
}

#[tokio::test(start_paused = true)]
async fn events_postpone_the_idle_report() {
    init_tracing();

    let log = Arc::new(RecordingLog::new());
    let opts = options(&log).with_idle_interval(ms(2000));
    let (tx, streams) = event_channel();

    let handle = tokio::spawn(async move { watch(streams, &opts, |_| {}).await });

    for _ in 0..3 {
        sleep(ms(1500)).await;
        tx.events.send(RawEvent::new("/a", ChangeKind::Write)).unwrap();
    }
    sleep(ms(100)).await;
    let errors = tx.errors.clone();
    drop(tx);
    handle.await.unwrap();

    assert_eq!(log.idle_count(), 0);
    drop(errors);
}

#[tokio::test(start_paused = true)]
async fn debounced_loop_collapses_bursts_per_path() {
    init_tracing();

    let log = Arc::new(RecordingLog::new());
    let opts = options(&log).with_debounce(ms(100));
    let recorder = CallbackRecorder::new();
    let (tx, streams) = event_channel();
    let start = Instant::now();

    let handle = {
        let callback = recorder.callback();
        tokio::spawn(async move { watch_dedup(streams, &opts, callback).await })
    };

    tx.events.send(RawEvent::new("/a", ChangeKind::Create)).unwrap();
    sleep(ms(30)).await;
    tx.events.send(RawEvent::new("/a", ChangeKind::Write)).unwrap();
    tx.events.send(RawEvent::new("/b", ChangeKind::Write)).unwrap();
    sleep(ms(30)).await;
    tx.events.send(RawEvent::new("/a", ChangeKind::Write)).unwrap();

    sleep(ms(400)).await;
    let errors = tx.errors.clone();
    drop(tx);
    assert_eq!(handle.await.unwrap(), StreamEnd::Events);

    let a = recorder.calls_for("/a");
    let b = recorder.calls_for("/b");
    assert_eq!(a.len(), 1);
    assert_eq!(b.len(), 1);
    assert_eq!(a[0].event.kind, ChangeKind::Write);
    assert_near(a[0].at - start, ms(160));
    assert_near(b[0].at - start, ms(130));
    drop(errors);
}

#[tokio::test(start_paused = true)]
async fn pending_bursts_are_discarded_on_close_by_default() {
    init_tracing();

    let log = Arc::new(RecordingLog::new());
    let opts = options(&log).with_debounce(ms(100));
    let recorder = CallbackRecorder::new();
    let (tx, streams) = event_channel();

    tx.events.send(RawEvent::new("/a", ChangeKind::Write)).unwrap();
    let errors = tx.errors.clone();
    drop(tx);

    watch_dedup(streams, &opts, recorder.callback()).await;
    sleep(ms(500)).await;

    assert!(recorder.calls().is_empty());
    drop(errors);
}

#[tokio::test(start_paused = true)]
async fn pending_bursts_are_flushed_on_close_when_asked() {
    init_tracing();

    let log = Arc::new(RecordingLog::new());
    let opts = options(&log)
        .with_debounce(ms(100))
        .with_on_close(ClosePolicy::Flush);
    let recorder = CallbackRecorder::new();
    let (tx, streams) = event_channel();
    let start = Instant::now();

    tx.events.send(RawEvent::new("/a", ChangeKind::Create)).unwrap();
    tx.events.send(RawEvent::new("/a", ChangeKind::Remove)).unwrap();
    let errors = tx.errors.clone();
    drop(tx);

    watch_dedup(streams, &opts, recorder.callback()).await;

    let calls = recorder.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].event, RawEvent::new("/a", ChangeKind::Remove));
    assert_near(calls[0].at - start, ms(0));
    assert_eq!(
        log.entries(),
        vec![LogEntry::Fired(RawEvent::new("/a", ChangeKind::Remove))]
    );
    drop(errors);
}

#[tokio::test(start_paused = true)]
async fn watcher_facade_runs_both_modes() {
    init_tracing();

    let log = Arc::new(RecordingLog::new());

    let (tx, streams) = event_channel();
    let watcher = Watcher::from_parts(FakeSource::new(), streams, options(&log));
    tx.events.send(RawEvent::new("/a", ChangeKind::Write)).unwrap();
    let errors = tx.errors.clone();
    drop(tx);
    let mut seen = Vec::new();
    assert_eq!(watcher.watch(|event| seen.push(event)).await, StreamEnd::Events);
    assert_eq!(seen, vec![RawEvent::new("/a", ChangeKind::Write)]);
    drop(errors);

    let recorder = CallbackRecorder::new();
    let (tx, streams) = event_channel();
    let opts = options(&log)
        .with_debounce(ms(50))
        .with_on_close(ClosePolicy::Flush);
    let watcher = Watcher::from_parts(FakeSource::new(), streams, opts);
    assert_eq!(watcher.options().debounce, ms(50));
    tx.events.send(RawEvent::new("/a", ChangeKind::Create)).unwrap();
    tx.events.send(RawEvent::new("/a", ChangeKind::Write)).unwrap();
    // Only the event stream closes, so both events are handled first.
    let errors = tx.errors.clone();
    drop(tx);
    assert_eq!(
        watcher.watch_dedup(recorder.callback()).await,
        StreamEnd::Events
    );
    let calls = recorder.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].event, RawEvent::new("/a", ChangeKind::Write));
    drop(errors);
}
