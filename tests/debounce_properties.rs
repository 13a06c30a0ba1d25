// tests/debounce_properties.rs

mod common;
use crate::common::{CallbackRecorder, RecordingLog, ms};

use std::sync::Arc;

use proptest::prelude::*;
use tokio::time::{Instant, sleep};

use treewatch::watch::{ChangeKind, Debouncer, RawEvent};

const DELAY_MS: u64 = 100;

fn paused_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .unwrap()
}

fn kind_strategy() -> impl Strategy<Value = ChangeKind> {
    prop_oneof![
        Just(ChangeKind::Create),
        Just(ChangeKind::Write),
        Just(ChangeKind::Remove),
        Just(ChangeKind::Rename),
        Just(ChangeKind::Chmod),
    ]
}

proptest! {
    // Events on one path, each arriving before the previous quiet period is
    // over, produce exactly one call carrying the last event, one delay after
    // the last arrival.
    #[test]
    fn test_burst_yields_single_call_with_last_event(
        burst in proptest::collection::vec((0..DELAY_MS, kind_strategy()), 1..20),
    ) {
        let rt = paused_runtime();
        let (calls, last_offset, last_kind) = rt.block_on(async {
            let recorder = CallbackRecorder::new();
            let log = Arc::new(RecordingLog::new());
            let mut debouncer = Debouncer::new(ms(DELAY_MS), recorder.shared(), log);
            let start = Instant::now();

            let mut last_kind = ChangeKind::Other;
            for (gap, kind) in &burst {
                sleep(ms(*gap)).await;
                debouncer.push(RawEvent::new("/p", *kind));
                last_kind = *kind;
            }
            let last_offset = Instant::now() - start;

            sleep(ms(DELAY_MS * 3)).await;
            let calls: Vec<_> = recorder
                .calls()
                .into_iter()
                .map(|d| (d.event, d.at - start))
                .collect();
            (calls, last_offset, last_kind)
        });

        prop_assert_eq!(calls.len(), 1);
        prop_assert_eq!(&calls[0].0, &RawEvent::new("/p", last_kind));
        let fired_at = calls[0].1;
        prop_assert!(fired_at >= last_offset + ms(DELAY_MS));
        prop_assert!(fired_at <= last_offset + ms(DELAY_MS + 5));
    }

    // Every distinct path gets exactly one call, whatever the interleaving,
    // as long as the whole sequence fits inside one quiet period.
    #[test]
    fn test_one_call_per_distinct_path(
        events in proptest::collection::vec((0..8usize, 0..3u64), 1..40),
    ) {
        let rt = paused_runtime();
        let (calls, distinct) = rt.block_on(async {
            let recorder = CallbackRecorder::new();
            let log = Arc::new(RecordingLog::new());
            let mut debouncer = Debouncer::new(ms(DELAY_MS), recorder.shared(), log);

            let mut distinct = std::collections::HashSet::new();
            for (idx, gap) in &events {
                sleep(ms(*gap)).await;
                let path = format!("/dir/{idx}");
                distinct.insert(path.clone());
                debouncer.push(RawEvent::new(path, ChangeKind::Write));
            }

            sleep(ms(DELAY_MS * 3)).await;
            (recorder.calls(), distinct)
        });

        let mut fired: Vec<String> = calls
            .iter()
            .map(|d| d.event.path.display().to_string())
            .collect();
        fired.sort();
        let mut expected: Vec<String> = distinct.into_iter().collect();
        expected.sort();
        prop_assert_eq!(fired, expected);
    }
}
