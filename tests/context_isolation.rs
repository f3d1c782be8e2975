use std::collections::HashMap;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use logrecorder::{
    ChannelSink, ContextId, Dispatcher, Event, JsonLinesSink, Level, MemorySink, RecorderConfig,
};

#[test]
fn flush_contains_only_the_triggering_threads_events() {
    let sink = Arc::new(MemorySink::new());
    let recorder = Arc::new(Dispatcher::new(RecorderConfig::default(), Arc::clone(&sink)).unwrap());

    recorder.log(Level::Debug, "1").unwrap();

    let workers: Vec<_> = (0..10)
        .map(|_| {
            let recorder = Arc::clone(&recorder);
            thread::spawn(move || {
                for _ in 0..10 {
                    recorder.log(Level::Info, "2").unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    recorder.log(Level::Error, "3").unwrap();

    assert_eq!(sink.payloads(), vec!["1", "3"]);
    assert_eq!(recorder.context_count(), 11);
}

#[test]
fn concurrent_contexts_flush_their_own_history_in_order() {
    const CONTEXTS: usize = 32;
    const ROUNDS: usize = 20;

    let sink = Arc::new(MemorySink::new());
    let recorder = Dispatcher::new(RecorderConfig::default().with_max_size(4), Arc::clone(&sink)).unwrap();
    let barrier = Barrier::new(CONTEXTS);

    thread::scope(|s| {
        for n in 0..CONTEXTS {
            let recorder = &recorder;
            let barrier = &barrier;
            s.spawn(move || {
                let ctx = ContextId::from_name(&format!("task-{n}"));
                barrier.wait();
                for round in 0..ROUNDS {
                    recorder.log_in(ctx, Level::Debug, (n, round, 0)).unwrap();
                    recorder.log_in(ctx, Level::Info, (n, round, 1)).unwrap();
                    recorder.log_in(ctx, Level::Error, (n, round, 2)).unwrap();
                }
            });
        }
    });

    let mut per_context: HashMap<ContextId, Vec<(usize, usize, usize)>> = HashMap::new();
    for event in sink.take() {
        per_context
            .entry(event.context())
            .or_default()
            .push(event.into_payload());
    }

    assert_eq!(per_context.len(), CONTEXTS);
    for (ctx, payloads) in per_context {
        let n = payloads[0].0;
        assert_eq!(ctx, ContextId::from_name(&format!("task-{n}")));
        let expected: Vec<_> = (0..ROUNDS)
            .flat_map(|round| (0..3).map(move |step| (n, round, step)))
            .collect();
        assert_eq!(payloads, expected);
    }
    assert_eq!(recorder.stats().flushes, (CONTEXTS * ROUNDS) as u64);
}

#[test]
fn bounded_registry_caps_tracked_contexts() {
    let sink = Arc::new(MemorySink::new());
    let recorder =
        Dispatcher::new(RecorderConfig::default().with_max_contexts(8), Arc::clone(&sink)).unwrap();

    for n in 0..100 {
        recorder.log_in(ContextId::new(), Level::Info, n).unwrap();
    }

    assert_eq!(recorder.context_count(), 8);
    assert_eq!(recorder.stats().evicted_contexts, 92);
    assert!(sink.is_empty());
}

#[test]
fn channel_sink_feeds_a_writer_thread() {
    let (sink, rx) = ChannelSink::bounded("writer", 64);
    let recorder = Dispatcher::new(RecorderConfig::default(), sink).unwrap();

    let writer = thread::spawn(move || {
        let mut seen = Vec::new();
        while let Ok(event) = rx.recv_timeout(Duration::from_secs(5)) {
            let event: Event<String> = event;
            seen.push(event.into_payload());
            if seen.len() == 3 {
                break;
            }
        }
        seen
    });

    recorder.log(Level::Debug, "connecting".to_string()).unwrap();
    recorder.log(Level::Info, "handshake".to_string()).unwrap();
    recorder.log(Level::Error, "reset by peer".to_string()).unwrap();

    assert_eq!(writer.join().unwrap(), vec!["connecting", "handshake", "reset by peer"]);
}

#[test]
fn full_channel_reports_failures_but_empties_history() {
    let (sink, rx) = ChannelSink::bounded("tiny", 1);
    let recorder = Dispatcher::new(RecorderConfig::default(), sink).unwrap();
    let ctx = ContextId::new();

    recorder.log_in(ctx, Level::Info, 1u8).unwrap();
    recorder.log_in(ctx, Level::Info, 2u8).unwrap();
    let err = recorder.log_in(ctx, Level::Error, 3u8).unwrap_err();

    assert!(err.is_flush());
    assert_eq!(recorder.buffered_len(ctx), 0);
    assert_eq!(rx.try_recv().unwrap().into_payload(), 1);
    assert!(rx.try_recv().is_err());
}

#[test]
fn json_sink_persists_flushed_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flushed.jsonl");

    let recorder = Dispatcher::new(
        RecorderConfig::default().with_caller_data(true),
        JsonLinesSink::create(&path).unwrap(),
    )
    .unwrap();
    let ctx = ContextId::from_name("job-7");
    recorder
        .log_in(ctx, Level::Debug, serde_json::json!({"step": "fetch"}))
        .unwrap();
    recorder
        .log_in(ctx, Level::Error, serde_json::json!({"step": "store", "error": "disk full"}))
        .unwrap();

    let docs: Vec<serde_json::Value> = std::fs::read_to_string(&path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0]["level"], "DEBUG");
    assert_eq!(docs[0]["payload"]["step"], "fetch");
    assert_eq!(docs[1]["payload"]["error"], "disk full");
    assert_eq!(docs[1]["context"], ctx.to_string());
    assert!(docs[1]["caller"]["file"]
        .as_str()
        .unwrap()
        .ends_with("context_isolation.rs"));
}

#[test]
fn json_file_only_grows_on_trigger() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("batches.jsonl");
    let recorder = Dispatcher::new(RecorderConfig::default(), JsonLinesSink::create(&path).unwrap()).unwrap();
    let ctx = ContextId::new();
    let line_count = || std::fs::read_to_string(&path).unwrap().lines().count();

    recorder.log_in(ctx, Level::Info, "warming up").unwrap();
    assert_eq!(line_count(), 0);

    recorder.log_in(ctx, Level::Error, "first failure").unwrap();
    assert_eq!(line_count(), 2);

    recorder.log_in(ctx, Level::Debug, "retrying").unwrap();
    recorder.log_in(ctx, Level::Debug, "retrying again").unwrap();
    assert_eq!(line_count(), 2);

    recorder.log_in(ctx, Level::Error, "second failure").unwrap();
    assert_eq!(line_count(), 5);
}
