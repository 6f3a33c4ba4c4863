use console_core::log::shared_buffer;
use console_core::mocks::{MockControl, MockStream, ScriptedReply};
use console_core::{
    CommandDispatcher, CommandOutcome, ConnectionManager, ConnectionState, LogCategory,
    SharedLogBuffer, StreamEvent,
};

fn messages(logs: &SharedLogBuffer) -> Vec<String> {
    logs.lock()
        .unwrap()
        .entries()
        .iter()
        .map(|e| e.message.clone())
        .collect()
}

/// The canonical session: connect, two frames, normal close.
#[tokio::test]
async fn session_log_matches_arrival_order() {
    let (stream, events_tx, _closed) = MockStream::new();
    let logs = shared_buffer();
    let mut manager = ConnectionManager::new(stream, "ws://host/ws/logs", logs.clone());

    let mut events = manager.connect().await.expect("stream should open");
    for event in [
        StreamEvent::Opened,
        StreamEvent::Frame("hello".into()),
        StreamEvent::Frame("world".into()),
        StreamEvent::Closed,
    ] {
        events_tx.send(event).await.unwrap();
    }
    drop(events_tx);

    while let Some(event) = events.recv().await {
        manager.handle_stream_event(event).await;
    }

    let msgs = messages(&logs);
    assert_eq!(msgs.len(), 5);
    assert!(msgs[0].contains("Connecting"));
    assert!(msgs[1].contains("established"));
    assert_eq!(msgs[2], "hello");
    assert_eq!(msgs[3], "world");
    assert!(msgs[4].contains("closed"));
    assert_eq!(manager.state(), ConnectionState::Disconnected);

    // Raw frames classify as data, local annotations as info.
    let buffer = logs.lock().unwrap();
    assert_eq!(buffer.entries()[2].category(), LogCategory::Data);
    assert_eq!(buffer.entries()[0].category(), LogCategory::Info);
    assert!(buffer
        .entries()
        .windows(2)
        .all(|w| w[0].timestamp <= w[1].timestamp));
}

/// Every route into Disconnected produces exactly one closed entry, even
/// when the closure was preceded by a stream error.
#[tokio::test]
async fn exactly_one_closed_entry_per_disconnect() {
    let (stream, events_tx, _closed) = MockStream::new();
    let logs = shared_buffer();
    let mut manager = ConnectionManager::new(stream, "ws://host/ws/logs", logs.clone());

    manager.connect().await.unwrap();
    manager.handle_stream_event(StreamEvent::Opened).await;
    manager
        .handle_stream_event(StreamEvent::Error("abnormal closure".into()))
        .await;
    manager.handle_stream_event(StreamEvent::Closed).await;
    drop(events_tx);

    assert_eq!(manager.state(), ConnectionState::Disconnected);
    let closed_entries = messages(&logs)
        .iter()
        .filter(|m| m.contains("Connection to WebSocket closed"))
        .count();
    assert_eq!(closed_entries, 1);
}

#[tokio::test]
async fn reconnect_after_close_starts_a_fresh_log() {
    let (stream, events_tx, _closed) = MockStream::new();
    let logs = shared_buffer();
    let mut manager = ConnectionManager::new(stream, "ws://host/ws/logs", logs.clone());

    manager.connect().await.unwrap();
    manager.handle_stream_event(StreamEvent::Opened).await;
    manager
        .handle_stream_event(StreamEvent::Frame("old session line".into()))
        .await;
    manager.handle_stream_event(StreamEvent::Closed).await;
    drop(events_tx);

    // The mock refuses a second open; the manager absorbs that as a
    // failed attempt rather than raising it.
    let second = manager.connect().await;
    assert!(second.is_none());
    assert_eq!(manager.state(), ConnectionState::Disconnected);

    let msgs = messages(&logs);
    assert!(!msgs.iter().any(|m| m == "old session line"));
    assert!(msgs[0].contains("Connecting"));
}

#[tokio::test]
async fn disconnect_while_disconnected_does_not_panic_or_close() {
    let (stream, _events_tx, closed) = MockStream::new();
    let logs = shared_buffer();
    let mut manager = ConnectionManager::new(stream, "ws://host/ws/logs", logs.clone());

    manager.disconnect().await;

    assert_eq!(manager.state(), ConnectionState::Disconnecting);
    assert!(!closed.load(std::sync::atomic::Ordering::SeqCst));
}

/// The control channel is transport independent: a start request goes
/// out even though the stream never connected.
#[tokio::test]
async fn start_while_stream_disconnected_still_posts() {
    let control = MockControl::new(vec![ScriptedReply::Respond(true, "started".into())]);
    let logs = shared_buffer();
    let dispatcher = CommandDispatcher::new(control, logs.clone());

    let outcome = dispatcher.start().await;

    assert_eq!(outcome, CommandOutcome::Accepted("started".into()));
    let msgs = messages(&logs);
    assert!(msgs.last().unwrap().contains("[OK]:"));
    assert!(msgs.last().unwrap().contains("started"));
}

#[tokio::test]
async fn stop_rejection_keeps_body_as_detail() {
    let control = MockControl::new(vec![ScriptedReply::Respond(
        false,
        "process not running".into(),
    )]);
    let logs = shared_buffer();
    let dispatcher = CommandDispatcher::new(control, logs.clone());

    let outcome = dispatcher.stop().await;

    assert_eq!(outcome, CommandOutcome::Rejected("process not running".into()));
    let last = messages(&logs).pop().unwrap();
    assert!(last.contains("[ERR]:"));
    assert!(last.contains("process not running"));
}

#[tokio::test]
async fn blank_command_never_reaches_the_wire() {
    let control = MockControl::new(vec![]);
    let logs = shared_buffer();
    let dispatcher = CommandDispatcher::new(control, logs.clone());

    assert_eq!(dispatcher.send_command("").await, CommandOutcome::SkippedEmpty);
    assert_eq!(
        dispatcher.send_command("   ").await,
        CommandOutcome::SkippedEmpty
    );
    assert!(logs.lock().unwrap().is_empty());
}

/// Dispatcher results interleave with stream frames in the order they
/// actually arrive, sharing one buffer without losing entries.
#[tokio::test]
async fn dispatcher_and_stream_share_the_buffer_in_event_order() {
    let (stream, events_tx, _closed) = MockStream::new();
    let logs = shared_buffer();
    let mut manager = ConnectionManager::new(stream, "ws://host/ws/logs", logs.clone());
    let control = MockControl::new(vec![ScriptedReply::Respond(true, "ack".into())]);
    let dispatcher = CommandDispatcher::new(control, logs.clone());

    manager.connect().await.unwrap();
    manager.handle_stream_event(StreamEvent::Opened).await;
    manager
        .handle_stream_event(StreamEvent::Frame("frame before".into()))
        .await;

    let outcome = dispatcher.send_command("whoami").await;
    assert_eq!(outcome, CommandOutcome::Accepted("ack".into()));

    manager
        .handle_stream_event(StreamEvent::Frame("frame after".into()))
        .await;
    drop(events_tx);

    let msgs = messages(&logs);
    let frame_before = msgs.iter().position(|m| m == "frame before").unwrap();
    let cmd = msgs.iter().position(|m| m.starts_with("[CMD]:")).unwrap();
    let ok = msgs.iter().position(|m| m.starts_with("[OK]:")).unwrap();
    let frame_after = msgs.iter().position(|m| m == "frame after").unwrap();
    assert!(frame_before < cmd && cmd < ok && ok < frame_after);
}
