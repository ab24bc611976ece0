mod common;

use common::{answer, events, Script, ScriptedTransport, Step};
use paperqa_chat::{ChatError, ChatHandle, ChatSession, ChatUpdate};
use paperqa_llm::ProtocolEvent;
use paperqa_types::Session;

/// Sends one delta, then stalls
fn stalled() -> Script {
    let mut steps = events(&[ProtocolEvent::content("par")]);
    steps.push(Step::Hang);
    Script::Stream(steps)
}

fn handle(scripts: impl IntoIterator<Item = Script>) -> ChatHandle {
    let transport = ScriptedTransport::new(scripts);
    ChatHandle::new(ChatSession::new(Session::new("paper-1"), transport))
}

#[tokio::test]
async fn test_updates_arrive_in_order() {
    let handle = handle([answer(&["Hel", "lo"], &["p.2"])]);

    let mut updates = handle.submit("greet").unwrap();
    let mut received = Vec::new();
    while let Some(update) = updates.recv().await {
        received.push(update);
    }

    assert_eq!(received.len(), 4);
    assert!(matches!(&received[0], ChatUpdate::Sources(s) if s == &["p.2".to_string()]));
    assert!(matches!(&received[1], ChatUpdate::Content(c) if c == "Hel"));
    assert!(matches!(&received[2], ChatUpdate::Content(c) if c == "lo"));
    match &received[3] {
        ChatUpdate::Finished(Ok(answer)) => assert_eq!(answer.content, "Hello"),
        other => panic!("unexpected update: {other:?}"),
    }

    let transcript = handle.transcript().await;
    assert_eq!(transcript.len(), 2);
    assert!(!handle.is_busy());
}

#[tokio::test]
async fn test_second_submit_is_busy() {
    let handle = handle([stalled()]);

    let mut updates = handle.submit("first").unwrap();
    assert!(matches!(updates.recv().await, Some(ChatUpdate::Content(_))));
    assert!(handle.is_busy());
    assert!(matches!(handle.submit("second"), Err(ChatError::Busy)));

    updates.cancel();
    let outcome = updates.outcome().await;
    assert!(matches!(outcome, Err(ChatError::Cancelled)));

    let transcript = handle.transcript().await;
    assert_eq!(transcript.len(), 1);
    assert!(!transcript.is_streaming());
}

#[tokio::test]
async fn test_dropped_receiver_cancels() {
    let handle = handle([stalled(), answer(&["ok"], &[])]);

    let mut updates = handle.submit("abandoned").unwrap();
    assert!(matches!(updates.recv().await, Some(ChatUpdate::Content(_))));
    drop(updates);

    // Waits for the background task to release the session
    let transcript = handle.transcript().await;
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript.last().unwrap().content(), "abandoned");

    let answer = handle.submit("again").unwrap().outcome().await.unwrap();
    assert_eq!(answer.content, "ok");
    assert_eq!(handle.transcript().await.len(), 3);
}

#[tokio::test]
async fn test_pending_snapshot_does_not_block_submit() {
    let handle = handle([stalled(), answer(&["fine"], &[])]);

    let mut first = handle.submit("first").unwrap();
    assert!(matches!(first.recv().await, Some(ChatUpdate::Content(_))));

    // Queue a snapshot behind the running exchange; it is handed the session
    // as soon as the exchange lets go of it
    let snapshot = tokio::spawn({
        let handle = handle.clone();
        async move { handle.transcript().await }
    });
    tokio::task::yield_now().await;

    first.cancel();
    assert!(first.outcome().await.unwrap_err().is_cancelled());
    assert!(!handle.is_busy());

    let answer = handle.submit("second").unwrap().outcome().await.unwrap();
    assert_eq!(answer.content, "fine");

    assert_eq!(snapshot.await.unwrap().len(), 1);
    assert_eq!(handle.transcript().await.len(), 3);
}

#[tokio::test]
async fn test_failure_is_reported_as_final_update() {
    let handle = handle([Script::Refuse("down for maintenance".to_string())]);

    let err = handle.submit("q").unwrap().outcome().await.unwrap_err();

    assert!(matches!(err, ChatError::Transport(_)));
    assert_eq!(handle.transcript().await.len(), 1);
}

#[tokio::test]
async fn test_cancel_before_start_leaves_transcript_untouched() {
    let handle = handle([stalled()]);

    let updates = handle.submit("never sent").unwrap();
    updates.cancel();

    assert!(updates.outcome().await.unwrap_err().is_cancelled());
    assert!(handle.transcript().await.is_empty());
}

#[tokio::test]
async fn test_blank_submit_rejected() {
    let handle = handle([]);
    assert!(matches!(handle.submit("  "), Err(ChatError::EmptyQuestion)));
    assert!(!handle.is_busy());
}
