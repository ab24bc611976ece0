#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use paperqa_llm::{AskRequest, AskTransport, ByteStream, ProtocolEvent};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// One step of a scripted answer stream
#[derive(Debug, Clone)]
pub enum Step {
    Chunk(Vec<u8>),
    /// Mid-stream transport error
    Fail(String),
    /// Never yield again
    Hang,
}

/// What one `open` call does
#[derive(Debug, Clone)]
pub enum Script {
    Stream(Vec<Step>),
    Refuse(String),
    /// `open` itself never resolves
    HangOpen,
}

/// In-memory transport replaying one script per request
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<AskRequest>>,
    stream_dropped: Arc<AtomicBool>,
}

impl ScriptedTransport {
    pub fn new(scripts: impl IntoIterator<Item = Script>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into_iter().collect()),
            ..Default::default()
        })
    }

    pub fn requests(&self) -> Vec<AskRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Whether the last opened stream has been dropped by the reader
    pub fn stream_dropped(&self) -> bool {
        self.stream_dropped.load(Ordering::SeqCst)
    }
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl AskTransport for ScriptedTransport {
    async fn open(&self, request: AskRequest) -> Result<ByteStream> {
        self.requests.lock().unwrap().push(request);
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Script::Refuse("no script left".to_string()));

        let steps = match script {
            Script::Stream(steps) => steps,
            Script::Refuse(message) => anyhow::bail!("Paper API error (503): {}", message),
            Script::HangOpen => {
                futures::future::pending::<()>().await;
                unreachable!()
            }
        };

        self.stream_dropped.store(false, Ordering::SeqCst);
        let flag = DropFlag(Arc::clone(&self.stream_dropped));

        Ok(Box::pin(async_stream::stream! {
            let _flag = flag;
            for step in steps {
                match step {
                    Step::Chunk(bytes) => {
                        yield Ok(bytes);
                    }
                    Step::Fail(message) => {
                        yield Err(anyhow::anyhow!(message));
                        return;
                    }
                    Step::Hang => {
                        futures::future::pending::<()>().await;
                    }
                }
            }
        }))
    }
}

pub fn chunk(text: &str) -> Step {
    Step::Chunk(text.as_bytes().to_vec())
}

/// One chunk per event, framed the way the server sends them
pub fn events(events: &[ProtocolEvent]) -> Vec<Step> {
    events
        .iter()
        .map(|event| chunk(&event.to_data_line().unwrap()))
        .collect()
}

pub fn answer(deltas: &[&str], sources: &[&str]) -> Script {
    let mut all = vec![ProtocolEvent::sources(sources.iter().copied())];
    all.extend(deltas.iter().map(|d| ProtocolEvent::content(*d)));
    all.push(ProtocolEvent::Completion);
    Script::Stream(events(&all))
}
