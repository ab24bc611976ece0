use anyhow::Result;
use paperqa_chat::{Answer, ChatError, ChatSession, StreamEnd};
use paperqa_llm::ProtocolEvent;
use paperqa_markup::normalize;
use std::future::Future;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// How one question ended
#[derive(Debug)]
pub enum Turn {
    Answered(Answer),
    Failed(ChatError),
    Interrupted,
}

/// Line-oriented prompt over a chat session
pub struct Repl {
    chat: ChatSession,
    render_math: bool,
}

impl Repl {
    pub fn new(chat: ChatSession) -> Self {
        Self {
            chat,
            render_math: false,
        }
    }

    pub fn with_render_math(mut self, render_math: bool) -> Self {
        self.render_math = render_math;
        self
    }

    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    /// Read questions from stdin until EOF, `/quit`, or Ctrl-C at the prompt.
    /// Ctrl-C while an answer streams cancels only that answer.
    pub async fn run(&mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = std::io::stdout();

        loop {
            write!(stdout, "> ")?;
            stdout.flush()?;

            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = ctrl_c() => None,
            };
            let Some(line) = line else {
                writeln!(stdout)?;
                break;
            };

            match line.trim() {
                "" => continue,
                "/quit" | "/exit" => break,
                question => {
                    self.ask(question, &mut stdout, ctrl_c()).await?;
                }
            }
        }

        tracing::info!(messages = self.chat.transcript().len(), "Leaving prompt");
        Ok(())
    }

    /// Stream one answer into `out`. Resolving `interrupt` cancels the answer and
    /// leaves only the question in the transcript.
    pub async fn ask<W, F>(&mut self, question: &str, out: &mut W, interrupt: F) -> Result<Turn>
    where
        W: Write,
        F: Future<Output = ()>,
    {
        tokio::pin!(interrupt);

        let begun = tokio::select! {
            biased;
            _ = &mut interrupt => None,
            begun = self.chat.begin(question) => Some(begun),
        };
        let mut exchange = match begun {
            None => {
                writeln!(out, "[cancelled]")?;
                return Ok(Turn::Interrupted);
            }
            Some(Err(e)) => return report_failure(e, out),
            Some(Ok(exchange)) => exchange,
        };

        loop {
            let next = tokio::select! {
                biased;
                _ = &mut interrupt => None,
                next = exchange.next_event() => Some(next),
            };

            match next {
                None => {
                    exchange.cancel();
                    writeln!(out, "\n[cancelled]")?;
                    return Ok(Turn::Interrupted);
                }
                Some(Ok(Some(ProtocolEvent::ContentDelta { content }))) => {
                    write!(out, "{}", content)?;
                    out.flush()?;
                }
                Some(Ok(Some(_))) => {}
                Some(Ok(None)) => break,
                Some(Err(e)) => {
                    writeln!(out)?;
                    return report_failure(e, out);
                }
            }
        }

        let answer = match exchange.finish().await {
            Ok(answer) => answer,
            Err(e) => return report_failure(e, out),
        };

        writeln!(out)?;
        if !answer.sources.is_empty() {
            writeln!(out, "\nSources: {}", answer.sources.join(", "))?;
        }
        if answer.end == StreamEnd::EndOfData {
            writeln!(out, "[answer may be incomplete]")?;
        }
        if self.render_math {
            let rendered = normalize(&answer.content);
            if rendered != answer.content {
                writeln!(out, "\n{}", rendered)?;
            }
        }

        Ok(Turn::Answered(answer))
    }
}

fn report_failure<W: Write>(error: ChatError, out: &mut W) -> Result<Turn> {
    writeln!(out, "error: {}", error)?;
    Ok(Turn::Failed(error))
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
