//! Stream sessions: infinite, strided, timed playback of one animation.
//!
//! A session runs `Init -> Streaming -> {Closed, Error}`. Frames are composed
//! by a producer task that paces itself with the interval and hands each
//! emission to the session over a one-slot channel, so a slow consumer only
//! ever stalls its own producer. The session owns the writer. Whatever ends
//! the stream (a failed write, cancellation, or a producer fault) the
//! producer is aborted and the teardown is written exactly once.

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use ascii_video_core::ansi::{preamble, teardown};
use ascii_video_core::{Animation, SessionId, SessionStatus, StreamParams};

use crate::emission::tick;
use crate::selection::Selection;

/// Upper bound on writing the teardown to a consumer that stopped reading.
const TEARDOWN_TIMEOUT: Duration = Duration::from_millis(500);

/// Summary of a finished session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    /// Session ID
    pub id: SessionId,
    /// Final state, `Closed` or `Error`
    pub status: SessionStatus,
    /// Frames fully written
    pub frames_sent: u64,
    /// Completed passes over the selection
    pub loops: u64,
}

/// Why streaming stopped.
#[derive(Debug)]
enum Stop {
    Cancelled,
    Disconnected(io::Error),
    Fault,
}

/// Aborts the producer when the session scope ends, however it ends.
struct ProducerGuard(JoinHandle<()>);

impl Drop for ProducerGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// One client's playback of an animation.
#[derive(Debug)]
pub struct StreamSession {
    id: SessionId,
    animation: Arc<Animation>,
    params: StreamParams,
    selection: Selection,
    status: SessionStatus,
}

impl StreamSession {
    /// Create a session over a shared animation.
    pub fn new(animation: Arc<Animation>, params: StreamParams) -> Self {
        let selection = Selection::new(animation.len(), params.stride());
        Self {
            id: SessionId::new(),
            animation,
            params,
            selection,
            status: SessionStatus::Init,
        }
    }

    /// Get session ID.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Get session status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Frames this session plays.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Animation being played.
    pub fn animation(&self) -> &Arc<Animation> {
        &self.animation
    }

    fn set_status(&mut self, status: SessionStatus) {
        debug!(session = %self.id, from = ?self.status, to = ?status, "Session state change");
        self.status = status;
    }

    /// Stream until `cancelled` resolves or the writer fails.
    ///
    /// Never returns an error: every way out ends in `Closed` or `Error`
    /// after the teardown has been written once.
    pub async fn run<W, C>(mut self, mut writer: W, cancelled: C) -> SessionReport
    where
        W: AsyncWrite + Unpin,
        C: Future<Output = ()>,
    {
        tokio::pin!(cancelled);
        info!(
            session = %self.id,
            animation = %self.animation.name(),
            interval = self.params.interval(),
            stride = %self.params.stride(),
            "Stream started"
        );

        let mut frames_sent = 0u64;
        let opening = preamble();
        let started = tokio::select! {
            biased;
            res = write_chunk(&mut writer, opening.as_bytes()) => res.map_err(Stop::Disconnected),
            _ = cancelled.as_mut() => Err(Stop::Cancelled),
        };
        let stop = match started {
            Err(stop) => stop,
            Ok(()) => {
                self.set_status(SessionStatus::Streaming);
                self.stream(&mut writer, cancelled.as_mut(), &mut frames_sent)
                    .await
            }
        };

        let status = match &stop {
            Stop::Cancelled => {
                debug!(session = %self.id, "Stream cancelled");
                SessionStatus::Closed
            }
            Stop::Disconnected(e) => {
                debug!(session = %self.id, error = %e, "Client went away");
                SessionStatus::Closed
            }
            Stop::Fault => {
                error!(session = %self.id, "Frame producer stopped unexpectedly");
                SessionStatus::Error
            }
        };
        self.set_status(status);

        let closing = teardown();
        let cleanup = write_chunk(&mut writer, closing.as_bytes());
        match tokio::time::timeout(TEARDOWN_TIMEOUT, cleanup).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(session = %self.id, error = %e, "Teardown not delivered"),
            Err(_) => debug!(session = %self.id, "Teardown timed out"),
        }

        let selected = self.selection.len().max(1) as u64;
        let report = SessionReport {
            id: self.id,
            status,
            frames_sent,
            loops: frames_sent / selected,
        };
        info!(
            session = %report.id,
            status = ?report.status,
            frames = report.frames_sent,
            "Stream ended"
        );
        report
    }

    /// The streaming loop; returns why it stopped.
    async fn stream<W, C>(
        &self,
        writer: &mut W,
        mut cancelled: std::pin::Pin<&mut C>,
        frames_sent: &mut u64,
    ) -> Stop
    where
        W: AsyncWrite + Unpin,
        C: Future<Output = ()>,
    {
        let (tx, mut rx) = mpsc::channel::<String>(1);
        let _producer = ProducerGuard(tokio::spawn(produce(
            Arc::clone(&self.animation),
            self.selection.clone(),
            self.params,
            tx,
        )));

        loop {
            let text = tokio::select! {
                biased;
                _ = &mut cancelled => return Stop::Cancelled,
                msg = rx.recv() => match msg {
                    Some(text) => text,
                    None => return Stop::Fault,
                },
            };

            tokio::select! {
                biased;
                _ = &mut cancelled => return Stop::Cancelled,
                res = write_chunk(&mut *writer, text.as_bytes()) => {
                    if let Err(e) = res {
                        return Stop::Disconnected(e);
                    }
                }
            }
            *frames_sent += 1;
        }
    }
}

/// Compose ticks forever, sleeping one interval after each.
///
/// Ends only when the receiving session is gone.
async fn produce(
    animation: Arc<Animation>,
    selection: Selection,
    params: StreamParams,
    tx: mpsc::Sender<String>,
) {
    let interval = params.interval_duration();
    let mut position = 0usize;

    loop {
        let Some(frame_index) = selection.frame_at(position) else {
            return;
        };
        let text = tick(&animation, frame_index, position, selection.len(), &params);
        if tx.send(text).await.is_err() {
            return;
        }
        position = selection.next(position);
        tokio::time::sleep(interval).await;
    }
}

async fn write_chunk<W: AsyncWrite + Unpin>(writer: &mut W, bytes: &[u8]) -> io::Result<()> {
    writer.write_all(bytes).await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use ascii_video_core::ansi::FULL_CLEAR;
    use ascii_video_core::{Dimensions, RenderedFrame};
    use std::pin::Pin;
    use std::sync::Mutex;
    use std::task::{Context, Poll};

    fn animation(name: &str, count: usize) -> Arc<Animation> {
        let frames = (0..count)
            .map(|i| RenderedFrame::new(format!("<{i}>"), Dimensions::new(1, 3)))
            .collect();
        Arc::new(Animation::new(name, frames).unwrap())
    }

    /// Accepts `budget` writes, then fails every write; records every attempt.
    #[derive(Clone)]
    struct FailingWriter {
        budget: usize,
        attempts: Arc<Mutex<Vec<Vec<u8>>>>,
    }

    impl FailingWriter {
        fn new(budget: usize) -> Self {
            Self {
                budget,
                attempts: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl AsyncWrite for FailingWriter {
        fn poll_write(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            self.attempts.lock().unwrap().push(buf.to_vec());
            if self.budget == 0 {
                return Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone")));
            }
            self.budget -= 1;
            Poll::Ready(Ok(buf.len()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    /// Never accepts a byte.
    struct StalledWriter;

    impl AsyncWrite for StalledWriter {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Pending
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Pending
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Pending
        }
    }

    fn frame_bodies(output: &str) -> Vec<String> {
        output
            .split(FULL_CLEAR)
            .skip(1)
            .filter_map(|chunk| chunk.split('\n').next().map(str::to_string))
            .collect()
    }

    #[tokio::test]
    async fn test_cancel_writes_preamble_frames_then_one_teardown() {
        let mut out: Vec<u8> = Vec::new();
        let session = StreamSession::new(animation("demo", 3), StreamParams::new(0.01, 1));
        assert_eq!(session.status(), SessionStatus::Init);

        let report = session
            .run(&mut out, tokio::time::sleep(Duration::from_millis(80)))
            .await;

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(&preamble()));
        assert!(text.ends_with(&teardown()));
        assert_eq!(text.matches(&teardown()).count(), 1);
        assert_eq!(text.matches(&preamble()).count(), 1);
        assert_eq!(report.status, SessionStatus::Closed);
        assert!(report.frames_sent >= 1);
        assert_eq!(frame_bodies(&text).len() as u64, report.frames_sent);
    }

    #[tokio::test]
    async fn test_stride_order_and_wrap() {
        let mut out: Vec<u8> = Vec::new();
        let session = StreamSession::new(animation("ten", 10), StreamParams::new(0.01, 2));
        assert_eq!(session.selection().indices(), &[0, 2, 4, 6, 8]);

        let report = session
            .run(&mut out, tokio::time::sleep(Duration::from_millis(150)))
            .await;
        let text = String::from_utf8(out).unwrap();
        let bodies = frame_bodies(&text);

        assert!(bodies.len() >= 6, "only {} frames", bodies.len());
        for (k, body) in bodies.iter().enumerate() {
            assert_eq!(body, &format!("<{}>", (k * 2) % 10));
        }
        assert!(text.contains("Animation 'ten' #1/5"));
        assert!(text.contains("Stride: 2 | Total frames: 10"));
        assert!(report.loops >= 1);
    }

    #[tokio::test]
    async fn test_disconnect_stops_stream_with_single_teardown() {
        let writer = FailingWriter::new(3);
        let attempts = Arc::clone(&writer.attempts);
        let session = StreamSession::new(animation("demo", 4), StreamParams::new(0.01, 1));

        let report = tokio::time::timeout(
            Duration::from_secs(2),
            session.run(writer, std::future::pending::<()>()),
        )
        .await
        .expect("session must end on its own after a failed write");

        assert_eq!(report.status, SessionStatus::Closed);
        assert_eq!(report.frames_sent, 2);

        let attempts = attempts.lock().unwrap();
        // preamble, two frames, the failed frame, teardown
        assert_eq!(attempts.len(), 5);
        assert_eq!(attempts.last().unwrap(), teardown().as_bytes());
        let teardowns = attempts
            .iter()
            .filter(|a| a.as_slice() == teardown().as_bytes())
            .count();
        assert_eq!(teardowns, 1);
    }

    #[tokio::test]
    async fn test_cancel_during_interval_is_prompt() {
        let mut out: Vec<u8> = Vec::new();
        let session = StreamSession::new(animation("slow", 2), StreamParams::new(10.0, 1));

        let started = std::time::Instant::now();
        let report = session
            .run(&mut out, tokio::time::sleep(Duration::from_millis(50)))
            .await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(report.frames_sent, 1);
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with(&teardown()));
    }

    #[tokio::test]
    async fn test_stalled_consumer_does_not_block_other_sessions() {
        let anim = animation("shared", 3);
        let stalled = StreamSession::new(Arc::clone(&anim), StreamParams::new(0.01, 1));
        let healthy = StreamSession::new(anim, StreamParams::new(0.01, 1));

        let stalled = tokio::spawn(
            stalled.run(StalledWriter, tokio::time::sleep(Duration::from_millis(100))),
        );

        let mut out: Vec<u8> = Vec::new();
        let report = healthy
            .run(&mut out, tokio::time::sleep(Duration::from_millis(80)))
            .await;
        assert!(report.frames_sent >= 3);

        let stalled = stalled.await.unwrap();
        assert_eq!(stalled.status, SessionStatus::Closed);
        assert_eq!(stalled.frames_sent, 0);
    }

    #[tokio::test]
    async fn test_single_frame_loop() {
        let mut out: Vec<u8> = Vec::new();
        let session = StreamSession::new(animation("one", 3), StreamParams::new(0.01, 50));
        session
            .run(&mut out, tokio::time::sleep(Duration::from_millis(60)))
            .await;

        let text = String::from_utf8(out).unwrap();
        assert!(frame_bodies(&text).iter().all(|b| b == "<0>"));
        assert!(text.contains("#1/1"));
    }
}
