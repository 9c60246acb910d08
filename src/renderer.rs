//! Background frame renderer.
//!
//! Frames are handed to a worker thread through a single-slot mailbox:
//! submitting a frame replaces any frame still waiting, and cancels the
//! frame currently being processed. Only the newest frame is ever worth
//! rendering, so nothing queues up behind a slow frame.
//!
//! Finished frames come back on a channel with room for one frame. If the
//! consumer has not taken the previous frame by the time a newer one is
//! waiting in the mailbox, the finished frame is dropped as stale.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::controls::Controls;
use crate::engine::FrameProcessor;
use crate::error::EngineError;
use crate::frame::FrameBuffer;

/// How long a finished frame waits for room in the output channel before
/// checking again.
const DELIVERY_RETRY: Duration = Duration::from_millis(5);

/// Counters describing what happened to submitted frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames submitted
    pub submitted: u64,
    /// Frames processed and delivered
    pub rendered: u64,
    /// Frames replaced, cancelled or left undelivered because a newer one arrived
    pub dropped: u64,
    /// Frames that failed to process
    pub failed: u64,
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    rendered: AtomicU64,
    dropped: AtomicU64,
    failed: AtomicU64,
}

#[derive(Default)]
struct Slot {
    pending: Option<FrameBuffer>,
    /// Cancel flag of the frame being processed, if any
    in_flight: Option<Arc<AtomicBool>>,
    stopped: bool,
}

#[derive(Default)]
struct Mailbox {
    slot: Mutex<Slot>,
    ready: Condvar,
    counters: Counters,
}

impl Mailbox {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Block until a frame is waiting or the renderer stops.
    fn take(&self) -> Option<(FrameBuffer, Arc<AtomicBool>)> {
        let mut slot = self.lock();
        loop {
            if slot.stopped {
                return None;
            }
            if let Some(frame) = slot.pending.take() {
                let cancel = Arc::new(AtomicBool::new(false));
                slot.in_flight = Some(Arc::clone(&cancel));
                return Some((frame, cancel));
            }
            slot = self.ready.wait(slot).unwrap_or_else(|e| e.into_inner());
        }
    }

    fn finish(&self) {
        self.lock().in_flight = None;
    }
}

/// Renders submitted frames on a background thread using the current
/// [`Controls`] snapshot for each frame.
pub struct FrameRenderer {
    mailbox: Arc<Mailbox>,
    worker: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for FrameRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameRenderer")
            .field("stats", &self.stats())
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl FrameRenderer {
    /// Start the worker thread. Rendered frames arrive on the returned receiver.
    pub fn start(controls: Arc<Controls>) -> (Self, Receiver<FrameBuffer>) {
        let mailbox = Arc::new(Mailbox::default());
        let (tx, rx) = mpsc::sync_channel(1);

        let worker_mailbox = Arc::clone(&mailbox);
        let handle = thread::spawn(move || run_render_loop(controls, worker_mailbox, tx));

        (
            Self {
                mailbox,
                worker: Some(handle),
            },
            rx,
        )
    }

    /// Hand a frame to the worker, replacing any frame still waiting and
    /// cancelling the one in progress.
    pub fn submit(&self, frame: FrameBuffer) {
        let counters = &self.mailbox.counters;
        counters.submitted.fetch_add(1, Ordering::Relaxed);

        let mut slot = self.mailbox.lock();
        if slot.stopped {
            counters.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }
        if slot.pending.replace(frame).is_some() {
            counters.dropped.fetch_add(1, Ordering::Relaxed);
            log::debug!("Dropped stale pending frame");
        }
        if let Some(cancel) = &slot.in_flight {
            cancel.store(true, Ordering::Relaxed);
        }
        drop(slot);
        self.mailbox.ready.notify_one();
    }

    /// Current counters.
    pub fn stats(&self) -> RenderStats {
        let c = &self.mailbox.counters;
        RenderStats {
            submitted: c.submitted.load(Ordering::Relaxed),
            rendered: c.rendered.load(Ordering::Relaxed),
            dropped: c.dropped.load(Ordering::Relaxed),
            failed: c.failed.load(Ordering::Relaxed),
        }
    }

    /// Check if the worker thread is still running.
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the worker and wait for it to exit. Any waiting frame is discarded.
    pub fn stop(&mut self) {
        {
            let mut slot = self.mailbox.lock();
            slot.stopped = true;
            if slot.pending.take().is_some() {
                self.mailbox.counters.dropped.fetch_add(1, Ordering::Relaxed);
            }
            if let Some(cancel) = &slot.in_flight {
                cancel.store(true, Ordering::Relaxed);
            }
        }
        self.mailbox.ready.notify_all();

        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for FrameRenderer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_render_loop(controls: Arc<Controls>, mailbox: Arc<Mailbox>, tx: SyncSender<FrameBuffer>) {
    let mut processor = FrameProcessor::new();
    let counters = &mailbox.counters;

    while let Some((mut frame, cancel)) = mailbox.take() {
        let snapshot = controls.snapshot();
        let result = processor.process_cancellable(
            &mut frame,
            &snapshot.options,
            &snapshot.threshold_map,
            &cancel,
        );
        mailbox.finish();

        match result {
            Ok(()) => {
                if !deliver(&mailbox, &tx, frame) {
                    break;
                }
            }
            Err(EngineError::Cancelled) => {
                counters.dropped.fetch_add(1, Ordering::Relaxed);
                log::debug!("Cancelled in-flight frame for a newer one");
            }
            Err(e) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                log::error!("Failed to process frame: {}", e);
            }
        }
    }
}

/// Send a finished frame, giving up if a newer frame is already waiting.
/// Returns false once the receiver is gone or the renderer stopped.
fn deliver(mailbox: &Mailbox, tx: &SyncSender<FrameBuffer>, frame: FrameBuffer) -> bool {
    let counters = &mailbox.counters;
    let mut frame = frame;

    loop {
        match tx.try_send(frame) {
            Ok(()) => {
                counters.rendered.fetch_add(1, Ordering::Relaxed);
                return true;
            }
            Err(TrySendError::Full(returned)) => {
                let slot = mailbox.lock();
                if slot.stopped {
                    counters.dropped.fetch_add(1, Ordering::Relaxed);
                    return false;
                }
                if slot.pending.is_some() {
                    counters.dropped.fetch_add(1, Ordering::Relaxed);
                    log::debug!("Consumer busy, dropped finished frame");
                    return true;
                }
                frame = returned;
                // Submit and stop notify; the timeout catches the consumer draining the channel
                let _ = mailbox
                    .ready
                    .wait_timeout(slot, DELIVERY_RETRY)
                    .unwrap_or_else(|e| e.into_inner());
            }
            Err(TrySendError::Disconnected(_)) => {
                counters.dropped.fetch_add(1, Ordering::Relaxed);
                log::debug!("Frame receiver closed, stopping renderer");
                return false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::PixelFormat;
    use crate::options::Options;
    use crate::palette::PalettePreset;

    fn controls() -> Arc<Controls> {
        let options = Options {
            pixel_size: 1,
            dither: false,
            palette: PalettePreset::BlackAndWhite.palette(),
            ..Options::default()
        };
        Arc::new(Controls::new(options).unwrap())
    }

    #[test]
    fn test_renders_submitted_frame() {
        let (mut renderer, rx) = FrameRenderer::start(controls());
        let frame = FrameBuffer::new(vec![200; 12], 2, 2, PixelFormat::Rgb).unwrap();
        renderer.submit(frame);

        let out = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(out.data.iter().all(|&b| b == 255));

        renderer.stop();
        assert!(!renderer.is_running());
        let stats = renderer.stats();
        assert_eq!(stats.submitted, 1);
        assert_eq!(stats.rendered, 1);
    }

    #[test]
    fn test_malformed_frame_counted_as_failed() {
        let (mut renderer, rx) = FrameRenderer::start(controls());
        renderer.submit(FrameBuffer {
            data: vec![0; 5],
            width: 2,
            height: 2,
            format: PixelFormat::Rgb,
        });
        renderer.submit(FrameBuffer::blank(1, 1, PixelFormat::Rgb));

        // The valid frame still comes through
        let out = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!((out.width, out.height), (1, 1));
        drop(rx);
        renderer.stop();

        let stats = renderer.stats();
        assert_eq!(stats.rendered, 1);
        assert_eq!(stats.rendered + stats.dropped + stats.failed, stats.submitted);
    }

    fn wait_for(renderer: &FrameRenderer, done: impl Fn(RenderStats) -> bool) -> RenderStats {
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        loop {
            let stats = renderer.stats();
            if done(stats) || std::time::Instant::now() > deadline {
                return stats;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_busy_consumer_newer_frame_replaces_finished_one() {
        let (mut renderer, rx) = FrameRenderer::start(controls());
        renderer.submit(FrameBuffer::new(vec![10; 3], 1, 1, PixelFormat::Rgb).unwrap());
        wait_for(&renderer, |s| s.rendered == 1);

        // Channel is full, so this one finishes and waits for room
        renderer.submit(FrameBuffer::new(vec![20; 3], 1, 1, PixelFormat::Rgb).unwrap());
        thread::sleep(Duration::from_millis(50));
        renderer.submit(FrameBuffer::new(vec![240; 3], 1, 1, PixelFormat::Rgb).unwrap());
        let stats = wait_for(&renderer, |s| s.dropped == 1);
        assert_eq!(stats.dropped, 1);

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap().data, vec![0; 3]);
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap().data, vec![255; 3]);

        renderer.stop();
        let stats = renderer.stats();
        assert_eq!(stats.rendered, 2);
        assert_eq!(stats.rendered + stats.dropped, stats.submitted);
    }

    #[test]
    fn test_stop_wakes_waiting_delivery() {
        let (mut renderer, _rx) = FrameRenderer::start(controls());
        renderer.submit(FrameBuffer::blank(1, 1, PixelFormat::Rgb));
        wait_for(&renderer, |s| s.rendered == 1);
        renderer.submit(FrameBuffer::blank(1, 1, PixelFormat::Rgb));
        thread::sleep(Duration::from_millis(50));

        let started = std::time::Instant::now();
        renderer.stop();
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(!renderer.is_running());

        let stats = renderer.stats();
        assert_eq!(stats.rendered, 1);
        assert_eq!(stats.dropped, 1);
    }

    #[test]
    fn test_submit_after_stop_is_dropped() {
        let (mut renderer, _rx) = FrameRenderer::start(controls());
        renderer.stop();
        renderer.submit(FrameBuffer::blank(1, 1, PixelFormat::Rgb));
        assert_eq!(renderer.stats().dropped, 1);
    }
}
