//! Audio playback for the pet's voice and the speaking flag that drives the
//! mouth.

use crate::errors::Result;
use crate::pet::audio::clip_duration;
use crate::pet::{PetEvent, StateStore};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Somewhere decoded samples can be played.
///
/// `play` resolves once the clip has finished.
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Acquire the output resource ahead of the first clip
    async fn warm_up(&self) -> Result<()> {
        Ok(())
    }

    async fn play(&self, samples: Vec<f32>, sample_rate: u32) -> Result<()>;
}

/// Sink without a device: holds the speaking window for the clip's real
/// duration so the mouth animates in time with the words.
#[derive(Debug, Default, Clone, Copy)]
pub struct PacedSink;

#[async_trait]
impl AudioSink for PacedSink {
    async fn play(&self, samples: Vec<f32>, sample_rate: u32) -> Result<()> {
        tokio::time::sleep(clip_duration(samples.len(), sample_rate)).await;
        Ok(())
    }
}

/// Clears `speaking` when playback ends, however it ends.
struct SpeakingGuard<'a> {
    store: &'a StateStore,
}

impl<'a> SpeakingGuard<'a> {
    fn start(store: &'a StateStore) -> Self {
        store.set_speaking(true);
        store.emit(PetEvent::SpeakingStarted);
        Self { store }
    }
}

impl Drop for SpeakingGuard<'_> {
    fn drop(&mut self) {
        self.store.update(|s| {
            s.speaking = false;
            s.mouth_open = false;
            true
        });
        self.store.emit(PetEvent::SpeakingEnded);
    }
}

/// Owns the audio output and reports speaking state through the store
pub struct PlaybackController {
    sink: Arc<dyn AudioSink>,
    store: StateStore,
}

impl PlaybackController {
    pub fn new(sink: Arc<dyn AudioSink>, store: StateStore) -> Self {
        Self { sink, store }
    }

    /// Make sure the output resource exists. Failure is logged, not fatal.
    pub async fn warm_up(&self) {
        if let Err(e) = self.sink.warm_up().await {
            warn!("Audio output unavailable: {}", e);
        }
    }

    /// Play a clip to completion. Returns whether any audio was played.
    pub async fn play(&self, samples: Vec<f32>, sample_rate: u32) -> bool {
        if samples.is_empty() {
            debug!("Nothing to play");
            return false;
        }

        debug!(
            "Playing {} samples ({:?})",
            samples.len(),
            clip_duration(samples.len(), sample_rate)
        );

        let _speaking = SpeakingGuard::start(&self.store);
        match self.sink.play(samples, sample_rate).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Playback failed: {}", e);
                false
            }
        }
    }
}

#[cfg(feature = "speaker")]
pub use speaker::SpeakerSink;

#[cfg(feature = "speaker")]
mod speaker {
    //! Playback on the default output device. `rodio::OutputStream` is not
    //! `Send`, so it lives on its own thread for the rest of the process.

    use super::AudioSink;
    use crate::errors::{PetError, Result};
    use async_trait::async_trait;
    use rodio::buffer::SamplesBuffer;
    use rodio::{OutputStream, Sink};
    use std::sync::mpsc;
    use std::thread;
    use tokio::sync::{oneshot, Mutex};
    use tracing::info;

    struct PlayRequest {
        samples: Vec<f32>,
        sample_rate: u32,
        done: oneshot::Sender<Result<()>>,
    }

    /// Speaker output, acquired on first use and then reused
    #[derive(Default)]
    pub struct SpeakerSink {
        commands: Mutex<Option<mpsc::Sender<PlayRequest>>>,
    }

    impl SpeakerSink {
        pub fn new() -> Self {
            Self::default()
        }

        /// Start the audio thread once; concurrent callers wait on the same start-up
        async fn acquire(&self) -> Result<mpsc::Sender<PlayRequest>> {
            let mut slot = self.commands.lock().await;
            if let Some(tx) = slot.as_ref() {
                return Ok(tx.clone());
            }

            let (tx, rx) = mpsc::channel::<PlayRequest>();
            let (init_tx, init_rx) = oneshot::channel::<Result<()>>();

            thread::Builder::new()
                .name("mood-pet-audio".into())
                .spawn(move || run(&rx, init_tx))
                .map_err(|e| PetError::playback(format!("failed to spawn audio thread: {e}")))?;

            init_rx
                .await
                .map_err(|_| PetError::playback("audio thread died during start-up"))??;

            *slot = Some(tx.clone());
            Ok(tx)
        }

        async fn forget(&self) {
            *self.commands.lock().await = None;
        }

        /// Whether the audio thread is running
        pub async fn is_acquired(&self) -> bool {
            self.commands.lock().await.is_some()
        }
    }

    fn run(rx: &mpsc::Receiver<PlayRequest>, init_tx: oneshot::Sender<Result<()>>) {
        let (_stream, handle) = match OutputStream::try_default() {
            Ok(output) => output,
            Err(e) => {
                let _ = init_tx.send(Err(PetError::playback(e.to_string())));
                return;
            }
        };
        if init_tx.send(Ok(())).is_err() {
            return;
        }
        info!("Audio output acquired on default device");

        while let Ok(request) = rx.recv() {
            let result = Sink::try_new(&handle)
                .map_err(|e| PetError::playback(e.to_string()))
                .map(|sink| {
                    sink.append(SamplesBuffer::new(1, request.sample_rate, request.samples));
                    sink.sleep_until_end();
                });
            let _ = request.done.send(result);
        }
    }

    #[async_trait]
    impl AudioSink for SpeakerSink {
        async fn warm_up(&self) -> Result<()> {
            self.acquire().await.map(|_| ())
        }

        async fn play(&self, samples: Vec<f32>, sample_rate: u32) -> Result<()> {
            let tx = self.acquire().await?;
            let (done, finished) = oneshot::channel();
            if tx
                .send(PlayRequest {
                    samples,
                    sample_rate,
                    done,
                })
                .is_err()
            {
                self.forget().await;
                return Err(PetError::playback("audio thread is gone"));
            }

            finished
                .await
                .map_err(|_| PetError::playback("audio thread dropped the clip"))?
        }
    }

}
