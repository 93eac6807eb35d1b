use crate::gender::{Gender, GenderedText, resolve};
use crate::logger;
use crate::models::ApiRequest;
use std::io::Cursor;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("audio device unavailable: {0}")]
    Device(String),
    #[error("undecodable audio payload: {0}")]
    Decode(String),
}

/// Where decoded audio ends up. Split out so the cancellation contract is
/// testable without a sound card.
pub trait PlaybackSink {
    fn play(&mut self, bytes: Vec<u8>) -> Result<(), AudioError>;
    fn stop(&mut self);
}

pub struct RodioSink {
    _stream: rodio::OutputStream,
    handle: rodio::OutputStreamHandle,
    sink: Option<rodio::Sink>,
}

impl RodioSink {
    pub fn new() -> Result<RodioSink, AudioError> {
        let (stream, handle) =
            rodio::OutputStream::try_default().map_err(|e| AudioError::Device(e.to_string()))?;
        Ok(RodioSink {
            _stream: stream,
            handle,
            sink: None,
        })
    }
}

impl PlaybackSink for RodioSink {
    fn play(&mut self, bytes: Vec<u8>) -> Result<(), AudioError> {
        self.stop();
        let source = rodio::Decoder::new(Cursor::new(bytes))
            .map_err(|e| AudioError::Decode(e.to_string()))?;
        let sink =
            rodio::Sink::try_new(&self.handle).map_err(|e| AudioError::Device(e.to_string()))?;
        sink.append(source);
        sink.play();
        self.sink = Some(sink);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }
}

/// One playback context: at most one active stream, one in-flight fetch.
///
/// Starting a new playback bumps the shared generation counter, which both
/// invalidates the previous in-flight fetch (the worker checks it) and stops
/// whatever is currently sounding. Stale fetches complete silently; an abort
/// is never an error.
pub struct AudioPlayer {
    sink: Option<Box<dyn PlaybackSink>>,
    request_tx: Sender<ApiRequest>,
    generation: Arc<AtomicU64>,
    pub language: String,
}

impl AudioPlayer {
    pub fn new(request_tx: Sender<ApiRequest>, generation: Arc<AtomicU64>) -> AudioPlayer {
        let sink: Option<Box<dyn PlaybackSink>> = match RodioSink::new() {
            Ok(sink) => Some(Box::new(sink)),
            Err(e) => {
                logger::log(&format!("Audio output unavailable: {}", e));
                None
            }
        };
        AudioPlayer {
            sink,
            request_tx,
            generation,
            language: "he".to_string(),
        }
    }

    pub fn with_sink(
        sink: Box<dyn PlaybackSink>,
        request_tx: Sender<ApiRequest>,
        generation: Arc<AtomicU64>,
    ) -> AudioPlayer {
        AudioPlayer {
            sink: Some(sink),
            request_tx,
            generation,
            language: "he".to_string(),
        }
    }

    /// Begin playback for the learner's gender. Resolves the text, aborts any
    /// prior in-flight fetch, stops the current stream and issues the new
    /// request. Returns the playback generation, which stays current until
    /// the next `begin`.
    pub fn begin(&mut self, text: &GenderedText, gender: Gender, audio_url: Option<&str>) -> u64 {
        let playback = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(sink) = &mut self.sink {
            sink.stop();
        }
        let request = match audio_url {
            Some(url) => ApiRequest::FetchAudio {
                url: url.to_string(),
                playback,
            },
            None => ApiRequest::Synthesize {
                text: resolve(text, gender).to_string(),
                language: self.language.clone(),
                gender,
                playback,
            },
        };
        self.request_tx.send(request).ok();
        playback
    }

    pub fn is_current(&self, playback: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == playback
    }

    /// Fetched bytes arrived from the worker. Stale generations are dropped.
    pub fn play_fetched(&mut self, playback: u64, bytes: Vec<u8>) {
        if !self.is_current(playback) {
            return;
        }
        if let Some(sink) = &mut self.sink
            && let Err(e) = sink.play(bytes)
        {
            logger::log(&format!("Playback failed: {}", e));
        }
    }

    /// The TTS endpoint failed; degrade to a local synthesizer when one is
    /// installed, otherwise skip playback. Neither path surfaces an error to
    /// the learner.
    pub fn fallback(&mut self, playback: u64, text: &str, language: &str) {
        if !self.is_current(playback) || text.is_empty() {
            return;
        }
        logger::log("TTS unavailable, trying local speech synthesis");
        if !speak_with_system(text, language) {
            logger::log("No local speech synthesizer found, skipping playback");
        }
    }

    pub fn stop(&mut self) {
        if let Some(sink) = &mut self.sink {
            sink.stop();
        }
    }
}

/// Spawn a platform speech synthesizer without waiting for it.
fn speak_with_system(text: &str, language: &str) -> bool {
    let candidates: &[(&str, Vec<&str>)] = if cfg!(target_os = "macos") {
        &[("say", vec![text])]
    } else {
        &[
            ("espeak-ng", vec!["-v", language, text]),
            ("espeak", vec!["-v", language, text]),
        ]
    };

    for (program, args) in candidates {
        let spawned = Command::new(program)
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        if spawned.is_ok() {
            return true;
        }
    }
    false
}
