use crate::api::ApiClient;
use crate::logger;
use crate::models::{ApiRequest, ApiResponse};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

/// All backend traffic funnels through one worker thread so the UI loop never
/// blocks on the network. Requests are handled one at a time, which also gives
/// the strictly-sequential ordering the session machines assume.
///
/// `playback_gen` is the shared playback generation counter: a TTS or audio
/// fetch whose generation is no longer current when it completes was aborted
/// by a newer playback and is dropped without a response.
pub fn spawn_net_worker(
    response_tx: Sender<ApiResponse>,
    request_rx: Receiver<ApiRequest>,
    playback_gen: Arc<AtomicU64>,
) -> thread::JoinHandle<()> {
    thread::Builder::new()
        .name("ulpan::net_worker".to_string())
        .spawn(move || {
            let client = ApiClient::from_env();
            let rt = tokio::runtime::Runtime::new().expect("Failed to create worker runtime");

            loop {
                match request_rx.recv() {
                    Ok(request) => {
                        let response = rt.block_on(handle(&client, request, &playback_gen));
                        if let Some(response) = response
                            && response_tx.send(response).is_err()
                        {
                            break;
                        }
                    }
                    Err(_) => {
                        logger::log("Worker channel disconnected, exiting");
                        break;
                    }
                }
            }
        })
        .expect("Failed to spawn network worker thread")
}

async fn handle(
    client: &ApiClient,
    request: ApiRequest,
    playback_gen: &AtomicU64,
) -> Option<ApiResponse> {
    match request {
        ApiRequest::FetchLesson { id } => match client.get_lesson(&id).await {
            Ok(lesson) => Some(ApiResponse::LessonLoaded {
                id,
                lesson: Box::new(lesson),
            }),
            Err(e) => {
                logger::log(&format!("Lesson fetch failed for {}: {}", id, e));
                Some(ApiResponse::LessonFailed {
                    id,
                    error: e.to_string(),
                })
            }
        },
        ApiRequest::Chat {
            message,
            history,
            lesson_id,
        } => match client.chat(&message, &history, lesson_id.as_deref()).await {
            Ok(reply) => Some(ApiResponse::ChatReply { reply }),
            Err(e) => {
                logger::log(&format!("Chat request failed: {}", e));
                Some(ApiResponse::ChatFailed {
                    error: e.to_string(),
                })
            }
        },
        ApiRequest::Synthesize {
            text,
            language,
            gender,
            playback,
        } => {
            if playback_gen.load(Ordering::SeqCst) != playback {
                // Aborted before we even started; swallowed by design of the
                // playback contract, not an error.
                return None;
            }
            let result = client.synthesize(&text, &language, gender).await;
            if playback_gen.load(Ordering::SeqCst) != playback {
                logger::log("Dropping stale TTS result");
                return None;
            }
            match result {
                Ok(bytes) => Some(ApiResponse::Audio { playback, bytes }),
                Err(e) => {
                    logger::log(&format!("TTS request failed: {}", e));
                    Some(ApiResponse::AudioFailed {
                        playback,
                        text,
                        language,
                        error: e.to_string(),
                    })
                }
            }
        }
        ApiRequest::FetchAudio { url, playback } => {
            if playback_gen.load(Ordering::SeqCst) != playback {
                return None;
            }
            let result = client.fetch_audio(&url).await;
            if playback_gen.load(Ordering::SeqCst) != playback {
                logger::log("Dropping stale audio fetch");
                return None;
            }
            match result {
                Ok(bytes) => Some(ApiResponse::Audio { playback, bytes }),
                Err(e) => {
                    logger::log(&format!("Audio fetch failed for {}: {}", url, e));
                    Some(ApiResponse::AudioFailed {
                        playback,
                        text: String::new(),
                        language: String::new(),
                        error: e.to_string(),
                    })
                }
            }
        }
        ApiRequest::FetchStats => match client.stats().await {
            Ok(stats) => Some(ApiResponse::StatsLoaded { stats }),
            Err(e) => {
                logger::log(&format!("Stats fetch failed: {}", e));
                Some(ApiResponse::StatsFailed {
                    error: e.to_string(),
                })
            }
        },
        ApiRequest::FetchReview { limit } => match client.review_queue(limit).await {
            Ok(items) => Some(ApiResponse::ReviewQueue { items }),
            Err(e) => {
                logger::log(&format!("Review queue fetch failed: {}", e));
                Some(ApiResponse::ReviewQueueFailed {
                    error: e.to_string(),
                })
            }
        },
        ApiRequest::SubmitQuality {
            word_id,
            quality,
            outbox_id,
        } => match client.submit_quality(&word_id, quality).await {
            Ok(()) => Some(ApiResponse::QualitySubmitted { word_id, outbox_id }),
            Err(e) => {
                logger::log(&format!(
                    "Quality submission failed for {} (quality {}): {}",
                    word_id, quality, e
                ));
                Some(ApiResponse::QualityFailed {
                    word_id,
                    quality,
                    outbox_id,
                    error: e.to_string(),
                })
            }
        },
    }
}
