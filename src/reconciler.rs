//! Notification reconciliation — the core state machine of a run.
//!
//! The channel only offers "list everything delivered so far", so every
//! cycle re-reads the full history and replays it against the registry.
//! Correctness against duplicates, replays and unknown ids rests on one
//! guard: a job that already reached a terminal state never changes again,
//! so the first conclusive envelope processed for a job wins.
//!
//! Per cycle: fetch → parse each item (bad items are skipped) → apply each
//! envelope (terminal/unknown ids are skipped) → render → stop when every
//! job is terminal or the wall-clock ceiling is exceeded → sleep.

use std::time::{Duration, Instant};

use tokio::time::sleep;

use crate::channel::{ChannelClient, Inbox};
use crate::gallery::GalleryStore;
use crate::kie::{CallbackEnvelope, ResultPayload};
use crate::registry::{JobState, Registry};
use crate::ui::RunProgress;

/// A parsed notification, reduced to what the registry needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub job_id: String,
    pub state: EnvelopeState,
    /// Result location, when the envelope carried one.
    pub result_url: Option<String>,
    /// Provider message, used as the failure reason.
    pub message: Option<String>,
}

/// The provider's state vocabulary mapped to ours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Success,
    Fail,
    /// Progress pings and anything else inconclusive.
    Other,
}

/// What applying an envelope did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Job transitioned to SUCCEEDED; the caller should fire the gallery save.
    Succeeded,
    /// Job transitioned to FAILED.
    Failed,
    /// Unknown id or already-terminal job; nothing changed.
    Skipped,
    /// Success without an extractable URL, or a non-conclusive state;
    /// the job stays PENDING.
    Inconclusive,
}

/// How the poll loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every job reached a terminal state.
    Complete,
    /// The ceiling elapsed with jobs still pending; partial results stand.
    TimedOut,
}

/// Timing knobs for the poll loop.
#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Fixed delay between poll cycles.
    pub interval: Duration,
    /// Wall-clock ceiling for the whole run.
    pub ceiling: Duration,
}

/// Parse one raw notification body into an [`Envelope`].
///
/// Returns `None` for anything that does not look like a provider
/// callback — per-item parse failures must never abort the loop, so there
/// is no error to propagate.
pub fn parse_envelope(content: &str) -> Option<Envelope> {
    let raw: CallbackEnvelope = serde_json::from_str(content).ok()?;

    let state = match raw.data.state.as_deref() {
        Some("success") => EnvelopeState::Success,
        Some("fail") => EnvelopeState::Fail,
        _ => EnvelopeState::Other,
    };

    Some(Envelope {
        job_id: raw.data.task_id.clone(),
        state,
        result_url: extract_result_url(&raw),
        message: raw.msg,
    })
}

/// Two-path result extraction: a direct `resultUrls` list wins; otherwise
/// the nested `resultJson` string is parsed and its first URL taken.
fn extract_result_url(raw: &CallbackEnvelope) -> Option<String> {
    if let Some(urls) = &raw.data.result_urls
        && let Some(first) = urls.first()
    {
        return Some(first.clone());
    }

    let nested = raw.data.result_json.as_deref()?;
    let payload: ResultPayload = serde_json::from_str(nested).ok()?;
    payload.result_urls.first().cloned()
}

/// Apply one envelope to the registry.
///
/// The terminal-state guard lives here: envelopes for unknown ids or for
/// jobs already terminal are skipped, which makes replayed and duplicated
/// deliveries harmless.
pub fn apply_envelope(registry: &mut Registry, envelope: &Envelope) -> Applied {
    let Some(job) = registry.get_mut(&envelope.job_id) else {
        return Applied::Skipped;
    };
    if job.state.is_terminal() {
        return Applied::Skipped;
    }

    match envelope.state {
        EnvelopeState::Success => match &envelope.result_url {
            Some(url) => {
                job.state = JobState::Succeeded {
                    result_url: url.clone(),
                };
                Applied::Succeeded
            }
            // A success without a locatable result is not conclusive yet.
            None => Applied::Inconclusive,
        },
        EnvelopeState::Fail => {
            job.state = JobState::Failed {
                reason: envelope
                    .message
                    .clone()
                    .unwrap_or_else(|| "provider reported failure".to_string()),
            };
            Applied::Failed
        }
        EnvelopeState::Other => Applied::Inconclusive,
    }
}

/// Drain the channel until every job is terminal or the ceiling fires.
///
/// Transient fetch errors count as empty cycles. Gallery saves are fired
/// on each success transition; a failed save is reported through the
/// progress surface and the job stays SUCCEEDED.
pub async fn reconcile_until_done<G: GalleryStore>(
    channel: &ChannelClient,
    inbox: &Inbox,
    registry: &mut Registry,
    gallery: Option<&G>,
    prompt: &str,
    settings: &PollSettings,
    progress: &RunProgress,
) -> RunOutcome {
    let started = Instant::now();

    loop {
        match channel.poll(inbox).await {
            Ok(items) => {
                for item in items {
                    let Some(content) = item.content.as_deref() else {
                        continue;
                    };
                    let Some(envelope) = parse_envelope(content) else {
                        continue;
                    };

                    if apply_envelope(registry, &envelope) == Applied::Succeeded {
                        save_to_gallery(registry, gallery, &envelope, prompt, progress).await;
                    }
                }
            }
            Err(e) => {
                // Empty cycle; the relay is best-effort.
                progress.note(&format!("channel fetch failed, will retry: {e}"));
            }
        }

        progress.render(registry);

        if registry.all_terminal() {
            return RunOutcome::Complete;
        }
        if started.elapsed() >= settings.ceiling {
            return RunOutcome::TimedOut;
        }

        sleep(settings.interval).await;
    }
}

async fn save_to_gallery<G: GalleryStore>(
    registry: &Registry,
    gallery: Option<&G>,
    envelope: &Envelope,
    prompt: &str,
    progress: &RunProgress,
) {
    let Some(store) = gallery else { return };
    let Some(job) = registry.get(&envelope.job_id) else {
        return;
    };
    let JobState::Succeeded { result_url } = &job.state else {
        return;
    };

    if let Err(e) = store.save(result_url, prompt, &job.provider_label).await {
        progress.note(&format!(
            "gallery save failed for {}: {e}",
            job.provider_label
        ));
    }
}
