use std::path::PathBuf;
use std::time::Duration;

use uuid::Uuid;

use crate::channel::ChannelClient;
use crate::error::SketchrenderError;
use crate::gallery::SheetGallery;
use crate::kie::{CreateTaskRequest, KieClient};
use crate::providers::{GenerationRequest, MediaKind, Provider};
use crate::reconciler::{self, PollSettings, RunOutcome};
use crate::registry::{Job, Registry};
use crate::ui::RunProgress;
use crate::upload::{self, UploadedAsset};

/// Timing knobs resolved from configuration.
#[derive(Debug, Clone)]
pub struct RunTiming {
    pub poll_interval: Duration,
    /// Ceiling for runs containing only image jobs.
    pub image_ceiling: Duration,
    /// Ceiling when any dispatched job produces video.
    pub video_ceiling: Duration,
}

/// Final accounting for one generation run.
#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub outcome: RunOutcome,
    pub succeeded: usize,
    pub failed: usize,
    pub pending: usize,
    /// Images that never uploaded; their submissions were skipped.
    pub upload_failures: Vec<String>,
    /// (provider, image) combinations whose submission was rejected.
    pub submission_failures: Vec<String>,
}

/// Drives one generation run end to end: upload sketches, provision the
/// notification inbox, dispatch one job per (provider, sketch) combination,
/// then reconcile notifications until every job is terminal or the ceiling
/// fires.
///
/// All collaborators are explicit constructor inputs — there is no ambient
/// credential or endpoint lookup below this point.
pub struct RunOrchestrator {
    kie: KieClient,
    channel: ChannelClient,
    gallery: Option<SheetGallery>,
    timing: RunTiming,
    quiet: bool,
}

impl RunOrchestrator {
    pub fn new(
        kie: KieClient,
        channel: ChannelClient,
        gallery: Option<SheetGallery>,
        timing: RunTiming,
    ) -> Self {
        Self {
            kie,
            channel,
            gallery,
            timing,
            quiet: false,
        }
    }

    /// Suppress terminal progress output for this run.
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Execute a full run. Only two conditions abort it: failing to
    /// provision an inbox, and ending dispatch with zero jobs. Everything
    /// else degrades to partial results.
    pub async fn run(
        &self,
        image_paths: &[PathBuf],
        request: &GenerationRequest,
    ) -> Result<RunReport, SketchrenderError> {
        let run_id = Uuid::new_v4();

        // Upload phase: one failure skips that image, not its siblings.
        let mut assets: Vec<UploadedAsset> = Vec::new();
        let mut upload_failures: Vec<String> = Vec::new();
        for path in image_paths {
            match upload::upload_sketch(&self.kie, path).await {
                Ok(asset) => assets.push(asset),
                Err(e) => upload_failures.push(e.to_string()),
            }
        }

        // No inbox, no run.
        let inbox = self
            .channel
            .provision()
            .await
            .map_err(SketchrenderError::ChannelProvision)?;

        let mut registry = Registry::new();
        let mut submission_failures: Vec<String> = Vec::new();
        self.dispatch(
            request,
            &assets,
            &inbox.url,
            &mut registry,
            &mut submission_failures,
        )
        .await;

        if registry.is_empty() {
            // Nothing to poll; hand every accumulated reason back with
            // the error instead of dropping them with the run.
            let failures = upload_failures
                .into_iter()
                .chain(submission_failures)
                .collect();
            return Err(SketchrenderError::NoJobsStarted { failures });
        }

        let settings = PollSettings {
            interval: self.timing.poll_interval,
            ceiling: self.ceiling_for(&request.providers),
        };

        let progress = if self.quiet {
            RunProgress::hidden(&registry)
        } else {
            RunProgress::start(&registry)
        };
        for failure in upload_failures.iter().chain(&submission_failures) {
            progress.note(failure);
        }

        let outcome = reconciler::reconcile_until_done(
            &self.channel,
            &inbox,
            &mut registry,
            self.gallery.as_ref(),
            &request.prompt,
            &settings,
            &progress,
        )
        .await;

        progress.finish(&registry, outcome);

        let (succeeded, failed, pending) = registry.tally();
        Ok(RunReport {
            run_id,
            outcome,
            succeeded,
            failed,
            pending,
            upload_failures,
            submission_failures,
        })
    }

    /// Submit one task per (provider, sketch) combination — text-only
    /// providers get a single task. A rejected submission is recorded and
    /// never blocks the remaining combinations.
    async fn dispatch(
        &self,
        request: &GenerationRequest,
        assets: &[UploadedAsset],
        inbox_url: &str,
        registry: &mut Registry,
        failures: &mut Vec<String>,
    ) {
        for provider in &request.providers {
            if provider.takes_image_input() {
                for (index, asset) in assets.iter().enumerate() {
                    let label = provider.label(Some(index));
                    self.submit_one(provider, request, Some(&asset.url), label, inbox_url, registry, failures)
                        .await;
                }
            } else {
                let label = provider.label(None);
                self.submit_one(provider, request, None, label, inbox_url, registry, failures)
                    .await;
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn submit_one(
        &self,
        provider: &Provider,
        request: &GenerationRequest,
        image_url: Option<&str>,
        label: String,
        inbox_url: &str,
        registry: &mut Registry,
        failures: &mut Vec<String>,
    ) {
        let task = CreateTaskRequest {
            model: provider.model_id().to_string(),
            callback_url: inbox_url.to_string(),
            input: provider.build_input(request, image_url),
        };

        match self.kie.create_task(&task).await {
            Ok(job_id) => registry.insert(Job::new(job_id, label)),
            Err(source) => {
                failures.push(
                    SketchrenderError::Submission { label, source }.to_string(),
                );
            }
        }
    }

    fn ceiling_for(&self, providers: &[Provider]) -> Duration {
        let has_video = providers
            .iter()
            .any(|p| p.media_kind() == MediaKind::Video);
        if has_video {
            self.timing.video_ceiling
        } else {
            self.timing.image_ceiling
        }
    }
}
