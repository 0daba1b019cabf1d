//! End-to-end video SJT generation.

use derive_builder::Builder;
use derive_getters::Getters;
use sjt_agents::{
    Director, GenerationTools, LlmDirector, RunContext, SequentialDirector, SwarmOrchestrator,
};
use sjt_config::{ApiSection, DirectorKind, SjtConfig};
use sjt_core::{CharacterSeed, RunMeta, RunOutput, Situation};
use sjt_error::{SjtResult, ValidationError};
use sjt_interface::{Muxer, NarrationOutcome, Narrator, TextDriver, ToolUse, VideoRenderer};
use sjt_media::{
    ArtifactFinalizer, AvMerger, CharacterStore, FfmpegMuxer, FinalizeRequest, MergeOptions,
};
use sjt_models::OpenAiChatClient;
use sjt_render::{HailuoClient, NarrationSynthesizer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// One video SJT to generate.
///
/// # Examples
///
/// ```
/// use sjt::{Situation, VideoSjtRequest};
///
/// let request = VideoSjtRequest::builder()
///     .situation(Situation::from_stem("A classmate questions your plan.", Default::default()))
///     .trait_label("N4")
///     .out_basename(Some("SJT_N4_1".to_string()))
///     .build()
///     .unwrap();
///
/// assert_eq!(request.trait_label(), "N4");
/// assert!(request.outdir().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Builder, Getters)]
#[builder(setter(into))]
pub struct VideoSjtRequest {
    /// Situation record; its text drives generation and narration
    situation: Situation,
    /// Trait the stimulus should activate
    trait_label: String,
    /// Optional character seed JSON
    #[builder(default)]
    character_seed_json: Option<String>,
    /// Directory for the final clip; the run directory when absent
    #[builder(default)]
    outdir: Option<PathBuf>,
    /// Final file name without extension
    #[builder(default)]
    out_basename: Option<String>,
    /// Director override for this run
    #[builder(default)]
    director: Option<DirectorKind>,
}

impl VideoSjtRequest {
    /// Create a new builder.
    pub fn builder() -> VideoSjtRequestBuilder {
        VideoSjtRequestBuilder::default()
    }
}

/// Runs the agent roles, the video job, narration, merge and finalization
/// strictly in sequence.
pub struct VideoSjtPipeline {
    config: SjtConfig,
    text_model: Arc<dyn TextDriver>,
    tool_model: Option<Arc<dyn ToolUse>>,
    renderer: Arc<dyn VideoRenderer>,
    narrator: Arc<dyn Narrator>,
    merger: AvMerger,
    finalizer: ArtifactFinalizer,
    characters: CharacterStore,
}

impl VideoSjtPipeline {
    /// Pipeline over explicit collaborators.
    ///
    /// Without [`VideoSjtPipeline::with_tool_model`] only the sequential
    /// director is available.
    pub fn new(
        config: SjtConfig,
        text_model: Arc<dyn TextDriver>,
        renderer: Arc<dyn VideoRenderer>,
        narrator: Arc<dyn Narrator>,
        muxer: Arc<dyn Muxer>,
    ) -> Self {
        let characters = CharacterStore::new(config.storage.character_file.clone());
        Self {
            config,
            text_model,
            tool_model: None,
            renderer,
            narrator,
            merger: AvMerger::new(muxer),
            finalizer: ArtifactFinalizer::new(),
            characters,
        }
    }

    /// Tool-calling model for the LLM director.
    pub fn with_tool_model(mut self, tool_model: Arc<dyn ToolUse>) -> Self {
        self.tool_model = Some(tool_model);
        self
    }

    /// Pipeline with the OpenAI-compatible chat client, the Hailuo job
    /// client, the speech client and ffmpeg, as configured.
    ///
    /// # Errors
    ///
    /// Returns an error if any API key is missing.
    pub fn from_config(config: SjtConfig) -> SjtResult<Self> {
        let chat = Arc::new(OpenAiChatClient::from_config(
            &config.llm,
            config.api_key(ApiSection::Llm)?,
        ));
        let renderer = Arc::new(HailuoClient::new(
            &config.video,
            config.api_key(ApiSection::Video)?,
            config.storage.output_root.clone(),
        ));
        let narrator = Arc::new(NarrationSynthesizer::new(
            &config.narration,
            config.api_key(ApiSection::Narration)?,
        ));
        let muxer = Arc::new(FfmpegMuxer::from_config(&config.merge));

        Ok(Self::new(config, chat.clone(), renderer, narrator, muxer).with_tool_model(chat))
    }

    /// Configuration in use.
    pub fn config(&self) -> &SjtConfig {
        &self.config
    }

    fn orchestrator(&self, kind: DirectorKind) -> SjtResult<SwarmOrchestrator> {
        let director: Arc<dyn Director> = match kind {
            DirectorKind::Sequential => Arc::new(SequentialDirector::new()),
            DirectorKind::Llm => {
                let tool_model = self.tool_model.clone().ok_or_else(|| {
                    ValidationError::new("The llm director needs a tool-calling model")
                })?;
                Arc::new(
                    LlmDirector::new(tool_model)
                        .with_temperature(Some(self.config.llm.temperature)),
                )
            }
        };
        let tools = GenerationTools::new(self.text_model.clone(), self.characters.clone())
            .with_temperature(Some(self.config.llm.temperature));
        Ok(SwarmOrchestrator::new(
            tools,
            director,
            self.config.orchestrator.max_turns,
        ))
    }

    /// Generate one narrated clip.
    ///
    /// # Errors
    ///
    /// Fails on missing situation text, when no video prompt can be produced,
    /// on any video job failure, and when no clip is left to finalize.
    /// Narration failures and cleanup problems are logged and tolerated.
    #[instrument(skip_all, fields(trait_label = %request.trait_label))]
    pub async fn run(&self, request: &VideoSjtRequest) -> SjtResult<RunOutput> {
        let text = request.situation.narrative_text()?;

        let character =
            CharacterSeed::from_json_or_default(request.character_seed_json.as_deref());
        self.characters.save(&character)?;

        let kind = request.director.unwrap_or(self.config.orchestrator.director);
        let swarm = self.orchestrator(kind)?;
        let context =
            RunContext::new(text.clone(), character).with_trait_label(&request.trait_label);
        let run = swarm.run(context).await?;
        if let Err(e) = run.transcript.save(&self.config.storage.transcript_dir) {
            warn!(error = %e, "Failed to save transcript");
        }

        let prompt = run.video_prompt()?.clone();
        info!(source = %prompt.source, chars = prompt.text.chars().count(), "Video prompt ready");

        let rendered = self.renderer.render(&prompt.text, &request.trait_label).await?;
        info!(path = %rendered.path.display(), task_id = %rendered.task_id, "Clip rendered");

        let target_seconds = self
            .config
            .narration
            .target_seconds
            .or(Some(self.config.video.duration));
        let narration = self
            .narrator
            .narrate(&text, &rendered.dir, target_seconds, None)
            .await;
        if let NarrationOutcome::NoAudio { reason } = &narration {
            warn!(%reason, "Continuing without narration");
        }

        let env_name = rendered
            .dir
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "env".to_string());
        let report = self
            .merger
            .merge(
                &rendered.dir,
                &rendered.dir,
                &rendered.dir,
                &MergeOptions::first_pair(env_name.clone()),
            )
            .await?;
        let merge_basename = if report.merged.is_empty() {
            warn!(
                failures = report.failures.len(),
                "No merged clip; finalizing the rendered clip"
            );
            None
        } else {
            Some(env_name)
        };

        let finalized = self.finalizer.finalize(&FinalizeRequest {
            work_dir: rendered.dir.clone(),
            target_dir: request.outdir.clone(),
            merge_basename,
            out_basename: request.out_basename.clone(),
        })?;
        for warning in &finalized.cleanup.warnings {
            warn!(path = %warning.path.display(), message = %warning.message, "Cleanup warning");
        }
        info!(path = %finalized.path.display(), "Video SJT ready");

        Ok(RunOutput {
            video_path: finalized.path,
            options: request.situation.options.clone(),
            meta: RunMeta {
                trait_label: request.trait_label.clone(),
                prompts: prompt.text,
                text,
            },
        })
    }
}
