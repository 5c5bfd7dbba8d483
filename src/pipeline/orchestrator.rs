use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::config::PipelineConfig;
use crate::foundation::core::Fps;
use crate::foundation::error::{SlidecastError, SlidecastResult};
use crate::media::mux::{FfmpegSegmentEncoder, SegmentEncoder, VideoSegment};
use crate::media::probe::AudioAsset;
use crate::media::sequence::PauseSpec;
use crate::narration::http::HttpServices;
use crate::narration::{ImageGenerator, SpeechSynthesizer, Translator, Voice};
use crate::pipeline::run::{PipelineRun, RunReport};
use crate::pipeline::state::{PipelineError, PipelineState, SegmentRef, Stage};
use crate::pipeline::workdir::WorkDir;
use crate::slide::composer::{IllustrationStatus, SlideComposer};
use crate::slide::model::{Slide, validate_slides};
use crate::store::fs::FsContentStore;
use crate::store::{ContentStore, TopicRecord};
use crate::title::animator::TitleAnimator;

/// External collaborators of the pipeline.
#[derive(Clone)]
pub struct Services {
    /// Text-to-speech.
    pub speech: Arc<dyn SpeechSynthesizer>,
    /// Lecture-note translation.
    pub translator: Arc<dyn Translator>,
    /// Slide illustrations.
    pub images: Arc<dyn ImageGenerator>,
    /// Where finished topics are published.
    pub store: Arc<dyn ContentStore>,
    /// Segment muxing and final assembly.
    pub encoder: Arc<dyn SegmentEncoder>,
}

impl Services {
    /// HTTP adapters, the file-backed store and the ffmpeg encoder, all from `cfg`.
    pub fn from_config(cfg: &PipelineConfig) -> SlidecastResult<Self> {
        let http = HttpServices::from_config(&cfg.narration)?;
        Ok(Self {
            speech: Arc::new(http.speech),
            translator: Arc::new(http.translator),
            images: Arc::new(http.images),
            store: Arc::new(FsContentStore::open(&cfg.store.root)?),
            encoder: Arc::new(FfmpegSegmentEncoder::new(cfg.fps()?)),
        })
    }
}

/// One mutex per topic key, so two runs for the same topic never overlap.
#[derive(Debug, Default)]
pub struct TopicLocks {
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl TopicLocks {
    /// Lock shared by every run of `topic`.
    pub fn slot(&self, topic: &str) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        slots.entry(topic.to_string()).or_default().clone()
    }
}

/// Drives one topic from slides to a published video.
pub struct Orchestrator {
    config: PipelineConfig,
    fps: Fps,
    services: Services,
    locks: TopicLocks,
}

fn at(stage: Stage, segment: Option<SegmentRef>) -> impl FnOnce(SlidecastError) -> PipelineError {
    move |e| PipelineError::new(stage, segment, e)
}

impl Orchestrator {
    /// Validate `config` and bind it to `services`.
    pub fn new(config: PipelineConfig, services: Services) -> SlidecastResult<Self> {
        config.validate()?;
        let fps = config.fps()?;
        Ok(Self {
            config,
            fps,
            services,
            locks: TopicLocks::default(),
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Store runs publish into.
    pub fn store(&self) -> &dyn ContentStore {
        self.services.store.as_ref()
    }

    /// Generate, assemble and publish the lecture video for `topic`.
    ///
    /// Blocks while another run of the same topic is in progress. Invalid input fails before
    /// any service is called or file is written.
    #[tracing::instrument(skip(self, slides), fields(slides = slides.len()))]
    pub fn run(&self, topic: &str, slides: &[Slide]) -> Result<RunReport, PipelineError> {
        let mut run = PipelineRun::new(topic, slides);
        let result = self.drive(&mut run);
        if let Err(e) = &result {
            run.fail(e.stage, e.source.to_string());
            tracing::error!(stage = %e.stage, kind = ?e.kind(), error = %e, "run failed");
        }
        result
    }

    fn drive(&self, run: &mut PipelineRun) -> Result<RunReport, PipelineError> {
        let cfg = &self.config;
        let topic = run.topic().to_string();

        run.advance(PipelineState::ValidatingInput)
            .map_err(at(Stage::Validating, None))?;
        if topic.trim().is_empty() {
            return Err(PipelineError::new(
                Stage::Validating,
                None,
                SlidecastError::validation("topic must not be empty"),
            ));
        }
        let rendered: Vec<(usize, Slide)> =
            validate_slides(run.slides(), cfg.slide.max_content_chars)
                .map_err(|e| {
                    PipelineError::new(Stage::Validating, e.number.map(SegmentRef::Slide), e.error)
                })?
                .into_iter()
                .map(|n| (n.number, n.slide.clone()))
                .collect();

        let slot = self.locks.slot(&topic);
        let _topic_guard = slot.lock().unwrap_or_else(|p| p.into_inner());

        let mut wd = WorkDir::create(&cfg.work_dir, &topic, cfg.retention)
            .map_err(at(Stage::RenderingTitle, None))?;
        tracing::info!(work_dir = %wd.path().display(), slides = rendered.len(), "run started");

        let voice = Voice {
            speaker: cfg.narration.speaker.clone(),
            locale: cfg.narration.voice_locale.clone(),
        };

        // Title
        run.advance(PipelineState::RenderingTitle)
            .map_err(at(Stage::RenderingTitle, None))?;
        tracing::info!("rendering title");
        let (title_audio, title_segment) = self
            .render_title(&topic, &voice, &wd)
            .map_err(at(Stage::RenderingTitle, Some(SegmentRef::Title)))?;
        run.audio.push((SegmentRef::Title, title_audio));
        run.segments.push(title_segment);

        // Slides, strictly in order
        let mut composer = SlideComposer::new(&cfg.slide);
        for (number, slide) in &rendered {
            let number = *number;
            let seg_ref = Some(SegmentRef::Slide(number));
            run.advance(PipelineState::RenderingSlides { index: number })
                .map_err(at(Stage::RenderingSlides, seg_ref))?;
            tracing::info!(slide = number, "rendering slide");

            let illustration = self.illustrate(number, slide, &wd.images());
            let mut image = composer
                .compose(
                    &slide.content,
                    illustration.as_ref().ok().map(|p| p.as_path()),
                    &wd.slides().join(format!("{number:03}.png")),
                )
                .map_err(at(Stage::RenderingSlides, seg_ref))?;
            if let Err(reason) = illustration {
                image.illustration = IllustrationStatus::Failed(reason);
            }

            let audio = cfg
                .retry
                .run("slide narration", || {
                    self.services
                        .speech
                        .synthesize(&slide.content, &voice, &wd.audio())
                })
                .map_err(at(Stage::RenderingSlides, seg_ref))?;
            let segment = self
                .services
                .encoder
                .mux_image(
                    &image.path,
                    &audio,
                    &wd.videos().join(format!("{number:03}-slide.mp4")),
                )
                .map_err(at(Stage::RenderingSlides, seg_ref))?;
            tracing::debug!(slide = number, duration_secs = segment.duration_secs, "slide segment");

            run.audio.push((SegmentRef::Slide(number), audio));
            run.slide_images.push((number, image));
            run.segments.push(segment);
        }

        // Sequencing
        run.advance(PipelineState::Sequencing)
            .map_err(at(Stage::Sequencing, None))?;
        tracing::info!(segments = run.segments.len(), "sequencing");
        let pause = PauseSpec {
            duration_secs: cfg.pause_secs,
            rgb: cfg.pause_rgb,
        };
        let final_video = self
            .services
            .encoder
            .concatenate(&run.segments, &pause, &wd.videos().join("final.mp4"))
            .map_err(at(Stage::Sequencing, None))?;
        run.final_video = Some(final_video.clone());

        // Translating
        run.advance(PipelineState::Translating)
            .map_err(at(Stage::Translating, None))?;
        tracing::info!(locale = %cfg.narration.translation_locale, "translating notes");
        for (number, slide) in &rendered {
            let note = cfg
                .retry
                .run("translation", || {
                    self.services
                        .translator
                        .translate(&slide.content, &cfg.narration.translation_locale)
                })
                .map_err(at(Stage::Translating, Some(SegmentRef::Slide(*number))))?;
            run.notes.push(note);
        }

        // Publishing
        run.advance(PipelineState::Publishing)
            .map_err(at(Stage::Publishing, None))?;
        tracing::info!("publishing");
        let video_blob_id = match self.publish(run, &final_video.path) {
            Ok(id) => id,
            Err(e) => {
                wd.preserve();
                return Err(PipelineError::new(Stage::Publishing, None, e));
            }
        };

        run.advance(PipelineState::Done)
            .map_err(at(Stage::Publishing, None))?;
        wd.mark_success();
        tracing::info!(
            blob = %video_blob_id,
            duration_secs = final_video.duration_secs,
            "run finished"
        );

        Ok(RunReport {
            topic,
            final_video,
            segments: run.segments.clone(),
            slide_images: run.slide_images.clone(),
            notes: run.notes.clone(),
            video_blob_id,
            work_dir: wd.path().to_path_buf(),
            history: run.history().to_vec(),
        })
    }

    fn render_title(
        &self,
        topic: &str,
        voice: &Voice,
        wd: &WorkDir,
    ) -> SlidecastResult<(AudioAsset, VideoSegment)> {
        let heading = self.config.narration.heading_for(topic);
        let audio = self.config.retry.run("title narration", || {
            self.services.speech.synthesize(&heading, voice, &wd.audio())
        })?;
        let mut clip = TitleAnimator::new(&self.config.title, self.fps).animate(topic)?;
        let segment = self.services.encoder.mux_clip(
            &mut clip,
            &audio,
            &wd.videos().join("000-title.mp4"),
        )?;
        tracing::debug!(
            glyphs = clip.glyph_count(),
            duration_secs = segment.duration_secs,
            "title segment"
        );
        Ok((audio, segment))
    }

    /// Generate the slide illustration. Failure is reported, not escalated.
    fn illustrate(
        &self,
        number: usize,
        slide: &Slide,
        out_dir: &Path,
    ) -> Result<PathBuf, String> {
        self.config
            .retry
            .run("illustration", || {
                self.services
                    .images
                    .generate(&slide.image_description, out_dir)
            })
            .map_err(|e| {
                tracing::warn!(slide = number, error = %e, "illustration failed, text-only slide");
                e.to_string()
            })
    }

    fn publish(&self, run: &PipelineRun, video: &Path) -> SlidecastResult<String> {
        let bytes = std::fs::read(video).map_err(|e| {
            SlidecastError::persistence(format!("read final video '{}': {e}", video.display()))
        })?;
        let store = self.services.store.as_ref();
        let blob = store.put_blob(&bytes, "final.mp4")?;
        store.upsert(
            run.topic(),
            &TopicRecord {
                slides: run.slides().to_vec(),
                video_blob_id: Some(blob.clone()),
                notes: run.notes.clone(),
            },
        )?;
        Ok(blob)
    }
}
