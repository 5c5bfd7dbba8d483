use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};

use crate::config::{NarrationConfig, ServiceEndpoint};
use crate::foundation::error::{ServiceKind, SlidecastError, SlidecastResult};
use crate::media::probe::{AudioAsset, probe_audio};
use crate::narration::{ImageGenerator, SpeechSynthesizer, Translator, Voice};

/// Blocking JSON client for one endpoint.
struct ServiceClient {
    kind: ServiceKind,
    endpoint: ServiceEndpoint,
    http: reqwest::blocking::Client,
}

impl ServiceClient {
    fn new(kind: ServiceKind, endpoint: &ServiceEndpoint) -> SlidecastResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(endpoint.timeout_secs.max(1)))
            .build()
            .map_err(|e| SlidecastError::service(kind, format!("build http client: {e}")))?;
        Ok(Self {
            kind,
            endpoint: endpoint.clone(),
            http,
        })
    }

    fn api_key(&self) -> SlidecastResult<String> {
        std::env::var(&self.endpoint.api_key_env).map_err(|_| {
            SlidecastError::service(
                self.kind,
                format!("environment variable {} is not set", self.endpoint.api_key_env),
            )
        })
    }

    fn post<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        body: &Req,
        auth: Auth,
    ) -> SlidecastResult<Resp> {
        if self.endpoint.url.is_empty() {
            return Err(SlidecastError::service(self.kind, "no endpoint url configured"));
        }
        let key = self.api_key()?;
        let request = self.http.post(&self.endpoint.url).json(body);
        let request = match auth {
            Auth::SubscriptionKey => request.header("api-subscription-key", key),
            Auth::Bearer => request.bearer_auth(key),
        };

        let response = request
            .send()
            .map_err(|e| SlidecastError::service(self.kind, format!("request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SlidecastError::service(
                self.kind,
                format!("HTTP {status}: {}", body.trim()),
            ));
        }
        response
            .json::<Resp>()
            .map_err(|e| SlidecastError::service(self.kind, format!("malformed response: {e}")))
    }
}

#[derive(Clone, Copy)]
enum Auth {
    SubscriptionKey,
    Bearer,
}

/// Write `bytes` to a fresh uniquely named file under `dir`, all or nothing.
pub fn write_new_file(dir: &Path, extension: &str, bytes: &[u8]) -> SlidecastResult<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| {
        SlidecastError::encoding(format!("create '{}': {e}", dir.display()))
    })?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| SlidecastError::encoding(format!("create scratch file: {e}")))?;
    tmp.write_all(bytes)
        .and_then(|()| tmp.flush())
        .map_err(|e| SlidecastError::encoding(format!("write scratch file: {e}")))?;
    let path = dir.join(format!("{}.{extension}", uuid::Uuid::new_v4()));
    tmp.persist(&path)
        .map_err(|e| SlidecastError::encoding(format!("move '{}' into place: {e}", path.display())))?;
    Ok(path)
}

/// Keep `bytes` under `dir` as a `.wav` only if they probe as audio.
///
/// Undecodable payloads leave nothing behind.
fn persist_probed_audio(dir: &Path, bytes: &[u8]) -> SlidecastResult<AudioAsset> {
    std::fs::create_dir_all(dir).map_err(|e| {
        SlidecastError::encoding(format!("create '{}': {e}", dir.display()))
    })?;
    let mut tmp = tempfile::Builder::new()
        .prefix(".narration-")
        .suffix(".wav")
        .tempfile_in(dir)
        .map_err(|e| SlidecastError::encoding(format!("create scratch file: {e}")))?;
    tmp.write_all(bytes)
        .and_then(|()| tmp.flush())
        .map_err(|e| SlidecastError::encoding(format!("write scratch file: {e}")))?;
    let mut audio = probe_audio(tmp.path()).map_err(|e| {
        SlidecastError::service(ServiceKind::Speech, format!("returned audio is unreadable: {e}"))
    })?;

    let path = dir.join(format!("{}.wav", uuid::Uuid::new_v4()));
    tmp.persist(&path)
        .map_err(|e| SlidecastError::encoding(format!("move '{}' into place: {e}", path.display())))?;
    audio.path = path;
    Ok(audio)
}

fn decode_base64(kind: ServiceKind, data: &str) -> SlidecastResult<Vec<u8>> {
    general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|e| SlidecastError::service(kind, format!("payload is not base64: {e}")))
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    speaker: &'a str,
    target_language_code: &'a str,
    inputs: [&'a str; 1],
    pitch: f32,
    pace: f32,
    loudness: f32,
    speech_sample_rate: u32,
    enable_preprocessing: bool,
    model: &'a str,
}

#[derive(Deserialize)]
struct SpeechResponse {
    #[serde(default)]
    audios: Vec<String>,
}

/// Text-to-speech over HTTP. Responses carry base64 WAV audio.
pub struct HttpSpeechClient {
    client: ServiceClient,
}

impl HttpSpeechClient {
    /// Client for `endpoint`; the key is read from the environment on each call.
    pub fn new(endpoint: &ServiceEndpoint) -> SlidecastResult<Self> {
        Ok(Self {
            client: ServiceClient::new(ServiceKind::Speech, endpoint)?,
        })
    }
}

impl SpeechSynthesizer for HttpSpeechClient {
    fn synthesize(&self, text: &str, voice: &Voice, out_dir: &Path) -> SlidecastResult<AudioAsset> {
        let request = SpeechRequest {
            speaker: &voice.speaker,
            target_language_code: &voice.locale,
            inputs: [text],
            pitch: 1.0,
            pace: 1.0,
            loudness: 1.0,
            speech_sample_rate: 22_050,
            enable_preprocessing: true,
            model: "bulbul:v1",
        };
        let response: SpeechResponse = self.client.post(&request, Auth::SubscriptionKey)?;
        let audio = response
            .audios
            .first()
            .ok_or_else(|| SlidecastError::service(ServiceKind::Speech, "response has no audio"))?;
        let bytes = decode_base64(ServiceKind::Speech, audio)?;
        let audio = persist_probed_audio(out_dir, &bytes)?;
        tracing::debug!(
            path = %audio.path.display(),
            chars = text.chars().count(),
            secs = audio.duration_secs,
            "narration synthesized"
        );
        Ok(audio)
    }
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    input: &'a str,
    source_language_code: &'a str,
    target_language_code: &'a str,
    speaker_gender: &'a str,
    mode: &'a str,
    model: &'a str,
    enable_preprocessing: bool,
}

#[derive(Deserialize)]
struct TranslateResponse {
    translated_text: Option<String>,
}

/// Translation over HTTP.
pub struct HttpTranslator {
    client: ServiceClient,
    source_locale: String,
}

impl HttpTranslator {
    /// Client for `endpoint`, translating from `source_locale`.
    pub fn new(endpoint: &ServiceEndpoint, source_locale: impl Into<String>) -> SlidecastResult<Self> {
        Ok(Self {
            client: ServiceClient::new(ServiceKind::Translation, endpoint)?,
            source_locale: source_locale.into(),
        })
    }
}

impl Translator for HttpTranslator {
    fn translate(&self, text: &str, target_locale: &str) -> SlidecastResult<String> {
        let request = TranslateRequest {
            input: text,
            source_language_code: &self.source_locale,
            target_language_code: target_locale,
            speaker_gender: "Female",
            mode: "formal",
            model: "mayura:v1",
            enable_preprocessing: true,
        };
        let response: TranslateResponse = self.client.post(&request, Auth::SubscriptionKey)?;
        response
            .translated_text
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                SlidecastError::service(ServiceKind::Translation, "response has no translated_text")
            })
    }
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    instances: [ImagePrompt<'a>; 1],
    parameters: ImageParameters,
}

#[derive(Serialize)]
struct ImagePrompt<'a> {
    prompt: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageParameters {
    sample_count: u32,
    aspect_ratio: &'static str,
}

#[derive(Deserialize)]
struct ImageResponse {
    #[serde(default)]
    predictions: Vec<ImagePrediction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImagePrediction {
    bytes_base64_encoded: String,
    #[serde(default)]
    mime_type: Option<String>,
}

/// Image generation over HTTP with bearer authentication.
pub struct HttpImageGenerator {
    client: ServiceClient,
}

impl HttpImageGenerator {
    /// Client for `endpoint`.
    pub fn new(endpoint: &ServiceEndpoint) -> SlidecastResult<Self> {
        Ok(Self {
            client: ServiceClient::new(ServiceKind::ImageGeneration, endpoint)?,
        })
    }
}

impl ImageGenerator for HttpImageGenerator {
    fn generate(&self, prompt: &str, out_dir: &Path) -> SlidecastResult<PathBuf> {
        let request = ImageRequest {
            instances: [ImagePrompt { prompt }],
            parameters: ImageParameters {
                sample_count: 1,
                aspect_ratio: "1:1",
            },
        };
        let response: ImageResponse = self.client.post(&request, Auth::Bearer)?;
        let prediction = response.predictions.first().ok_or_else(|| {
            SlidecastError::service(ServiceKind::ImageGeneration, "response has no predictions")
        })?;
        let bytes = decode_base64(ServiceKind::ImageGeneration, &prediction.bytes_base64_encoded)?;
        let extension = match prediction.mime_type.as_deref() {
            Some("image/jpeg") => "jpg",
            _ => "png",
        };
        write_new_file(out_dir, extension, &bytes)
    }
}

/// HTTP adapters for every external service named in `cfg`.
pub struct HttpServices {
    /// Text-to-speech.
    pub speech: HttpSpeechClient,
    /// Translation.
    pub translator: HttpTranslator,
    /// Illustrations.
    pub images: HttpImageGenerator,
}

impl HttpServices {
    /// Build all adapters.
    pub fn from_config(cfg: &NarrationConfig) -> SlidecastResult<Self> {
        Ok(Self {
            speech: HttpSpeechClient::new(&cfg.speech)?,
            translator: HttpTranslator::new(&cfg.translate, cfg.source_locale.clone())?,
            images: HttpImageGenerator::new(&cfg.image)?,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/narration/http.rs"]
mod tests;
