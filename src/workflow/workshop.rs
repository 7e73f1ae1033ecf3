//! Wizard actions

use base64::Engine;
use tokio::sync::Mutex;

use crate::cover::{compose, CoverImage, DrawList, TextMeasurer, TextOverlayConfig, CANVAS_SIZE};
use crate::epub::EpubExtractor;
use crate::generation::{
    prepare_script_request, GenerationError, Generator, PodcastContent, ScriptRequest,
};
use crate::history::{HistoryItem, HistoryStore};

use super::state::{
    BookUpload, GeneratedImage, PublishDestination, StepStatus, WorkflowError, WorkflowState,
    DEFAULT_MAX_UPLOAD_BYTES, DISCOVER_DESTINATION, PUBLISH_DESTINATIONS, STEP_DISCOVER,
    STEP_PUBLISH, STEP_SCRIPT,
};

/// Name used for the cover when nothing better is known
pub const FALLBACK_BOOK_NAME: &str = "Book Name";

/// Script generation started by [`Workshop::begin_script`]
#[derive(Debug)]
pub struct ScriptJob {
    file_name: String,
}

/// Cover generation started by [`Workshop::begin_cover`]
#[derive(Debug)]
pub struct CoverJob {
    book_name: String,
}

impl CoverJob {
    pub fn book_name(&self) -> &str {
        &self.book_name
    }
}

/// The five-step wizard: upload a book, generate a script and a cover,
/// edit the cover text, publish elsewhere.
pub struct Workshop<G> {
    generator: G,
    history: HistoryStore,
    state: WorkflowState,
    max_upload_bytes: usize,
}

impl<G: Generator> Workshop<G> {
    /// Create a workshop over an already loaded history store
    pub fn new(generator: G, history: HistoryStore) -> Self {
        Self {
            generator,
            history,
            state: WorkflowState::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn history(&self) -> &[HistoryItem] {
        self.history.items()
    }

    /// Jump to any step
    pub fn go_to_step(&mut self, step: u8) -> Result<(), WorkflowError> {
        if !(STEP_DISCOVER..=STEP_PUBLISH).contains(&step) {
            return Err(WorkflowError::InvalidStep(step));
        }
        self.state.current_step = step;
        Ok(())
    }

    /// Accept an uploaded book.
    ///
    /// EPUB files are reduced to their text; anything else is passed on as
    /// raw bytes with the declared mime type. A failed upload keeps the
    /// previous book.
    pub async fn load_book(
        &mut self,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<&BookUpload, WorkflowError> {
        let prepared = self.prepare_upload(file_name, mime_type, bytes).await;
        match prepared {
            Ok(upload) => {
                tracing::info!(
                    file_name,
                    mime_type = %upload.mime_type,
                    size = upload.size,
                    "Loaded book"
                );
                self.state.error = None;
                Ok(&*self.state.book.insert(upload))
            }
            Err(e) => {
                tracing::warn!(file_name, error = %e, "Rejected upload");
                self.state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn prepare_upload(
        &self,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<BookUpload, WorkflowError> {
        let size = bytes.len();
        if size > self.max_upload_bytes {
            return Err(WorkflowError::FileTooLarge {
                size,
                limit: self.max_upload_bytes,
            });
        }

        let engine = base64::engine::general_purpose::STANDARD;

        if file_name.to_lowercase().ends_with(".epub") {
            let extraction =
                tokio::task::spawn_blocking(move || EpubExtractor::new().extract(&bytes)).await??;
            if !extraction.skipped.is_empty() {
                tracing::debug!(skipped = extraction.skipped.len(), "Some spine items were skipped");
            }

            let text = extraction.text;
            Ok(BookUpload {
                file_name: file_name.to_string(),
                mime_type: "text/plain".to_string(),
                size,
                base64: engine.encode(text.as_bytes()),
                text_chars: Some(text.chars().count()),
                text: Some(text),
            })
        } else {
            Ok(BookUpload {
                file_name: file_name.to_string(),
                mime_type: mime_type.to_string(),
                size,
                base64: engine.encode(&bytes),
                text: None,
                text_chars: None,
            })
        }
    }

    /// Display name of the current book
    pub fn book_name(&self) -> String {
        if let Some(book) = &self.state.book {
            return strip_extension(&book.file_name).to_string();
        }
        self.state
            .generated_content
            .as_ref()
            .map(|content| content.title.clone())
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| FALLBACK_BOOK_NAME.to_string())
    }

    /// Generate the script for the uploaded book and remember it
    pub async fn generate_script(
        &mut self,
        prompt: Option<&str>,
    ) -> Result<&PodcastContent, WorkflowError> {
        let (job, request) = self.begin_script(prompt)?;
        let result = self.generator.generate_script(request).await;
        self.finish_script(job, result).await
    }

    /// Mark the script as loading and build the request for the generator
    pub fn begin_script(
        &mut self,
        prompt: Option<&str>,
    ) -> Result<(ScriptJob, ScriptRequest), WorkflowError> {
        if self.state.content_status == StepStatus::Loading {
            return Err(WorkflowError::Busy);
        }
        let book = self.state.book.as_ref().ok_or(WorkflowError::NoBookLoaded)?;
        let prepared = prepare_script_request(&book.base64, book.text.as_deref(), &book.mime_type, prompt);
        let job = ScriptJob {
            file_name: book.file_name.clone(),
        };

        self.state.content_status = StepStatus::Loading;
        self.state.error = None;
        self.state.safety_warning = prepared.warning;
        Ok((job, prepared.request))
    }

    /// Apply the generator's answer to a started script job
    pub async fn finish_script(
        &mut self,
        job: ScriptJob,
        result: Result<PodcastContent, GenerationError>,
    ) -> Result<&PodcastContent, WorkflowError> {
        let content = match result {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(file_name = %job.file_name, error = %e, "Script generation failed");
                let err = WorkflowError::from(e);
                self.state.content_status = StepStatus::Error;
                self.state.error = Some(err.to_string());
                return Err(err);
            }
        };

        if let Err(e) = self.history.record(content.clone(), &job.file_name).await {
            tracing::error!(error = %e, "Failed to record history");
        }

        self.state.content_status = StepStatus::Success;
        Ok(&*self.state.generated_content.insert(content))
    }

    /// Generate a new cover for the current book name
    pub async fn generate_cover(&mut self) -> Result<&GeneratedImage, WorkflowError> {
        let job = self.begin_cover()?;
        let result = self.generator.generate_cover(job.book_name()).await;
        self.finish_cover(job, result)
    }

    /// Mark the cover as loading and leave edit mode
    pub fn begin_cover(&mut self) -> Result<CoverJob, WorkflowError> {
        if self.state.cover_status == StepStatus::Loading {
            return Err(WorkflowError::Busy);
        }
        let job = CoverJob {
            book_name: self.book_name(),
        };

        self.state.cover_status = StepStatus::Loading;
        self.state.error = None;
        self.state.is_editing_cover = false;
        Ok(job)
    }

    /// Apply the generator's answer to a started cover job
    pub fn finish_cover(
        &mut self,
        job: CoverJob,
        result: Result<String, GenerationError>,
    ) -> Result<&GeneratedImage, WorkflowError> {
        let data_url = match result {
            Ok(data_url) => data_url,
            Err(e) => {
                tracing::error!(book_name = %job.book_name, error = %e, "Cover generation failed");
                let err = WorkflowError::from(e);
                self.state.cover_status = StepStatus::Error;
                self.state.error = Some(err.to_string());
                return Err(err);
            }
        };

        self.state.original_cover = Some(data_url.clone());
        self.state.overlay = TextOverlayConfig::for_book(&job.book_name);
        self.state.cover_status = StepStatus::Success;
        Ok(&*self.state.generated_cover.insert(GeneratedImage::from_data_url(data_url)))
    }

    pub fn begin_cover_edit(&mut self) -> Result<(), WorkflowError> {
        if self.state.original_cover.is_none() {
            return Err(WorkflowError::NoCover);
        }
        self.state.is_editing_cover = true;
        Ok(())
    }

    pub fn update_overlay(&mut self, overlay: TextOverlayConfig) {
        self.state.overlay = overlay;
    }

    /// Draw commands for the original cover with the current overlay
    pub fn cover_layout(&self, measurer: &dyn TextMeasurer) -> Result<DrawList, WorkflowError> {
        let data_url = self.state.original_cover.as_deref().ok_or(WorkflowError::NoCover)?;
        let image = CoverImage::from_data_url(data_url)?;

        let size = CANVAS_SIZE as u32;
        let mut list = DrawList::new(size, size);
        compose(&mut list, measurer, &image, &self.state.overlay);
        Ok(list)
    }

    /// Replace the shown cover with a rendered edit. The original stays
    /// available for further edits.
    pub fn save_edited_cover(&mut self, data_url: String) -> Result<&GeneratedImage, WorkflowError> {
        if !self.state.is_editing_cover {
            return Err(WorkflowError::NotEditing);
        }
        CoverImage::from_data_url(&data_url)?;

        self.state.is_editing_cover = false;
        Ok(&*self.state.generated_cover.insert(GeneratedImage::from_data_url(data_url)))
    }

    pub fn cancel_cover_edit(&mut self) {
        self.state.is_editing_cover = false;
    }

    /// Reopen a remembered script on the script step
    pub fn load_from_history(&mut self, id: &str) -> Result<&PodcastContent, WorkflowError> {
        let item = self
            .history
            .get(id)
            .cloned()
            .ok_or_else(|| WorkflowError::UnknownHistoryItem(id.to_string()))?;

        self.state.current_step = STEP_SCRIPT;
        self.state.content_status = StepStatus::Success;
        self.state.error = None;
        self.state.generated_cover = None;
        self.state.original_cover = None;
        self.state.cover_status = StepStatus::Idle;
        self.state.is_editing_cover = false;
        Ok(&*self.state.generated_content.insert(item.content))
    }

    pub async fn delete_history_item(&mut self, id: &str) -> Result<(), WorkflowError> {
        if !self.history.remove(id).await? {
            return Err(WorkflowError::UnknownHistoryItem(id.to_string()));
        }
        Ok(())
    }

    /// Discovery link followed by the publishing sites
    pub fn publish_destinations(&self) -> Vec<PublishDestination> {
        std::iter::once(DISCOVER_DESTINATION)
            .chain(PUBLISH_DESTINATIONS)
            .collect()
    }
}

/// Generate a script on a shared workshop. The lock is released while
/// the generator runs, so the state stays readable.
pub async fn run_script<G>(
    workshop: &Mutex<Workshop<G>>,
    prompt: Option<&str>,
) -> Result<(), WorkflowError>
where
    G: Generator + Clone,
{
    let (generator, job, request) = {
        let mut guard = workshop.lock().await;
        let (job, request) = guard.begin_script(prompt)?;
        (guard.generator().clone(), job, request)
    };

    let result = generator.generate_script(request).await;

    let mut guard = workshop.lock().await;
    guard.finish_script(job, result).await?;
    Ok(())
}

/// Generate a cover on a shared workshop, see [`run_script`]
pub async fn run_cover<G>(workshop: &Mutex<Workshop<G>>) -> Result<(), WorkflowError>
where
    G: Generator + Clone,
{
    let (generator, job) = {
        let mut guard = workshop.lock().await;
        let job = guard.begin_cover()?;
        (guard.generator().clone(), job)
    };

    let result = generator.generate_cover(job.book_name()).await;

    let mut guard = workshop.lock().await;
    guard.finish_cover(job, result)?;
    Ok(())
}

/// File name without its last extension: a final `.` followed by at least
/// one character that is neither `.` nor `/`
fn strip_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(dot) if dot + 1 < file_name.len() && !file_name[dot + 1..].contains('/') => {
            &file_name[..dot]
        }
        _ => file_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cover::{png_data_url, sample_png, AdvanceMeasurer};
    use crate::epub::single_chapter_epub;
    use crate::generation::{GenerationError, ScriptRequest};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeGenerator {
        fail: bool,
        scripts: Mutex<Vec<ScriptRequest>>,
        covers: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Generator for FakeGenerator {
        async fn generate_script(&self, request: ScriptRequest) -> Result<PodcastContent, GenerationError> {
            self.scripts.lock().unwrap().push(request);
            if self.fail {
                return Err(GenerationError::Remote("quota exceeded".to_string()));
            }
            Ok(PodcastContent {
                title: "Episode One".to_string(),
                intro: "Show notes".to_string(),
                script: "Welcome back".to_string(),
            })
        }

        async fn generate_cover(&self, book_title: &str) -> Result<String, GenerationError> {
            self.covers.lock().unwrap().push(book_title.to_string());
            if self.fail {
                return Err(GenerationError::NoImage);
            }
            Ok(png_data_url(&sample_png(8, 8)))
        }
    }

    /// Generator that waits for the test to release each call
    #[derive(Default)]
    struct GatedGenerator {
        release: tokio::sync::Notify,
    }

    #[async_trait]
    impl Generator for GatedGenerator {
        async fn generate_script(&self, _request: ScriptRequest) -> Result<PodcastContent, GenerationError> {
            self.release.notified().await;
            Ok(PodcastContent {
                title: "Slow Episode".to_string(),
                intro: String::new(),
                script: String::new(),
            })
        }

        async fn generate_cover(&self, _book_title: &str) -> Result<String, GenerationError> {
            self.release.notified().await;
            Ok(png_data_url(&sample_png(8, 8)))
        }
    }

    type SharedWorkshop = std::sync::Arc<tokio::sync::Mutex<Workshop<std::sync::Arc<GatedGenerator>>>>;

    fn gated_workshop(dir: &TempDir) -> (SharedWorkshop, std::sync::Arc<GatedGenerator>) {
        let gate = std::sync::Arc::new(GatedGenerator::default());
        let workshop = Workshop::new(gate.clone(), HistoryStore::open(dir.path()));
        (std::sync::Arc::new(tokio::sync::Mutex::new(workshop)), gate)
    }

    async fn wait_for<F>(shared: &SharedWorkshop, ready: F)
    where
        F: Fn(&WorkflowState) -> bool,
    {
        tokio::time::timeout(std::time::Duration::from_secs(2), async {
            while !ready(shared.lock().await.state()) {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("state never reached");
    }

    fn workshop(dir: &TempDir, generator: FakeGenerator) -> Workshop<FakeGenerator> {
        Workshop::new(generator, HistoryStore::open(dir.path()))
    }

    fn book_text() -> String {
        "It was a bright cold day in April. ".repeat(5)
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("walden.epub"), "walden");
        assert_eq!(strip_extension("my.book.pdf"), "my.book");
        assert_eq!(strip_extension("README"), "README");
        assert_eq!(strip_extension(".hidden"), "");
        assert_eq!(strip_extension("a."), "a.");
        assert_eq!(strip_extension("dir.d/notes"), "dir.d/notes");
    }

    #[tokio::test]
    async fn test_step_navigation() {
        let dir = TempDir::new().unwrap();
        let mut workshop = workshop(&dir, FakeGenerator::default());

        workshop.go_to_step(5).unwrap();
        assert_eq!(workshop.state().current_step, 5);
        workshop.go_to_step(2).unwrap();
        assert_eq!(workshop.state().current_step, 2);

        assert!(matches!(workshop.go_to_step(0), Err(WorkflowError::InvalidStep(0))));
        assert!(matches!(workshop.go_to_step(6), Err(WorkflowError::InvalidStep(6))));
        assert_eq!(workshop.state().current_step, 2);
    }

    #[tokio::test]
    async fn test_load_epub_extracts_text() {
        let dir = TempDir::new().unwrap();
        let mut workshop = workshop(&dir, FakeGenerator::default());
        workshop.go_to_step(2).unwrap();

        let upload = workshop
            .load_book("Orwell.EPUB", "application/epub+zip", single_chapter_epub(&book_text()))
            .await
            .unwrap();

        assert_eq!(upload.mime_type, "text/plain");
        let text = upload.text.clone().unwrap();
        assert!(text.starts_with("It was a bright cold day"));
        let decoded = base64::engine::general_purpose::STANDARD.decode(&upload.base64).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), text);

        assert_eq!(workshop.state().current_step, 2);
        assert_eq!(workshop.book_name(), "Orwell");
    }

    #[tokio::test]
    async fn test_load_other_file_passes_bytes_through() {
        let dir = TempDir::new().unwrap();
        let mut workshop = workshop(&dir, FakeGenerator::default());

        let upload = workshop
            .load_book("essay.pdf", "application/pdf", b"%PDF-1.7".to_vec())
            .await
            .unwrap();

        assert_eq!(upload.mime_type, "application/pdf");
        assert_eq!(upload.base64, "JVBERi0xLjc=");
        assert!(upload.text.is_none());
    }

    #[tokio::test]
    async fn test_oversized_upload_keeps_previous_book() {
        let dir = TempDir::new().unwrap();
        let mut workshop = workshop(&dir, FakeGenerator::default()).with_max_upload_bytes(16);
        workshop.load_book("a.pdf", "application/pdf", vec![0; 16]).await.unwrap();

        let err = workshop
            .load_book("b.pdf", "application/pdf", vec![0; 17])
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::FileTooLarge { size: 17, limit: 16 }));
        assert_eq!(workshop.state().book.as_ref().unwrap().file_name, "a.pdf");
        assert!(workshop.state().error.is_some());
    }

    #[tokio::test]
    async fn test_broken_epub_records_error() {
        let dir = TempDir::new().unwrap();
        let mut workshop = workshop(&dir, FakeGenerator::default());

        let err = workshop
            .load_book("broken.epub", "application/epub+zip", b"not a zip".to_vec())
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::Extraction(_)));
        assert!(workshop.state().book.is_none());
        assert!(workshop.state().error.as_deref().unwrap().starts_with("Failed to read the file"));
    }

    #[tokio::test]
    async fn test_generate_script_records_history() {
        let dir = TempDir::new().unwrap();
        let mut workshop = workshop(&dir, FakeGenerator::default());
        workshop
            .load_book("walden.epub", "application/epub+zip", single_chapter_epub(&book_text()))
            .await
            .unwrap();

        let content = workshop.generate_script(Some("Keep it short")).await.unwrap();
        assert_eq!(content.title, "Episode One");

        assert_eq!(workshop.state().content_status, StepStatus::Success);
        assert_eq!(workshop.history().len(), 1);
        assert_eq!(workshop.history()[0].book_name, "walden.epub");

        let requests = workshop.generator.scripts.lock().unwrap();
        assert_eq!(requests[0].final_mime_type, "text/plain");
        assert_eq!(requests[0].custom_prompt, "Keep it short");
    }

    #[tokio::test]
    async fn test_failed_script_is_not_recorded() {
        let dir = TempDir::new().unwrap();
        let generator = FakeGenerator {
            fail: true,
            ..FakeGenerator::default()
        };
        let mut workshop = workshop(&dir, generator);
        workshop.load_book("a.pdf", "application/pdf", b"%PDF".to_vec()).await.unwrap();

        let err = workshop.generate_script(None).await.unwrap_err();

        assert!(matches!(err, WorkflowError::Generation(_)));
        assert_eq!(workshop.state().content_status, StepStatus::Error);
        assert!(workshop.state().error.as_deref().unwrap().contains("quota exceeded"));
        assert!(workshop.history().is_empty());
    }

    #[tokio::test]
    async fn test_script_requires_book() {
        let dir = TempDir::new().unwrap();
        let mut workshop = workshop(&dir, FakeGenerator::default());

        let err = workshop.generate_script(None).await.unwrap_err();
        assert!(matches!(err, WorkflowError::NoBookLoaded));
        assert_eq!(workshop.state().content_status, StepStatus::Idle);
    }

    #[tokio::test]
    async fn test_cover_uses_fallback_name_and_resets_overlay() {
        let dir = TempDir::new().unwrap();
        let mut workshop = workshop(&dir, FakeGenerator::default());
        workshop.update_overlay(TextOverlayConfig {
            podcast_title: "OLD".to_string(),
            main_text: "old".to_string(),
            color: crate::cover::TextColor::Orange,
        });

        workshop.generate_cover().await.unwrap();

        assert_eq!(workshop.generator.covers.lock().unwrap()[0], FALLBACK_BOOK_NAME);
        assert_eq!(workshop.state().overlay, TextOverlayConfig::for_book(FALLBACK_BOOK_NAME));
        assert_eq!(workshop.state().cover_status, StepStatus::Success);
    }

    #[tokio::test]
    async fn test_cover_edit_cycle() {
        let dir = TempDir::new().unwrap();
        let mut workshop = workshop(&dir, FakeGenerator::default());
        assert!(matches!(workshop.begin_cover_edit(), Err(WorkflowError::NoCover)));

        workshop.load_book("Walden.pdf", "application/pdf", b"%PDF".to_vec()).await.unwrap();
        let original = workshop.generate_cover().await.unwrap().url.clone();
        workshop.begin_cover_edit().unwrap();

        let layout = workshop.cover_layout(&AdvanceMeasurer::default()).unwrap();
        let texts: Vec<_> = layout.texts().map(|(text, _, _)| text.to_string()).collect();
        assert!(texts.contains(&"Walden".to_string()));

        let edited = png_data_url(&sample_png(16, 16));
        workshop.save_edited_cover(edited.clone()).unwrap();
        assert!(!workshop.state().is_editing_cover);
        assert_eq!(workshop.state().generated_cover.as_ref().unwrap().url, edited);
        assert_eq!(workshop.state().original_cover.as_deref(), Some(original.as_str()));

        assert!(matches!(
            workshop.save_edited_cover(edited),
            Err(WorkflowError::NotEditing)
        ));
    }

    #[tokio::test]
    async fn test_regenerating_cover_leaves_edit_mode() {
        let dir = TempDir::new().unwrap();
        let mut workshop = workshop(&dir, FakeGenerator::default());
        workshop.generate_cover().await.unwrap();
        workshop.begin_cover_edit().unwrap();

        workshop.generate_cover().await.unwrap();
        assert!(!workshop.state().is_editing_cover);
    }

    #[tokio::test]
    async fn test_load_from_history() {
        let dir = TempDir::new().unwrap();
        let mut workshop = workshop(&dir, FakeGenerator::default());
        workshop.load_book("a.pdf", "application/pdf", b"%PDF".to_vec()).await.unwrap();
        workshop.generate_script(None).await.unwrap();
        workshop.generate_cover().await.unwrap();
        let id = workshop.history()[0].id.clone();

        workshop.go_to_step(5).unwrap();
        workshop.load_from_history(&id).unwrap();

        let state = workshop.state();
        assert_eq!(state.current_step, STEP_SCRIPT);
        assert_eq!(state.content_status, StepStatus::Success);
        assert_eq!(state.cover_status, StepStatus::Idle);
        assert!(state.generated_cover.is_none());

        assert!(matches!(
            workshop.load_from_history("nope"),
            Err(WorkflowError::UnknownHistoryItem(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_history_item() {
        let dir = TempDir::new().unwrap();
        let mut workshop = workshop(&dir, FakeGenerator::default());
        workshop.load_book("a.pdf", "application/pdf", b"%PDF".to_vec()).await.unwrap();
        workshop.generate_script(None).await.unwrap();
        let id = workshop.history()[0].id.clone();

        workshop.delete_history_item(&id).await.unwrap();
        assert!(workshop.history().is_empty());
        assert!(workshop.delete_history_item(&id).await.is_err());
    }

    #[tokio::test]
    async fn test_book_name_falls_back_to_generated_title() {
        let dir = TempDir::new().unwrap();
        let mut workshop = workshop(&dir, FakeGenerator::default());
        assert_eq!(workshop.book_name(), FALLBACK_BOOK_NAME);

        workshop.load_book("a.pdf", "application/pdf", b"%PDF".to_vec()).await.unwrap();
        workshop.generate_script(None).await.unwrap();
        let id = workshop.history()[0].id.clone();

        let mut fresh = Workshop::new(FakeGenerator::default(), HistoryStore::open(dir.path()));
        fresh.history.load().await.unwrap();
        fresh.load_from_history(&id).unwrap();
        assert_eq!(fresh.book_name(), "Episode One");
    }

    #[test]
    fn test_publish_destinations() {
        let dir = TempDir::new().unwrap();
        let workshop = workshop(&dir, FakeGenerator::default());
        let destinations = workshop.publish_destinations();

        assert_eq!(destinations.len(), 3);
        assert_eq!(destinations[0].url, "https://www.dushupai.com/");
        assert_eq!(destinations[1].url, "https://podcaster.xiaoyuzhoufm.com/dashboard");
        assert_eq!(destinations[2].url, "https://studio.ximalaya.com/");
    }

    #[tokio::test]
    async fn test_state_readable_while_cover_generates() {
        let dir = TempDir::new().unwrap();
        let (shared, gate) = gated_workshop(&dir);

        let task = tokio::spawn({
            let shared = shared.clone();
            async move { run_cover(&shared).await }
        });
        wait_for(&shared, |state| state.cover_status == StepStatus::Loading).await;

        assert!(matches!(run_cover(&shared).await, Err(WorkflowError::Busy)));
        shared.lock().await.go_to_step(STEP_PUBLISH).unwrap();

        gate.release.notify_one();
        task.await.unwrap().unwrap();

        let workshop = shared.lock().await;
        assert_eq!(workshop.state().cover_status, StepStatus::Success);
        assert_eq!(workshop.state().current_step, STEP_PUBLISH);
        assert!(workshop.state().original_cover.is_some());
    }

    #[tokio::test]
    async fn test_state_readable_while_script_generates() {
        let dir = TempDir::new().unwrap();
        let (shared, gate) = gated_workshop(&dir);
        shared
            .lock()
            .await
            .load_book("a.pdf", "application/pdf", b"%PDF".to_vec())
            .await
            .unwrap();

        let task = tokio::spawn({
            let shared = shared.clone();
            async move { run_script(&shared, Some("Short")).await }
        });
        wait_for(&shared, |state| state.content_status == StepStatus::Loading).await;
        assert!(shared.lock().await.history().is_empty());

        gate.release.notify_one();
        task.await.unwrap().unwrap();

        let workshop = shared.lock().await;
        assert_eq!(workshop.state().content_status, StepStatus::Success);
        assert_eq!(workshop.history().len(), 1);
        assert_eq!(workshop.history()[0].content.title, "Slow Episode");
    }

    #[tokio::test]
    async fn test_failed_cover_job_records_error() {
        let dir = TempDir::new().unwrap();
        let mut workshop = workshop(&dir, FakeGenerator::default());

        let job = workshop.begin_cover().unwrap();
        assert_eq!(job.book_name(), FALLBACK_BOOK_NAME);
        assert_eq!(workshop.state().cover_status, StepStatus::Loading);

        let err = workshop.finish_cover(job, Err(GenerationError::NoImage)).unwrap_err();
        assert!(matches!(err, WorkflowError::Generation(GenerationError::NoImage)));
        assert_eq!(workshop.state().cover_status, StepStatus::Error);
        assert!(workshop.begin_cover().is_ok());
    }
}
