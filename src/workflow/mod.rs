//! Five-step podcast wizard
//!
//! [`Workshop`] holds the wizard state and drives the extractor, the
//! generator, the cover compositor and the history store.

mod state;
mod workshop;

pub use state::{
    BookUpload, GeneratedImage, PublishDestination, StepStatus, WorkflowError, WorkflowState,
    DEFAULT_MAX_UPLOAD_BYTES, DISCOVER_DESTINATION, PUBLISH_DESTINATIONS, STEP_COVER,
    STEP_DISCOVER, STEP_PUBLISH, STEP_SCRIPT, STEP_UPLOAD,
};
pub use workshop::{run_cover, run_script, CoverJob, ScriptJob, Workshop, FALLBACK_BOOK_NAME};
