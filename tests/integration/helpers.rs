//! Shared test helpers for integration tests.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use slidehub::{
    AppConfig, ConversionEvent, DocumentAutomation, Library, LibraryFile, ProjectSession,
    TaskEvent, TaskEventPayload,
};
use slidehub_automation::{FakeAutomation, FakeSlide};

/// Test fixture: a library wired to the fake automation host, rooted in
/// a temp directory.
pub struct TestEnv {
    pub library: Library,
    pub fake: Arc<FakeAutomation>,
    tmp: tempfile::TempDir,
}

impl TestEnv {
    pub async fn new() -> Self {
        let tmp = tempfile::tempdir().expect("tempdir");
        let mut config = AppConfig::default();
        config.library.projects_dir =
            tmp.path().join("projects").to_string_lossy().into_owned();
        config.library.thumbnail_height = 18;

        let fake = Arc::new(FakeAutomation::new());
        let automation: Arc<dyn DocumentAutomation> = Arc::clone(&fake) as _;
        let library = Library::new(config, automation);

        Self { library, fake, tmp }
    }

    /// Directory for placeholder source presentations.
    pub fn sources_dir(&self) -> PathBuf {
        self.tmp.path().join("sources")
    }

    /// Scratch directory for export outputs.
    pub fn out_dir(&self) -> PathBuf {
        self.tmp.path().join("out")
    }

    /// Write a placeholder source file, import it, and script the fake
    /// host to serve `slides` for the stored copy.
    pub async fn import_scripted(
        &self,
        session: &ProjectSession,
        file_name: &str,
        slides: Vec<FakeSlide>,
    ) -> LibraryFile {
        let source = self.sources_dir().join(file_name);
        tokio::fs::create_dir_all(source.parent().expect("parent"))
            .await
            .expect("mkdir");
        tokio::fs::write(&source, b"placeholder presentation")
            .await
            .expect("write source");

        let file = session.import_file(&source).await.expect("import");
        self.fake
            .add_document(session.root().join(&file.stored_path), slides);
        file
    }
}

/// A deck of `n` simple slides with one shape each.
pub fn deck(n: u32) -> Vec<FakeSlide> {
    (1..=n)
        .map(|i| {
            FakeSlide::titled(&format!("Slide {i}"))
                .with_body(&format!("Body {i}"))
                .with_notes(&format!("Notes {i}"))
                .with_shape("text_box", 10.0, 20.0, 300.0, 80.0)
        })
        .collect()
}

/// Trigger conversion and collect the task's events until it finishes.
pub async fn convert_and_wait(env: &TestEnv, session: &ProjectSession) -> Vec<TaskEvent> {
    let mut rx = env.library.subscribe();
    let task_id = session.convert().await.expect("convert");

    let mut events = Vec::new();
    loop {
        let event = tokio::time::timeout(Duration::from_secs(30), rx.recv())
            .await
            .expect("conversion timed out")
            .expect("event channel closed");
        if event.task_id != task_id {
            continue;
        }

        let finished = matches!(
            event.payload,
            TaskEventPayload::Conversion(ConversionEvent::Finished { .. })
        );
        events.push(event);
        if finished {
            break;
        }
    }
    events
}

/// Count the rows of a table.
pub async fn count_rows(pool: &sqlx::SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("count rows")
}
