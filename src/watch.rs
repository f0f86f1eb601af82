//! File system watcher that keeps `pages.json` current.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Event Loop                              │
//! │                                                              │
//! │  ┌──────────┐   ┌────────────┐   ┌──────────┐   ┌─────────┐  │
//! │  │ notify   │──▶│ WatchEvent │──▶│ Debouncer│──▶│ rebuild │  │
//! │  │ events   │   │ + filter   │   │ (300ms)  │   │         │  │
//! │  └──────────┘   └────────────┘   └──────────┘   └────┬────┘  │
//! │                                                      │       │
//! │                             Pipeline::run ◀──────────┤       │
//! │                    DevSession invalidate + reload ◀──┘       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! All rebuilds run on the event loop thread, one at a time. Events that
//! arrive while waiting out the debounce window or while a rebuild runs are
//! collapsed into the next rebuild.

use crate::{
    config::MergeConfig,
    error::PagesError,
    log,
    pages::user_config::config_source_paths,
    pipeline::Pipeline,
    utils::{
        category::{FileCategory, categorize_path, is_page_source},
        path::rel_path,
    },
};
use anyhow::{Context, Result};
use notify::{
    Event, EventKind, RecursiveMode, Watcher,
    event::{ModifyKind, RenameMode},
};
use rustc_hash::FxHashSet;
use std::{
    path::{Path, PathBuf},
    sync::{Arc, mpsc},
    time::{Duration, Instant},
};

// =============================================================================
// Constants
// =============================================================================

const DEBOUNCE_MS: u64 = 300;

/// Id of the virtual module that serves `pages.json` to the dev session.
pub const PAGES_MODULE_ID: &str = "virtual:pages-json";

// =============================================================================
// Events
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchEventKind {
    Added,
    Changed,
    Removed,
}

/// A single file change, as seen by the rebuild filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WatchEvent {
    pub kind: WatchEventKind,
    pub path: PathBuf,
}

impl WatchEvent {
    pub fn new(kind: WatchEventKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    /// Translate a notify event. Renames become a removal of the old path and
    /// an addition of the new one; access events are dropped.
    pub fn from_notify(event: &Event) -> Vec<Self> {
        use WatchEventKind::*;

        let all = |kind: WatchEventKind| -> Vec<Self> {
            event.paths.iter().map(|p| Self::new(kind, p)).collect()
        };

        match event.kind {
            EventKind::Create(_) => all(Added),
            EventKind::Remove(_) => all(Removed),
            EventKind::Modify(ModifyKind::Name(mode)) => match mode {
                RenameMode::From => all(Removed),
                RenameMode::To => all(Added),
                RenameMode::Both => {
                    let mut events = Vec::with_capacity(2);
                    if let Some(from) = event.paths.first() {
                        events.push(Self::new(Removed, from));
                    }
                    if let Some(to) = event.paths.get(1) {
                        events.push(Self::new(Added, to));
                    }
                    events
                }
                _ => event
                    .paths
                    .iter()
                    .map(|p| Self::new(if p.exists() { Added } else { Removed }, p))
                    .collect(),
            },
            EventKind::Modify(_) => all(Changed),
            _ => Vec::new(),
        }
    }
}

/// Whether an event should trigger a rebuild.
///
/// - `Added` / `Removed`: only page-source extensions count.
/// - `Changed`: page sources and user config sources, never the output.
pub fn should_rebuild(event: &WatchEvent, config: &MergeConfig) -> bool {
    match event.kind {
        WatchEventKind::Added | WatchEventKind::Removed => is_page_source(&event.path),
        WatchEventKind::Changed => matches!(
            categorize_path(&event.path, config),
            FileCategory::Page | FileCategory::Config
        ),
    }
}

/// Check if path is a temp/backup file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

// =============================================================================
// Dev Session
// =============================================================================

/// Live development session notified after each successful rebuild.
pub trait DevSession: Send + Sync {
    /// Drop the cached copy of a virtual module.
    fn invalidate_module(&self, id: &str);
    /// Ask every connected client to reload.
    fn full_reload(&self);
}

// =============================================================================
// Debounce State
// =============================================================================

/// Batches accepted events until the stream goes quiet.
struct Debouncer {
    pending: FxHashSet<WatchEvent>,
    last_event: Option<Instant>,
}

impl Debouncer {
    fn new() -> Self {
        Self {
            pending: FxHashSet::default(),
            last_event: None,
        }
    }

    fn add(&mut self, event: WatchEvent) {
        self.pending.insert(event);
        self.last_event = Some(Instant::now());
    }

    fn ready(&self) -> bool {
        !self.pending.is_empty()
            && self
                .last_event
                .is_some_and(|t| t.elapsed() >= Duration::from_millis(DEBOUNCE_MS))
    }

    fn take(&mut self) -> Vec<WatchEvent> {
        self.last_event = None;
        self.pending.drain().collect()
    }

    fn timeout(&self) -> Duration {
        if self.pending.is_empty() {
            Duration::from_secs(60)
        } else {
            Duration::from_millis(DEBOUNCE_MS)
        }
    }
}

// =============================================================================
// Coordinator
// =============================================================================

/// Re-runs the pipeline on relevant changes and notifies the dev session.
pub struct WatchCoordinator {
    pipeline: Pipeline,
    session: Option<Arc<dyn DevSession>>,
}

impl WatchCoordinator {
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            session: None,
        }
    }

    pub fn with_session(mut self, session: Arc<dyn DevSession>) -> Self {
        self.session = Some(session);
        self
    }

    /// Filter an event against the current options.
    pub fn accepts(&self, event: &WatchEvent) -> bool {
        !is_temp_file(&event.path) && should_rebuild(event, self.pipeline.options())
    }

    /// Run the pipeline, then invalidate and reload the dev session.
    ///
    /// The session is left alone when the run fails.
    pub fn rebuild(&self) -> Result<(), PagesError> {
        self.pipeline.run()?;
        self.notify_session();
        Ok(())
    }

    fn notify_session(&self) {
        let Some(session) = &self.session else {
            return;
        };
        session.invalidate_module(PAGES_MODULE_ID);
        session.full_reload();
        self.pipeline
            .logger()
            .debug("hmr", format_args!("invalidated {PAGES_MODULE_ID}, full reload"));
    }

    /// Rebuild once for a batch of accepted events.
    ///
    /// Non-fatal failures are logged and the previous output stays in place;
    /// fatal ones end the watch loop.
    fn handle_changes(&self, events: &[WatchEvent]) -> Result<()> {
        let Some(first) = events.first() else {
            return Ok(());
        };

        let options = self.pipeline.options();
        let root = options.get_root();
        for event in events {
            self.pipeline.logger().debug(
                "hmr",
                format_args!(
                    "{} {} [{}]",
                    kind_verb(event.kind),
                    rel_path(&event.path, root),
                    categorize_path(&event.path, options).name()
                ),
            );
        }

        if events.len() == 1 {
            log!("watch"; "{} {}, rebuilding...", rel_path(&first.path, root), kind_verb(first.kind));
        } else {
            log!("watch"; "{} files changed, rebuilding...", events.len());
        }

        match self.rebuild() {
            Ok(()) => Ok(()),
            Err(err) if err.is_fatal() => Err(err.into()),
            Err(err) => {
                let logger = self.pipeline.logger();
                logger.error(format_args!("rebuild failed: {err}"));
                logger.debug("error", format_args!("{err:?}"));
                Ok(())
            }
        }
    }

    fn setup_watchers(&self, watcher: &mut impl Watcher) -> Result<()> {
        let options = self.pipeline.options();
        let root = options.get_root();

        let dirs = options.dirs.iter().chain(&options.sub_packages);
        for dir in dirs.map(|d| options.resolve(d)).filter(|d| d.exists()) {
            watcher
                .watch(&dir, RecursiveMode::Recursive)
                .with_context(|| format!("Failed to watch {}", dir.display()))?;
            log!("watch"; "{}/", rel_path(&dir, root));
        }

        for file in config_source_paths(root) {
            watcher
                .watch(&file, RecursiveMode::NonRecursive)
                .with_context(|| format!("Failed to watch {}", file.display()))?;
            log!("watch"; "{}", rel_path(&file, root));
        }

        Ok(())
    }

    /// Block on file events and rebuild until the watcher shuts down.
    pub fn watch_blocking(&self) -> Result<()> {
        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;
        self.setup_watchers(&mut watcher)?;

        let mut debouncer = Debouncer::new();

        loop {
            match rx.recv_timeout(debouncer.timeout()) {
                Ok(Ok(event)) => {
                    WatchEvent::from_notify(&event)
                        .into_iter()
                        .filter(|e| self.accepts(e))
                        .for_each(|e| debouncer.add(e));
                }
                Ok(Err(e)) => log!("watch"; "error: {e}"),
                Err(mpsc::RecvTimeoutError::Timeout) if debouncer.ready() => {
                    self.handle_changes(&debouncer.take())?;
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
                _ => {}
            }
        }

        Ok(())
    }
}

const fn kind_verb(kind: WatchEventKind) -> &'static str {
    match kind {
        WatchEventKind::Added => "added",
        WatchEventKind::Changed => "changed",
        WatchEventKind::Removed => "removed",
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::Logger;
    use notify::event::{CreateKind, DataChange, RemoveKind};
    use parking_lot::Mutex;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Default)]
    struct MockSession {
        calls: Mutex<Vec<String>>,
    }

    impl DevSession for MockSession {
        fn invalidate_module(&self, id: &str) {
            self.calls.lock().push(format!("invalidate:{id}"));
        }
        fn full_reload(&self) {
            self.calls.lock().push("reload".into());
        }
    }

    fn config_at(root: &Path) -> MergeConfig {
        let mut config = MergeConfig::default();
        config.set_root(root);
        config
    }

    fn coordinator(root: &Path) -> WatchCoordinator {
        WatchCoordinator::new(Pipeline::new(Arc::new(config_at(root)), Logger::default()))
    }

    #[test]
    fn test_output_change_never_rebuilds() {
        let config = config_at(Path::new("/proj"));

        for path in ["/proj/src/pages.json", "/proj/pages.json"] {
            let event = WatchEvent::new(WatchEventKind::Changed, path);
            assert!(!should_rebuild(&event, &config), "{path}");
        }
    }

    #[test]
    fn test_changed_filter() {
        let config = config_at(Path::new("/proj"));
        let changed = |p: &str| should_rebuild(&WatchEvent::new(WatchEventKind::Changed, p), &config);

        assert!(changed("/proj/src/pages/index/index.json5"));
        assert!(changed("/proj/pages.config.toml"));
        assert!(!changed("/proj/src/pages/index/index.vue"));
    }

    #[test]
    fn test_added_and_removed_use_extension_only() {
        let config = config_at(Path::new("/proj"));
        let check = |kind, p: &str| should_rebuild(&WatchEvent::new(kind, p), &config);

        assert!(check(WatchEventKind::Added, "/proj/src/pages/a/a.jsonc"));
        assert!(check(WatchEventKind::Removed, "/proj/src/pages/a/a.json"));
        assert!(!check(WatchEventKind::Added, "/proj/src/pages/a/a.vue"));
        assert!(!check(WatchEventKind::Removed, "/proj/pages.config.toml"));
    }

    #[test]
    fn test_from_notify() {
        let create = Event::new(EventKind::Create(CreateKind::File)).add_path("/a.json".into());
        assert_eq!(
            WatchEvent::from_notify(&create),
            vec![WatchEvent::new(WatchEventKind::Added, "/a.json")]
        );

        let modify = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content)))
            .add_path("/a.json".into());
        assert_eq!(WatchEvent::from_notify(&modify)[0].kind, WatchEventKind::Changed);

        let remove = Event::new(EventKind::Remove(RemoveKind::File)).add_path("/a.json".into());
        assert_eq!(WatchEvent::from_notify(&remove)[0].kind, WatchEventKind::Removed);

        let rename = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
            .add_path("/old.json".into())
            .add_path("/new.json".into());
        assert_eq!(
            WatchEvent::from_notify(&rename),
            vec![
                WatchEvent::new(WatchEventKind::Removed, "/old.json"),
                WatchEvent::new(WatchEventKind::Added, "/new.json"),
            ]
        );

        let access = Event::new(EventKind::Access(notify::event::AccessKind::Any))
            .add_path("/a.json".into());
        assert!(WatchEvent::from_notify(&access).is_empty());
    }

    #[test]
    fn test_temp_files_are_ignored() {
        let dir = TempDir::new().unwrap();
        let coordinator = coordinator(dir.path());
        let page = dir.path().join("src/pages/a/a.json");

        assert!(coordinator.accepts(&WatchEvent::new(WatchEventKind::Added, &page)));
        assert!(!coordinator.accepts(&WatchEvent::new(
            WatchEventKind::Added,
            dir.path().join("src/pages/a/.a.json")
        )));
        assert!(!coordinator.accepts(&WatchEvent::new(
            WatchEventKind::Changed,
            dir.path().join("src/pages/a/a.json~")
        )));
    }

    #[test]
    fn test_debouncer_collapses_duplicates() {
        let mut debouncer = Debouncer::new();
        assert!(!debouncer.ready());
        assert_eq!(debouncer.timeout(), Duration::from_secs(60));

        let event = WatchEvent::new(WatchEventKind::Changed, "/a.json");
        debouncer.add(event.clone());
        debouncer.add(event.clone());
        debouncer.add(WatchEvent::new(WatchEventKind::Changed, "/b.json"));

        assert_eq!(debouncer.timeout(), Duration::from_millis(DEBOUNCE_MS));
        assert!(!debouncer.ready());
        debouncer.last_event = Some(Instant::now() - Duration::from_millis(DEBOUNCE_MS));
        assert!(debouncer.ready());
        assert_eq!(debouncer.take().len(), 2);
        assert!(!debouncer.ready());
    }

    #[test]
    fn test_rebuild_notifies_session() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("pages.config.json"), r#"{ "pages": [{ "path": "pages/index/index" }] }"#)
            .unwrap();
        let session = Arc::new(MockSession::default());
        let coordinator = coordinator(dir.path()).with_session(session.clone());

        coordinator.rebuild().unwrap();

        assert_eq!(
            *session.calls.lock(),
            vec![format!("invalidate:{PAGES_MODULE_ID}"), "reload".to_owned()]
        );
        assert!(dir.path().join("src/pages.json").exists());
    }

    #[test]
    fn test_failed_rebuild_leaves_session_alone() {
        let dir = TempDir::new().unwrap();
        let session = Arc::new(MockSession::default());
        let coordinator = coordinator(dir.path()).with_session(session.clone());

        let err = coordinator.rebuild().unwrap_err();

        assert!(err.is_fatal());
        assert!(session.calls.lock().is_empty());
    }

    #[test]
    fn test_non_fatal_failure_keeps_watching() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("pages.config.json"), "{}").unwrap();
        fs::create_dir_all(dir.path().join("src/pages/a")).unwrap();
        let broken = dir.path().join("src/pages/a/a.json");
        fs::write(&broken, "{ pages: [").unwrap();
        let coordinator = coordinator(dir.path());

        let events = [WatchEvent::new(WatchEventKind::Changed, &broken)];
        assert!(coordinator.handle_changes(&events).is_ok());

        fs::remove_file(dir.path().join("pages.config.json")).unwrap();
        assert!(coordinator.handle_changes(&events).is_err());
    }
}
