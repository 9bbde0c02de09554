// Explicit collaborators handed to the screens instead of globals.
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::core::http::{AttoTransport, Transport};
use crate::core::library::{
    DirectoryMediaLibrary, DirectoryPermissionGate, MediaLibrary, PermissionGate, PermissionStatus,
};
use crate::core::persist::Persister;
use crate::core::storage::{Config, Settings};

/// Everything a screen talks to. Cheap to clone; clones share the permission prompt flag.
#[derive(Clone)]
pub struct Services {
    pub transport: Arc<dyn Transport>,
    pub library: Arc<dyn MediaLibrary>,
    pub permissions: Arc<dyn PermissionGate>,
    pub settings: Settings,
    pub staging_dir: PathBuf,
    permission_prompted: Arc<AtomicBool>,
}

impl Services {
    pub fn new(
        transport: Arc<dyn Transport>,
        library: Arc<dyn MediaLibrary>,
        permissions: Arc<dyn PermissionGate>,
        settings: Settings,
        staging_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            transport,
            library,
            permissions,
            settings,
            staging_dir: staging_dir.into(),
            permission_prompted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Real HTTP plus a directory-backed media library at `config.library_dir`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(AttoTransport),
            Arc::new(DirectoryMediaLibrary::new(&config.library_dir)),
            Arc::new(DirectoryPermissionGate::new(&config.library_dir)),
            config.settings.clone(),
            &config.staging_dir,
        )
    }

    pub fn persister(&self) -> Persister {
        Persister::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.library),
            Arc::clone(&self.permissions),
            self.staging_dir.clone(),
            self.settings.album.clone(),
        )
    }

    /// Prompts for media library access at most once per session.
    ///
    /// Returns `None` when no prompt was shown, otherwise the status it produced.
    pub fn prompt_permission_once(&self) -> Option<PermissionStatus> {
        if self.permissions.status().is_granted() {
            return None;
        }
        if self.permission_prompted.swap(true, Ordering::SeqCst) {
            return None;
        }
        let status = self.permissions.request();
        log::info!("Media library permission request: {:?}", status);
        Some(status)
    }
}
