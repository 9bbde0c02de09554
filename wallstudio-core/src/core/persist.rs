use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::error::WallpaperError;
use crate::core::http::{RequestContext, Transport};
use crate::core::image::{GeneratedImage, ImageCandidate};
use crate::core::library::{Asset, MediaLibrary, PermissionGate};

pub const SAVED_TITLE: &str = "Wallpaper Saved";
pub const SAVED_MESSAGE: &str = "Wallpaper has been saved to your gallery. You can set it as your background from your device's wallpaper settings.";
pub const PERMISSION_TITLE: &str = "Permission required";
pub const PERMISSION_MESSAGE: &str = "Please enable media library access in settings";
pub const FAILED_TITLE: &str = "Error";
pub const FAILED_MESSAGE: &str = "Failed to save wallpaper. Please try again.";

/// What to save: a remote search result or an inline generated image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveSource {
    Remote { url: String, file_stem: String },
    Inline(GeneratedImage),
}

impl SaveSource {
    pub fn from_candidate(candidate: &ImageCandidate) -> Self {
        SaveSource::Remote {
            url: candidate.display_url().to_string(),
            file_stem: candidate.file_stem(),
        }
    }
}

/// Result of one save attempt, shown once to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub success: bool,
    pub title: String,
    pub message: String,
}

impl SaveOutcome {
    fn saved() -> Self {
        Self {
            success: true,
            title: SAVED_TITLE.to_string(),
            message: SAVED_MESSAGE.to_string(),
        }
    }

    fn failed(err: &WallpaperError) -> Self {
        let (title, message) = match err {
            WallpaperError::Permission(_) => (PERMISSION_TITLE, PERMISSION_MESSAGE),
            _ => (FAILED_TITLE, FAILED_MESSAGE),
        };
        Self {
            success: false,
            title: title.to_string(),
            message: message.to_string(),
        }
    }
}

/// Stages an image on disk, registers it in the media library and files it into an album.
#[derive(Clone)]
pub struct Persister {
    transport: Arc<dyn Transport>,
    library: Arc<dyn MediaLibrary>,
    permissions: Arc<dyn PermissionGate>,
    staging_dir: PathBuf,
    album: String,
}

impl Persister {
    pub fn new(
        transport: Arc<dyn Transport>,
        library: Arc<dyn MediaLibrary>,
        permissions: Arc<dyn PermissionGate>,
        staging_dir: impl Into<PathBuf>,
        album: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            library,
            permissions,
            staging_dir: staging_dir.into(),
            album: album.into(),
        }
    }

    pub fn album(&self) -> &str {
        &self.album
    }

    /// Runs the whole pipeline. Failures are logged and reported as a generic outcome.
    pub fn save_to_library(&self, source: &SaveSource) -> SaveOutcome {
        match self.try_save(source) {
            Ok(asset) => {
                log::info!("Saved {} to album {:?}", asset.id, self.album);
                SaveOutcome::saved()
            }
            Err(e) => {
                log::error!("Error saving wallpaper: {}", e);
                SaveOutcome::failed(&e)
            }
        }
    }

    fn try_save(&self, source: &SaveSource) -> Result<Asset, WallpaperError> {
        if !self.permissions.status().is_granted() {
            return Err(WallpaperError::Permission("media library access not granted".into()));
        }

        let file = match source {
            SaveSource::Remote { url, file_stem } => self.download(url, file_stem)?,
            SaveSource::Inline(image) => self.write_inline(image)?,
        };
        verify_staged(&file)?;

        let asset = self.library.create_asset(&file)?;
        match self.library.find_album(&self.album)? {
            Some(album) => self.library.add_to_album(&album, &asset)?,
            None => {
                self.library.create_album(&self.album, &asset)?;
            }
        }
        Ok(asset)
    }

    fn download(&self, url: &str, file_stem: &str) -> Result<PathBuf, WallpaperError> {
        let path = self.staging_dir.join(format!("{}.jpg", file_stem));
        let bytes = self
            .transport
            .execute(RequestContext::get(url))?
            .into_success_body()?;
        fs::write(&path, bytes).map_err(WallpaperError::persistence)?;
        log::info!("Downloaded {} to {:?}", url, path);
        Ok(path)
    }

    fn write_inline(&self, image: &GeneratedImage) -> Result<PathBuf, WallpaperError> {
        let bytes = image.decode()?;
        let file_name = format!("wallpaper-{}.{}", Utc::now().timestamp_millis(), image.extension());
        let path = self.staging_dir.join(file_name);
        fs::write(&path, bytes).map_err(WallpaperError::persistence)?;
        log::info!("Wrote generated {} image to {:?}", image.mime_type, path);
        Ok(path)
    }
}

fn verify_staged(path: &Path) -> Result<(), WallpaperError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(()),
        _ => Err(WallpaperError::Persistence("file not created".into())),
    }
}
