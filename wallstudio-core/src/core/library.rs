use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::WallpaperError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

impl PermissionStatus {
    pub fn is_granted(self) -> bool {
        self == PermissionStatus::Granted
    }
}

/// Read/write access to the media library.
pub trait PermissionGate: Send + Sync {
    /// Current status, without prompting.
    fn status(&self) -> PermissionStatus;
    /// Prompts for access if the platform allows it.
    fn request(&self) -> PermissionStatus;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub id: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub name: String,
    pub path: PathBuf,
}

/// Platform media library. Album lookups are by exact name.
pub trait MediaLibrary: Send + Sync {
    fn create_asset(&self, file: &Path) -> Result<Asset, WallpaperError>;
    fn find_album(&self, name: &str) -> Result<Option<Album>, WallpaperError>;
    fn create_album(&self, name: &str, first: &Asset) -> Result<Album, WallpaperError>;
    fn add_to_album(&self, album: &Album, asset: &Asset) -> Result<(), WallpaperError>;
}

/// Media library kept in a plain directory: assets are files in the root,
/// albums are sub-directories holding copies of their assets.
#[derive(Debug, Clone)]
pub struct DirectoryMediaLibrary {
    root: PathBuf,
}

impl DirectoryMediaLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn album_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl MediaLibrary for DirectoryMediaLibrary {
    fn create_asset(&self, file: &Path) -> Result<Asset, WallpaperError> {
        let file_name = file
            .file_name()
            .ok_or_else(|| WallpaperError::persistence(format!("{} has no file name", file.display())))?;
        let target = self.root.join(file_name);
        fs::copy(file, &target).map_err(|e| {
            WallpaperError::persistence(format!("failed to copy {} into library: {}", file.display(), e))
        })?;
        log::info!("Created asset {:?}", target);

        Ok(Asset {
            id: file_name.to_string_lossy().into_owned(),
            path: target,
        })
    }

    fn find_album(&self, name: &str) -> Result<Option<Album>, WallpaperError> {
        let path = self.album_path(name);
        if path.is_dir() {
            Ok(Some(Album {
                name: name.to_string(),
                path,
            }))
        } else {
            Ok(None)
        }
    }

    fn create_album(&self, name: &str, first: &Asset) -> Result<Album, WallpaperError> {
        let path = self.album_path(name);
        fs::create_dir_all(&path)
            .map_err(|e| WallpaperError::persistence(format!("failed to create album {:?}: {}", name, e)))?;
        log::info!("Created album {:?}", path);

        let album = Album {
            name: name.to_string(),
            path,
        };
        self.add_to_album(&album, first)?;
        Ok(album)
    }

    fn add_to_album(&self, album: &Album, asset: &Asset) -> Result<(), WallpaperError> {
        let target = album.path.join(&asset.id);
        fs::copy(&asset.path, &target).map_err(|e| {
            WallpaperError::persistence(format!("failed to add {} to album {:?}: {}", asset.id, album.name, e))
        })?;
        log::info!("Added {} to album {:?}", asset.id, album.name);
        Ok(())
    }
}

/// Grants access when the library directory exists (or can be created) and is writable.
#[derive(Debug, Clone)]
pub struct DirectoryPermissionGate {
    root: PathBuf,
}

impl DirectoryPermissionGate {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl PermissionGate for DirectoryPermissionGate {
    fn status(&self) -> PermissionStatus {
        match fs::metadata(&self.root) {
            Ok(meta) if meta.is_dir() && !meta.permissions().readonly() => PermissionStatus::Granted,
            Ok(_) => PermissionStatus::Denied,
            Err(_) => PermissionStatus::Undetermined,
        }
    }

    fn request(&self) -> PermissionStatus {
        if let Err(e) = fs::create_dir_all(&self.root) {
            log::warn!("Cannot create library directory {:?}: {}", self.root, e);
            return PermissionStatus::Denied;
        }
        self.status()
    }
}
