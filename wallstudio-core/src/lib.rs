// Module declarations
pub mod core;

// Public API re-exports
pub use crate::core::app::{Alert, GalleryScreen, GeneratorScreen, SaveState, Selection, ViewState};
pub use crate::core::error::{Rejected, WallpaperError};
pub use crate::core::filter::{filter_for_wallpaper, RatioTarget};
pub use crate::core::http::{AttoTransport, HttpMethod, HttpResponse, RequestContext, Transport};
pub use crate::core::image::{extension_for_mime, GeneratedImage, ImageCandidate, ImageVariants};
pub use crate::core::library::{
    Album, Asset, DirectoryMediaLibrary, DirectoryPermissionGate, MediaLibrary, PermissionGate,
    PermissionStatus,
};
pub use crate::core::persist::{Persister, SaveOutcome, SaveSource};
pub use crate::core::request::{generate_image, search_images, wallpaper_prompt, NO_IMAGE_GENERATED};
pub use crate::core::services::Services;
pub use crate::core::storage::{Config, GenerationSettings, SearchSettings, Settings, DEFAULT_ALBUM};
