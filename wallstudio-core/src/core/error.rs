use thiserror::Error;

/// Failure of a fetch, generate or save operation.
///
/// Every variant is recoverable: the screens turn it into an [`Alert`](crate::Alert)
/// and a log line, never a panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WallpaperError {
    /// Transport failure or non-success status from a provider.
    #[error("network error: {0}")]
    Network(String),

    /// The generation call succeeded but carried no usable image.
    #[error("{0}")]
    Generation(String),

    /// Media library access is not granted.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Staging file or media library registration failed.
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl WallpaperError {
    pub fn network(err: impl ToString) -> Self {
        Self::Network(err.to_string())
    }

    pub fn persistence(err: impl ToString) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<attohttpc::Error> for WallpaperError {
    fn from(err: attohttpc::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// Why a screen refused a user trigger. The host renders these as a disabled control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error("another operation is already in progress")]
    Busy,
    #[error("no wallpaper is selected")]
    NothingSelected,
    #[error("there is nothing to save yet")]
    NothingLoaded,
    #[error("the prompt is empty")]
    EmptyPrompt,
}
