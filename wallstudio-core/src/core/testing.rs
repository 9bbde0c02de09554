//! In-memory fakes for the transport, media library and permission seams.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;

use crate::core::error::WallpaperError;
use crate::core::http::{HttpResponse, RequestContext, Transport};
use crate::core::library::{Album, Asset, MediaLibrary, PermissionGate, PermissionStatus};

/// Replays queued responses; the last one repeats once the queue is drained.
#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, WallpaperError>>>,
    requests: Mutex<Vec<RequestContext>>,
}

impl FakeTransport {
    pub fn with_response(response: HttpResponse) -> Self {
        let transport = Self::default();
        transport.push(Ok(response));
        transport
    }

    pub fn json(value: serde_json::Value) -> Self {
        Self::with_response(HttpResponse {
            status: 200,
            body: value.to_string().into_bytes(),
        })
    }

    pub fn push(&self, response: Result<HttpResponse, WallpaperError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<RequestContext> {
        self.requests.lock().unwrap().last().cloned()
    }
}

impl Transport for FakeTransport {
    fn execute(&self, request: RequestContext) -> Result<HttpResponse, WallpaperError> {
        self.requests.lock().unwrap().push(request);
        let mut responses = self.responses.lock().unwrap();
        if responses.len() > 1 {
            return responses.pop_front().unwrap();
        }
        responses
            .front()
            .cloned()
            .unwrap_or_else(|| Err(WallpaperError::network("no response queued")))
    }
}

/// Holds every request until [`GatedTransport::release`] hands it a response.
pub struct GatedTransport {
    started: AtomicUsize,
    gate: Mutex<Receiver<Result<HttpResponse, WallpaperError>>>,
    sender: Sender<Result<HttpResponse, WallpaperError>>,
}

impl Default for GatedTransport {
    fn default() -> Self {
        let (sender, receiver) = channel();
        Self {
            started: AtomicUsize::new(0),
            gate: Mutex::new(receiver),
            sender,
        }
    }
}

impl GatedTransport {
    pub fn release(&self, response: Result<HttpResponse, WallpaperError>) {
        self.sender.send(response).unwrap();
    }

    pub fn release_json(&self, value: serde_json::Value) {
        self.release(Ok(HttpResponse {
            status: 200,
            body: value.to_string().into_bytes(),
        }));
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

impl Transport for GatedTransport {
    fn execute(&self, _request: RequestContext) -> Result<HttpResponse, WallpaperError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        self.gate
            .lock()
            .unwrap()
            .recv()
            .unwrap_or_else(|_| Err(WallpaperError::network("gate dropped")))
    }
}

#[derive(Default)]
struct LibraryState {
    assets: Vec<PathBuf>,
    albums: Vec<(String, Vec<String>)>,
    create_album_calls: usize,
}

#[derive(Default)]
pub struct FakeLibrary {
    state: Mutex<LibraryState>,
    failure: Option<String>,
}

impl FakeLibrary {
    pub fn failing(reason: &str) -> Self {
        Self {
            failure: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn assets(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().assets.clone()
    }

    pub fn albums(&self) -> Vec<(String, Vec<String>)> {
        self.state.lock().unwrap().albums.clone()
    }

    pub fn create_album_calls(&self) -> usize {
        self.state.lock().unwrap().create_album_calls
    }
}

impl MediaLibrary for FakeLibrary {
    fn create_asset(&self, file: &Path) -> Result<Asset, WallpaperError> {
        if let Some(reason) = &self.failure {
            return Err(WallpaperError::persistence(reason));
        }
        self.state.lock().unwrap().assets.push(file.to_path_buf());
        Ok(Asset {
            id: file.file_name().unwrap().to_string_lossy().into_owned(),
            path: file.to_path_buf(),
        })
    }

    fn find_album(&self, name: &str) -> Result<Option<Album>, WallpaperError> {
        let state = self.state.lock().unwrap();
        Ok(state.albums.iter().find(|(n, _)| n == name).map(|(n, _)| Album {
            name: n.clone(),
            path: PathBuf::from(n),
        }))
    }

    fn create_album(&self, name: &str, first: &Asset) -> Result<Album, WallpaperError> {
        let mut state = self.state.lock().unwrap();
        if state.albums.iter().any(|(n, _)| n == name) {
            return Err(WallpaperError::persistence("album already exists"));
        }
        state.create_album_calls += 1;
        state.albums.push((name.to_string(), vec![first.id.clone()]));
        Ok(Album {
            name: name.to_string(),
            path: PathBuf::from(name),
        })
    }

    fn add_to_album(&self, album: &Album, asset: &Asset) -> Result<(), WallpaperError> {
        let mut state = self.state.lock().unwrap();
        let entry = state
            .albums
            .iter_mut()
            .find(|(n, _)| *n == album.name)
            .ok_or_else(|| WallpaperError::persistence("no such album"))?;
        entry.1.push(asset.id.clone());
        Ok(())
    }
}

pub struct FakePermissions {
    status: Mutex<PermissionStatus>,
    on_request: PermissionStatus,
    requests: AtomicUsize,
}

impl FakePermissions {
    pub fn new(status: PermissionStatus, on_request: PermissionStatus) -> Self {
        Self {
            status: Mutex::new(status),
            on_request,
            requests: AtomicUsize::new(0),
        }
    }

    pub fn granted() -> Self {
        Self::new(PermissionStatus::Granted, PermissionStatus::Granted)
    }

    pub fn denied() -> Self {
        Self::new(PermissionStatus::Denied, PermissionStatus::Denied)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl PermissionGate for FakePermissions {
    fn status(&self) -> PermissionStatus {
        *self.status.lock().unwrap()
    }

    fn request(&self) -> PermissionStatus {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let mut status = self.status.lock().unwrap();
        *status = self.on_request;
        *status
    }
}
