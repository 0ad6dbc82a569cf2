// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! The audio engine that sound assets are loaded into and played from.
//!
//! Loading is asynchronous: [`AudioEngine::load`] hands back a handle right away and
//! the engine later reports the outcome to its [`LoadListener`] from a thread it owns.

use std::fmt;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::config::EngineSettings;
use crate::volume::StereoVolume;

pub mod cpal;
pub mod decode;
pub mod mixer;
pub mod mock;

/// Opaque identifier the engine assigns to a sample it has accepted for loading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EngineHandle(NonZeroU32);

impl EngineHandle {
    /// Wraps a raw engine identifier. Zero is never a valid handle.
    pub fn new(raw: u32) -> Option<EngineHandle> {
        NonZeroU32::new(raw).map(EngineHandle)
    }

    /// Returns the raw identifier.
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors reported by an audio engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Sound asset not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Audio engine has been released")]
    Released,

    #[error("No sample loaded for handle {0}")]
    UnknownHandle(EngineHandle),

    #[error("Failed to decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("Audio device error: {0}")]
    Device(String),
}

/// Receives load completion notifications. Called from an engine-owned thread, never
/// from inside [`AudioEngine::load`].
pub trait LoadListener: Send + Sync {
    /// Reports that the load identified by `handle` finished. The engine passes itself
    /// so the listener can start playback without holding its own reference.
    fn on_load_complete(
        &self,
        engine: &dyn AudioEngine,
        handle: EngineHandle,
        status: Result<(), EngineError>,
    );
}

/// A mixing engine that sound samples are loaded into.
///
/// `load` must return promptly and must not wait for the listener to run: callers hold
/// locks across it that the listener also takes.
pub trait AudioEngine: fmt::Display + Send + Sync {
    /// Registers the listener for load completion notifications, replacing any other.
    fn set_load_listener(&self, listener: Arc<dyn LoadListener>);

    /// Starts loading the asset at `path`. Failing here means the asset was not accepted
    /// and no notification will follow.
    fn load(&self, path: &Path) -> Result<EngineHandle, EngineError>;

    /// Plays a loaded sample once at the given volume.
    fn play(&self, handle: EngineHandle, volume: StereoVolume) -> Result<(), EngineError>;

    /// Frees every sample and stops delivering notifications. Any later call fails with
    /// [`EngineError::Released`].
    fn release(&self);
}

/// Opens the engine named by the settings.
pub fn from_settings(settings: &EngineSettings) -> Result<Arc<dyn AudioEngine>, EngineError> {
    let device = settings.device();
    if device.starts_with("mock") {
        info!(device, "Using mock audio engine");
        let engine: Arc<dyn AudioEngine> = mock::Engine::auto_completing(device);
        return Ok(engine);
    }

    Ok(Arc::new(cpal::Engine::open(settings)?))
}
