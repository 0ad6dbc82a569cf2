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

//! Plays the standard media action sounds (shutter click, focus complete, start and
//! stop of video recording) without callers having to manage sample buffers.
//!
//! Sounds are loaded into an [`engine::AudioEngine`] on demand. A play request that
//! arrives before loading has finished is held and started by the engine's load
//! completion notification.

pub mod config;
pub mod engine;
pub mod service;
pub mod sounds;
pub mod state;
pub mod volume;

#[cfg(test)]
mod testutil;

pub use config::Settings;
pub use service::SoundActionService;
pub use sounds::{SoundCatalog, SoundId};
pub use state::{Lifecycle, SoundState};
pub use volume::{HostAudio, RingerMode, StereoVolume, StreamKind, VolumePolicy};

/// Errors returned to callers of the sound service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown sound requested: {0}")]
    UnknownSound(usize),

    #[error("Sound service has been released and must not be used after release()")]
    Released,

    #[error(transparent)]
    Engine(#[from] engine::EngineError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}
