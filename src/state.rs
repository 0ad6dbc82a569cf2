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

//! Per-sound load/playback state.
//!
//! A sound moves `NotLoaded -> Loading -> Loaded`, passing through
//! `LoadingPlayRequested` if someone asks to play it before the engine has finished
//! loading. Every sound has its own lock so that a completion notification for one
//! sound never waits on a play request for another.

use std::fmt;

use parking_lot::{Mutex, MutexGuard};

use crate::engine::EngineHandle;
use crate::sounds::SoundId;
use crate::volume::StereoVolume;

/// Lifecycle of a sound without the data attached to each state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    NotLoaded,
    Loading,
    LoadingPlayRequested,
    Loaded,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Lifecycle::NotLoaded => "not loaded",
            Lifecycle::Loading => "loading",
            Lifecycle::LoadingPlayRequested => "loading (play requested)",
            Lifecycle::Loaded => "loaded",
        };
        f.write_str(name)
    }
}

/// The state of one sound. A handle exists exactly when the engine has accepted a load.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum SoundState {
    #[default]
    NotLoaded,
    Loading(EngineHandle),
    /// Loading, with a playback to start at `volume` once the load completes.
    LoadingPlayRequested {
        handle: EngineHandle,
        volume: StereoVolume,
    },
    Loaded(EngineHandle),
}

/// What a play request needs the caller to do next.
#[derive(Debug, PartialEq)]
pub(crate) enum PlayRequest {
    /// Nothing is loaded yet. The caller must start a load and then call
    /// [`SoundState::start_loading`] with the volume.
    NeedsLoad,
    /// The play was recorded and will happen when loading completes.
    Deferred,
    /// The sample is ready; play it now.
    PlayNow(EngineHandle),
}

/// What a load completion notification needs the caller to do next.
#[derive(Debug, PartialEq)]
pub(crate) enum Completion {
    /// The load failed and the sound is back to not loaded.
    Failed,
    /// The sound is loaded and nobody is waiting on it.
    Loaded,
    /// The sound is loaded and a deferred play must be started.
    PlayDeferred(EngineHandle, StereoVolume),
    /// The notification arrived in a state that wasn't waiting for one.
    Unexpected(Lifecycle),
}

impl SoundState {
    pub fn lifecycle(&self) -> Lifecycle {
        match self {
            SoundState::NotLoaded => Lifecycle::NotLoaded,
            SoundState::Loading(_) => Lifecycle::Loading,
            SoundState::LoadingPlayRequested { .. } => Lifecycle::LoadingPlayRequested,
            SoundState::Loaded(_) => Lifecycle::Loaded,
        }
    }

    pub fn handle(&self) -> Option<EngineHandle> {
        match *self {
            SoundState::NotLoaded => None,
            SoundState::Loading(handle)
            | SoundState::LoadingPlayRequested { handle, .. }
            | SoundState::Loaded(handle) => Some(handle),
        }
    }

    /// The volume of the play waiting on the load, if there is one.
    pub fn pending_volume(&self) -> Option<StereoVolume> {
        match *self {
            SoundState::LoadingPlayRequested { volume, .. } => Some(volume),
            _ => None,
        }
    }

    /// Records that the engine accepted a load. `play` carries the volume when the load
    /// was started by a play request.
    pub(crate) fn start_loading(&mut self, handle: EngineHandle, play: Option<StereoVolume>) {
        debug_assert_eq!(self.lifecycle(), Lifecycle::NotLoaded);
        *self = match play {
            Some(volume) => SoundState::LoadingPlayRequested { handle, volume },
            None => SoundState::Loading(handle),
        };
    }

    /// Handles a play request. Repeated requests while loading collapse into one,
    /// keeping the most recent volume.
    pub(crate) fn request_play(&mut self, volume: StereoVolume) -> PlayRequest {
        match *self {
            SoundState::NotLoaded => PlayRequest::NeedsLoad,
            SoundState::Loading(handle) | SoundState::LoadingPlayRequested { handle, .. } => {
                *self = SoundState::LoadingPlayRequested { handle, volume };
                PlayRequest::Deferred
            }
            SoundState::Loaded(handle) => PlayRequest::PlayNow(handle),
        }
    }

    /// Applies a load completion notification for this sound's handle.
    pub(crate) fn complete_load(&mut self, succeeded: bool) -> Completion {
        if !succeeded {
            *self = SoundState::NotLoaded;
            return Completion::Failed;
        }

        match *self {
            SoundState::Loading(handle) => {
                *self = SoundState::Loaded(handle);
                Completion::Loaded
            }
            SoundState::LoadingPlayRequested { handle, volume } => {
                *self = SoundState::Loaded(handle);
                Completion::PlayDeferred(handle, volume)
            }
            other => Completion::Unexpected(other.lifecycle()),
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = SoundState::NotLoaded;
    }
}

/// A sound's state behind its own lock.
pub(crate) struct SoundSlot {
    id: SoundId,
    state: Mutex<SoundState>,
}

impl SoundSlot {
    pub(crate) fn new(id: SoundId) -> SoundSlot {
        SoundSlot {
            id,
            state: Mutex::new(SoundState::NotLoaded),
        }
    }

    pub(crate) fn id(&self) -> SoundId {
        self.id
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, SoundState> {
        self.state.lock()
    }
}
