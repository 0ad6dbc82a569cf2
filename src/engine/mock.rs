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
use std::{
    fmt,
    path::{Path, PathBuf},
    sync::{Arc, Weak},
    thread,
};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use super::{AudioEngine, EngineError, EngineHandle, LoadListener};
use crate::volume::StereoVolume;

/// A mock engine. Doesn't actually play anything, but remembers every call made to it.
///
/// Loads are accepted unless their directory has been rejected. Completion
/// notifications are delivered by [`Engine::complete`], or automatically from a
/// spawned thread for an auto-completing engine.
pub struct Engine {
    name: String,
    auto_complete: bool,
    this: Weak<Engine>,
    listener: RwLock<Option<Arc<dyn LoadListener>>>,
    calls: Mutex<Calls>,
}

#[derive(Default)]
struct Calls {
    next_handle: u32,
    load_calls: usize,
    play_calls: usize,
    release_calls: usize,
    released: bool,
    rejected_dirs: Vec<PathBuf>,
    loaded_paths: Vec<PathBuf>,
    plays: Vec<(EngineHandle, StereoVolume)>,
}

impl Engine {
    /// Gets a mock engine whose loads complete only when told to.
    pub fn new(name: &str) -> Arc<Engine> {
        Engine::build(name, false)
    }

    /// Gets a mock engine that reports every accepted load as successful from its own
    /// thread.
    pub fn auto_completing(name: &str) -> Arc<Engine> {
        Engine::build(name, true)
    }

    fn build(name: &str, auto_complete: bool) -> Arc<Engine> {
        Arc::new_cyclic(|this| Engine {
            name: name.to_string(),
            auto_complete,
            this: this.clone(),
            listener: RwLock::new(None),
            calls: Mutex::new(Calls {
                next_handle: 1,
                ..Default::default()
            }),
        })
    }

    /// Refuses every load from the given directory.
    pub fn reject_dir<P: AsRef<Path>>(&self, dir: P) {
        self.calls
            .lock()
            .rejected_dirs
            .push(dir.as_ref().to_path_buf());
    }

    /// Delivers a load completion notification on the calling thread, the way the
    /// engine's own thread would.
    pub fn complete(&self, handle: EngineHandle, status: Result<(), EngineError>) {
        let listener = self.listener.read().clone();
        match listener {
            Some(listener) => listener.on_load_complete(self, handle, status),
            None => debug!(handle = %handle, "No listener for load completion"),
        }
    }

    /// The number of load calls, accepted or not.
    pub fn load_calls(&self) -> usize {
        self.calls.lock().load_calls
    }

    /// The number of play calls, successful or not.
    pub fn play_calls(&self) -> usize {
        self.calls.lock().play_calls
    }

    pub fn release_calls(&self) -> usize {
        self.calls.lock().release_calls
    }

    /// The paths of every accepted load, in order.
    pub fn loaded_paths(&self) -> Vec<PathBuf> {
        self.calls.lock().loaded_paths.clone()
    }

    /// Every successful play, in order.
    pub fn plays(&self) -> Vec<(EngineHandle, StereoVolume)> {
        self.calls.lock().plays.clone()
    }
}

impl AudioEngine for Engine {
    fn set_load_listener(&self, listener: Arc<dyn LoadListener>) {
        *self.listener.write() = Some(listener);
    }

    fn load(&self, path: &Path) -> Result<EngineHandle, EngineError> {
        let handle = {
            let mut calls = self.calls.lock();
            calls.load_calls += 1;
            if calls.released {
                return Err(EngineError::Released);
            }
            if calls.rejected_dirs.iter().any(|dir| path.starts_with(dir)) {
                return Err(EngineError::NotFound(path.to_path_buf()));
            }

            let handle = EngineHandle::new(calls.next_handle)
                .ok_or_else(|| EngineError::Device("handles exhausted".to_string()))?;
            calls.next_handle += 1;
            calls.loaded_paths.push(path.to_path_buf());
            handle
        };

        info!(device = self.name, path = ?path, handle = %handle, "Loading sample (mock)");

        if self.auto_complete {
            let this = self.this.clone();
            thread::spawn(move || {
                if let Some(engine) = this.upgrade() {
                    engine.complete(handle, Ok(()));
                }
            });
        }
        Ok(handle)
    }

    fn play(&self, handle: EngineHandle, volume: StereoVolume) -> Result<(), EngineError> {
        let mut calls = self.calls.lock();
        calls.play_calls += 1;
        if calls.released {
            return Err(EngineError::Released);
        }
        if handle.get() >= calls.next_handle {
            return Err(EngineError::UnknownHandle(handle));
        }
        calls.plays.push((handle, volume));
        debug!(device = self.name, handle = %handle, ?volume, "Playing sample (mock)");
        Ok(())
    }

    fn release(&self) {
        {
            let mut calls = self.calls.lock();
            calls.release_calls += 1;
            calls.released = true;
        }
        *self.listener.write() = None;
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}
