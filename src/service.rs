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

//! The public sound service: load, play and release media action sounds.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, error, info, span, warn, Level};

use crate::config::Settings;
use crate::engine::{self, AudioEngine, EngineError, EngineHandle, LoadListener};
use crate::sounds::{SoundCatalog, SoundId};
use crate::state::{Completion, PlayRequest, SoundSlot, SoundState};
use crate::volume::{HostAudio, StereoVolume, VolumePolicy};
use crate::Error;

type Slots = [SoundSlot; SoundId::COUNT];

/// Plays the media action sounds through a shared audio engine.
///
/// Only one instance is needed for all sounds. Every method may be called from any
/// thread. Nothing here blocks waiting for a load: a play request made before its sound
/// is ready is started by the engine's completion notification instead.
///
/// An outstanding load can't be cancelled and has no timeout. If the engine never
/// reports back, that sound stays loading until [`SoundActionService::release`].
pub struct SoundActionService {
    catalog: SoundCatalog,
    sounds: Arc<Slots>,
    /// The engine, or None once released. Calls hold the read side for their duration.
    engine: RwLock<Option<Arc<dyn AudioEngine>>>,
    /// Applied by [`SoundActionService::play_with_host_volume`].
    volume_policy: VolumePolicy,
}

impl SoundActionService {
    /// Creates a service over the given engine and registers for its load notifications.
    pub fn new(catalog: SoundCatalog, engine: Arc<dyn AudioEngine>) -> SoundActionService {
        let sounds: Arc<Slots> = Arc::new(SoundId::ALL.map(SoundSlot::new));
        engine.set_load_listener(Arc::new(LoadCompleteHandler {
            sounds: sounds.clone(),
        }));

        info!(engine = %engine, dirs = ?catalog.dirs(), "Sound service created");
        SoundActionService {
            catalog,
            sounds,
            engine: RwLock::new(Some(engine)),
            volume_policy: VolumePolicy::default(),
        }
    }

    /// Replaces the volume policy used by [`SoundActionService::play_with_host_volume`].
    pub fn with_volume_policy(mut self, volume_policy: VolumePolicy) -> SoundActionService {
        self.volume_policy = volume_policy;
        self
    }

    /// Creates a service with the catalog and engine described by the settings.
    pub fn from_settings(settings: &Settings) -> Result<SoundActionService, Error> {
        let engine = engine::from_settings(settings.engine())?;
        Ok(
            SoundActionService::new(SoundCatalog::from_settings(settings), engine)
                .with_volume_policy(*settings.volume_policy()),
        )
    }

    /// Returns the volume policy used by [`SoundActionService::play_with_host_volume`].
    pub fn volume_policy(&self) -> &VolumePolicy {
        &self.volume_policy
    }

    /// Returns the catalog the sounds are loaded from.
    pub fn catalog(&self) -> &SoundCatalog {
        &self.catalog
    }

    /// Preloads a sound to cut the latency of its first play.
    ///
    /// Returns false if no candidate directory had a usable asset, or if the sound is
    /// already loaded or loading.
    pub fn load(&self, id: SoundId) -> Result<bool, Error> {
        let engine = self.engine.read();
        let engine = engine.as_deref().ok_or(Error::Released)?;

        let slot = &self.sounds[id.index()];
        let mut state = slot.lock();
        if let SoundState::NotLoaded = *state {
            match self.load_sound(engine, id) {
                Some(handle) => {
                    state.start_loading(handle, None);
                    Ok(true)
                }
                None => {
                    error!(sound = %id, "load() error loading sound");
                    Ok(false)
                }
            }
        } else {
            warn!(sound = %id, state = %state.lifecycle(), "load() called in wrong state");
            Ok(false)
        }
    }

    /// Plays a sound. Pass `1.0` for full volume or `(left, right)` for separate
    /// channel volumes; both are clamped to [0, 1].
    ///
    /// A sound that isn't loaded yet is loaded first and played once loading completes.
    /// Plays requested while loading collapse into one, at the most recent volume. A
    /// sound that can't be loaded is dropped without an error.
    pub fn play(&self, id: SoundId, volume: impl Into<StereoVolume>) -> Result<(), Error> {
        let volume = volume.into();
        let engine = self.engine.read();
        let engine = engine.as_deref().ok_or(Error::Released)?;

        let slot = &self.sounds[id.index()];
        let mut state = slot.lock();
        match state.request_play(volume) {
            PlayRequest::NeedsLoad => match self.load_sound(engine, id) {
                Some(handle) => {
                    state.start_loading(handle, Some(volume));
                    debug!(sound = %id, handle = %handle, "Play deferred until loaded");
                }
                None => error!(sound = %id, "play() error loading sound"),
            },
            PlayRequest::Deferred => {
                debug!(sound = %id, ?volume, "Play deferred until loaded");
            }
            PlayRequest::PlayNow(handle) => {
                drop(state);
                if let Err(e) = engine.play(handle, volume) {
                    warn!(sound = %id, err = %e, "Failed to play sound");
                }
            }
        }
        Ok(())
    }

    /// Plays a sound at the volume the host's audio settings call for. Nothing is played
    /// while the ringer is silent or on vibrate.
    pub fn play_with_volume_policy(
        &self,
        id: SoundId,
        host: &dyn HostAudio,
        policy: &VolumePolicy,
    ) -> Result<(), Error> {
        match policy.volume(host) {
            Some(volume) => self.play(id, volume),
            None => {
                if self.is_released() {
                    return Err(Error::Released);
                }
                debug!(sound = %id, "Ringer is silenced, not playing");
                Ok(())
            }
        }
    }

    /// Plays a sound at the host's volume using the service's own volume policy.
    pub fn play_with_host_volume(&self, id: SoundId, host: &dyn HostAudio) -> Result<(), Error> {
        self.play_with_volume_policy(id, host, &self.volume_policy)
    }

    /// Returns a snapshot of a sound's state.
    pub fn state(&self, id: SoundId) -> SoundState {
        *self.sounds[id.index()].lock()
    }

    /// Returns true once the service has been released.
    pub fn is_released(&self) -> bool {
        self.engine.read().is_none()
    }

    /// Frees every sound and the engine. Any later load or play fails with
    /// [`Error::Released`]. Calling this again does nothing.
    pub fn release(&self) {
        let mut engine = self.engine.write();
        let Some(released) = engine.take() else {
            return;
        };

        for slot in self.sounds.iter() {
            slot.lock().reset();
        }
        released.release();
        info!(engine = %released, "Sound service released");
    }

    /// Tries each candidate path until the engine accepts one.
    fn load_sound(&self, engine: &dyn AudioEngine, id: SoundId) -> Option<EngineHandle> {
        let span = span!(Level::DEBUG, "load sound", sound = %id);
        let _enter = span.enter();

        for path in self.catalog.candidates(id) {
            match engine.load(&path) {
                Ok(handle) => {
                    info!(path = ?path, handle = %handle, "Loading sound");
                    return Some(handle);
                }
                Err(e) => debug!(path = ?path, err = %e, "Candidate rejected"),
            }
        }
        None
    }
}

impl Drop for SoundActionService {
    fn drop(&mut self) {
        self.release();
    }
}

/// Applies the engine's load completion notifications to the sounds.
struct LoadCompleteHandler {
    sounds: Arc<Slots>,
}

impl LoadListener for LoadCompleteHandler {
    fn on_load_complete(
        &self,
        engine: &dyn AudioEngine,
        handle: EngineHandle,
        status: Result<(), EngineError>,
    ) {
        for slot in self.sounds.iter() {
            // Compare under the lock: a load that was just accepted may still be
            // recording its handle.
            let mut state = slot.lock();
            if state.handle() != Some(handle) {
                continue;
            }

            let completion = state.complete_load(status.is_ok());
            drop(state);

            let id = slot.id();
            match completion {
                Completion::Failed => {
                    if let Err(e) = status {
                        error!(sound = %id, handle = %handle, err = %e, "Error loading sound");
                    }
                }
                Completion::Loaded => debug!(sound = %id, handle = %handle, "Sound loaded"),
                Completion::PlayDeferred(handle, volume) => {
                    debug!(sound = %id, handle = %handle, "Sound loaded, playing deferred request");
                    if let Err(e) = engine.play(handle, volume) {
                        warn!(sound = %id, err = %e, "Failed to play sound");
                    }
                }
                Completion::Unexpected(lifecycle) => {
                    error!(sound = %id, state = %lifecycle, "Load completion in wrong state");
                }
            }
            return;
        }

        debug!(handle = %handle, "Load completion for a handle no sound owns");
    }
}

#[cfg(test)]
mod test {
    use std::sync::Barrier;
    use std::thread;

    use super::*;
    use crate::engine::mock;
    use crate::state::Lifecycle;
    use crate::testutil::{eventually, init_tracing};
    use crate::volume::{FixedHostAudio, RingerMode, StreamKind};

    fn service() -> (SoundActionService, Arc<mock::Engine>) {
        init_tracing();
        let engine = mock::Engine::new("mock");
        let service = SoundActionService::new(SoundCatalog::default(), engine.clone());
        (service, engine)
    }

    #[test]
    fn test_load_moves_to_loading() {
        let (service, engine) = service();
        for id in SoundId::ALL {
            assert!(service.load(id).unwrap());
            assert_eq!(service.state(id).lifecycle(), Lifecycle::Loading);
            assert!(service.state(id).handle().is_some());
        }
        assert_eq!(engine.load_calls(), SoundId::COUNT);
    }

    #[test]
    fn test_load_falls_back_to_next_directory() {
        let (service, engine) = service();
        engine.reject_dir("/product/media/audio/ui");

        assert!(service.load(SoundId::FocusComplete).unwrap());
        assert_eq!(
            engine.loaded_paths(),
            vec![std::path::PathBuf::from(
                "/system/media/audio/ui/camera_focus.ogg"
            )]
        );
        assert_eq!(engine.load_calls(), 2);
    }

    #[test]
    fn test_load_fails_when_no_directory_accepts() {
        let (service, engine) = service();
        engine.reject_dir("/product/media/audio/ui");
        engine.reject_dir("/system/media/audio/ui");

        assert!(!service.load(SoundId::ShutterClick).unwrap());
        assert_eq!(service.state(SoundId::ShutterClick), SoundState::NotLoaded);
        assert_eq!(engine.load_calls(), 2);
    }

    #[test]
    fn test_load_in_wrong_state_is_a_noop() {
        let (service, engine) = service();
        assert!(service.load(SoundId::ShutterClick).unwrap());
        let before = service.state(SoundId::ShutterClick);

        assert!(!service.load(SoundId::ShutterClick).unwrap());
        assert_eq!(service.state(SoundId::ShutterClick), before);
        assert_eq!(engine.load_calls(), 1);
    }

    #[test]
    fn test_play_then_complete() {
        let (service, engine) = service();
        service.play(SoundId::ShutterClick, (0.5, 0.5)).unwrap();
        assert_eq!(
            service.state(SoundId::ShutterClick).lifecycle(),
            Lifecycle::LoadingPlayRequested
        );
        assert!(engine.plays().is_empty());

        let handle = service.state(SoundId::ShutterClick).handle().unwrap();
        engine.complete(handle, Ok(()));

        assert_eq!(engine.load_calls(), 1);
        assert_eq!(engine.plays(), vec![(handle, StereoVolume::new(0.5, 0.5))]);
        assert_eq!(
            service.state(SoundId::ShutterClick),
            SoundState::Loaded(handle)
        );
    }

    #[test]
    fn test_rapid_plays_coalesce_to_last() {
        let (service, engine) = service();
        service.play(SoundId::StartVideoRecording, 0.2).unwrap();
        service.play(SoundId::StartVideoRecording, (0.7, 0.9)).unwrap();

        let handle = service.state(SoundId::StartVideoRecording).handle().unwrap();
        engine.complete(handle, Ok(()));

        assert_eq!(engine.load_calls(), 1);
        assert_eq!(engine.plays(), vec![(handle, StereoVolume::new(0.7, 0.9))]);
    }

    #[test]
    fn test_play_after_preload_is_deferred() {
        let (service, engine) = service();
        assert!(service.load(SoundId::FocusComplete).unwrap());
        service.play(SoundId::FocusComplete, 1.0).unwrap();
        assert_eq!(
            service.state(SoundId::FocusComplete).pending_volume(),
            Some(StereoVolume::FULL)
        );

        let handle = service.state(SoundId::FocusComplete).handle().unwrap();
        engine.complete(handle, Ok(()));
        assert_eq!(engine.plays(), vec![(handle, StereoVolume::FULL)]);
    }

    #[test]
    fn test_preload_completion_does_not_play() {
        let (service, engine) = service();
        assert!(service.load(SoundId::FocusComplete).unwrap());
        let handle = service.state(SoundId::FocusComplete).handle().unwrap();
        engine.complete(handle, Ok(()));

        assert!(engine.plays().is_empty());
        assert_eq!(
            service.state(SoundId::FocusComplete),
            SoundState::Loaded(handle)
        );
    }

    #[test]
    fn test_loaded_plays_immediately_without_reloading() {
        let (service, engine) = service();
        assert!(service.load(SoundId::ShutterClick).unwrap());
        let handle = service.state(SoundId::ShutterClick).handle().unwrap();
        engine.complete(handle, Ok(()));

        service.play(SoundId::ShutterClick, 1.0).unwrap();
        service.play(SoundId::ShutterClick, 0.3).unwrap();

        assert_eq!(engine.load_calls(), 1);
        assert_eq!(
            engine.plays(),
            vec![
                (handle, StereoVolume::FULL),
                (handle, StereoVolume::uniform(0.3))
            ]
        );
    }

    #[test]
    fn test_failed_completion_resets() {
        let (service, engine) = service();
        service.play(SoundId::StopVideoRecording, 1.0).unwrap();
        let handle = service.state(SoundId::StopVideoRecording).handle().unwrap();

        engine.complete(
            handle,
            Err(EngineError::Decode {
                path: "VideoStop.ogg".into(),
                reason: "corrupt".to_string(),
            }),
        );

        assert_eq!(
            service.state(SoundId::StopVideoRecording),
            SoundState::NotLoaded
        );
        assert!(engine.plays().is_empty());

        // The sound can be loaded again afterwards.
        assert!(service.load(SoundId::StopVideoRecording).unwrap());
        assert_eq!(engine.load_calls(), 2);
    }

    #[test]
    fn test_failed_completion_resets_loaded_sound() {
        let (service, engine) = service();
        assert!(service.load(SoundId::ShutterClick).unwrap());
        let handle = service.state(SoundId::ShutterClick).handle().unwrap();
        engine.complete(handle, Ok(()));

        engine.complete(handle, Err(EngineError::UnknownHandle(handle)));
        assert_eq!(service.state(SoundId::ShutterClick), SoundState::NotLoaded);
    }

    #[test]
    fn test_duplicate_success_is_ignored() {
        let (service, engine) = service();
        assert!(service.load(SoundId::ShutterClick).unwrap());
        let handle = service.state(SoundId::ShutterClick).handle().unwrap();
        engine.complete(handle, Ok(()));
        engine.complete(handle, Ok(()));

        assert_eq!(
            service.state(SoundId::ShutterClick),
            SoundState::Loaded(handle)
        );
        assert!(engine.plays().is_empty());
    }

    #[test]
    fn test_completion_for_unknown_handle_is_ignored() {
        let (service, engine) = service();
        assert!(service.load(SoundId::ShutterClick).unwrap());
        let handle = service.state(SoundId::ShutterClick).handle().unwrap();

        engine.complete(EngineHandle::new(handle.get() + 100).unwrap(), Ok(()));
        assert_eq!(service.state(SoundId::ShutterClick).lifecycle(), Lifecycle::Loading);
    }

    #[test]
    fn test_release_then_use_fails() {
        let (service, engine) = service();
        service.play(SoundId::ShutterClick, 1.0).unwrap();
        assert!(service.load(SoundId::FocusComplete).unwrap());
        let calls = engine.load_calls();

        service.release();
        assert!(service.is_released());
        assert_eq!(engine.release_calls(), 1);
        for id in SoundId::ALL {
            assert_eq!(service.state(id), SoundState::NotLoaded);
        }

        assert!(matches!(service.load(SoundId::ShutterClick), Err(Error::Released)));
        assert!(matches!(
            service.play(SoundId::ShutterClick, 1.0),
            Err(Error::Released)
        ));
        assert_eq!(engine.load_calls(), calls);
        assert_eq!(engine.play_calls(), 0);

        service.release();
        assert_eq!(engine.release_calls(), 1);
    }

    #[test]
    fn test_drop_releases_engine() {
        let (service, engine) = service();
        drop(service);
        assert_eq!(engine.release_calls(), 1);
    }

    #[test]
    fn test_concurrent_plays_load_once() {
        const THREADS: usize = 16;

        let (service, engine) = service();
        let service = Arc::new(service);
        let barrier = Arc::new(Barrier::new(THREADS));

        let joins: Vec<_> = (0..THREADS)
            .map(|i| {
                let service = service.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    service
                        .play(SoundId::ShutterClick, i as f32 / THREADS as f32)
                        .unwrap();
                })
            })
            .collect();
        for join in joins {
            join.join().unwrap();
        }

        assert_eq!(engine.load_calls(), 1);
        let state = service.state(SoundId::ShutterClick);
        assert_eq!(state.lifecycle(), Lifecycle::LoadingPlayRequested);
        assert!(state.handle().is_some());

        engine.complete(state.handle().unwrap(), Ok(()));
        assert_eq!(engine.play_calls(), 1);
    }

    #[test]
    fn test_completion_racing_plays() {
        let (service, engine) = service();
        let service = Arc::new(service);

        // Each thread counts the plays made once the sound was already loaded; those
        // must reach the engine directly.
        let mut joins: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                thread::spawn(move || {
                    let mut after_loaded: usize = 0;
                    for _ in 0..50 {
                        let loaded =
                            service.state(SoundId::FocusComplete).lifecycle() == Lifecycle::Loaded;
                        service.play(SoundId::FocusComplete, 1.0).unwrap();
                        if loaded {
                            after_loaded += 1;
                        }
                    }
                    after_loaded
                })
            })
            .collect();

        // Complete the load while the plays are still coming in.
        joins.push({
            let service = service.clone();
            let engine = engine.clone();
            thread::spawn(move || {
                let handle = loop {
                    if let Some(handle) = service.state(SoundId::FocusComplete).handle() {
                        break handle;
                    }
                    thread::yield_now();
                };
                engine.complete(handle, Ok(()));
                0
            })
        });
        let after_loaded: usize = joins.into_iter().map(|join| join.join().unwrap()).sum();

        assert_eq!(
            service.state(SoundId::FocusComplete).lifecycle(),
            Lifecycle::Loaded
        );
        assert_eq!(engine.load_calls(), 1);

        // The deferred play plus every play made once loaded. Plays that raced the
        // completion may have gone either way.
        let played = engine.play_calls();
        assert!(played >= after_loaded + 1);
        assert!(played <= 400);

        for _ in 0..10 {
            service.play(SoundId::FocusComplete, 0.5).unwrap();
        }
        assert_eq!(engine.play_calls(), played + 10);
        assert_eq!(engine.load_calls(), 1);
    }

    #[test]
    fn test_volume_policy_vibrate_plays_nothing() {
        let (service, engine) = service();
        let host = FixedHostAudio {
            ringer_mode: RingerMode::Vibrate,
            volume: 10,
            max_volume: 10,
        };

        service
            .play_with_volume_policy(SoundId::ShutterClick, &host, &VolumePolicy::default())
            .unwrap();
        assert_eq!(engine.load_calls(), 0);
        assert_eq!(engine.play_calls(), 0);
    }

    #[test]
    fn test_volume_policy_normal_uses_stream_volume() {
        let (service, engine) = service();
        let host = FixedHostAudio {
            ringer_mode: RingerMode::Normal,
            volume: 3,
            max_volume: 4,
        };
        let policy = VolumePolicy::new(StreamKind::System, 1.0);

        service
            .play_with_volume_policy(SoundId::ShutterClick, &host, &policy)
            .unwrap();
        let handle = service.state(SoundId::ShutterClick).handle().unwrap();
        engine.complete(handle, Ok(()));
        assert_eq!(engine.plays(), vec![(handle, StereoVolume::uniform(0.75))]);
    }

    #[test]
    fn test_volume_policy_after_release() {
        let (service, _engine) = service();
        service.release();
        let host = FixedHostAudio {
            ringer_mode: RingerMode::Silent,
            volume: 0,
            max_volume: 10,
        };
        assert!(matches!(
            service.play_with_volume_policy(SoundId::ShutterClick, &host, &VolumePolicy::default()),
            Err(Error::Released)
        ));
    }

    #[test]
    fn test_from_settings_with_mock_engine() {
        init_tracing();
        let settings = Settings::from_yaml_str(
            "sound_dirs:\n  - /opt/sounds\nengine:\n  device: mock-settings\n",
        )
        .unwrap();
        let service = SoundActionService::from_settings(&settings).unwrap();
        assert_eq!(
            service.catalog().dirs(),
            [std::path::PathBuf::from("/opt/sounds")].as_slice()
        );

        service.play(SoundId::ShutterClick, 1.0).unwrap();
        eventually(
            || service.state(SoundId::ShutterClick).lifecycle() == Lifecycle::Loaded,
            "Sound never finished loading",
        );
    }

    /// Engine whose play looks at the sound's state, which needs the sound's lock.
    struct StateCheckingEngine {
        inner: Arc<mock::Engine>,
        listener: RwLock<Option<Arc<dyn LoadListener>>>,
        service: parking_lot::Mutex<std::sync::Weak<SoundActionService>>,
        seen: parking_lot::Mutex<Vec<SoundState>>,
    }

    impl StateCheckingEngine {
        fn complete(&self, handle: EngineHandle) {
            let listener = self.listener.read().clone();
            if let Some(listener) = listener {
                listener.on_load_complete(self, handle, Ok(()));
            }
        }
    }

    impl std::fmt::Display for StateCheckingEngine {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "state-checking {}", self.inner)
        }
    }

    impl AudioEngine for StateCheckingEngine {
        fn set_load_listener(&self, listener: Arc<dyn LoadListener>) {
            *self.listener.write() = Some(listener);
        }

        fn load(&self, path: &std::path::Path) -> Result<EngineHandle, EngineError> {
            self.inner.load(path)
        }

        fn play(&self, handle: EngineHandle, volume: StereoVolume) -> Result<(), EngineError> {
            let service = self.service.lock().upgrade();
            if let Some(service) = service {
                self.seen.lock().push(service.state(SoundId::ShutterClick));
            }
            self.inner.play(handle, volume)
        }

        fn release(&self) {
            self.inner.release();
        }
    }

    #[test]
    fn test_engine_played_without_sound_locked() {
        init_tracing();
        let engine = Arc::new(StateCheckingEngine {
            inner: mock::Engine::new("mock"),
            listener: RwLock::new(None),
            service: parking_lot::Mutex::new(std::sync::Weak::new()),
            seen: parking_lot::Mutex::new(Vec::new()),
        });
        let service = Arc::new(SoundActionService::new(
            SoundCatalog::default(),
            engine.clone(),
        ));
        *engine.service.lock() = Arc::downgrade(&service);

        // If a play were made with the sound locked, the engine would deadlock on it,
        // so drive everything from another thread and wait for it to finish.
        let done = Arc::new(std::sync::atomic::AtomicBool::new(false));
        {
            let engine = engine.clone();
            let service = service.clone();
            let done = done.clone();
            thread::spawn(move || {
                service.play(SoundId::ShutterClick, 1.0).unwrap();
                let handle = service.state(SoundId::ShutterClick).handle().unwrap();
                // Deferred play from the completion notification.
                engine.complete(handle);
                // Immediate play of a loaded sound.
                service.play(SoundId::ShutterClick, 0.5).unwrap();
                done.store(true, std::sync::atomic::Ordering::SeqCst);
            });
        }
        eventually(
            || done.load(std::sync::atomic::Ordering::SeqCst),
            "Engine was called with the sound locked",
        );

        let handle = service.state(SoundId::ShutterClick).handle().unwrap();
        assert_eq!(
            *engine.seen.lock(),
            vec![SoundState::Loaded(handle), SoundState::Loaded(handle)]
        );
        assert_eq!(
            engine.inner.plays(),
            vec![
                (handle, StereoVolume::FULL),
                (handle, StereoVolume::uniform(0.5))
            ]
        );
    }

    #[test]
    fn test_play_with_host_volume_uses_service_policy() {
        let (service, engine) = service();
        let service = service.with_volume_policy(VolumePolicy::new(StreamKind::Alarm, 0.25));
        let host = FixedHostAudio {
            ringer_mode: RingerMode::Normal,
            volume: 5,
            max_volume: 0,
        };

        service
            .play_with_host_volume(SoundId::ShutterClick, &host)
            .unwrap();
        let handle = service.state(SoundId::ShutterClick).handle().unwrap();
        engine.complete(handle, Ok(()));
        assert_eq!(engine.plays(), vec![(handle, StereoVolume::uniform(0.25))]);
    }

    #[test]
    fn test_from_settings_keeps_volume_policy() {
        init_tracing();
        let settings = Settings::from_yaml_str(
            "engine:\n  device: mock-policy\nvolume_policy:\n  stream: notification\n  default_volume: 0.4\n",
        )
        .unwrap();
        let service = SoundActionService::from_settings(&settings).unwrap();
        assert_eq!(
            *service.volume_policy(),
            VolumePolicy::new(StreamKind::Notification, 0.4)
        );
    }

    #[test]
    fn test_sounds_are_independent() {
        let (service, engine) = service();
        service.play(SoundId::ShutterClick, 1.0).unwrap();
        assert!(service.load(SoundId::FocusComplete).unwrap());

        let focus = service.state(SoundId::FocusComplete).handle().unwrap();
        engine.complete(focus, Ok(()));

        assert_eq!(
            service.state(SoundId::ShutterClick).lifecycle(),
            Lifecycle::LoadingPlayRequested
        );
        assert_eq!(
            service.state(SoundId::FocusComplete),
            SoundState::Loaded(focus)
        );
        assert!(engine.plays().is_empty());
    }
}
