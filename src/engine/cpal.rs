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
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, AtomicU32, Ordering},
        Arc,
    },
    thread,
};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, span, Level};

use super::decode::{self, LoadedSample};
use super::mixer::Mixer;
use super::{AudioEngine, EngineError, EngineHandle, LoadListener};
use crate::config::EngineSettings;
use crate::volume::StereoVolume;

/// Frames reserved for the mix buffer when the host picks the buffer size.
const DEFAULT_BUFFER_FRAMES: usize = 8192;

/// A request for the loader thread.
struct LoadRequest {
    handle: EngineHandle,
    path: PathBuf,
}

/// Commands for the output stream callback.
enum MixerCommand {
    Play(LoadedSample, StereoVolume),
    StopAll,
}

/// An engine playing through a cpal output device.
///
/// Loads are decoded on the engine's loader thread, which also delivers the completion
/// notifications. Playback is mixed directly in the cpal callback.
pub struct Engine {
    core: Arc<Core>,
    /// Handle to the loader thread.
    loader_thread: Mutex<Option<thread::JoinHandle<()>>>,
    /// Handle to the thread keeping the cpal stream alive.
    output_thread: Mutex<Option<thread::JoinHandle<()>>>,
    /// Dropping this stops the output thread.
    shutdown_tx: Mutex<Option<Sender<()>>>,
}

/// State shared between the engine, its loader thread and listeners.
struct Core {
    /// The name of the device.
    name: String,
    /// Output sample rate; samples are resampled to it when loaded.
    sample_rate: u32,
    released: AtomicBool,
    next_handle: AtomicU32,
    samples: RwLock<HashMap<EngineHandle, LoadedSample>>,
    listener: RwLock<Option<Arc<dyn LoadListener>>>,
    load_tx: Mutex<Option<Sender<LoadRequest>>>,
    mixer_tx: Sender<MixerCommand>,
}

impl Engine {
    /// Opens the output device named by the settings and starts the engine threads.
    pub fn open(settings: &EngineSettings) -> Result<Engine, EngineError> {
        let span = span!(Level::INFO, "open engine (cpal)");
        let _enter = span.enter();

        let (device, name) = find_device(settings.device())?;
        let supported = device
            .default_output_config()
            .map_err(|e| EngineError::Device(e.to_string()))?;
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.config();
        let sample_rate = config.sample_rate.0;
        let num_channels = config.channels;

        let (mixer_tx, mixer_rx) = crossbeam_channel::unbounded();
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(0);
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);
        let mixer = Mixer::new(num_channels, settings.max_streams());

        // Streams can't always be moved between threads, so the stream is created and
        // kept on its own thread until shutdown.
        let output_thread = thread::spawn(move || {
            let stream = match sample_format {
                cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, mixer, mixer_rx),
                cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, mixer, mixer_rx),
                cpal::SampleFormat::I32 => build_stream::<i32>(&device, &config, mixer, mixer_rx),
                cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, mixer, mixer_rx),
                other => Err(format!("unsupported sample format {:?}", other)),
            };
            let stream = match stream.and_then(|stream| {
                stream.play().map_err(|e| e.to_string())?;
                Ok(stream)
            }) {
                Ok(stream) => {
                    let _ = ready_tx.send(Ok(()));
                    stream
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };

            // Wait for shutdown. The sender is dropped on release.
            let _ = shutdown_rx.recv();
            drop(stream);
        });

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = output_thread.join();
                return Err(EngineError::Device(e));
            }
            Err(_) => {
                let _ = output_thread.join();
                return Err(EngineError::Device("output thread exited".to_string()));
            }
        }

        let (core, load_rx) = Core::new(name, sample_rate, mixer_tx);
        let core = Arc::new(core);

        let loader_thread = {
            let core = core.clone();
            thread::spawn(move || core.run_loader(load_rx))
        };

        info!(
            device = core.name,
            sample_rate,
            channels = num_channels,
            max_streams = settings.max_streams(),
            "CPAL output stream started successfully"
        );

        Ok(Engine {
            core,
            loader_thread: Mutex::new(Some(loader_thread)),
            output_thread: Mutex::new(Some(output_thread)),
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
        })
    }
}

/// Finds the output device with the given name, or the host default for "default".
fn find_device(name: &str) -> Result<(cpal::Device, String), EngineError> {
    // Suppress noisy output here.
    let _shh_stderr = shh::stderr().ok();

    let host = cpal::default_host();
    let device = if name == "default" {
        host.default_output_device()
    } else {
        host.output_devices()
            .map_err(|e| EngineError::Device(e.to_string()))?
            .find(|device| device.name().is_ok_and(|n| n.trim() == name))
    };

    match device {
        Some(device) => {
            let device_name = device.name().unwrap_or_else(|_| name.to_string());
            Ok((device, device_name))
        }
        None => Err(EngineError::Device(format!(
            "no device found with name {}",
            name
        ))),
    }
}

/// Builds an output stream whose callback drains mixer commands and mixes into the
/// device buffer, converting from f32 where needed.
fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut mixer: Mixer,
    commands: Receiver<MixerCommand>,
) -> Result<cpal::Stream, String>
where
    T: cpal::SizedSample + cpal::Sample + cpal::FromSample<f32>,
{
    // Sized before the stream starts so the callback doesn't allocate.
    let buffer_frames = match config.buffer_size {
        cpal::BufferSize::Fixed(frames) => frames as usize,
        cpal::BufferSize::Default => DEFAULT_BUFFER_FRAMES,
    };
    let mut scratch: Vec<f32> = vec![0.0; buffer_frames * config.channels.max(1) as usize];
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                while let Ok(command) = commands.try_recv() {
                    match command {
                        MixerCommand::Play(sample, volume) => mixer.add(sample, volume),
                        MixerCommand::StopAll => mixer.clear(),
                    }
                }

                if scratch.len() < data.len() {
                    scratch.resize(data.len(), 0.0);
                }
                let scratch = &mut scratch[..data.len()];
                mixer.process(scratch);
                for (dst, &src) in data.iter_mut().zip(scratch.iter()) {
                    *dst = T::from_sample(src);
                }
            },
            |err| error!("CPAL output stream error: {}", err),
            None,
        )
        .map_err(|e| e.to_string())
}

impl Core {
    /// Creates the shared state along with the receiving end of its load queue.
    fn new(
        name: String,
        sample_rate: u32,
        mixer_tx: Sender<MixerCommand>,
    ) -> (Core, Receiver<LoadRequest>) {
        let (load_tx, load_rx) = crossbeam_channel::unbounded();
        let core = Core {
            name,
            sample_rate,
            released: AtomicBool::new(false),
            next_handle: AtomicU32::new(1),
            samples: RwLock::new(HashMap::new()),
            listener: RwLock::new(None),
            load_tx: Mutex::new(Some(load_tx)),
            mixer_tx,
        };
        (core, load_rx)
    }

    /// Decodes queued loads and reports each one to the listener. Exits once the
    /// request channel closes.
    fn run_loader(&self, requests: Receiver<LoadRequest>) {
        for request in requests.iter() {
            if self.released.load(Ordering::Acquire) {
                break;
            }

            let status = decode::decode_file(&request.path, self.sample_rate).map(|sample| {
                self.samples.write().insert(request.handle, sample);
            });
            if let Err(e) = &status {
                debug!(handle = %request.handle, err = %e, "Load failed");
            }

            let listener = self.listener.read().clone();
            if let Some(listener) = listener {
                listener.on_load_complete(self, request.handle, status);
            }
        }
        debug!(device = self.name, "Loader thread exiting");
    }
}

impl AudioEngine for Core {
    fn set_load_listener(&self, listener: Arc<dyn LoadListener>) {
        *self.listener.write() = Some(listener);
    }

    fn load(&self, path: &Path) -> Result<EngineHandle, EngineError> {
        if self.released.load(Ordering::Acquire) {
            return Err(EngineError::Released);
        }
        // Missing files are refused up front so the caller can try somewhere else.
        if !path.is_file() {
            return Err(EngineError::NotFound(path.to_path_buf()));
        }

        let handle = EngineHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed))
            .ok_or_else(|| EngineError::Device("handles exhausted".to_string()))?;
        let load_tx = self.load_tx.lock();
        let load_tx = load_tx.as_ref().ok_or(EngineError::Released)?;
        load_tx
            .send(LoadRequest {
                handle,
                path: path.to_path_buf(),
            })
            .map_err(|_| EngineError::Released)?;
        Ok(handle)
    }

    fn play(&self, handle: EngineHandle, volume: StereoVolume) -> Result<(), EngineError> {
        if self.released.load(Ordering::Acquire) {
            return Err(EngineError::Released);
        }
        let sample = self
            .samples
            .read()
            .get(&handle)
            .cloned()
            .ok_or(EngineError::UnknownHandle(handle))?;
        self.mixer_tx
            .send(MixerCommand::Play(sample, volume))
            .map_err(|_| EngineError::Released)
    }

    fn release(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }
        *self.listener.write() = None;
        self.load_tx.lock().take();
        self.samples.write().clear();
        let _ = self.mixer_tx.send(MixerCommand::StopAll);
    }
}

impl fmt::Display for Core {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} Hz)", self.name, self.sample_rate)
    }
}

impl AudioEngine for Engine {
    fn set_load_listener(&self, listener: Arc<dyn LoadListener>) {
        self.core.set_load_listener(listener);
    }

    fn load(&self, path: &Path) -> Result<EngineHandle, EngineError> {
        self.core.load(path)
    }

    fn play(&self, handle: EngineHandle, volume: StereoVolume) -> Result<(), EngineError> {
        self.core.play(handle, volume)
    }

    /// Stops both engine threads and waits for them.
    fn release(&self) {
        self.core.release();
        self.shutdown_tx.lock().take();

        if let Some(thread) = self.loader_thread.lock().take() {
            let _ = thread.join();
        }
        if let Some(thread) = self.output_thread.lock().take() {
            let _ = thread.join();
        }
        info!(device = self.core.name, "Engine released");
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (CPAL)", self.core)
    }
}
