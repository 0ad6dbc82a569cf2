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
use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::sounds::SoundId;
use crate::volume::VolumePolicy;

mod engine;
mod error;

pub use engine::EngineSettings;
pub use error::ConfigError;

/// Prefix of environment variables that override file settings, e.g.
/// `ACTIONSOUND_ENGINE__DEVICE=mock`.
const ENV_PREFIX: &str = "ACTIONSOUND";

/// A YAML representation of the sound service configuration. Every field is optional.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct Settings {
    /// Directories searched for sound assets, in order.
    sound_dirs: Option<Vec<PathBuf>>,

    /// Asset file name overrides.
    sound_files: SoundFiles,

    /// The audio engine to play through.
    engine: EngineSettings,

    /// How the host's ringer and stream volume are applied.
    volume_policy: VolumePolicy,
}

/// Asset file name per sound. Unset sounds keep their default file.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct SoundFiles {
    shutter_click: Option<String>,
    focus_complete: Option<String>,
    start_video_recording: Option<String>,
    stop_video_recording: Option<String>,
}

impl SoundFiles {
    /// Returns the configured file for the sound, if any.
    pub fn file_for(&self, id: SoundId) -> Option<&str> {
        match id {
            SoundId::ShutterClick => self.shutter_click.as_deref(),
            SoundId::FocusComplete => self.focus_complete.as_deref(),
            SoundId::StartVideoRecording => self.start_video_recording.as_deref(),
            SoundId::StopVideoRecording => self.stop_video_recording.as_deref(),
        }
    }
}

impl Settings {
    /// Reads settings from a file (format chosen by extension), applying environment
    /// overrides on top.
    pub fn load(path: &Path) -> Result<Settings, ConfigError> {
        Settings::build(File::from(path))
    }

    /// Reads settings from a YAML string, applying environment overrides on top.
    pub fn from_yaml_str(yaml: &str) -> Result<Settings, ConfigError> {
        Settings::build(File::from_str(yaml, FileFormat::Yaml))
    }

    fn build<S>(source: S) -> Result<Settings, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        Ok(Config::builder()
            .add_source(source)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?)
    }

    /// Returns the configured sound directories, if overridden.
    pub fn sound_dirs(&self) -> Option<&[PathBuf]> {
        self.sound_dirs.as_deref()
    }

    pub fn sound_files(&self) -> &SoundFiles {
        &self.sound_files
    }

    pub fn engine(&self) -> &EngineSettings {
        &self.engine
    }

    pub fn volume_policy(&self) -> &VolumePolicy {
        &self.volume_policy
    }
}
