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
use serde::Deserialize;

const DEFAULT_DEVICE: &str = "default";
const DEFAULT_MAX_STREAMS: usize = 1;

/// A YAML representation of the audio engine configuration.
#[derive(Deserialize, Clone, Debug)]
pub struct EngineSettings {
    /// The output device. "default" is the host's default output, names starting with
    /// "mock" select the mock engine.
    #[serde(default = "default_device")]
    device: String,

    /// Sounds that may play at once (default: 1). A new sound steals the oldest.
    max_streams: Option<usize>,
}

fn default_device() -> String {
    DEFAULT_DEVICE.to_string()
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings::new(DEFAULT_DEVICE)
    }
}

impl EngineSettings {
    /// New will create a new engine configuration.
    pub fn new(device: &str) -> EngineSettings {
        EngineSettings {
            device: device.to_string(),
            max_streams: None,
        }
    }

    /// Returns the device from the configuration.
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Returns the maximum number of simultaneous sounds, at least 1.
    pub fn max_streams(&self) -> usize {
        self.max_streams.unwrap_or(DEFAULT_MAX_STREAMS).max(1)
    }
}
