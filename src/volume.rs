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

//! Playback volume and the host audio policy that decides it.

use serde::Deserialize;
use tracing::debug;

/// Left and right playback gains, each in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StereoVolume {
    left: f32,
    right: f32,
}

impl StereoVolume {
    pub const FULL: StereoVolume = StereoVolume {
        left: 1.0,
        right: 1.0,
    };

    /// Creates a volume, clamping both sides into [0, 1]. NaN is treated as silence.
    pub fn new(left: f32, right: f32) -> StereoVolume {
        StereoVolume {
            left: clamp_unit(left),
            right: clamp_unit(right),
        }
    }

    /// The same volume on both sides.
    pub fn uniform(volume: f32) -> StereoVolume {
        StereoVolume::new(volume, volume)
    }

    pub fn left(&self) -> f32 {
        self.left
    }

    pub fn right(&self) -> f32 {
        self.right
    }
}

impl Default for StereoVolume {
    fn default() -> Self {
        StereoVolume::FULL
    }
}

impl From<f32> for StereoVolume {
    fn from(volume: f32) -> Self {
        StereoVolume::uniform(volume)
    }
}

impl From<(f32, f32)> for StereoVolume {
    fn from((left, right): (f32, f32)) -> Self {
        StereoVolume::new(left, right)
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Host ringer setting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RingerMode {
    Normal,
    Silent,
    Vibrate,
}

/// Host audio stream whose volume the sounds should follow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    VoiceCall,
    System,
    Ring,
    #[default]
    Music,
    Alarm,
    Notification,
}

/// A failed query against the host audio subsystem.
#[derive(Debug, thiserror::Error)]
#[error("Host audio query failed: {0}")]
pub struct HostAudioError(pub String);

/// Queries the host audio routing subsystem.
pub trait HostAudio {
    fn ringer_mode(&self) -> Result<RingerMode, HostAudioError>;

    fn stream_volume(&self, stream: StreamKind) -> Result<u32, HostAudioError>;

    fn stream_max_volume(&self, stream: StreamKind) -> Result<u32, HostAudioError>;
}

/// Host audio that always reports the same values. Useful where there is no ringer
/// to consult.
#[derive(Clone, Debug)]
pub struct FixedHostAudio {
    pub ringer_mode: RingerMode,
    pub volume: u32,
    pub max_volume: u32,
}

impl HostAudio for FixedHostAudio {
    fn ringer_mode(&self) -> Result<RingerMode, HostAudioError> {
        Ok(self.ringer_mode)
    }

    fn stream_volume(&self, _: StreamKind) -> Result<u32, HostAudioError> {
        Ok(self.volume)
    }

    fn stream_max_volume(&self, _: StreamKind) -> Result<u32, HostAudioError> {
        Ok(self.max_volume)
    }
}

/// Derives a playback volume from the host's ringer mode and stream volume.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct VolumePolicy {
    /// The stream whose volume is followed.
    stream: StreamKind,
    /// Used when the stream volume can't be read.
    default_volume: f32,
}

impl Default for VolumePolicy {
    fn default() -> Self {
        VolumePolicy {
            stream: StreamKind::Music,
            default_volume: 1.0,
        }
    }
}

impl VolumePolicy {
    pub fn new(stream: StreamKind, default_volume: f32) -> VolumePolicy {
        VolumePolicy {
            stream,
            default_volume,
        }
    }

    pub fn stream(&self) -> StreamKind {
        self.stream
    }

    pub fn default_volume(&self) -> f32 {
        self.default_volume
    }

    /// Returns the volume to play at, or None if the host says to stay quiet.
    ///
    /// An unreadable ringer mode is treated as normal.
    pub fn volume(&self, host: &dyn HostAudio) -> Option<StereoVolume> {
        let ringer_mode = host.ringer_mode().unwrap_or_else(|e| {
            debug!(err = %e, "Unable to read ringer mode, assuming normal");
            RingerMode::Normal
        });

        match ringer_mode {
            RingerMode::Normal => Some(StereoVolume::uniform(self.stream_volume(host))),
            RingerMode::Silent | RingerMode::Vibrate => None,
        }
    }

    fn stream_volume(&self, host: &dyn HostAudio) -> f32 {
        let current = host.stream_volume(self.stream);
        let max = host.stream_max_volume(self.stream);
        match (current, max) {
            (Ok(current), Ok(max)) if max > 0 => current as f32 / max as f32,
            (Ok(_), Ok(_)) => self.default_volume,
            (Err(e), _) | (_, Err(e)) => {
                debug!(err = %e, stream = ?self.stream, "Unable to read stream volume, using default");
                self.default_volume
            }
        }
    }
}
