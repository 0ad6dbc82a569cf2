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

//! The fixed catalog of media action sounds and where to find them on disk.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::Settings;
use crate::Error;

/// Directories searched for sound assets, in order.
const DEFAULT_SOUND_DIRS: [&str; 2] = ["/product/media/audio/ui/", "/system/media/audio/ui/"];

/// One of the predefined media action sounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundId {
    /// Still image capture.
    ShutterClick,
    /// Focusing has completed. Deciding when that happens is up to the caller.
    FocusComplete,
    /// Start of video recording.
    StartVideoRecording,
    /// End of video recording.
    StopVideoRecording,
}

impl SoundId {
    /// Number of sounds in the catalog.
    pub const COUNT: usize = 4;

    /// Every sound, in catalog order.
    pub const ALL: [SoundId; SoundId::COUNT] = [
        SoundId::ShutterClick,
        SoundId::FocusComplete,
        SoundId::StartVideoRecording,
        SoundId::StopVideoRecording,
    ];

    /// Converts a raw catalog index into a sound. Anything outside the catalog is
    /// a caller error.
    pub fn from_index(index: usize) -> Result<SoundId, Error> {
        SoundId::ALL
            .get(index)
            .copied()
            .ok_or(Error::UnknownSound(index))
    }

    /// The position of this sound in the catalog.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The snake_case name used in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            SoundId::ShutterClick => "shutter_click",
            SoundId::FocusComplete => "focus_complete",
            SoundId::StartVideoRecording => "start_video_recording",
            SoundId::StopVideoRecording => "stop_video_recording",
        }
    }

    fn default_file_name(self) -> &'static str {
        match self {
            SoundId::ShutterClick => "camera_click.ogg",
            SoundId::FocusComplete => "camera_focus.ogg",
            SoundId::StartVideoRecording => "VideoRecord.ogg",
            SoundId::StopVideoRecording => "VideoStop.ogg",
        }
    }
}

impl TryFrom<usize> for SoundId {
    type Error = Error;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        SoundId::from_index(index)
    }
}

impl FromStr for SoundId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SoundId::ALL
            .into_iter()
            .find(|id| id.name() == s)
            .ok_or_else(|| format!("unknown sound name: {}", s))
    }
}

impl fmt::Display for SoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Maps each sound to an asset file and knows which directories to look in.
#[derive(Clone, Debug)]
pub struct SoundCatalog {
    /// Candidate directories, tried in order.
    dirs: Vec<PathBuf>,
    /// Asset file names, indexed by sound.
    files: [String; SoundId::COUNT],
}

impl Default for SoundCatalog {
    fn default() -> Self {
        SoundCatalog {
            dirs: DEFAULT_SOUND_DIRS.iter().map(PathBuf::from).collect(),
            files: SoundId::ALL.map(|id| id.default_file_name().to_string()),
        }
    }
}

impl SoundCatalog {
    /// Creates a catalog with the given directories and the default file names.
    pub fn with_dirs<P: AsRef<Path>>(dirs: &[P]) -> SoundCatalog {
        SoundCatalog {
            dirs: dirs.iter().map(|dir| dir.as_ref().to_path_buf()).collect(),
            ..Default::default()
        }
    }

    /// Builds the catalog described by the settings, falling back to the defaults for
    /// anything left unset.
    pub fn from_settings(settings: &Settings) -> SoundCatalog {
        let mut catalog = match settings.sound_dirs() {
            Some(dirs) => SoundCatalog::with_dirs(dirs),
            None => SoundCatalog::default(),
        };
        for id in SoundId::ALL {
            if let Some(file) = settings.sound_files().file_for(id) {
                catalog.files[id.index()] = file.to_string();
            }
        }
        catalog
    }

    /// Returns the asset file name for the sound.
    pub fn file_name(&self, id: SoundId) -> &str {
        &self.files[id.index()]
    }

    /// Returns the candidate directories.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Every path the sound may be loaded from, in the order they should be tried.
    pub fn candidates(&self, id: SoundId) -> impl Iterator<Item = PathBuf> + '_ {
        let file_name = self.file_name(id);
        self.dirs.iter().map(move |dir| dir.join(file_name))
    }
}
