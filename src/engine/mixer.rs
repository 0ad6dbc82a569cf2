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
//! Voice mixing for one-shot sounds, independent of any audio backend.
use super::decode::LoadedSample;
use crate::volume::StereoVolume;

/// A sample being played.
struct Voice {
    sample: LoadedSample,
    /// Next frame to mix.
    frame: usize,
    volume: StereoVolume,
}

impl Voice {
    fn is_finished(&self) -> bool {
        self.frame >= self.sample.frames()
    }

    /// Returns the left and right values of the current frame with the volume applied.
    /// Mono samples feed both sides.
    fn next_frame(&mut self) -> (f32, f32) {
        let channels = self.sample.channel_count() as usize;
        let data = self.sample.data();
        let base = self.frame * channels;
        let left = data[base];
        let right = if channels > 1 { data[base + 1] } else { left };
        self.frame += 1;
        (left * self.volume.left(), right * self.volume.right())
    }
}

/// Mixes a bounded number of voices into interleaved output.
pub struct Mixer {
    voices: Vec<Voice>,
    /// Maximum simultaneous voices; the oldest is stolen when a new one won't fit.
    max_voices: usize,
    /// Number of output channels.
    num_channels: u16,
}

impl Mixer {
    pub fn new(num_channels: u16, max_voices: usize) -> Self {
        let max_voices = max_voices.max(1);
        Self {
            voices: Vec::with_capacity(max_voices),
            max_voices,
            num_channels: num_channels.max(1),
        }
    }

    /// Starts playing a sample from the beginning.
    pub fn add(&mut self, sample: LoadedSample, volume: StereoVolume) {
        if self.voices.len() >= self.max_voices {
            self.voices.remove(0);
        }
        self.voices.push(Voice {
            sample,
            frame: 0,
            volume,
        });
    }

    /// Stops every voice.
    pub fn clear(&mut self) {
        self.voices.clear();
    }

    /// Number of voices still playing.
    pub fn active(&self) -> usize {
        self.voices.len()
    }

    /// Mixes the active voices into `output`, overwriting it. Left goes to the first
    /// output channel and right to the second; a mono output gets their average.
    pub fn process(&mut self, output: &mut [f32]) {
        output.fill(0.0);
        let channels = self.num_channels as usize;

        for voice in self.voices.iter_mut() {
            for frame in output.chunks_mut(channels) {
                if voice.is_finished() {
                    break;
                }
                let (left, right) = voice.next_frame();
                if channels == 1 {
                    frame[0] += (left + right) * 0.5;
                } else {
                    frame[0] += left;
                    if let Some(second) = frame.get_mut(1) {
                        *second += right;
                    }
                }
            }
        }

        self.voices.retain(|voice| !voice.is_finished());
        for sample in output.iter_mut() {
            *sample = sample.clamp(-1.0, 1.0);
        }
    }
}
