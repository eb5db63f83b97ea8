//! Non-allocating views over host audio.
//!
//! Hosts hand audio over either as one slice per channel (planar) or as a
//! single interleaved slice. [`AudioBuffer`] wraps both without copying, and
//! engines process through frame/channel indexing.

/// Mutable view over one block of host audio.
///
/// ```rust
/// use strata_core::AudioBuffer;
///
/// let mut left = [0.1f32, 0.2, 0.3];
/// let mut right = [0.4f32, 0.5];
/// let mut channels: [&mut [f32]; 2] = [&mut left, &mut right];
/// let buffer = AudioBuffer::planar(&mut channels);
/// assert_eq!(buffer.num_channels(), 2);
/// assert_eq!(buffer.num_frames(), 2);
///
/// let mut data = [0.0f32; 7];
/// let buffer = AudioBuffer::interleaved(&mut data, 2);
/// assert_eq!(buffer.num_frames(), 3);
/// ```
#[derive(Debug)]
pub enum AudioBuffer<'a> {
    /// One slice per channel. Frame count is the shortest channel.
    Planar(&'a mut [&'a mut [f32]]),
    /// Frames laid out channel by channel. A trailing partial frame is
    /// never touched.
    Interleaved {
        /// Sample data.
        data: &'a mut [f32],
        /// Samples per frame.
        channels: usize,
    },
}

impl<'a> AudioBuffer<'a> {
    /// Planar view.
    pub fn planar(channels: &'a mut [&'a mut [f32]]) -> Self {
        AudioBuffer::Planar(channels)
    }

    /// Interleaved view with `channels` samples per frame.
    pub fn interleaved(data: &'a mut [f32], channels: usize) -> Self {
        AudioBuffer::Interleaved { data, channels }
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        match self {
            AudioBuffer::Planar(channels) => channels.len(),
            AudioBuffer::Interleaved { channels, .. } => *channels,
        }
    }

    /// Number of complete frames.
    pub fn num_frames(&self) -> usize {
        match self {
            AudioBuffer::Planar(channels) => channels.iter().map(|c| c.len()).min().unwrap_or(0),
            AudioBuffer::Interleaved { data, channels } => {
                if *channels == 0 {
                    0
                } else {
                    data.len() / *channels
                }
            }
        }
    }

    /// Sample at `(channel, frame)`. Callers stay within
    /// [`num_channels`](Self::num_channels) and [`num_frames`](Self::num_frames).
    #[inline]
    pub fn get(&self, channel: usize, frame: usize) -> f32 {
        match self {
            AudioBuffer::Planar(channels) => channels[channel][frame],
            AudioBuffer::Interleaved { data, channels } => data[frame * *channels + channel],
        }
    }

    /// Write the sample at `(channel, frame)`.
    #[inline]
    pub fn set(&mut self, channel: usize, frame: usize, value: f32) {
        match self {
            AudioBuffer::Planar(channels) => channels[channel][frame] = value,
            AudioBuffer::Interleaved { data, channels } => data[frame * *channels + channel] = value,
        }
    }

    /// Apply `f` to every sample of the first `max_channels` channels, in
    /// frame order.
    pub fn for_each_sample(&mut self, max_channels: usize, mut f: impl FnMut(usize, f32) -> f32) {
        let frames = self.num_frames();
        let channels = self.num_channels().min(max_channels);
        for frame in 0..frames {
            for channel in 0..channels {
                let y = f(channel, self.get(channel, frame));
                self.set(channel, frame, y);
            }
        }
    }
}
