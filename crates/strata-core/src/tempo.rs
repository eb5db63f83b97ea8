//! Host transport and musical time.
//!
//! The host pushes a [`TransportInfo`] before each `process` call. Engines
//! that do not sync to tempo ignore it.

/// Transport state reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransportInfo {
    /// Tempo in beats per minute.
    pub bpm: f32,
    /// Time signature numerator.
    pub numerator: u32,
    /// Time signature denominator.
    pub denominator: u32,
    /// Whether the host transport is running.
    pub is_playing: bool,
}

impl TransportInfo {
    /// Transport at the given tempo in 4/4, stopped.
    pub fn new(bpm: f32) -> Self {
        Self {
            bpm,
            ..Self::default()
        }
    }

    /// True when the tempo is finite and positive.
    pub fn has_valid_tempo(&self) -> bool {
        self.bpm.is_finite() && self.bpm > 0.0
    }
}

impl Default for TransportInfo {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            numerator: 4,
            denominator: 4,
            is_playing: false,
        }
    }
}

/// Note lengths for tempo-synced times.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NoteDivision {
    /// Whole note (4 beats)
    Whole,
    /// Half note (2 beats)
    Half,
    /// Quarter note (1 beat)
    #[default]
    Quarter,
    /// Eighth note (1/2 beat)
    Eighth,
    /// Sixteenth note (1/4 beat)
    Sixteenth,
    /// Dotted quarter (1.5 beats)
    DottedQuarter,
    /// Dotted eighth (3/4 beat)
    DottedEighth,
    /// Quarter triplet (2/3 beat)
    TripletQuarter,
    /// Eighth triplet (1/3 beat)
    TripletEighth,
}

impl NoteDivision {
    /// Every division, in the order a normalized selector walks them.
    pub const ALL: [NoteDivision; 9] = [
        NoteDivision::Whole,
        NoteDivision::Half,
        NoteDivision::DottedQuarter,
        NoteDivision::Quarter,
        NoteDivision::DottedEighth,
        NoteDivision::TripletQuarter,
        NoteDivision::Eighth,
        NoteDivision::TripletEighth,
        NoteDivision::Sixteenth,
    ];

    /// Pick a division from a normalized `[0, 1]` selector value split into
    /// equal bands.
    pub fn from_normalized(value: f32) -> Self {
        let count = Self::ALL.len();
        let index = (value.clamp(0.0, 1.0) * count as f32) as usize;
        Self::ALL[index.min(count - 1)]
    }

    /// Length in beats.
    pub fn beats(&self) -> f32 {
        match self {
            NoteDivision::Whole => 4.0,
            NoteDivision::Half => 2.0,
            NoteDivision::Quarter => 1.0,
            NoteDivision::Eighth => 0.5,
            NoteDivision::Sixteenth => 0.25,
            NoteDivision::DottedQuarter => 1.5,
            NoteDivision::DottedEighth => 0.75,
            NoteDivision::TripletQuarter => 2.0 / 3.0,
            NoteDivision::TripletEighth => 1.0 / 3.0,
        }
    }

    /// Duration in milliseconds at `bpm`.
    ///
    /// ```rust
    /// use strata_core::NoteDivision;
    ///
    /// assert!((NoteDivision::Quarter.to_ms(120.0) - 500.0).abs() < 0.1);
    /// assert!((NoteDivision::DottedEighth.to_ms(120.0) - 375.0).abs() < 0.1);
    /// ```
    pub fn to_ms(&self, bpm: f32) -> f32 {
        self.beats() * 60000.0 / bpm
    }

    /// Duration in samples at `bpm` and `sample_rate`.
    pub fn to_samples(&self, bpm: f32, sample_rate: f32) -> f32 {
        self.to_ms(bpm) / 1000.0 * sample_rate
    }
}
