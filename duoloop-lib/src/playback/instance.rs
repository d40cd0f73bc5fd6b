//! The playback surface the loop scheduler depends on.
//!
//! Anything that can report its timing, start and pause, seek, and expose a
//! blend weight can be looped. Decoding, loading and layout stay with the
//! implementor.

use std::fmt::{Display, Formatter};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Identity of one of the two buffered instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InstanceId {
    A,
    B,
}

impl InstanceId {
    /// The other instance of the pair.
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }
}

impl Display for InstanceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
        }
    }
}

/// How an instance's frame is fitted into its container.
///
/// Opaque to scheduling; forwarded untouched to each instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectFit {
    #[default]
    Cover,
    Contain,
    Fill,
    None,
    ScaleDown,
}

impl ObjectFit {
    pub const ALL: [ObjectFit; 5] = [
        ObjectFit::Cover,
        ObjectFit::Contain,
        ObjectFit::Fill,
        ObjectFit::None,
        ObjectFit::ScaleDown,
    ];

    /// Next mode in display order, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|fit| *fit == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cover => "cover",
            Self::Contain => "contain",
            Self::Fill => "fill",
            Self::None => "none",
            Self::ScaleDown => "scale-down",
        }
    }
}

impl std::str::FromStr for ObjectFit {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|fit| fit.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| format!("unknown object fit `{}`", value))
    }
}

/// One buffered player bound to the looped source.
///
/// The scheduler is the only caller of the mutating methods.
pub trait PlaybackInstance {
    /// Elapsed playback time.
    fn position(&self) -> Duration;

    /// Total length, or `None` until metadata has loaded.
    fn duration(&self) -> Option<Duration>;

    /// Whether the play head is currently advancing.
    fn is_playing(&self) -> bool;

    fn play(&mut self);

    fn pause(&mut self);

    /// Move the play head. Rewinding uses `Duration::ZERO`.
    fn set_position(&mut self, position: Duration);

    /// Current blend level in `0.0..=1.0`.
    fn visual_weight(&self) -> f32;

    fn set_visual_weight(&mut self, weight: f32);

    /// Forward the presentation fit mode. Instances that do not render may
    /// ignore it.
    fn set_object_fit(&mut self, _fit: ObjectFit) {}
}
