//! Keyframe animation: tracks, clips, actions and the mixer that applies
//! them to scene nodes.

pub mod action;
pub mod binder;
pub mod binding;
pub mod clip;
pub mod filter;
pub mod group;
pub mod mixer;
pub mod tracks;
pub mod values;

pub use action::{AnimationAction, LoopMode, TrackValue};
pub use binder::Binder;
pub use binding::{PropertyBinding, TargetPath};
pub use clip::{AnimationClip, Track, TrackData, TrackMeta};
pub use filter::{DEFAULT_ROOT_BONE, filter_clip, keeps_track};
pub use group::AnimationObjectGroup;
pub use mixer::{ActionHandle, AnimationMixer};
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::Interpolatable;
