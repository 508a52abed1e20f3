//! Root-motion filtering for imported clips.
//!
//! Dance and idle clips authored for a different rig often carry scale keys
//! and per-bone translations that fight the placement applied by the stage.
//! Only the root bone's position and every rotation channel survive.

use crate::animation::binding::TargetPath;
use crate::animation::clip::{AnimationClip, Track};

/// Default root bone name suffix (matches `Hips` and `mixamorigHips`).
pub const DEFAULT_ROOT_BONE: &str = "Hips";

/// Whether a track named `name` survives filtering against `root_bone`.
#[must_use]
pub fn keeps_track(name: &str, root_bone: &str) -> bool {
    let root_position = format!("{root_bone}.{}", TargetPath::Translation.property_name());
    let rotation = format!(".{}", TargetPath::Rotation.property_name());
    name.ends_with(&root_position) || name.ends_with(&rotation)
}

/// Returns `clip` with every track other than root position and rotations removed.
#[must_use]
pub fn filter_clip(mut clip: AnimationClip, root_bone: &str) -> AnimationClip {
    let before = clip.tracks.len();
    clip.retain_tracks(|track: &Track| keeps_track(&track.name(), root_bone));
    log::debug!(
        "Filtered clip '{}': kept {} of {} tracks",
        clip.name,
        clip.tracks.len(),
        before
    );
    clip
}
