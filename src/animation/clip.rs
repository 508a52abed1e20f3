use glam::{Quat, Vec3};

use crate::animation::binding::TargetPath;
use crate::animation::tracks::KeyframeTrack;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackMeta {
    pub node_name: String,
    pub target: TargetPath,
}

#[derive(Debug, Clone)]
pub enum TrackData {
    Vector3(KeyframeTrack<Vec3>),
    Quaternion(KeyframeTrack<Quat>),
}

impl TrackData {
    #[must_use]
    pub fn end_time(&self) -> f32 {
        match self {
            Self::Vector3(track) => track.end_time(),
            Self::Quaternion(track) => track.end_time(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Track {
    pub meta: TrackMeta,
    pub data: TrackData,
}

impl Track {
    #[must_use]
    pub fn new(node_name: impl Into<String>, target: TargetPath, data: TrackData) -> Self {
        Self {
            meta: TrackMeta {
                node_name: node_name.into(),
                target,
            },
            data,
        }
    }

    /// `<node>.<property>`, e.g. `mixamorigHips.position`.
    #[must_use]
    pub fn name(&self) -> String {
        format!("{}.{}", self.meta.node_name, self.meta.target.property_name())
    }
}

#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    /// Builds a clip whose duration is the latest keyframe over all tracks.
    #[must_use]
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        let duration = tracks
            .iter()
            .map(|t| t.data.end_time())
            .fold(0.0_f32, f32::max);

        Self {
            name: name.into(),
            duration,
            tracks,
        }
    }

    /// Keeps only the tracks for which `keep` returns true. Duration is left as is.
    pub fn retain_tracks(&mut self, mut keep: impl FnMut(&Track) -> bool) {
        self.tracks.retain(|track| keep(track));
    }

    #[must_use]
    pub fn track_names(&self) -> Vec<String> {
        self.tracks.iter().map(Track::name).collect()
    }
}
