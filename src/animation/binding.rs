use crate::scene::NodeHandle;

/// Transform property a track drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
}

impl TargetPath {
    /// Property suffix used in track names, e.g. `Hips.position`.
    #[must_use]
    pub fn property_name(self) -> &'static str {
        match self {
            Self::Translation => "position",
            Self::Rotation => "quaternion",
            Self::Scale => "scale",
        }
    }

    #[must_use]
    pub fn from_property_name(name: &str) -> Option<Self> {
        match name {
            "position" => Some(Self::Translation),
            "quaternion" => Some(Self::Rotation),
            "scale" => Some(Self::Scale),
            _ => None,
        }
    }
}

/// Maps track `track_index` of a clip onto `node_handle` in the scene.
#[derive(Debug, Clone)]
pub struct PropertyBinding {
    pub track_index: usize,
    pub node_handle: NodeHandle,
    pub target: TargetPath,
}
