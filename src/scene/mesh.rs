use crate::resources::{GeometryHandle, MaterialHandle};

/// Mesh component: a geometry drawn with a material.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub geometry: GeometryHandle,
    pub material: MaterialHandle,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Mesh {
    #[must_use]
    pub fn new(geometry: GeometryHandle, material: MaterialHandle) -> Self {
        Self {
            geometry,
            material,
            cast_shadow: false,
            receive_shadow: false,
        }
    }
}
