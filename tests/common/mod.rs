//! In-memory glTF fixtures shared by the integration tests.

#![allow(dead_code)]

use base64::Engine as _;
use serde_json::json;

fn push_f32s(buffer: &mut Vec<u8>, values: &[f32]) {
    for v in values {
        buffer.extend_from_slice(&v.to_le_bytes());
    }
}

/// A one-triangle avatar:
///
/// ```text
/// Armature
/// ├── mixamorig:Hips
/// └── Body (mesh, material "Body_Skin")
/// ```
///
/// With `with_animation`, a one-second clip "Dance" moves, rotates and
/// scales the hips.
#[must_use]
pub fn avatar_gltf(with_animation: bool) -> Vec<u8> {
    serde_json::to_vec(&avatar_document(with_animation)).expect("fixture serializes")
}

/// The avatar with a second node, `Body2`, drawing the same mesh as `Body`.
#[must_use]
pub fn twin_body_gltf() -> Vec<u8> {
    let mut doc = avatar_document(false);
    doc["nodes"][0]["children"] = json!([1, 2, 3]);
    doc["nodes"]
        .as_array_mut()
        .expect("nodes array")
        .push(json!({ "name": "Body2", "mesh": 0, "translation": [1.0, 0.0, 0.0] }));
    serde_json::to_vec(&doc).expect("fixture serializes")
}

fn avatar_document(with_animation: bool) -> serde_json::Value {
    let mut bin = Vec::new();
    // 0: positions
    push_f32s(&mut bin, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    // 36: indices, padded to 4
    for i in [0u16, 1, 2] {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    bin.extend_from_slice(&[0, 0]);
    // 44: key times
    push_f32s(&mut bin, &[0.0, 1.0]);
    // 52: translations
    push_f32s(&mut bin, &[0.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
    // 76: rotations
    let h = std::f32::consts::FRAC_1_SQRT_2;
    push_f32s(&mut bin, &[0.0, 0.0, 0.0, 1.0, 0.0, h, 0.0, h]);
    // 108: scales
    push_f32s(&mut bin, &[1.0, 1.0, 1.0, 2.0, 2.0, 2.0]);
    assert_eq!(bin.len(), 132);

    let uri = format!(
        "data:application/octet-stream;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&bin)
    );

    let mut doc = json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [
            { "name": "Armature", "children": [1, 2] },
            { "name": "mixamorig:Hips" },
            { "name": "Body", "mesh": 0 }
        ],
        "meshes": [{
            "name": "Body",
            "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 }]
        }],
        "materials": [{ "name": "Body_Skin" }],
        "buffers": [{ "byteLength": 132, "uri": uri }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 6 },
            { "buffer": 0, "byteOffset": 44, "byteLength": 8 },
            { "buffer": 0, "byteOffset": 52, "byteLength": 24 },
            { "buffer": 0, "byteOffset": 76, "byteLength": 32 },
            { "buffer": 0, "byteOffset": 108, "byteLength": 24 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
            { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" },
            { "bufferView": 2, "componentType": 5126, "count": 2, "type": "SCALAR",
              "min": [0.0], "max": [1.0] },
            { "bufferView": 3, "componentType": 5126, "count": 2, "type": "VEC3" },
            { "bufferView": 4, "componentType": 5126, "count": 2, "type": "VEC4" },
            { "bufferView": 5, "componentType": 5126, "count": 2, "type": "VEC3" }
        ]
    });

    if with_animation {
        doc["animations"] = json!([{
            "name": "Dance",
            "samplers": [
                { "input": 2, "output": 3 },
                { "input": 2, "output": 4 },
                { "input": 2, "output": 5 }
            ],
            "channels": [
                { "sampler": 0, "target": { "node": 1, "path": "translation" } },
                { "sampler": 1, "target": { "node": 1, "path": "rotation" } },
                { "sampler": 2, "target": { "node": 1, "path": "scale" } }
            ]
        }]);
    }

    doc
}
