//! glTF 2.0 loading in two phases.
//!
//! [`GltfLoader::load`] reads and decodes everything on a background task
//! into a plain-data [`GltfAsset`]. [`GltfAsset::instantiate`] then builds
//! scene nodes, skeletons and asset entries on the render thread.

use base64::Engine as _;
use glam::{Affine3A, Mat4, Quat, Vec3, Vec4};

use crate::animation::{
    AnimationClip, InterpolationMode, KeyframeTrack, TargetPath, Track, TrackData,
};
use crate::assets::io::AssetReaderVariant;
use crate::assets::server::AssetServer;
use crate::errors::{Result, StageError};
use crate::resources::{
    AlphaMode, Geometry, GeometryHandle, Material, MaterialHandle, Side, Texture, TextureHandle, TextureSampler,
};
use crate::scene::{Mesh, NodeHandle, Scene, SkeletonKey, Skeleton};

/// Node description with indices into the asset's own arrays.
#[derive(Debug, Clone)]
pub struct GltfNode {
    pub name: String,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub children: Vec<usize>,
    pub mesh: Option<usize>,
    pub skin: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct GltfPrimitive {
    pub geometry: Geometry,
    pub material: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct GltfMaterial {
    pub material: Material,
    /// Index into [`GltfAsset::textures`] for the base color map.
    pub map: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct GltfSkin {
    pub name: String,
    pub joints: Vec<usize>,
    pub inverse_bind_matrices: Vec<Affine3A>,
}

/// Decoded glTF contents, independent of any scene.
#[derive(Debug, Clone, Default)]
pub struct GltfAsset {
    pub name: String,
    pub nodes: Vec<GltfNode>,
    /// Root nodes of the default scene.
    pub roots: Vec<usize>,
    pub meshes: Vec<Vec<GltfPrimitive>>,
    pub materials: Vec<GltfMaterial>,
    pub textures: Vec<Texture>,
    pub skins: Vec<GltfSkin>,
    pub animations: Vec<AnimationClip>,
}

/// Handles of a model placed into a scene, including every resource it
/// added to the asset server.
#[derive(Debug, Clone)]
pub struct ModelInstance {
    pub root: NodeHandle,
    pub mesh_nodes: Vec<NodeHandle>,
    pub skeletons: Vec<SkeletonKey>,
    pub geometries: Vec<GeometryHandle>,
    pub materials: Vec<MaterialHandle>,
    pub textures: Vec<TextureHandle>,
}

impl ModelInstance {
    /// Removes the model's nodes from `scene` and its resources from
    /// `assets`.
    pub fn despawn(self, scene: &mut Scene, assets: &mut AssetServer) {
        scene.remove_node(self.root);
        for handle in self.geometries {
            assets.remove_geometry(handle);
        }
        for handle in self.materials {
            assets.remove_material(handle);
        }
        for handle in self.textures {
            assets.remove_texture(handle);
        }
    }
}

/// Strips characters that cannot appear in a `node.property` track name.
#[must_use]
pub fn sanitize_node_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '[' | ']' | '.' | ':' | '/'))
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

fn node_name(node: &gltf::Node) -> String {
    node.name()
        .map_or_else(|| format!("Node_{}", node.index()), sanitize_node_name)
}

/// Decodes the payload of a `data:` URI.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| StageError::DataUriError(format!("not a data URI: {uri:.32}")))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| StageError::DataUriError("missing ',' separator".to_string()))?;
    if header.ends_with(";base64") {
        Ok(base64::engine::general_purpose::STANDARD.decode(payload)?)
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

pub struct GltfLoader;

impl GltfLoader {
    /// Reads `source` (path or URL) and every external buffer and image it
    /// references.
    pub async fn load(source: &str) -> Result<GltfAsset> {
        let (reader, file_name) = AssetReaderVariant::from_source(source)?;
        let bytes = reader.read_bytes(&file_name).await?;
        let gltf = gltf::Gltf::from_slice(&bytes)?;

        let mut buffers = Vec::with_capacity(gltf.buffers().len());
        for buffer in gltf.buffers() {
            let data = match (Self::embedded_buffer(&gltf, &buffer)?, buffer.source()) {
                (Some(data), _) => data,
                (None, gltf::buffer::Source::Uri(uri)) => reader.read_bytes(uri).await?,
                (None, gltf::buffer::Source::Bin) => {
                    return Err(StageError::GltfError("missing GLB binary chunk".to_string()));
                }
            };
            buffers.push(data);
        }

        let mut images = Vec::with_capacity(gltf.images().len());
        for image in gltf.images() {
            let encoded = match image.source() {
                gltf::image::Source::View { view, .. } => Self::view_bytes(&buffers, &view)?.to_vec(),
                gltf::image::Source::Uri { uri, .. } if uri.starts_with("data:") => decode_data_uri(uri)?,
                gltf::image::Source::Uri { uri, .. } => reader.read_bytes(uri).await?,
            };
            images.push(encoded);
        }

        let asset = Self::parse(&file_name, &gltf, &buffers, &images)?;
        log::info!(
            "Loaded '{}': {} nodes, {} meshes, {} skins, {} animations",
            asset.name,
            asset.nodes.len(),
            asset.meshes.len(),
            asset.skins.len(),
            asset.animations.len()
        );
        Ok(asset)
    }

    /// Synchronous variant for self-contained data (GLB or data URIs only).
    pub fn from_slice(name: &str, bytes: &[u8]) -> Result<GltfAsset> {
        let gltf = gltf::Gltf::from_slice(bytes)?;

        let buffers = gltf
            .buffers()
            .map(|buffer| {
                Self::embedded_buffer(&gltf, &buffer)?.ok_or_else(|| {
                    StageError::AssetNotFound(format!("external buffer {} in {name}", buffer.index()))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let images = gltf
            .images()
            .map(|image| match image.source() {
                gltf::image::Source::View { view, .. } => Ok(Self::view_bytes(&buffers, &view)?.to_vec()),
                gltf::image::Source::Uri { uri, .. } if uri.starts_with("data:") => decode_data_uri(uri),
                gltf::image::Source::Uri { uri, .. } => {
                    Err(StageError::AssetNotFound(format!("external image {uri} in {name}")))
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Self::parse(name, &gltf, &buffers, &images)
    }

    /// The GLB chunk or a `data:` URI; `None` for external files.
    fn embedded_buffer(gltf: &gltf::Gltf, buffer: &gltf::Buffer) -> Result<Option<Vec<u8>>> {
        match buffer.source() {
            gltf::buffer::Source::Bin => gltf
                .blob
                .clone()
                .map(Some)
                .ok_or_else(|| StageError::GltfError("missing GLB binary chunk".to_string())),
            gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => decode_data_uri(uri).map(Some),
            gltf::buffer::Source::Uri(_) => Ok(None),
        }
    }

    fn view_bytes<'a>(buffers: &'a [Vec<u8>], view: &gltf::buffer::View) -> Result<&'a [u8]> {
        let data = buffers
            .get(view.buffer().index())
            .ok_or_else(|| StageError::GltfError(format!("buffer view {} out of range", view.index())))?;
        let start = view.offset();
        let end = start + view.length();
        data.get(start..end)
            .ok_or_else(|| StageError::GltfError(format!("buffer view {} exceeds buffer", view.index())))
    }

    fn parse(name: &str, gltf: &gltf::Gltf, buffers: &[Vec<u8>], images: &[Vec<u8>]) -> Result<GltfAsset> {
        let textures = Self::load_textures(gltf, images)?;
        let materials = gltf.materials().map(|m| Self::load_material(&m)).collect();
        let meshes = gltf.meshes().map(|m| Self::load_mesh(&m, buffers)).collect();
        let skins = Self::load_skins(gltf, buffers);
        let animations = Self::load_animations(gltf, buffers);

        let nodes = gltf
            .nodes()
            .map(|node| {
                let (t, r, s) = node.transform().decomposed();
                GltfNode {
                    name: node_name(&node),
                    translation: Vec3::from_array(t),
                    rotation: Quat::from_array(r),
                    scale: Vec3::from_array(s),
                    children: node.children().map(|c| c.index()).collect(),
                    mesh: node.mesh().map(|m| m.index()),
                    skin: node.skin().map(|s| s.index()),
                }
            })
            .collect::<Vec<_>>();

        let roots = match gltf.default_scene().or_else(|| gltf.scenes().next()) {
            Some(scene) => scene.nodes().map(|n| n.index()).collect(),
            None => {
                let mut is_child = vec![false; nodes.len()];
                for node in &nodes {
                    for &child in &node.children {
                        if let Some(flag) = is_child.get_mut(child) {
                            *flag = true;
                        }
                    }
                }
                (0..nodes.len()).filter(|&i| !is_child[i]).collect()
            }
        };

        Ok(GltfAsset {
            name: name.to_string(),
            nodes,
            roots,
            meshes,
            materials,
            textures,
            skins,
            animations,
        })
    }

    fn load_textures(gltf: &gltf::Gltf, images: &[Vec<u8>]) -> Result<Vec<Texture>> {
        let mut textures = Vec::with_capacity(gltf.textures().len());
        for texture in gltf.textures() {
            let source_index = texture.source().index();
            let encoded = images.get(source_index).ok_or_else(|| {
                StageError::GltfError(format!("texture {} references missing image", texture.index()))
            })?;
            let image = image::load_from_memory(encoded)?.to_rgba8();

            let sampler = texture.sampler();
            let mut generate_mipmaps = false;
            let mut engine_sampler = TextureSampler {
                address_mode_u: wrap_mode(sampler.wrap_s()),
                address_mode_v: wrap_mode(sampler.wrap_t()),
                ..Default::default()
            };
            if let Some(gltf::texture::MagFilter::Nearest) = sampler.mag_filter() {
                engine_sampler.mag_filter = wgpu::FilterMode::Nearest;
            }
            if let Some(min) = sampler.min_filter() {
                use gltf::texture::MinFilter;
                let (min_filter, mipmap) = match min {
                    MinFilter::Nearest => (wgpu::FilterMode::Nearest, None),
                    MinFilter::Linear => (wgpu::FilterMode::Linear, None),
                    MinFilter::NearestMipmapNearest => {
                        (wgpu::FilterMode::Nearest, Some(wgpu::MipmapFilterMode::Nearest))
                    }
                    MinFilter::LinearMipmapNearest => {
                        (wgpu::FilterMode::Linear, Some(wgpu::MipmapFilterMode::Nearest))
                    }
                    MinFilter::NearestMipmapLinear => {
                        (wgpu::FilterMode::Nearest, Some(wgpu::MipmapFilterMode::Linear))
                    }
                    MinFilter::LinearMipmapLinear => {
                        (wgpu::FilterMode::Linear, Some(wgpu::MipmapFilterMode::Linear))
                    }
                };
                engine_sampler.min_filter = min_filter;
                if let Some(mipmap) = mipmap {
                    engine_sampler.mipmap_filter = mipmap;
                    generate_mipmaps = true;
                }
            } else {
                // unspecified: trilinear, like most viewers
                generate_mipmaps = true;
            }

            let tex_name = texture
                .name()
                .or_else(|| texture.source().name())
                .map_or_else(|| format!("Texture_{}", texture.index()), str::to_string);
            let mut tex = Texture::new(&tex_name, image);
            tex.sampler = engine_sampler;
            tex.generate_mipmaps = generate_mipmaps;
            textures.push(tex);
        }
        Ok(textures)
    }

    fn load_material(material: &gltf::Material) -> GltfMaterial {
        let pbr = material.pbr_metallic_roughness();
        let mut engine = Material::new_standard(Vec4::from_array(pbr.base_color_factor()))
            .with_name(material.name().unwrap_or_default());
        engine.roughness = pbr.roughness_factor();
        engine.metalness = pbr.metallic_factor();
        engine.emissive = Vec3::from_array(material.emissive_factor());
        engine.side = if material.double_sided() { Side::Double } else { Side::Front };
        engine.alpha_mode = match material.alpha_mode() {
            gltf::material::AlphaMode::Opaque => AlphaMode::Opaque,
            gltf::material::AlphaMode::Mask => AlphaMode::Mask(material.alpha_cutoff().unwrap_or(0.5)),
            gltf::material::AlphaMode::Blend => AlphaMode::Blend,
        };

        GltfMaterial {
            material: engine,
            map: pbr.base_color_texture().map(|info| info.texture().index()),
        }
    }

    fn load_mesh(mesh: &gltf::Mesh, buffers: &[Vec<u8>]) -> Vec<GltfPrimitive> {
        let mut primitives = Vec::new();
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "Skipping non-triangle primitive {} of mesh {:?}",
                    primitive.index(),
                    mesh.name()
                );
                continue;
            }

            let reader = primitive.reader(|b| buffers.get(b.index()).map(Vec::as_slice));
            let Some(positions) = reader.read_positions() else {
                log::warn!("Primitive {} of mesh {:?} has no positions", primitive.index(), mesh.name());
                continue;
            };
            let positions: Vec<[f32; 3]> = positions.collect();
            let indices = reader
                .read_indices()
                .map(|i| i.into_u32().collect())
                .unwrap_or_default();

            let mut geometry = Geometry::new(positions, indices);
            geometry.ensure_indices();

            if let Some(uvs) = reader.read_tex_coords(0) {
                geometry = geometry.with_uvs(uvs.into_f32().collect());
            }
            match reader.read_normals() {
                Some(normals) => geometry = geometry.with_normals(normals.collect()),
                None => geometry.compute_vertex_normals(),
            }
            if let (Some(joints), Some(weights)) = (reader.read_joints(0), reader.read_weights(0)) {
                geometry = geometry.with_skin(joints.into_u16().collect(), weights.into_f32().collect());
            }
            if primitive.morph_targets().next().is_some() {
                log::debug!("Ignoring morph targets on mesh {:?}", mesh.name());
            }

            primitives.push(GltfPrimitive {
                geometry,
                material: primitive.material().index(),
            });
        }
        primitives
    }

    fn load_skins(gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Vec<GltfSkin> {
        gltf.skins()
            .map(|skin| {
                let reader = skin.reader(|b| buffers.get(b.index()).map(Vec::as_slice));
                let joints: Vec<usize> = skin.joints().map(|n| n.index()).collect();
                let inverse_bind_matrices = reader.read_inverse_bind_matrices().map_or_else(
                    || vec![Affine3A::IDENTITY; joints.len()],
                    |iter| {
                        iter.map(|m| Affine3A::from_mat4(Mat4::from_cols_array_2d(&m)))
                            .collect()
                    },
                );
                GltfSkin {
                    name: skin.name().unwrap_or("Skeleton").to_string(),
                    joints,
                    inverse_bind_matrices,
                }
            })
            .collect()
    }

    fn load_animations(gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Vec<AnimationClip> {
        use gltf::animation::util::ReadOutputs;

        let mut clips = Vec::new();
        for anim in gltf.animations() {
            let mut tracks = Vec::new();

            for channel in anim.channels() {
                let reader = channel.reader(|b| buffers.get(b.index()).map(Vec::as_slice));
                let target = channel.target();
                let node_name = node_name(&target.node());

                let Some(inputs) = reader.read_inputs() else {
                    continue;
                };
                let times: Vec<f32> = inputs.collect();
                let Some(outputs) = reader.read_outputs() else {
                    continue;
                };

                let interpolation = match channel.sampler().interpolation() {
                    gltf::animation::Interpolation::Linear => InterpolationMode::Linear,
                    gltf::animation::Interpolation::Step => InterpolationMode::Step,
                    gltf::animation::Interpolation::CubicSpline => InterpolationMode::CubicSpline,
                };

                let (path, data) = match outputs {
                    ReadOutputs::Translations(iter) => (
                        TargetPath::Translation,
                        TrackData::Vector3(KeyframeTrack::new(
                            times,
                            iter.map(Vec3::from_array).collect(),
                            interpolation,
                        )),
                    ),
                    ReadOutputs::Rotations(iter) => (
                        TargetPath::Rotation,
                        TrackData::Quaternion(KeyframeTrack::new(
                            times,
                            iter.into_f32().map(Quat::from_array).collect(),
                            interpolation,
                        )),
                    ),
                    ReadOutputs::Scales(iter) => (
                        TargetPath::Scale,
                        TrackData::Vector3(KeyframeTrack::new(
                            times,
                            iter.map(Vec3::from_array).collect(),
                            interpolation,
                        )),
                    ),
                    ReadOutputs::MorphTargetWeights(_) => {
                        log::debug!("Skipping morph weight channel on '{node_name}'");
                        continue;
                    }
                };
                tracks.push(Track::new(node_name, path, data));
            }

            let name = anim
                .name()
                .map_or_else(|| format!("Animation_{}", anim.index()), str::to_string);
            clips.push(AnimationClip::new(name, tracks));
        }
        clips
    }
}

fn wrap_mode(mode: gltf::texture::WrappingMode) -> wgpu::AddressMode {
    match mode {
        gltf::texture::WrappingMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        gltf::texture::WrappingMode::MirroredRepeat => wgpu::AddressMode::MirrorRepeat,
        gltf::texture::WrappingMode::Repeat => wgpu::AddressMode::Repeat,
    }
}

impl GltfAsset {
    /// Places the model into `scene` under a new root named after the asset
    /// and moves its resources into `assets`.
    ///
    /// Consumes the asset; animations are returned untouched in the second
    /// slot so callers can keep them.
    pub fn instantiate(self, scene: &mut Scene, assets: &mut AssetServer) -> Result<(ModelInstance, Vec<AnimationClip>)> {
        let root = scene.create_node_with_name(&self.name);

        let texture_handles: Vec<TextureHandle> = self
            .textures
            .into_iter()
            .map(|t| assets.add_texture(t))
            .collect();

        let material_handles: Vec<MaterialHandle> = self
            .materials
            .into_iter()
            .map(|m| {
                let mut material = m.material;
                material.map = m.map.and_then(|i| texture_handles.get(i).copied());
                assets.add_material(material)
            })
            .collect();
        let mut default_material: Option<MaterialHandle> = None;

        // nodes, shallow
        let handles: Vec<NodeHandle> = self
            .nodes
            .iter()
            .map(|desc| {
                let handle = scene.create_node_with_name(&desc.name);
                if let Some(node) = scene.get_node_mut(handle) {
                    node.transform.position = desc.translation;
                    node.transform.rotation = desc.rotation;
                    node.transform.scale = desc.scale;
                }
                handle
            })
            .collect();

        // hierarchy
        for (index, desc) in self.nodes.iter().enumerate() {
            for &child in &desc.children {
                let child_handle = handles.get(child).copied().ok_or_else(|| {
                    StageError::GltfError(format!("node {index} has invalid child {child}"))
                })?;
                scene.attach(child_handle, handles[index]);
            }
        }
        for &r in &self.roots {
            if let Some(&handle) = handles.get(r) {
                scene.attach(handle, root);
            }
        }
        // orphans outside the default scene would otherwise linger as roots
        let orphans: Vec<NodeHandle> = handles
            .iter()
            .copied()
            .filter(|&h| scene.get_node(h).is_some_and(|n| n.parent().is_none()))
            .collect();
        for handle in orphans {
            scene.remove_node(handle);
        }

        // skins
        let skeletons: Vec<SkeletonKey> = self
            .skins
            .into_iter()
            .map(|skin| {
                let bones = skin
                    .joints
                    .iter()
                    .filter_map(|&j| handles.get(j).copied())
                    .collect();
                scene.add_skeleton(Skeleton::new(&skin.name, bones, skin.inverse_bind_matrices))
            })
            .collect();

        // meshes
        // a mesh shared by several nodes is cloned for all but its last user,
        // since skinned geometry is deformed per handle
        let mut meshes = self.meshes;
        let mut uses = vec![0usize; meshes.len()];
        for (index, desc) in self.nodes.iter().enumerate() {
            if let Some(count) = desc.mesh.and_then(|m| uses.get_mut(m))
                && scene.contains(handles[index])
            {
                *count += 1;
            }
        }

        let mut mesh_nodes = Vec::new();
        let mut geometries = Vec::new();
        for (index, desc) in self.nodes.iter().enumerate() {
            let Some(mesh_index) = desc.mesh else { continue };
            let node = handles[index];
            if !scene.contains(node) {
                continue;
            }
            let primitives = match uses.get_mut(mesh_index) {
                Some(count) if *count > 1 => {
                    *count -= 1;
                    meshes[mesh_index].clone()
                }
                Some(_) => std::mem::take(&mut meshes[mesh_index]),
                None => Vec::new(),
            };
            let single = primitives.len() == 1;

            for (p, primitive) in primitives.into_iter().enumerate() {
                let material = match primitive.material.and_then(|i| material_handles.get(i).copied()) {
                    Some(handle) => handle,
                    None => *default_material.get_or_insert_with(|| {
                        assets.add_material(Material::new_standard(Vec4::ONE).with_name("default"))
                    }),
                };
                let geometry = assets.add_geometry(primitive.geometry);
                geometries.push(geometry);

                let target = if single {
                    node
                } else {
                    scene.build_node(&format!("{}_{p}", desc.name)).with_parent(node).build()
                };
                scene.set_mesh(target, Mesh::new(geometry, material));
                if let Some(&skeleton) = desc.skin.and_then(|s| skeletons.get(s)) {
                    scene.bind_skin(target, skeleton);
                }
                mesh_nodes.push(target);
            }
        }

        let mut materials = material_handles;
        materials.extend(default_material);

        Ok((
            ModelInstance {
                root,
                mesh_nodes,
                skeletons,
                geometries,
                materials,
                textures: texture_handles,
            },
            self.animations,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_base64_data_uri() {
        let bytes = decode_data_uri("data:application/octet-stream;base64,AAEC").unwrap();
        assert_eq!(bytes, vec![0, 1, 2]);
    }

    #[test]
    fn decodes_plain_data_uri() {
        assert_eq!(decode_data_uri("data:text/plain,abc").unwrap(), b"abc".to_vec());
    }

    #[test]
    fn rejects_non_data_uri() {
        assert!(matches!(
            decode_data_uri("model.bin"),
            Err(StageError::DataUriError(_))
        ));
    }

    #[test]
    fn node_names_lose_track_separators() {
        assert_eq!(sanitize_node_name("mixamorig:Hips"), "mixamorigHips");
        assert_eq!(sanitize_node_name("Left Hand.001"), "Left_Hand001");
    }
}
