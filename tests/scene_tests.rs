//! Scene Integration Tests
//!
//! Tests for:
//! - Node creation, naming and removal
//! - Hierarchy attach/detach and world matrix propagation
//! - Component management: mesh, camera, light, skin
//! - Skeleton joint matrices

use std::f32::consts::FRAC_PI_2;

use glam::{Affine3A, Mat4, Vec3};

use avatar_stage::assets::AssetServer;
use avatar_stage::resources::primitives::create_circle;
use avatar_stage::resources::Material;
use avatar_stage::scene::{Camera, Mesh, Scene, Skeleton, SpotLight};

// ============================================================================
// Node Creation & Removal
// ============================================================================

#[test]
fn create_named_node() {
    let mut scene = Scene::new();
    let handle = scene.create_node_with_name("Test");
    assert!(scene.get_node(handle).is_some());
    assert_eq!(scene.name(handle), Some("Test"));
    assert!(scene.root_nodes().contains(&handle));
}

#[test]
fn remove_node_drops_subtree_and_components() {
    let mut scene = Scene::new();
    let parent = scene.create_node_with_name("Parent");
    let child = scene
        .build_node("Child")
        .with_parent(parent)
        .with_light(SpotLight::from_hex(0xffffff, 1.0))
        .build();
    assert_eq!(scene.light_count(), 1);

    scene.remove_node(parent);
    assert!(!scene.contains(parent));
    assert!(!scene.contains(child));
    assert_eq!(scene.light_count(), 0);
    assert!(scene.root_nodes().is_empty());
}

// ============================================================================
// Hierarchy
// ============================================================================

#[test]
fn attach_moves_child_out_of_roots() {
    let mut scene = Scene::new();
    let parent = scene.create_node_with_name("Parent");
    let child = scene.create_node_with_name("Child");
    scene.attach(child, parent);

    assert!(!scene.root_nodes().contains(&child));
    assert_eq!(scene.get_node(child).unwrap().parent(), Some(parent));
    assert_eq!(scene.get_node(parent).unwrap().children(), &[child]);
}

#[test]
fn attach_rejects_cycles() {
    let mut scene = Scene::new();
    let a = scene.create_node_with_name("A");
    let b = scene.build_node("B").with_parent(a).build();
    scene.attach(a, b);
    assert_eq!(scene.get_node(a).unwrap().parent(), None);
}

#[test]
fn detach_returns_node_to_roots() {
    let mut scene = Scene::new();
    let parent = scene.create_node_with_name("Parent");
    let child = scene.build_node("Child").with_parent(parent).build();
    scene.detach(child);
    assert!(scene.root_nodes().contains(&child));
    assert!(scene.get_node(parent).unwrap().children().is_empty());
}

#[test]
fn world_matrices_compose_down_the_tree() {
    let mut scene = Scene::new();
    let parent = scene
        .build_node("Parent")
        .with_position(Vec3::new(1.0, 0.0, 0.0))
        .build();
    let child = scene
        .build_node("Child")
        .with_position(Vec3::new(0.0, 2.0, 0.0))
        .with_parent(parent)
        .build();
    scene.update();

    let world = scene.get_node(child).unwrap().transform.world_position();
    assert!(world.abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), 1e-5));
}

#[test]
fn find_by_name_searches_subtree_only() {
    let mut scene = Scene::new();
    let avatar = scene.create_node_with_name("Avatar");
    let hips = scene.build_node("Hips").with_parent(avatar).build();
    let other = scene.create_node_with_name("Other");
    scene.build_node("Hips").with_parent(other).build();

    assert_eq!(scene.find_by_name(avatar, "Hips"), Some(hips));
    assert_eq!(scene.find_by_name(avatar, "Missing"), None);
}

// ============================================================================
// Components
// ============================================================================

#[test]
fn first_camera_becomes_active() {
    let mut scene = Scene::new();
    let camera = scene
        .build_node("Camera")
        .with_camera(Camera::new_perspective(75.0, 1.5, 0.1, 1000.0))
        .build();
    assert_eq!(scene.active_camera(), Some(camera));

    let (_, cam) = scene.active_camera_bundle_mut().unwrap();
    cam.set_aspect(2.0);
    assert_eq!(scene.camera(camera).unwrap().aspect, 2.0);
}

#[test]
fn ground_disc_faces_up_after_rotation() {
    let mut scene = Scene::new();
    let mut assets = AssetServer::new();
    let geometry = assets.add_geometry(create_circle(4.0, 60));
    let material = assets.add_material(Material::new_phong(Vec3::ONE.extend(1.0)));
    let ground = scene
        .build_node("Ground")
        .with_rotation_euler(-FRAC_PI_2, 0.0, 0.0)
        .with_mesh(Mesh::new(geometry, material))
        .build();
    scene.update();

    let world = scene.get_node(ground).unwrap().world_matrix();
    let normal = world.transform_vector3(Vec3::Z);
    assert!(normal.abs_diff_eq(Vec3::Y, 1e-5));
    assert_eq!(scene.meshes().count(), 1);
    assert_eq!(assets.geometry(geometry).unwrap().vertex_count(), 62);
}

#[test]
fn light_bundle_exposes_light_and_transform() {
    let mut scene = Scene::new();
    let light = scene
        .build_node("Spot")
        .with_position(Vec3::new(0.0, 5.0, 0.0))
        .with_light(SpotLight::from_hex(0xff7f00, 10.0))
        .build();

    let (spot, transform) = scene.light_bundle_mut(light).unwrap();
    spot.angle = 0.4;
    transform.position.x = 1.0;

    assert_eq!(scene.light(light).unwrap().angle, 0.4);
    assert_eq!(scene.get_node(light).unwrap().transform.position.x, 1.0);
}

#[test]
fn spotlight_cone_cosines_bound_the_penumbra() {
    let mut light = SpotLight::from_hex(0xffffff, 1.0);
    light.angle = 0.5;
    light.penumbra = 0.2;
    let (outer, inner) = light.cone_cosines();
    assert!((outer - 0.5_f32.cos()).abs() < 1e-6);
    assert!((inner - 0.4_f32.cos()).abs() < 1e-6);
    assert!(inner > outer);
}

// ============================================================================
// Skeletons
// ============================================================================

#[test]
fn joint_matrices_cancel_bind_pose() {
    let mut scene = Scene::new();
    let root = scene.create_node_with_name("Avatar");
    let bone = scene
        .build_node("Hips")
        .with_position(Vec3::new(0.0, 1.0, 0.0))
        .with_parent(root)
        .build();
    scene.update();

    let inverse_bind = Affine3A::from_translation(Vec3::new(0.0, -1.0, 0.0));
    let key = scene.add_skeleton(Skeleton::new("Rig", vec![bone], vec![inverse_bind]));
    scene.update();

    let joints = scene.skeleton(key).unwrap().joint_matrices();
    assert_eq!(joints.len(), 1);
    assert!(joints[0].abs_diff_eq(Mat4::IDENTITY, 1e-5));
}

#[test]
fn skin_binding_requires_live_skeleton() {
    let mut scene = Scene::new();
    let root = scene.create_node_with_name("Avatar");
    let bone = scene.build_node("Hips").with_parent(root).build();
    let mesh_node = scene.build_node("Body").with_parent(root).build();
    let key = scene.add_skeleton(Skeleton::new("Rig", vec![bone], vec![Affine3A::IDENTITY]));

    scene.bind_skin(mesh_node, key);
    assert_eq!(scene.skin(mesh_node).map(|s| s.skeleton), Some(key));

    scene.remove_node(root);
    assert!(scene.skeleton(key).is_none());
}
