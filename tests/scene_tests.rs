// Host-side tests for model binding, parameter application and animation.

use glam::{Vec2, Vec3};
use portal_core::*;
use std::cell::RefCell;
use std::f32::consts::FRAC_PI_2;
use std::rc::Rc;

fn mesh(positions: Vec<Vec3>) -> MeshGeometry {
    let n = positions.len();
    MeshGeometry {
        uvs: vec![Vec2::ZERO; n],
        indices: (0..n as u32).collect(),
        positions,
    }
}

fn triangle() -> MeshGeometry {
    mesh(vec![Vec3::ZERO, Vec3::X, Vec3::Y])
}

// Ring of points around (3, 1, 0) so the sample has a non-zero centre.
fn disc_points(n: usize) -> Vec<Vec3> {
    (0..n)
        .map(|i| {
            let a = i as f32 / n as f32 * std::f32::consts::TAU;
            Vec3::new(3.0 + a.cos(), 1.0 + a.sin(), 0.0)
        })
        .collect()
}

fn node(name: &str, transform: Transform, mesh: Option<MeshGeometry>) -> ModelNode {
    ModelNode {
        name: name.to_string(),
        transform,
        mesh,
    }
}

fn disc_transform() -> Transform {
    Transform {
        translation: Vec3::new(0.0, 0.8, -1.5),
        rotation: Vec3::new(FRAC_PI_2, 0.0, 0.0),
        scale: Vec3::splat(2.0),
    }
}

fn full_model(disc: usize) -> Model {
    let mut nodes = vec![
        node(BAKED_MESH_NODE, Transform::IDENTITY, Some(triangle())),
        node(DISC_FRONT_NODE, disc_transform(), Some(mesh(disc_points(disc)))),
        node(DISC_BACK_NODE, Transform::IDENTITY, None),
    ];
    for name in BULB_NODES {
        nodes.push(node(name, Transform::IDENTITY, Some(triangle())));
    }
    Model::new(nodes)
}

fn seeded_config() -> SceneConfig {
    SceneConfig {
        seed: Some(7),
        ..SceneConfig::default()
    }
}

fn bound_scene(disc: usize) -> (PortalScene, SceneParams) {
    let params = SceneParams::default();
    let mut scene = PortalScene::new(&seeded_config(), &params);
    scene.bind_model(&full_model(disc), &params).unwrap();
    (scene, params)
}

fn portal_cloud(scene: &PortalScene) -> &PointCloud {
    scene
        .portal_points()
        .and_then(|n| n.geometry.as_points())
        .unwrap()
}

#[test]
fn new_scene_has_fireflies_but_no_model() {
    let scene = PortalScene::new(&seeded_config(), &SceneParams::default());
    assert!(!scene.is_bound());
    assert_eq!(scene.graph().len(), 1);
    assert_eq!(scene.fireflies().unwrap().len(), FIREFLY_COUNT);
    assert!(scene.portal_points().is_none());
}

#[test]
fn binding_attaches_baked_mesh_bulbs_and_portal() {
    let params = SceneParams::default();
    let mut scene = PortalScene::new(&seeded_config(), &params);
    let bound = scene.bind_model(&full_model(64), &params).unwrap();

    assert_eq!(bound.meshes.len(), 5);
    assert_eq!(bound.meshes[0], BAKED_MESH_NODE);
    assert_eq!(bound.portal_source_points, 64);
    assert_eq!(bound.portal_points, 64);

    assert!(scene.is_bound());
    assert!(scene.graph().contains(BAKED_MESH_NODE));
    for name in BULB_NODES {
        assert!(scene.graph().contains(name));
    }
    // the back disc is looked up but not drawn, the front disc only feeds points
    assert!(!scene.graph().contains(DISC_BACK_NODE));
    assert!(!scene.graph().contains(DISC_FRONT_NODE));

    let baked = scene.graph().get(BAKED_MESH_NODE).unwrap();
    assert_eq!(baked.material, MaterialId::LightMap);
    assert!(matches!(
        scene.materials().get(baked.material),
        Material::LightMap(u) if u.baked_texture == TextureSlot::Baked
            && u.light_map_texture == TextureSlot::LightMap
    ));
}

#[test]
fn bulbs_share_one_flat_material() {
    let (scene, _) = bound_scene(16);
    let ids: Vec<MaterialId> = BULB_NODES
        .iter()
        .map(|n| scene.graph().get(n).unwrap().material)
        .collect();
    assert!(ids.iter().all(|id| *id == MaterialId::PoleLight));
    assert!(matches!(scene.materials().get(ids[0]), Material::Flat(_)));
}

#[test]
fn materials_carry_their_blending() {
    let (scene, _) = bound_scene(16);
    let materials = scene.materials();

    let light_map = materials.get(MaterialId::LightMap);
    assert_eq!(light_map.blend(), BlendMode::Opaque);
    assert!(light_map.depth_write());

    let bulbs = materials.get(MaterialId::PoleLight);
    assert_eq!(bulbs.blend(), BlendMode::Alpha);
    assert!(bulbs.depth_write());

    let portal = materials.get(MaterialId::PortalPoints);
    assert_eq!(portal.blend(), BlendMode::Alpha);
    assert!(portal.depth_write());

    let fireflies = materials.get(MaterialId::Fireflies);
    assert_eq!(fireflies.blend(), BlendMode::Additive);
    assert!(!fireflies.depth_write());

    let opaque = FlatMaterial {
        color: Color::WHITE,
        opacity: 1.0,
        transparent: false,
    };
    assert_eq!(Material::Flat(&opaque).blend(), BlendMode::Opaque);
}

#[test]
fn missing_nodes_are_all_reported_and_scene_is_untouched() {
    let params = SceneParams::default();
    let mut scene = PortalScene::new(&seeded_config(), &params);
    let model = Model::new(vec![node(BAKED_MESH_NODE, Transform::IDENTITY, Some(triangle()))]);

    let err = scene.bind_model(&model, &params).unwrap_err();
    let mut expected = vec![DISC_FRONT_NODE.to_string(), DISC_BACK_NODE.to_string()];
    expected.extend(BULB_NODES.iter().map(|s| s.to_string()));
    assert_eq!(err, BindError::MissingNodes(expected));
    assert!(err.to_string().contains("bulb-r2"));

    assert!(!scene.is_bound());
    assert_eq!(scene.graph().len(), 1);
}

#[test]
fn node_without_geometry_is_rejected() {
    let params = SceneParams::default();
    let mut scene = PortalScene::new(&seeded_config(), &params);
    let mut nodes = full_model(8).nodes().to_vec();
    nodes[0].mesh = None;

    let err = scene.bind_model(&Model::new(nodes), &params).unwrap_err();
    assert_eq!(err, BindError::MissingGeometry(BAKED_MESH_NODE.to_string()));
}

#[test]
fn portal_cloud_is_centred_and_placed_at_the_disc() {
    let (scene, _) = bound_scene(200);
    let (lo, hi) = portal_cloud(&scene).bounding_box().unwrap();
    assert!(((lo + hi) * 0.5).length() < 1e-5);

    let t = scene.portal_points().unwrap().transform;
    assert_eq!(t.translation, disc_transform().translation);
    assert_eq!(t.rotation, disc_transform().rotation);
    assert_eq!(t.scale, Vec3::ONE);
}

#[test]
fn density_keeps_roughly_that_share_of_points() {
    let (mut scene, _) = bound_scene(10_000);
    let kept = scene.regenerate_portal(0.5);
    assert!((4_500..=5_500).contains(&kept), "kept {kept}");
    assert_eq!(scene.regenerate_portal(0.0), 0);
    assert_eq!(scene.regenerate_portal(1.0), 10_000);
}

#[test]
fn resampling_at_the_same_density_draws_a_new_subset() {
    let (mut scene, _) = bound_scene(1_000);
    scene.regenerate_portal(0.5);
    let first = portal_cloud(&scene).clone();
    scene.regenerate_portal(0.5);
    let second = portal_cloud(&scene);

    assert_ne!(first.generation(), second.generation());
    assert_ne!(first.positions(), second.positions());
}

#[test]
fn sample_portal_edges() {
    let mut rng = rand::thread_rng();
    assert!(sample_portal(&[], 1.0, &mut rng).is_empty());
    let source = disc_points(32);
    assert_eq!(sample_portal(&source, 1.0, &mut rng).len(), 32);
    assert!(sample_portal(&source, 0.0, &mut rng).is_empty());
}

#[test]
fn fireflies_fill_the_configured_volume() {
    let field = FireflyField::default();
    let cloud = generate_fireflies(&field, &mut rand::thread_rng());
    assert_eq!(cloud.len(), FIREFLY_COUNT);
    assert_eq!(cloud.scales().len(), FIREFLY_COUNT);

    let half = field.horizontal_spread * 0.5;
    for p in cloud.positions() {
        assert!(p.x >= -half && p.x < half);
        assert!(p.z >= -half && p.z < half);
        assert!(p.y >= 0.0 && p.y < field.vertical_spread);
    }
    assert!(cloud.scales().iter().all(|s| (0.0..1.0).contains(s)));
}

#[test]
fn point_cloud_generations_are_unique() {
    let a = PointCloud::new(vec![Vec3::ZERO]);
    let b = PointCloud::new(vec![Vec3::ZERO]);
    assert_ne!(a.generation(), b.generation());
    assert_eq!(a.clone().generation(), a.generation());
}

#[test]
fn portal_color_updates_light_map_and_points() {
    let (scene, params) = bound_scene(16);
    let scene = Rc::new(RefCell::new(scene));
    let mut store = ParamStore::new(params);
    let _sub = {
        let scene = scene.clone();
        store.subscribe(move |change, params| scene.borrow_mut().apply(change, params))
    };

    let magenta = Color::from_hex("#ff00ff").unwrap();
    store.set_portal_color(magenta);
    store.set_portal_strength(0.8);

    let scene = scene.borrow();
    assert_eq!(scene.light_map().portal_color, magenta);
    assert!((scene.light_map().portal_strength - 0.8).abs() < 1e-6);
    assert_eq!(scene.points_material().color, magenta);
    // pole side untouched
    assert_eq!(scene.light_map().pole_color, SceneParams::default().pole_color);
}

#[test]
fn pole_color_updates_light_map_and_bulbs() {
    let (mut scene, mut params) = bound_scene(16);
    let green = Color::from_hex("#00ff00").unwrap();
    params.pole_color = green;
    params.pole_strength = 0.6;
    scene.apply(
        &ParamChange {
            key: ParamKey::PoleColor,
            value: ParamValue::Color(green),
        },
        &params,
    );

    assert_eq!(scene.light_map().pole_color, green);
    assert!((scene.light_map().pole_strength - 0.6).abs() < 1e-6);
    assert_eq!(scene.pole_light().color, green);
    let bulb = scene.graph().get(BULB_NODES[2]).unwrap();
    match scene.materials().get(bulb.material) {
        Material::Flat(m) => assert_eq!(m.color, green),
        other => panic!("bulb drawn with {other:?}"),
    }
}

#[test]
fn point_size_and_density_changes() {
    let (mut scene, mut params) = bound_scene(100);
    params.point_size = 0.25;
    scene.apply(
        &ParamChange {
            key: ParamKey::PointSize,
            value: ParamValue::Scalar(0.25),
        },
        &params,
    );
    assert!((scene.points_material().size - 0.25).abs() < 1e-6);

    let before = portal_cloud(&scene).generation();
    params.portal_density = 0.0;
    scene.apply(
        &ParamChange {
            key: ParamKey::PortalDensity,
            value: ParamValue::Scalar(0.0),
        },
        &params,
    );
    let cloud = portal_cloud(&scene);
    assert_ne!(cloud.generation(), before);
    assert!(cloud.is_empty());
}

#[test]
fn fireflies_survive_every_parameter_change() {
    let (scene, params) = bound_scene(100);
    let before = scene.fireflies().unwrap().clone();
    let scene = Rc::new(RefCell::new(scene));
    let mut store = ParamStore::new(params);
    let _sub = {
        let scene = scene.clone();
        store.subscribe(move |change, params| scene.borrow_mut().apply(change, params))
    };

    store.set_scene_color(Color::from_hex("#203040").unwrap());
    store.set_portal_strength(0.9);
    store.set_portal_color(Color::from_hex("#ff00ff").unwrap());
    store.set_pole_strength(0.4);
    store.set_pole_color(Color::from_hex("#00ff00").unwrap());
    store.set_point_size(0.3);
    let portal_before = portal_cloud(&scene.borrow()).generation();
    for density in [0.0, 0.25, 0.5, 1.0] {
        store.set_portal_density(density);
    }

    let scene = scene.borrow();
    assert_ne!(portal_cloud(&scene).generation(), portal_before);
    let after = scene.fireflies().unwrap();
    assert_eq!(after.generation(), before.generation());
    assert_eq!(after.len(), FIREFLY_COUNT);
    assert_eq!(after.positions(), before.positions());
}

#[test]
fn background_follows_scene_color_once_set() {
    let (mut scene, mut params) = bound_scene(4);
    assert_eq!(scene.clear_color(), Color::from_hex(CLEAR_COLOR_HEX).unwrap());
    assert_eq!(scene.graph().background(), None);

    params.scene_color = Color::from_hex("#102030").unwrap();
    scene.apply(
        &ParamChange {
            key: ParamKey::SceneColor,
            value: ParamValue::Color(params.scene_color),
        },
        &params,
    );
    assert_eq!(scene.clear_color(), params.scene_color);
}

#[test]
fn changes_before_binding_are_kept_for_later() {
    let mut params = SceneParams::default();
    let mut scene = PortalScene::new(&seeded_config(), &params);
    params.portal_density = 0.0;
    scene.apply(
        &ParamChange {
            key: ParamKey::PortalDensity,
            value: ParamValue::Scalar(0.0),
        },
        &params,
    );
    assert!(scene.portal_points().is_none());

    let bound = scene.bind_model(&full_model(50), &params).unwrap();
    assert_eq!(bound.portal_points, 0);
}

#[test]
fn loop_spins_portal_and_feeds_firefly_time() {
    let (mut scene, _) = bound_scene(16);
    let config = seeded_config();
    let mut camera = PerspectiveCamera::new(&config.camera, 1.0);
    let mut controls = OrbitControls::new(config.controls.clone(), config.camera.target);
    let mut render_loop = RenderLoop::new(LoopControl::new());
    let start = scene.portal_points().unwrap().transform.rotation.x;

    render_loop.tick(0.0, &mut scene, &mut controls, &mut camera);
    let state = render_loop.tick(2.0, &mut scene, &mut controls, &mut camera);
    let LoopState::Continue(time) = state else {
        panic!("loop stopped");
    };
    assert_eq!(time.frame, 2);
    assert!((time.delta - 2.0).abs() < 1e-6);

    let rotation = scene.portal_points().unwrap().transform.rotation.x;
    assert!((rotation - (start + PORTAL_SPIN_RATE * 2.0)).abs() < 1e-5);
    assert!((scene.firefly_uniforms().time - 2.0).abs() < 1e-6);

    // a clock going backwards yields a zero delta
    let LoopState::Continue(time) = render_loop.tick(1.5, &mut scene, &mut controls, &mut camera)
    else {
        panic!("loop stopped");
    };
    assert_eq!(time.delta, 0.0);
    let after = scene.portal_points().unwrap().transform.rotation.x;
    assert!((after - rotation).abs() < 1e-6);
}

#[test]
fn regeneration_resets_the_spin() {
    let (mut scene, _) = bound_scene(16);
    scene.advance(FrameTime {
        elapsed: 10.0,
        delta: 10.0,
        frame: 1,
    });
    scene.regenerate_portal(1.0);
    let rotation = scene.portal_points().unwrap().transform.rotation;
    assert_eq!(rotation, disc_transform().rotation);
}

#[test]
fn loop_task_drops_its_state_once_finished() {
    let state = Rc::new(());
    let mut task = LoopTask::new(state.clone());
    let mut steps = 0;

    assert!(task.step(|_| {
        steps += 1;
        true
    }));
    assert_eq!(Rc::strong_count(&state), 2);

    assert!(!task.step(|_| {
        steps += 1;
        false
    }));
    assert_eq!(Rc::strong_count(&state), 1);

    // later callbacks find nothing to run
    assert!(!task.step(|_| {
        steps += 1;
        true
    }));
    assert_eq!(steps, 2);
}

#[test]
fn stopped_loop_does_no_work() {
    let (mut scene, _) = bound_scene(16);
    let config = seeded_config();
    let mut camera = PerspectiveCamera::new(&config.camera, 1.0);
    let mut controls = OrbitControls::new(config.controls.clone(), config.camera.target);
    let control = LoopControl::new();
    let mut render_loop = RenderLoop::new(control.clone());

    render_loop.tick(0.5, &mut scene, &mut controls, &mut camera);
    control.stop();
    assert!(render_loop.control().is_stopped());
    assert_eq!(
        render_loop.tick(1.0, &mut scene, &mut controls, &mut camera),
        LoopState::Stopped
    );
    assert_eq!(render_loop.frames(), 1);
    assert!((scene.firefly_uniforms().time - 0.5).abs() < 1e-6);
}
