// Host-side tests for model and texture decoding.

use glam::Vec3;
use portal_core::*;
use std::io::Cursor;

const GLB_MAGIC: u32 = 0x4654_6C67;
const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;

// Quad corners as two triangles, shared by every node.
fn quad() -> Vec<[f32; 3]> {
    vec![
        [-1.0, 0.0, -1.0],
        [1.0, 0.0, -1.0],
        [1.0, 0.0, 1.0],
        [-1.0, 0.0, -1.0],
        [1.0, 0.0, 1.0],
        [-1.0, 0.0, 1.0],
    ]
}

fn pad_to_4(bytes: &mut Vec<u8>, fill: u8) {
    while bytes.len() % 4 != 0 {
        bytes.push(fill);
    }
}

/// Minimal binary glTF: one position-only mesh referenced by each named node.
fn build_glb(names: &[&str]) -> Vec<u8> {
    let positions = quad();
    let mut bin: Vec<u8> = positions
        .iter()
        .flatten()
        .flat_map(|f| f.to_le_bytes())
        .collect();
    let byte_length = bin.len();
    pad_to_4(&mut bin, 0);

    let nodes: Vec<String> = names
        .iter()
        .map(|name| {
            if *name == DISC_FRONT_NODE {
                // quarter turn around X, lifted one unit
                let s = std::f32::consts::FRAC_1_SQRT_2;
                format!(
                    r#"{{"name":"{name}","mesh":0,"translation":[0,1,0],"rotation":[{s},0,0,{s}]}}"#
                )
            } else {
                format!(r#"{{"name":"{name}","mesh":0}}"#)
            }
        })
        .collect();
    let roots: Vec<String> = (0..names.len()).map(|i| i.to_string()).collect();
    let json = format!(
        concat!(
            r#"{{"asset":{{"version":"2.0"}},"scene":0,"scenes":[{{"nodes":[{roots}]}}],"#,
            r#""nodes":[{nodes}],"meshes":[{{"primitives":[{{"attributes":{{"POSITION":0}}}}]}}],"#,
            r#""accessors":[{{"bufferView":0,"componentType":5126,"count":{count},"type":"VEC3","#,
            r#""min":[-1,0,-1],"max":[1,0,1]}}],"#,
            r#""bufferViews":[{{"buffer":0,"byteLength":{len}}}],"buffers":[{{"byteLength":{len}}}]}}"#
        ),
        roots = roots.join(","),
        nodes = nodes.join(","),
        count = positions.len(),
        len = byte_length,
    );
    let mut json = json.into_bytes();
    pad_to_4(&mut json, b' ');

    let total = 12 + 8 + json.len() + 8 + bin.len();
    let mut out = Vec::with_capacity(total);
    out.extend(GLB_MAGIC.to_le_bytes());
    out.extend(2u32.to_le_bytes());
    out.extend((total as u32).to_le_bytes());
    out.extend((json.len() as u32).to_le_bytes());
    out.extend(CHUNK_JSON.to_le_bytes());
    out.extend(json);
    out.extend((bin.len() as u32).to_le_bytes());
    out.extend(CHUNK_BIN.to_le_bytes());
    out.extend(bin);
    out
}

fn portal_glb() -> Vec<u8> {
    let mut names = vec![BAKED_MESH_NODE, DISC_FRONT_NODE, DISC_BACK_NODE];
    names.extend(BULB_NODES);
    build_glb(&names)
}

// 2x2 PNG: red, green on top; blue, white below.
fn png_2x2() -> Vec<u8> {
    let mut img = image::RgbaImage::new(2, 2);
    img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
    img.put_pixel(1, 0, image::Rgba([0, 255, 0, 255]));
    img.put_pixel(0, 1, image::Rgba([0, 0, 255, 255]));
    img.put_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

#[test]
fn glb_nodes_are_read_by_name() {
    let model = Model::from_glb(&portal_glb()).unwrap();
    assert_eq!(model.nodes().len(), 7);
    assert!(model.find_child("missing").is_none());

    let baked = model.find_child(BAKED_MESH_NODE).unwrap();
    let mesh = baked.mesh.as_ref().unwrap();
    assert_eq!(mesh.vertex_count(), 6);
    // no uv attribute: zero-filled, still one per vertex
    assert_eq!(mesh.uvs.len(), 6);
    // no index accessor: sequential triangles
    assert_eq!(mesh.indices, (0..6).collect::<Vec<u32>>());
    assert_eq!(baked.transform, Transform::IDENTITY);
}

#[test]
fn glb_node_transform_is_decomposed() {
    let model = Model::from_glb(&portal_glb()).unwrap();
    let disc = model.find_child(DISC_FRONT_NODE).unwrap();
    assert_eq!(disc.transform.translation, Vec3::new(0.0, 1.0, 0.0));
    assert!((disc.transform.rotation.x - std::f32::consts::FRAC_PI_2).abs() < 1e-4);
    assert!(disc.transform.rotation.y.abs() < 1e-4);
    assert!(disc.transform.rotation.z.abs() < 1e-4);
}

#[test]
fn decoded_glb_binds_into_the_scene() {
    let model = Model::from_glb(&portal_glb()).unwrap();
    let params = SceneParams::default();
    let config = SceneConfig {
        seed: Some(1),
        ..SceneConfig::default()
    };
    let mut scene = PortalScene::new(&config, &params);
    let bound = scene.bind_model(&model, &params).unwrap();
    assert_eq!(bound.portal_source_points, 6);
    assert_eq!(bound.portal_points, 6);
}

#[test]
fn glb_missing_a_bulb_fails_to_bind() {
    let model = Model::from_glb(&build_glb(&[
        BAKED_MESH_NODE,
        DISC_FRONT_NODE,
        DISC_BACK_NODE,
        "bulb-l1",
        "bulb-l2",
        "bulb-r1",
    ]))
    .unwrap();
    let params = SceneParams::default();
    let mut scene = PortalScene::new(&SceneConfig::default(), &params);
    assert_eq!(
        scene.bind_model(&model, &params),
        Err(BindError::MissingNodes(vec!["bulb-r2".to_string()]))
    );
}

#[test]
fn garbage_model_bytes_are_a_model_error() {
    let err = Model::from_glb(b"definitely not gltf").unwrap_err();
    assert!(matches!(err, LoadError::Model(_)));
}

#[test]
fn png_decodes_to_rgba() {
    let tex = TextureImage::decode(&png_2x2(), TextureOptions::BAKED).unwrap();
    assert_eq!((tex.width, tex.height), (2, 2));
    assert_eq!(tex.rgba.len(), 16);
    assert_eq!(&tex.rgba[0..4], &[255, 0, 0, 255]);
    assert_eq!(&tex.rgba[8..12], &[0, 0, 255, 255]);
    assert_eq!(tex.options.color_space, ColorSpace::Srgb);
}

#[test]
fn flip_y_swaps_rows() {
    let options = TextureOptions {
        color_space: ColorSpace::Linear,
        flip_y: true,
    };
    let tex = TextureImage::decode(&png_2x2(), options).unwrap();
    assert_eq!(&tex.rgba[0..4], &[0, 0, 255, 255]);
    assert_eq!(&tex.rgba[8..12], &[255, 0, 0, 255]);
}

#[test]
fn garbage_texture_bytes_are_a_texture_error() {
    let err = TextureImage::decode(&[1, 2, 3, 4], TextureOptions::BAKED).unwrap_err();
    assert!(matches!(err, LoadError::Texture(_)));
}

#[test]
fn solid_placeholder_is_one_pixel() {
    let tex = TextureImage::solid([10, 20, 30, 255], TextureOptions::BAKED);
    assert_eq!((tex.width, tex.height), (1, 1));
    assert_eq!(tex.rgba, vec![10, 20, 30, 255]);
}

#[test]
fn loaders_read_through_an_asset_source() {
    let mut source = MemorySource::new();
    source.insert("model.glb", portal_glb());
    source.insert("BakedMap.png", png_2x2());

    let model = pollster::block_on(load_model(&source, "model.glb")).unwrap();
    assert!(model.find_child(BAKED_MESH_NODE).is_some());

    let tex = pollster::block_on(load_texture(&source, "BakedMap.png", TextureOptions::BAKED))
        .unwrap();
    assert_eq!(tex.width, 2);
}

#[test]
fn missing_asset_is_a_fetch_error() {
    let source = MemorySource::new();
    let err = pollster::block_on(load_model(&source, "model.glb")).unwrap_err();
    match err {
        LoadError::Fetch { path, .. } => assert_eq!(path, "model.glb"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(pollster::block_on(load_texture(&source, "LightMap.jpg", TextureOptions::BAKED)).is_err());
}
