use std::fs;
use std::path::PathBuf;

use turret::core::articulation::{ compute_barrel_pivot, TankState };
use turret::core::scene_loader::load_scene;
use turret::io::obj_utils::load_mesh;
use turret::math::constants::Vector3f;
use turret::math::transform::Transform;

// Unit cube with one uv square per face, six quads.
const CUBE: &str = "\
o cube
v -0.5 -0.5 0.5
v 0.5 -0.5 0.5
v 0.5 0.5 0.5
v -0.5 0.5 0.5
v -0.5 -0.5 -0.5
v 0.5 -0.5 -0.5
v 0.5 0.5 -0.5
v -0.5 0.5 -0.5
vt 0.0 0.0
vt 1.0 0.0
vt 1.0 1.0
vt 0.0 1.0
vn 0.0 0.0 1.0
vn 0.0 0.0 -1.0
vn 1.0 0.0 0.0
vn -1.0 0.0 0.0
vn 0.0 1.0 0.0
vn 0.0 -1.0 0.0
f 1/1/1 2/2/1 3/3/1 4/4/1
f 6/1/2 5/2/2 8/3/2 7/4/2
f 2/1/3 6/2/3 7/3/3 3/4/3
f 5/1/4 1/2/4 4/3/4 8/4/4
f 4/1/5 3/2/5 7/3/5 8/4/5
f 5/1/6 6/2/6 2/3/6 1/4/6
";

const SCENE: &str = r#"
<scene>
    <tank>
        <float name="height_offset" value="0.46"/>
        <point name="turret_pivot" value="0, 0, 0"/>
        <point name="barrel_pivot" value="1.5, 0.8, 0"/>
        <point name="join_pivot" value="0, 0, 0"/>
        <string name="filename" value="cube.obj"/>
    </tank>
    <sensor type="perspective">
        <float name="fov" value="45"/>
        <transform name="to_world">
            <lookat origin="0, 5, 10" target="0, 0, 0" up="0, 1, 0"/>
        </transform>
    </sensor>
</scene>
"#;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("turret-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn cube_tangents_are_orthogonal_to_normals() {
    let dir = scratch_dir("cube");
    let path = dir.join("cube.obj");
    fs::write(&path, CUBE).unwrap();

    let mesh = load_mesh(&path).unwrap();
    assert_eq!(mesh.buffers.vertex_count(), 24);
    assert_eq!(mesh.buffers.triangle_count(), 12);
    assert_eq!(mesh.tangents.degenerate_triangles, 0);
    assert_eq!(mesh.tangents.zero_tangents, 0);

    for i in 0..mesh.buffers.vertex_count() {
        let n = mesh.buffers.normal(i);
        let t = mesh.tangents.tangent(i);
        let b = mesh.tangents.bitangent(i);
        assert!(t.dot(&n).abs() < 1e-5);
        assert!(b.dot(&n).abs() < 1e-5);
        assert!((t.norm() - 1.0).abs() < 1e-5);
        assert!((b.norm() - 1.0).abs() < 1e-5);
        // uv squares are mapped without shear
        assert!(t.dot(&b).abs() < 1e-5);
    }

    fs::remove_dir_all(&dir).ok();
}

#[test]
fn scene_drives_articulation_and_mesh() {
    let dir = scratch_dir("scene");
    fs::write(dir.join("cube.obj"), CUBE).unwrap();
    let scene_path = dir.join("scene.xml");
    fs::write(&scene_path, SCENE).unwrap();

    let scene = load_scene(&scene_path).unwrap();
    let barrel = Vector3f::new(1.5, 0.8, 0.0);
    let rest = scene.articulation.barrel_pivot(&scene.state);
    assert!((rest - barrel).norm() < 1e-5);
    assert!((rest - compute_barrel_pivot(&TankState::default(), &Vector3f::zeros(), &barrel, &Vector3f::zeros())).norm() < 1e-6);

    let turned = TankState { turret_rotation: std::f32::consts::PI, ..scene.state };
    let p = scene.articulation.barrel_pivot(&turned);
    assert!((p - Vector3f::new(-1.5, 0.8, 0.0)).norm() < 1e-5);

    let win = scene.view.to_screen(&Transform::identity(), &p).unwrap();
    assert!(win.x < scene.view.viewport().width / 2.0);
    assert!(win.z > 0.0 && win.z < 1.0);

    let mesh = load_mesh(scene.mesh_path.as_ref().unwrap()).unwrap();
    assert_eq!(mesh.buffers.triangle_count(), 12);

    fs::remove_dir_all(&dir).ok();
}
