// Copyright 2020 TwoCookingMice

use turret::core::scene_loader::load_scene;
use turret::io::obj_utils;
use turret::math::constants::Float;
use turret::math::transform::Transform;

use std::env;

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <scene.xml> [--x X] [--z Z] [--rotation R] [--turret R] [--elevation R] [--height H]", args[0]);
        std::process::exit(1);
    }

    let mut scene = match load_scene(&args[1]) {
        Ok(scene) => scene,
        Err(e) => {
            eprintln!("failed to load scene {}: {}", args[1], e);
            std::process::exit(1);
        }
    };

    let parse = |v: Option<&String>| v.and_then(|v| v.parse::<Float>().ok());
    let mut i = 2;
    while i < args.len() {
        let flag = args[i].as_str();
        i += 1;
        let value = parse(args.get(i));
        match (flag, value) {
            ("--x", Some(v)) => scene.state.position.x = v,
            ("--z", Some(v)) => scene.state.position.z = v,
            ("--rotation", Some(v)) => scene.state.rotation = v,
            ("--turret", Some(v)) => scene.state.turret_rotation = v,
            ("--elevation", Some(v)) => scene.state.barrel_elevation = v,
            ("--height", Some(v)) => scene.articulation.height_offset = v,
            _ => {
                eprintln!("ignoring argument: {}", flag);
                continue;
            }
        }
        i += 1;
    }

    let rig = &scene.articulation;
    let state = &scene.state;
    let pivot = rig.barrel_pivot(state);
    println!("Barrel pivot: {:.6}, {:.6}, {:.6}", pivot.x, pivot.y, pivot.z);
    if let Some(dir) = rig.aim_direction(state) {
        println!("Aim direction: {:.6}, {:.6}, {:.6}", dir.x, dir.y, dir.z);
    }
    match scene.view.to_screen(&Transform::identity(), &pivot) {
        Ok(win) => println!("Screen position: {:.2}, {:.2} (depth {:.6})", win.x, win.y, win.z),
        Err(e) => log::warn!("Barrel pivot has no screen position: {}.", e),
    }

    if let Some(path) = &scene.mesh_path {
        match obj_utils::load_mesh(path) {
            Ok(mesh) => {
                println!("Mesh: {} vertices, {} triangles", mesh.buffers.vertex_count(), mesh.buffers.triangle_count());
                println!("Degenerate uv triangles: {}", mesh.tangents.degenerate_triangles);
                println!("Vertices without tangent: {}", mesh.tangents.zero_tangents);
            }
            Err(e) => {
                eprintln!("failed to load mesh {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }
}
