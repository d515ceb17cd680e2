use turret::io::obj_utils::load_mesh;
use turret::math::constants::Float;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <mesh.obj>", args[0]);
        std::process::exit(1);
    }

    let mesh = load_mesh(&args[1]).unwrap_or_else(|e| {
        eprintln!("failed to load {}: {}", args[1], e);
        std::process::exit(1);
    });

    let buffers = &mesh.buffers;
    let tangents = &mesh.tangents;
    let mut max_t_dot_n: Float = 0.0;
    let mut max_b_dot_n: Float = 0.0;
    let mut max_t_dot_b: Float = 0.0;
    for i in 0..buffers.vertex_count() {
        let n = buffers.normal(i).normalize();
        let t = tangents.tangent(i);
        let b = tangents.bitangent(i);
        max_t_dot_n = max_t_dot_n.max(t.dot(&n).abs());
        max_b_dot_n = max_b_dot_n.max(b.dot(&n).abs());
        max_t_dot_b = max_t_dot_b.max(t.dot(&b).abs());
    }

    println!("Vertices: {}", buffers.vertex_count());
    println!("Triangles: {}", buffers.triangle_count());
    if let Some((lo, hi)) = buffers.bounding_box() {
        println!("Bounds: ({:.4}, {:.4}, {:.4}) - ({:.4}, {:.4}, {:.4})", lo.x, lo.y, lo.z, hi.x, hi.y, hi.z);
    }
    println!("Degenerate uv triangles: {}", tangents.degenerate_triangles);
    println!("Vertices without tangent: {}", tangents.zero_tangents);
    println!("Max |t.n|: {:.6}", max_t_dot_n);
    println!("Max |b.n|: {:.6}", max_b_dot_n);
    println!("Max |t.b|: {:.6}", max_t_dot_b);
}
