//! Build a tree of named 3D points and run each kind of query against it.
//!
//! Run with `RUST_LOG=debug cargo run --example nearest_points` to see build logs.

use kd_index::kdtree::{KdTree, KdTreeIndex};

fn main() {
    env_logger::init();

    let stations = [
        ("alpha", [0.0, 0.0, 0.0]),
        ("bravo", [4.0, 1.0, -2.0]),
        ("charlie", [-3.0, 5.0, 1.0]),
        ("delta", [2.5, 2.5, 2.5]),
        ("echo", [10.0, -4.0, 0.5]),
        ("foxtrot", [-6.0, -6.0, -6.0]),
    ];
    let tree = KdTree::<f64, 3, &str>::from_iter_with_payload(stations, |(name, p)| (p, name));

    let q = [2.0, 2.0, 1.0];
    if let Some(nearest) = tree.nearest(&q) {
        println!(
            "nearest to {:?}: {} (d = {:.3})",
            q,
            tree.payload(nearest.index),
            nearest.dist2.sqrt()
        );
    }

    println!("\n3 nearest:");
    for neighbor in tree.knn(&q, 3) {
        println!(
            "  {:<8} d = {:.3}",
            tree.payload(neighbor.index),
            neighbor.dist2.sqrt()
        );
    }

    println!("\nwithin 5.0:");
    for i in tree.radius_search(&q, 5.0) {
        println!("  {}", tree.payload(i));
    }

    println!("\ninside [-5, -5, -5]..[5, 5, 5]:");
    for i in tree.range_search(&[-5.0, -5.0, -5.0], &[5.0, 5.0, 5.0]) {
        let (point, name) = tree.item(i);
        println!("  {name:<8} {point:?}");
    }

    println!("\ntree depth: {}", tree.depth());
}
