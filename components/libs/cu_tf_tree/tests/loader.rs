use approx::assert_relative_eq;
use cu_tf_tree::{
    read_configuration, BufferTree, FormatLoader, RonStaticLoader, StampedIsometry, TfError,
    TransformType,
};
use std::path::PathBuf;

fn res(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("res").join(name)
}

#[test]
fn test_load_robot_description() {
    let tree = BufferTree::new();
    RonStaticLoader::new()
        .load_into_buffer(&res("edges.ron"), &tree)
        .unwrap();
    assert_eq!(tree.edge_count(), 4);

    let lidar = tree.lookup_transform("map", "lidar", 1_000_000).unwrap();
    let t = lidar.translation();
    assert_relative_eq!(t[0], 1.2, epsilon = 1e-9);
    assert_relative_eq!(t[1], 2.0, epsilon = 1e-9);
    assert_relative_eq!(t[2], 0.3, epsilon = 1e-9);

    let camera = tree.lookup_transform("lidar", "camera", 0).unwrap();
    let [_, _, yaw] = camera.euler_angles();
    assert_relative_eq!(yaw, std::f64::consts::FRAC_PI_2, epsilon = 1e-9);
}

#[test]
fn test_loaded_edges_are_static() {
    let tree = BufferTree::new();
    RonStaticLoader::new()
        .load_into_buffer(&res("edges.ron"), &tree)
        .unwrap();
    let result = tree.update(
        "odom",
        "base_link",
        StampedIsometry::identity(10),
        TransformType::Dynamic,
    );
    assert!(matches!(result, Err(TfError::InvalidGraph(_))));
}

#[test]
fn test_load_with_configuration() {
    let config = read_configuration(res("tf_buffer.ron")).unwrap();
    assert_eq!(config.max_transform_history, Some(1000));
    let tree = BufferTree::with_config(config);
    RonStaticLoader::new()
        .load_into_buffer(&res("edges.ron"), &tree)
        .unwrap();
    assert_eq!(tree.frames().len(), 5);
}
