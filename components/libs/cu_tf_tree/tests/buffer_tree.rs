use approx::assert_relative_eq;
use cu_tf_tree::{BufferTree, StampedIsometry, TfError, TransformType};
use std::f64::consts::FRAC_PI_2;

fn translation(x: f64, y: f64, z: f64, stamp: i64) -> StampedIsometry {
    StampedIsometry::new([x, y, z], [0.0, 0.0, 0.0, 1.0], stamp)
}

fn yaw(angle: f64, stamp: i64) -> StampedIsometry {
    let half = angle / 2.0;
    StampedIsometry::new([0.0, 0.0, 0.0], [0.0, 0.0, half.sin(), half.cos()], stamp)
}

#[test]
fn test_cycle_is_rejected_and_graph_unchanged() {
    let tree = BufferTree::new();
    tree.update("A", "B", translation(1.0, 0.0, 0.0, 0), TransformType::Static)
        .unwrap();
    tree.update("B", "C", translation(0.0, 1.0, 0.0, 0), TransformType::Static)
        .unwrap();

    let result = tree.update("C", "A", translation(0.0, 0.0, 1.0, 0), TransformType::Static);
    assert!(matches!(result, Err(TfError::InvalidGraph(_))));
    assert_eq!(tree.edge_count(), 2);

    let t = tree.lookup_transform("A", "C", 0).unwrap();
    assert_eq!(t.translation(), [1.0, 1.0, 0.0]);
}

#[test]
fn test_second_parent_is_rejected() {
    let tree = BufferTree::new();
    tree.update("map", "odom", translation(1.0, 0.0, 0.0, 0), TransformType::Static)
        .unwrap();
    let result = tree.update("world", "odom", translation(0.0, 0.0, 0.0, 0), TransformType::Static);
    assert!(matches!(result, Err(TfError::InvalidGraph(_))));
    assert_eq!(tree.frames(), vec!["map", "odom"]);
}

#[test]
fn test_dynamic_interpolation_and_window() {
    let tree = BufferTree::new();
    tree.update("odom", "base_link", translation(0.0, 0.0, 0.0, 0), TransformType::Dynamic)
        .unwrap();
    tree.update("odom", "base_link", translation(10.0, 0.0, 0.0, 10), TransformType::Dynamic)
        .unwrap();

    let t = tree.lookup_transform("odom", "base_link", 5).unwrap();
    assert_relative_eq!(t.translation()[0], 5.0);
    assert_relative_eq!(t.translation()[1], 0.0);
    assert_eq!(t.stamp(), 5);

    assert!(matches!(
        tree.lookup_transform("odom", "base_link", -1),
        Err(TfError::AttemptedLookupInPast(_))
    ));
    assert!(matches!(
        tree.lookup_transform("odom", "base_link", 25),
        Err(TfError::AttemptedLookUpInFuture(_))
    ));
}

#[test]
fn test_out_of_order_samples() {
    let tree = BufferTree::new();
    for (x, stamp) in [(20.0, 20), (0.0, 0), (10.0, 10)] {
        tree.update("odom", "base_link", translation(x, 0.0, 0.0, stamp), TransformType::Dynamic)
            .unwrap();
    }
    let t = tree.lookup_transform("odom", "base_link", 15).unwrap();
    assert_relative_eq!(t.translation()[0], 15.0);

    // same stamp overwrites
    tree.update("odom", "base_link", translation(-10.0, 0.0, 0.0, 10), TransformType::Dynamic)
        .unwrap();
    let t = tree.lookup_transform("odom", "base_link", 10).unwrap();
    assert_relative_eq!(t.translation()[0], -10.0);
}

#[test]
fn test_static_edge_is_time_invariant() {
    let tree = BufferTree::new();
    tree.update("map", "odom", translation(1.0, 0.0, 0.0, 0), TransformType::Static)
        .unwrap();
    for time in [0, 100, -100, i64::MAX] {
        let t = tree.lookup_transform("map", "odom", time).unwrap();
        assert_eq!(t.translation(), [1.0, 0.0, 0.0]);
    }
    tree.update("map", "odom", translation(2.0, 0.0, 0.0, 50), TransformType::Static)
        .unwrap();
    let t = tree.lookup_transform("map", "odom", 0).unwrap();
    assert_eq!(t.translation(), [2.0, 0.0, 0.0]);
}

#[test]
fn test_kind_is_fixed_per_edge() {
    let tree = BufferTree::new();
    tree.update("map", "odom", translation(1.0, 0.0, 0.0, 0), TransformType::Static)
        .unwrap();
    let result = tree.update("map", "odom", translation(1.0, 0.0, 0.0, 1), TransformType::Dynamic);
    assert!(matches!(result, Err(TfError::InvalidGraph(_))));
}

#[test]
fn test_disconnected_frames() {
    let tree = BufferTree::new();
    tree.update("map", "odom", translation(1.0, 0.0, 0.0, 0), TransformType::Static)
        .unwrap();
    tree.update("world", "camera", translation(1.0, 0.0, 0.0, 0), TransformType::Static)
        .unwrap();

    assert!(matches!(
        tree.lookup_transform("odom", "camera", 0),
        Err(TfError::CouldNotFindTransform(_))
    ));
    assert!(matches!(
        tree.lookup_latest_transform("odom", "camera"),
        Err(TfError::CouldNotFindTransform(_))
    ));
    assert!(matches!(
        tree.lookup_latest_transform("odom", "nowhere"),
        Err(TfError::CouldNotFindTransform(_))
    ));
}

#[test]
fn test_lookup_across_branches() {
    // map -> odom -> base_link -> {camera, lidar}
    let tree = BufferTree::new();
    tree.update("map", "odom", translation(1.0, 0.0, 0.0, 0), TransformType::Static)
        .unwrap();
    tree.update("odom", "base_link", yaw(FRAC_PI_2, 0), TransformType::Dynamic)
        .unwrap();
    tree.update("odom", "base_link", yaw(FRAC_PI_2, 100), TransformType::Dynamic)
        .unwrap();
    tree.update("base_link", "camera", translation(0.5, 0.0, 0.0, 0), TransformType::Static)
        .unwrap();
    tree.update("base_link", "lidar", translation(0.0, 0.0, 1.0, 0), TransformType::Static)
        .unwrap();

    let map_camera = tree.lookup_transform("map", "camera", 50).unwrap();
    let t = map_camera.translation();
    assert_relative_eq!(t[0], 1.0, epsilon = 1e-9);
    assert_relative_eq!(t[1], 0.5, epsilon = 1e-9);
    assert_relative_eq!(t[2], 0.0, epsilon = 1e-9);

    let camera_lidar = tree.lookup_transform("camera", "lidar", 50).unwrap();
    let t = camera_lidar.translation();
    assert_relative_eq!(t[0], -0.5, epsilon = 1e-9);
    assert_relative_eq!(t[1], 0.0, epsilon = 1e-9);
    assert_relative_eq!(t[2], 1.0, epsilon = 1e-9);

    // Round trip through the inverse lands back on identity.
    let back = tree.lookup_transform("lidar", "camera", 50).unwrap();
    let identity = &camera_lidar * &back;
    for (a, b) in identity.translation().iter().zip([0.0, 0.0, 0.0]) {
        assert_relative_eq!(*a, b, epsilon = 1e-9);
    }
    assert_relative_eq!(identity.rotation()[3].abs(), 1.0, epsilon = 1e-9);
}

#[test]
fn test_interpolated_rotation_takes_shorter_arc() {
    let tree = BufferTree::new();
    tree.update("odom", "base_link", yaw(170f64.to_radians(), 0), TransformType::Dynamic)
        .unwrap();
    tree.update("odom", "base_link", yaw(-170f64.to_radians(), 10), TransformType::Dynamic)
        .unwrap();
    let mid = tree.lookup_transform("odom", "base_link", 5).unwrap();
    let [_, _, z] = mid.euler_angles();
    assert_relative_eq!(z.abs(), std::f64::consts::PI, epsilon = 1e-9);
    let r = mid.rotation();
    let norm = r.iter().map(|c| c * c).sum::<f64>().sqrt();
    assert_relative_eq!(norm, 1.0, epsilon = 1e-12);
}

#[test]
fn test_latest_mixes_edge_stamps() {
    let tree = BufferTree::new();
    tree.update("map", "odom", translation(1.0, 0.0, 0.0, 0), TransformType::Dynamic)
        .unwrap();
    tree.update("map", "odom", translation(2.0, 0.0, 0.0, 30), TransformType::Dynamic)
        .unwrap();
    tree.update("odom", "base_link", translation(0.0, 1.0, 0.0, 10), TransformType::Dynamic)
        .unwrap();

    let latest = tree.lookup_latest_transform("map", "base_link").unwrap();
    assert_eq!(latest.translation(), [2.0, 1.0, 0.0]);
    assert_eq!(latest.stamp(), 10);

    // No single instant covers both edges with these stamps.
    assert!(tree.lookup_transform("map", "base_link", 30).is_err());
}

#[test]
fn test_same_frame_lookup() {
    let tree = BufferTree::new();
    tree.update("map", "odom", translation(1.0, 0.0, 0.0, 0), TransformType::Static)
        .unwrap();
    let t = tree.lookup_transform("odom", "odom", 42).unwrap();
    assert_eq!(t.translation(), [0.0, 0.0, 0.0]);
    assert_eq!(t.rotation(), [0.0, 0.0, 0.0, 1.0]);
    assert!(matches!(
        tree.lookup_transform("ghost", "ghost", 0),
        Err(TfError::CouldNotFindTransform(_))
    ));
}

#[test]
fn test_chain_translation_sums() {
    let tree = BufferTree::new();
    let depth = 200;
    for i in 0..depth {
        tree.update(
            &format!("f{i}"),
            &format!("f{}", i + 1),
            translation(1.0, 0.0, 0.0, 0),
            TransformType::Static,
        )
        .unwrap();
    }
    let t = tree
        .lookup_transform("f0", &format!("f{depth}"), 0)
        .unwrap();
    assert_relative_eq!(t.translation()[0], depth as f64, epsilon = 1e-9);
    let t = tree
        .lookup_transform(&format!("f{depth}"), "f0", 0)
        .unwrap();
    assert_relative_eq!(t.translation()[0], -(depth as f64), epsilon = 1e-9);
}
