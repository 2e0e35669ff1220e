use cu_tf_tree::{BufferTree, StampedIsometry, TfResult, TransformType};

fn main() -> TfResult<()> {
    println!("Cu TF Tree - Basic Usage Demo");
    println!("=============================");

    let tree = BufferTree::new();

    // Print every committed update.
    tree.register_observer(
        |from: &str, to: &str, t: &StampedIsometry, kind: TransformType| {
            println!("  [observer] {from} -> {to} ({kind}): {t}");
        },
    );

    // Static mount of the lidar on the robot
    tree.update(
        "base_link",
        "lidar",
        StampedIsometry::new([0.2, 0.0, 0.3], [0.0, 0.0, 0.0, 1.0], 0),
        TransformType::Static,
    )?;

    // Odometry at 1s and 2s, the robot moves 1m forward and turns 90 degrees
    let half_turn = std::f64::consts::FRAC_PI_4;
    tree.update(
        "odom",
        "base_link",
        StampedIsometry::from_secs([0.0, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0], 1.0),
        TransformType::Dynamic,
    )?;
    tree.update(
        "odom",
        "base_link",
        StampedIsometry::from_secs([1.0, 0.0, 0.0], [0.0, 0.0, half_turn.sin(), half_turn.cos()], 2.0),
        TransformType::Dynamic,
    )?;

    println!("\nLookups:");
    let mid = tree.lookup_transform("odom", "lidar", 1_500_000_000)?;
    println!("  odom -> lidar at 1.5s: {mid}");
    let [roll, pitch, yaw] = mid.euler_angles();
    println!("  euler: roll={roll:.3} pitch={pitch:.3} yaw={yaw:.3}");

    let latest = tree.lookup_latest_transform("lidar", "odom")?;
    println!("  latest lidar -> odom: {latest}");

    match tree.lookup_transform("odom", "lidar", 5_000_000_000) {
        Ok(t) => println!("  odom -> lidar at 5s: {t}"),
        Err(e) => println!("  odom -> lidar at 5s failed: {e}"),
    }

    // A late subscriber gets the whole history first.
    println!("\nLate observer:");
    tree.register_observer(
        |from: &str, to: &str, t: &StampedIsometry, _: TransformType| {
            println!("  [replay] {from} -> {to} at {:.3}s", t.stamp_secs());
        },
    );

    println!("\nGraph:\n{}", tree.visualize());
    Ok(())
}
