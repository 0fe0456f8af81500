use std::f32::consts::PI;

use cgmath::{InnerSpace, Point3};
use pagoda_viewer::{
    camera::{CameraController, OrbitCamera, Projection},
    config::{CAMERA, ORBIT, OrbitConfig},
};

fn projection() -> Projection {
    Projection::from_config(800, 600, &CAMERA)
}

fn distance(a: Point3<f32>, b: Point3<f32>) -> f32 {
    (a - b).magnitude()
}

#[test]
fn orbit_camera_reproduces_its_start_position() {
    let camera = OrbitCamera::from_config(&CAMERA);
    let expected = Point3::from(CAMERA.position);
    assert!(distance(camera.position(), expected) < 1e-4);
    assert!((camera.radius - (8.0f32 * 8.0 + 6.0 * 6.0 + 14.0 * 14.0).sqrt()).abs() < 1e-4);
}

#[test]
fn camera_never_goes_below_the_horizon_limit() {
    let mut camera = OrbitCamera::new(Point3::new(0.0, -5.0, 5.0), Point3::new(0.0, 0.0, 0.0));
    camera.clamp(&ORBIT);
    assert!(camera.phi <= ORBIT.max_polar_angle + 1e-6);
    assert!(camera.position().y > 0.0);
}

#[test]
fn camera_stays_off_the_pole() {
    let mut camera = OrbitCamera::new(Point3::new(0.0, 10.0, 0.0), Point3::new(0.0, 0.0, 0.0));
    camera.clamp(&ORBIT);
    assert!(camera.phi > 0.0);
}

#[test]
fn rotation_is_damped_over_frames() {
    let projection = projection();
    let mut camera = OrbitCamera::from_config(&CAMERA);
    let theta = camera.theta;
    let mut controller = CameraController::new(ORBIT, 600);

    controller.rotate_pixels(-100.0, 0.0);
    let total = 2.0 * PI * 100.0 / 600.0;

    controller.update(&mut camera, &projection);
    let first_step = camera.theta - theta;
    assert!((first_step - total * ORBIT.damping).abs() < 1e-4);
    assert!(controller.is_moving());

    for _ in 0..1000 {
        controller.update(&mut camera, &projection);
    }
    assert!(!controller.is_moving());
    assert!((camera.theta - theta - total).abs() < 1e-3);
}

#[test]
fn wheel_zooms_towards_the_target() {
    let projection = projection();
    let mut camera = OrbitCamera::from_config(&CAMERA);
    let radius = camera.radius;
    let mut controller = CameraController::new(ORBIT, 600);

    controller.zoom_steps(1.0);
    controller.update(&mut camera, &projection);
    assert!((camera.radius - radius * 0.95).abs() < 1e-4);

    controller.zoom_steps(-1.0);
    controller.update(&mut camera, &projection);
    assert!((camera.radius - radius).abs() < 1e-3);
}

#[test]
fn panning_moves_the_target() {
    let projection = projection();
    let mut camera = OrbitCamera::from_config(&CAMERA);
    let target = camera.target;
    let mut controller = CameraController::new(ORBIT, 600);

    controller.pan_pixels(50.0, 0.0);
    controller.update(&mut camera, &projection);

    assert!(distance(camera.target, target) > 0.0);
    // Horizontal panning keeps the target's height
    assert!((camera.target.y - target.y).abs() < 1e-5);
}

#[test]
fn panning_can_be_disabled() {
    let projection = projection();
    let mut camera = OrbitCamera::from_config(&CAMERA);
    let target = camera.target;
    let mut controller = CameraController::new(
        OrbitConfig {
            enable_pan: false,
            ..ORBIT
        },
        600,
    );

    controller.pan_pixels(50.0, 20.0);
    controller.update(&mut camera, &projection);

    assert_eq!(camera.target, target);
}
