use std::mem::size_of;

use pagoda_viewer::{
    camera::CameraUniform,
    color::LinearColor,
    config::{LIGHTING, OVERLAY, WATER},
    data_structures::material::{StandardUniform, WaterParams, WaterUniform},
    pipelines::{light::LightUniform, overlay::OverlayUniform},
};

#[test]
fn uniforms_match_their_shader_layout() {
    assert_eq!(size_of::<StandardUniform>(), 48);
    assert_eq!(size_of::<WaterUniform>(), 80);
    assert_eq!(size_of::<LightUniform>(), 96);
    assert_eq!(size_of::<CameraUniform>(), 80);
    assert_eq!(size_of::<OverlayUniform>(), 80);
}

#[test]
fn configured_colours_parse() {
    assert!(WaterParams::from_config(&WATER).is_ok());
    assert!(LightUniform::from_config(&LIGHTING).is_ok());
    assert!(OverlayUniform::from_config(&OVERLAY).is_ok());
}

#[test]
fn hex_colours_are_converted_to_linear() {
    let white = LinearColor::from_hex("#ffffff").expect("valid colour");
    assert!(white.to_array().iter().all(|c| (c - 1.0).abs() < 1e-6));
    assert_eq!(LinearColor::from_hex("#000").expect("valid colour").to_array(), [0.0; 3]);

    let shallow = LinearColor::from_hex("#49b6d6").expect("valid colour").to_array();
    let expected = [0.0666, 0.4678, 0.6724];
    for (actual, expected) in shallow.iter().zip(expected) {
        assert!((actual - expected).abs() < 1e-3, "{} != {}", actual, expected);
    }
}

#[test]
fn short_and_long_hex_forms_agree() {
    let short = LinearColor::from_hex("#abc").expect("valid colour");
    let long = LinearColor::from_hex("aabbcc").expect("valid colour");
    assert_eq!(short, long);
}

#[test]
fn malformed_colours_are_rejected() {
    for bad in ["", "#12", "#12345", "#gggggg", "#1234567"] {
        assert!(LinearColor::from_hex(bad).is_err(), "{} was accepted", bad);
    }
}
