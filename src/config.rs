//! Fixed, build-time configuration of the viewer.
//!
//! Nothing here can be overridden at runtime. The scene path comes from
//! `build.rs` (`SCENE_ASSET`), everything else is a constant.

use std::f32::consts::PI;

/// Path of the packaged scene, relative to the `assets/` directory.
pub const SCENE_ASSET: &str = env!("SCENE_ASSET");

/// Meshes whose name starts with this prefix get the water material.
pub const WATER_MESH_PREFIX: &str = "Water";

pub const BACKGROUND: &str = "#f2efe9";

#[derive(Clone, Copy, Debug)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

pub const CAMERA: CameraConfig = CameraConfig {
    position: [8.0, 6.0, 14.0],
    target: [0.0, 0.0, 0.0],
    fov_y: 35.0,
    near: 0.1,
    far: 1000.0,
};

#[derive(Clone, Copy, Debug)]
pub struct OrbitConfig {
    pub enable_pan: bool,
    pub damping: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
}

pub const ORBIT: OrbitConfig = OrbitConfig {
    enable_pan: true,
    damping: 0.05,
    min_polar_angle: 0.0,
    max_polar_angle: PI / 2.1,
    rotate_speed: 1.0,
    zoom_speed: 1.0,
    pan_speed: 1.0,
};

#[derive(Clone, Copy, Debug)]
pub struct DirectionalLightConfig {
    /// The light shines from here towards the origin.
    pub position: [f32; 3],
    pub intensity: f32,
    pub color: &'static str,
}

#[derive(Clone, Copy, Debug)]
pub struct LightingConfig {
    pub sky_color: &'static str,
    pub ground_color: &'static str,
    pub hemisphere_intensity: f32,
    pub directional: [DirectionalLightConfig; 2],
    pub exposure: f32,
}

pub const LIGHTING: LightingConfig = LightingConfig {
    sky_color: "#ffffff",
    ground_color: "#d9d2c7",
    hemisphere_intensity: 1.0,
    directional: [
        DirectionalLightConfig {
            position: [10.0, 12.0, 6.0],
            intensity: 1.1,
            color: "#ffffff",
        },
        DirectionalLightConfig {
            position: [-8.0, 6.0, -4.0],
            intensity: 0.6,
            color: "#ffffff",
        },
    ],
    exposure: 1.0,
};

#[derive(Clone, Copy, Debug)]
pub struct ModelPlacement {
    pub scale: f32,
    pub position: [f32; 3],
    /// Origin of the centring group the model is wrapped in.
    pub center_at: [f32; 3],
}

pub const MODEL: ModelPlacement = ModelPlacement {
    scale: 0.1,
    position: [0.0, 1.0, 0.0],
    center_at: [0.0, 1.0, 0.0],
};

#[derive(Clone, Copy, Debug)]
pub struct WaterConfig {
    pub color_deep: &'static str,
    pub color_shallow: &'static str,
    pub color_foam: &'static str,
    pub color_back: &'static str,
    pub opacity: f32,
    pub wave_amp: f32,
    pub wave_freq: f32,
    pub wave_speed: f32,
}

pub const WATER: WaterConfig = WaterConfig {
    color_deep: "#000",
    color_shallow: "#49b6d6",
    color_foam: "#dff6ff",
    color_back: "#0a3f52",
    opacity: 0.9,
    wave_amp: 0.1,
    wave_freq: 0.01,
    wave_speed: 1.0,
};

#[derive(Clone, Copy, Debug)]
pub struct ProgressConfig {
    /// Nominal load time the ramp is stretched over. A guess, not a measurement.
    pub nominal_duration_secs: f32,
    /// The ramp never passes this value while loading is still active.
    pub cap: f32,
}

pub const PROGRESS: ProgressConfig = ProgressConfig {
    nominal_duration_secs: 60.0,
    cap: 95.0,
};

#[derive(Clone, Copy, Debug)]
pub struct OverlayConfig {
    pub backdrop: &'static str,
    pub backdrop_alpha: f32,
    pub track_alpha: f32,
    pub fill: &'static str,
    /// Bar size in logical pixels, scaled by the window's scale factor.
    pub bar_size: [f32; 2],
}

pub const OVERLAY: OverlayConfig = OverlayConfig {
    backdrop: "#f2efe9",
    backdrop_alpha: 0.9,
    track_alpha: 0.12,
    fill: "#2b6f85",
    bar_size: [320.0, 8.0],
};
