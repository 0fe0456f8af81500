use anyhow::*;
use fs_extra::copy_items;
use fs_extra::dir::CopyOptions;
use std::env;
use std::path::PathBuf;

const DEFAULT_SCENE_ASSET: &str = "general.glb";

fn main() -> Result<()> {
    // This tells Cargo to rerun this script if something in /assets/ changes.
    println!("cargo:rerun-if-changed=assets/*");
    println!("cargo:rerun-if-env-changed=PAGODA_SCENE_ASSET");

    // The scene path is fixed at build time; there is no runtime override.
    let scene_asset =
        env::var("PAGODA_SCENE_ASSET").unwrap_or_else(|_| DEFAULT_SCENE_ASSET.to_string());
    if scene_asset.trim().is_empty() {
        bail!("PAGODA_SCENE_ASSET must not be empty");
    }
    println!("cargo:rustc-env=SCENE_ASSET={}", scene_asset);

    let out_dir = env::var("OUT_DIR")?;
    let mut copy_options = CopyOptions::new();
    copy_options.overwrite = true;
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let assets_src = manifest_dir.join("assets");
    if assets_src.exists() {
        copy_items(&[assets_src], out_dir, &copy_options)?;
    }

    Ok(())
}
