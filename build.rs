fn main() {
    #[cfg(feature = "desktop")]
    tauri_build::build();

    #[cfg(all(feature = "desktop", target_os = "macos"))]
    {
        println!("cargo:rustc-link-lib=framework=CoreGraphics");
        println!("cargo:rustc-link-lib=framework=AVFoundation");
    }
}
