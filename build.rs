//! This build script copies the `memory.x` file from the crate root into a directory where
//! the linker can always find it when building the firmware, and records the build time
//! so the watch starts with a sensible clock.

use std::{env, fs::File, io::Write, path::PathBuf};

fn main() {
    let out = &PathBuf::from(env::var_os("OUT_DIR").unwrap());

    // Only bare-metal ARM builds need the memory layout
    let target = env::var("TARGET").unwrap_or_default();
    if target.starts_with("thumb") {
        File::create(out.join("memory.x"))
            .unwrap()
            .write_all(include_bytes!("memory.x"))
            .unwrap();
        println!("cargo:rustc-link-search={}", out.display());
        println!("cargo:rustc-link-arg-bins=--nmagic");
        println!("cargo:rustc-link-arg-bins=-Tlink.x");
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    // Create rs file with current local time, used as the initial clock reference
    File::create(out.join("utc.rs"))
        .unwrap()
        .write_fmt(format_args!(
            "const UTC_EPOCH: i64 = {:?};",
            chrono::offset::Local::now().naive_local().and_utc().timestamp()
        ))
        .unwrap();

    println!("cargo:rerun-if-changed=memory.x");
}
