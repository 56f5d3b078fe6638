/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

fn main() {
    println!("cargo:rustc-check-cfg=cfg(cares1_15)");
    println!("cargo:rustc-check-cfg=cfg(cares1_19)");
    println!("cargo:rustc-check-cfg=cfg(cares1_20)");
    println!("cargo:rustc-check-cfg=cfg(cares1_22)");
    println!("cargo:rustc-check-cfg=cfg(cares1_23)");

    #[cfg(feature = "c-ares")]
    if let Ok(version) = std::env::var("DEP_CARES_VERSION_NUMBER") {
        // exported by the c-ares-sys crate through its links key
        let version = u64::from_str_radix(&version, 16).unwrap();

        if version >= 0x1_0f_00 {
            println!("cargo:rustc-cfg=cares1_15");
        }

        if version >= 0x1_13_00 {
            println!("cargo:rustc-cfg=cares1_19");
        }

        if version >= 0x1_14_00 {
            println!("cargo:rustc-cfg=cares1_20");
        }

        if version >= 0x1_16_00 {
            println!("cargo:rustc-cfg=cares1_22");
        }

        if version >= 0x1_17_00 {
            println!("cargo:rustc-cfg=cares1_23");
        }
    }
}
