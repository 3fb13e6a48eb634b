// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! CRD YAML Generator
//!
//! Generates the `CustomDomain` CRD manifest from the Rust types in src/crd.rs,
//! keeping deploy/crds/ in sync with the code.
//!
//! Usage:
//!   cargo run --bin crdgen [output-dir]
//!
//! The output directory defaults to deploy/crds.

use custom_domains_operator::crd::CustomDomain;
use kube::CustomResourceExt;
use std::fs;
use std::path::{Path, PathBuf};

const COPYRIGHT_HEADER: &str = "# Copyright (c) 2025 Erick Bourgeois, firestoned
# SPDX-License-Identifier: MIT
#
# This file is AUTO-GENERATED from src/crd.rs
# DO NOT EDIT MANUALLY - Run `cargo run --bin crdgen` to regenerate
#
";

fn main() -> anyhow::Result<()> {
    let output_dir = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from("deploy/crds"), PathBuf::from);

    fs::create_dir_all(&output_dir)?;

    println!("Generating CRD YAML files from src/crd.rs...");
    generate_crd::<CustomDomain>("customdomains.crd.yaml", &output_dir)?;

    println!("✓ Successfully generated CRD YAML files in {}", output_dir.display());
    println!("\nNext steps:");
    println!("  1. Review the generated files");
    println!("  2. Deploy with: kubectl apply -f {}", output_dir.display());

    Ok(())
}

fn generate_crd<T>(filename: &str, output_dir: &Path) -> anyhow::Result<()>
where
    T: CustomResourceExt,
{
    let yaml = serde_yaml::to_string(&T::crd())?;
    let content = format!("{COPYRIGHT_HEADER}{yaml}");

    fs::write(output_dir.join(filename), content)?;
    println!("  ✓ Generated {filename}");

    Ok(())
}
