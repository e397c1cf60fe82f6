use std::{env, fs, path::Path};

fn package_field<'a>(pkg: &'a toml::Table, key: &str, fallback: &'a str) -> &'a str {
    pkg.get(key).and_then(|v| v.as_str()).unwrap_or(fallback)
}

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let manifest = Path::new(&manifest_dir).join("Cargo.toml");
    println!("cargo:rerun-if-changed={}", manifest.display());
    println!("cargo:rerun-if-changed=docs/instructions.md");

    let raw = fs::read_to_string(&manifest)
        .unwrap_or_else(|e| panic!("Failed to read {}: {e}", manifest.display()));
    let parsed: toml::Table =
        toml::from_str(&raw).unwrap_or_else(|e| panic!("Failed to parse Cargo.toml: {e}"));
    let pkg = parsed
        .get("package")
        .and_then(|p| p.as_table())
        .expect("Cargo.toml missing [package]");

    let generated = format!(
        "pub const PKG_NAME: &str = {:?};\npub const PKG_VERSION: &str = {:?};\npub const PKG_DESCRIPTION: &str = {:?};\n",
        package_field(pkg, "name", "project-hub-mcp"),
        package_field(pkg, "version", "0.0.0"),
        package_field(pkg, "description", ""),
    );

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set");
    fs::write(Path::new(&out_dir).join("pkg_info.rs"), generated)
        .expect("Failed to write pkg_info.rs");
}
