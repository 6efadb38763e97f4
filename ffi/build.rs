use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Set to a directory to also copy the generated header there.
const HEADER_DIR_VAR: &str = "HTTPKIT_HEADER_DIR";
const HEADER_NAME: &str = "httpkit.h";

fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");
    println!("cargo:rerun-if-env-changed={HEADER_DIR_VAR}");

    let (Ok(crate_dir), Ok(out_dir)) = (env::var("CARGO_MANIFEST_DIR"), env::var("OUT_DIR")) else {
        return;
    };

    let generated = cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("HTTPKIT_H")
        .generate();

    let bindings = match generated {
        Ok(bindings) => bindings,
        Err(err) => {
            println!("cargo:warning=skipping C header generation: {err}");
            return;
        }
    };

    let mut targets = vec![PathBuf::from(out_dir)];
    if let Some(dir) = env::var_os(HEADER_DIR_VAR) {
        targets.push(PathBuf::from(dir));
    }
    for dir in targets {
        if let Err(err) = write_header(&bindings, &dir) {
            println!("cargo:warning=failed to write {}: {err}", dir.join(HEADER_NAME).display());
        }
    }
}

fn write_header(bindings: &cbindgen::Bindings, dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    let file = fs::File::create(dir.join(HEADER_NAME))?;
    bindings.write(file);
    Ok(())
}
