fn main() {
    let crate_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");

    // Header generation is best-effort: a broken cbindgen install should
    // not block the Rust build itself.
    match cbindgen::generate(&crate_dir) {
        Ok(bindings) => {
            bindings.write_to_file("include/cortex.h");
        }
        Err(err) => {
            println!("cargo:warning=cbindgen failed: {err}");
        }
    }
    println!("cargo:rerun-if-changed=src");
}
