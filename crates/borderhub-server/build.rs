// build.rs for borderhub-server
//
// rust_embed requires the embedded folder to exist at compile time.
// Packaged builds may not ship frontend/dist, so create a placeholder page
// when it is missing.

use std::path::Path;

fn main() {
    let dist = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../frontend/dist");

    if !dist.exists() {
        std::fs::create_dir_all(&dist).expect("failed to create placeholder frontend/dist");
        std::fs::write(
            dist.join("index.html"),
            "<!-- placeholder: frontend/dist was not found at build time -->\n",
        )
        .expect("failed to write placeholder index.html");
    }

    println!("cargo:rerun-if-changed=../../frontend/dist");
}
