use std::env;

fn main() {
    println!("cargo:rerun-if-changed=templates");
    let out_dir = env::var("OUT_DIR").unwrap();
    let report = hewn::generate("templates", out_dir, "templates").unwrap();
    for (path, err) in &report.failed {
        eprintln!("{}\n{err:#}", path.display());
    }
    assert!(report.is_success());
}
