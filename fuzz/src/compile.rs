#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let compiler = hewn::Compiler::new();
    if let Err(err) = compiler.compile("fuzz.html", data, "fuzz") {
        // rendering the snippet must not panic either
        let _ = format!("{err:#}");
    }
});
