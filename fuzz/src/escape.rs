#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let mut buf = String::new();
    hewn::rt::escape_html(data, &mut buf);
    assert!(!buf.contains(['<', '>', '"', '\'']));
    assert!(buf.len() >= data.len());
});
