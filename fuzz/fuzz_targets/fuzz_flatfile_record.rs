//! Fuzz target for the flat-file record parsers
//!
//! Entry bytes come straight from mirrored files, so every parser must
//! survive arbitrary input.

#![no_main]

use ferro_mirror::location::Window;
use ferro_mirror::record::RecordFormat;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }

    for format in [
        RecordFormat::GenBank,
        RecordFormat::Embl,
        RecordFormat::UniProt,
        RecordFormat::Fasta { protein: false },
    ] {
        let _ = format.parse(data, Window::whole(), false);
        let _ = format.parse(data, Window::new(5, 50), true);
    }
});
