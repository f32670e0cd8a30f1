#![no_main]

use libfuzzer_sys::fuzz_target;
use quatt::output::Output;
use quatt::{run_snapshot, FixedElectricalPower};
use std::io;
use std::io::{BufReader, Cursor, Write};

fuzz_target!(|data: &[u8]| {
    let _run = run_snapshot(
        BufReader::new(Cursor::new(data)),
        ReportSink,
        &FixedElectricalPower(1500.),
    );
});

/// Swallows the report while still letting it be formatted.
#[derive(Debug, Default)]
pub struct ReportSink;

impl Output for ReportSink {
    fn writer_for_location_key(&self, _location_key: &str) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        // make the output pretend it's a no-op so fuzzing exercises code that calls it
        false
    }
}
