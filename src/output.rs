use std::io::{self, Write};

use serde::Serialize;

use crate::pipeline::RunStats;

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_stats(stats: &RunStats) -> io::Result<()> {
        Self::print_json(stats)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}
