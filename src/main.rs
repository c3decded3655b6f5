// src/main.rs

use anyhow::Result;

fn main() -> Result<()> {
    lazymap::commands::run_cli()
}
