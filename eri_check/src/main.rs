//! Electron-repulsion kernel checker
//!
//! Prints `test ok` and exits with status 0 when every checked value agrees
//! with the reference integrals, `test failed` and status 1 otherwise.

use color_eyre::eyre::Result;
use eri_check::app::CheckApplication;

fn main() -> Result<()> {
    color_eyre::install()?;
    let success = CheckApplication::from_cli()?.run()?;
    println!("test {}", if success { "ok" } else { "failed" });
    std::process::exit(if success { 0 } else { 1 })
}
