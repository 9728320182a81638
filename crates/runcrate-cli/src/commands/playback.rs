//! Playback command implementation.

use crate::error::Result;
use crate::output::Formatter;
use runcrate_store::CrateStore;

/// Execute the playback command.
pub fn execute_playback(store: &CrateStore, formatter: &Formatter) -> Result<()> {
    let commands = store.playback()?;
    println!("{}", formatter.format_commands(&commands)?);
    Ok(())
}
