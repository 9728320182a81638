//! Show command implementation.

use crate::error::Result;
use crate::output::{ActionSummary, Formatter};
use runcrate_domain::entity::CREATE_ACTION;
use runcrate_store::CrateStore;

/// Summaries of every action in the crate, in graph order.
pub fn collect_actions(store: &CrateStore) -> Result<Vec<ActionSummary>> {
    let Some(document) = store.load()? else {
        return Ok(Vec::new());
    };
    Ok(document
        .entities_of_type(CREATE_ACTION)
        .map(ActionSummary::from_entity)
        .collect())
}

/// Execute the show command.
pub fn execute_show(store: &CrateStore, formatter: &Formatter) -> Result<()> {
    let actions = collect_actions(store)?;
    println!("{}", formatter.format_actions(&actions)?);
    Ok(())
}
