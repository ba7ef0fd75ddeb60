//! Agent grid command handlers.

use serde::Serialize;
use tabled::Tabled;

use unlockly_core::{AgentState, Session};

use crate::cli::{AgentsArgs, AgentsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct AgentEntry {
    name: String,
    state: AgentState,
}

#[derive(Tabled)]
struct AgentRow {
    #[tabled(rename = "AGENT")]
    name: String,
    #[tabled(rename = "STATE")]
    state: String,
}

pub async fn handle(
    session: &Session,
    args: AgentsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        AgentsCommand::List => {}
        AgentsCommand::Activate => session.activate_agents().await?,
        AgentsCommand::Toggle { name } => session.toggle_agent(&name).await?,
    }

    let agents = session.store().agents();
    if agents.is_empty() && !global.quiet {
        eprintln!(
            "No agent states reported yet.\n\
             Run: unlockly agents activate"
        );
        return Ok(());
    }

    let entries: Vec<AgentEntry> = agents
        .iter()
        .map(|(name, state)| AgentEntry {
            name: name.clone(),
            state: *state,
        })
        .collect();

    let color = output::should_color(&global.color);
    let rendered = output::render_list(
        &global.output,
        &entries,
        |e| AgentRow {
            name: e.name.clone(),
            state: output::agent_label(e.state, color),
        },
        |e| e.name.clone(),
    );
    output::print_output(&rendered, global.quiet);
    Ok(())
}
