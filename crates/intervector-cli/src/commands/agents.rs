use anyhow::{Context, Result};
use intervector_setup::directory::{self, AgentStatusUpdate, MessageFilter, NewMessage};
use std::path::Path;

use super::open_existing;

/// List the agent directory.
pub fn show_agents(db_path: &Path) -> Result<()> {
    let store = open_existing(db_path)?;
    let agents = directory::list_agents(&store).context("Failed to read the agent directory")?;

    println!("\n🤖 Agent Directory ({} agents)\n", agents.len());
    for agent in &agents {
        println!(
            "  {:<20} {:<12} {:<10} last seen {}",
            agent.agent_name,
            agent.agent_type,
            agent.status,
            agent.last_seen.as_deref().unwrap_or("never")
        );
        if !agent.specialties.is_empty() {
            println!("  {:<20} specialties: {}", "", agent.specialties.join(", "));
        }
    }

    Ok(())
}

/// List messages from the message log.
pub fn show_messages(db_path: &Path, filter: &MessageFilter) -> Result<()> {
    let store = open_existing(db_path)?;
    let messages =
        directory::list_messages(&store, filter).context("Failed to read the message log")?;

    println!("\n📡 Agent Messages ({} shown)\n", messages.len());
    for message in &messages {
        println!(
            "  [{}] {} → {} ({}, {})",
            message.timestamp,
            message.from_agent,
            message.to_agent,
            message.message_type,
            message.priority
        );
        if let Some(subject) = &message.subject {
            println!("    Subject: {subject}");
        }
        println!("    {}", message.content);
    }

    Ok(())
}

/// Append a message to the message log.
pub fn post_message(db_path: &Path, message: &NewMessage) -> Result<()> {
    let store = open_existing(db_path)?;
    let sent = directory::send_message(&store, message).with_context(|| {
        format!(
            "Failed to send message from {} to {}",
            message.from_agent, message.to_agent
        )
    })?;

    println!("✓ Sent {} ({} → {})", sent.id, sent.from_agent, sent.to_agent);
    Ok(())
}

/// Record a status heartbeat for an agent.
pub fn set_agent_status(db_path: &Path, update: &AgentStatusUpdate) -> Result<()> {
    let store = open_existing(db_path)?;
    let record = directory::update_agent_status(&store, update)
        .with_context(|| format!("Failed to update status of {}", update.agent_id))?;

    println!(
        "✓ {} is {}",
        record.id,
        record.meta_str("status").unwrap_or("online")
    );
    Ok(())
}
