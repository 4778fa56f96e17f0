//! The fixed collections and seed records of the agent command center.
//!
//! A [`SeedPlan`] is plain data: the bootstrap walks it in order, and tests
//! can build their own plans to exercise failure paths.

use intervector_core::{metadata, Metadata, Record};

/// Collection holding agent registrations.
pub const AGENT_DIRECTORY: &str = "agent_directory";

/// Collection holding agent-to-agent messages.
pub const AGENT_MESSAGE_LOG: &str = "agent_message_log";

/// Collection holding session restore points.
pub const SESSION_RESTORE_CONTEXT: &str = "session_restore_context";

/// Timestamp stamped on every seed record.
pub const SEED_TIMESTAMP: &str = "2025-07-26T18:00:00Z";

/// A collection the bootstrap ensures exists.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSpec {
    pub name: String,
    pub metadata: Metadata,
}

impl CollectionSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            name: name.into(),
            metadata,
        }
    }
}

/// An agent registered in [`AGENT_DIRECTORY`] on first run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSeed {
    pub id: String,
    pub agent_name: String,
    pub agent_type: String,
    pub status: String,
    pub specialties: Vec<String>,
    pub last_seen: String,
    pub description: String,
}

impl AgentSeed {
    /// Free-text profile stored as the record document.
    #[must_use]
    pub fn document(&self) -> String {
        format!("Agent profile for {}: {}", self.agent_name, self.description)
    }

    #[must_use]
    pub fn to_record(&self) -> Record {
        Record::new(self.id.as_str(), self.document()).with_metadata(metadata! {
            "agent_name" => self.agent_name.as_str(),
            "agent_type" => self.agent_type.as_str(),
            "status" => self.status.as_str(),
            "specialties" => self.specialties.join(","),
            "last_seen" => self.last_seen.as_str(),
        })
    }
}

/// A message written to [`AGENT_MESSAGE_LOG`] on first run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSeed {
    pub id: String,
    pub from_agent: String,
    pub to_agent: String,
    pub message_type: String,
    pub priority: String,
    pub timestamp: String,
    pub thread_id: String,
    pub status: String,
    pub subject: String,
    pub content: String,
}

impl MessageSeed {
    #[must_use]
    pub fn to_record(&self) -> Record {
        Record::new(self.id.as_str(), self.content.as_str()).with_metadata(metadata! {
            "from_agent" => self.from_agent.as_str(),
            "to_agent" => self.to_agent.as_str(),
            "message_type" => self.message_type.as_str(),
            "priority" => self.priority.as_str(),
            "timestamp" => self.timestamp.as_str(),
            "thread_id" => self.thread_id.as_str(),
            "status" => self.status.as_str(),
            "subject" => self.subject.as_str(),
        })
    }
}

/// Everything a bootstrap run ensures, in the order it is attempted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedPlan {
    pub collections: Vec<CollectionSpec>,
    pub agents: Vec<AgentSeed>,
    pub messages: Vec<MessageSeed>,
}

impl SeedPlan {
    /// The seven command center collections, three core agents and the
    /// initialization notice.
    #[must_use]
    pub fn command_center() -> Self {
        Self {
            collections: command_center_collections(),
            agents: core_agents(),
            messages: vec![initialization_message()],
        }
    }
}

fn command_center_collections() -> Vec<CollectionSpec> {
    vec![
        CollectionSpec::new(
            AGENT_MESSAGE_LOG,
            metadata! {
                "description" => "Agent-to-agent communication messages",
                "purpose" => "intervector_communication",
                "created_by" => "agent_command_center",
                "retention_days" => 30,
            },
        ),
        CollectionSpec::new(
            AGENT_DIRECTORY,
            metadata! {
                "description" => "Agent registration and status information",
                "purpose" => "agent_coordination",
                "created_by" => "agent_command_center",
                "max_agents" => 50,
            },
        ),
        CollectionSpec::new(
            SESSION_RESTORE_CONTEXT,
            metadata! {
                "description" => "Session restore points for zero-token recovery",
                "purpose" => "context_preservation",
                "created_by" => "prometheus_theo_development",
                "max_restore_points" => 100,
            },
        ),
        CollectionSpec::new(
            "command_center_knowledge",
            metadata! {
                "description" => "Shared knowledge and intelligence database",
                "purpose" => "knowledge_preservation",
                "created_by" => "agent_command_center",
                "scope" => "command_center_project",
            },
        ),
        CollectionSpec::new(
            "command_center_intelligence",
            metadata! {
                "description" => "Project intelligence and coordination data",
                "purpose" => "project_coordination",
                "created_by" => "agent_command_center",
                "scope" => "current_projects",
            },
        ),
        CollectionSpec::new(
            "agent_commands",
            metadata! {
                "description" => "Task assignments and command distribution",
                "purpose" => "task_coordination",
                "created_by" => "agent_command_center",
                "auto_cleanup" => true,
            },
        ),
        CollectionSpec::new(
            "powerline_intelligence",
            metadata! {
                "description" => "PowerLine project specific intelligence",
                "purpose" => "powerline_coordination",
                "created_by" => "theo_prometheus_collaboration",
                "project" => "powerline_system",
            },
        ),
    ]
}

fn agent(
    id: &str,
    agent_name: &str,
    agent_type: &str,
    specialties: &[&str],
    description: &str,
) -> AgentSeed {
    AgentSeed {
        id: id.to_string(),
        agent_name: agent_name.to_string(),
        agent_type: agent_type.to_string(),
        status: "active".to_string(),
        specialties: specialties.iter().map(|s| s.to_string()).collect(),
        last_seen: SEED_TIMESTAMP.to_string(),
        description: description.to_string(),
    }
}

fn core_agents() -> Vec<AgentSeed> {
    vec![
        agent(
            "agent_prometheus",
            "PROMETHEUS",
            "coordinator",
            &["coordination", "architecture", "protocol_design"],
            "Chief Coordinator & Architecture Lead for multi-agent systems",
        ),
        agent(
            "agent_theo_5001",
            "THEO-5001",
            "developer",
            &["frontend", "psychology", "dashboard_development"],
            "Frontend Development & Psychology Specialist",
        ),
        agent(
            "agent_marcus_5002",
            "MARCUS-5002",
            "developer",
            &["backend", "database", "api_development"],
            "Backend Development Specialist",
        ),
    ]
}

fn initialization_message() -> MessageSeed {
    MessageSeed {
        id: "msg_system_initialization_001".to_string(),
        from_agent: "SYSTEM".to_string(),
        to_agent: "ALL_AGENTS".to_string(),
        message_type: "system_notification".to_string(),
        priority: "HIGH".to_string(),
        timestamp: SEED_TIMESTAMP.to_string(),
        thread_id: "thread_system_init".to_string(),
        status: "delivered".to_string(),
        subject: "Agent Command Center Initialized".to_string(),
        content: "ChromaDB Agent Command Center has been successfully initialized. \
                  All agents can now communicate through the INTERVECTOR COMMUNICATION \
                  protocol. Ready for coordinated development and hive mind operations."
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intervector_core::model::validate_collection_name;
    use intervector_core::MetadataValue;
    use std::collections::HashSet;

    #[test]
    fn test_command_center_shape() {
        let plan = SeedPlan::command_center();
        assert_eq!(plan.collections.len(), 7);
        assert_eq!(plan.agents.len(), 3);
        assert_eq!(plan.messages.len(), 1);
    }

    #[test]
    fn test_collection_names_are_unique_and_valid() {
        let plan = SeedPlan::command_center();
        let names: HashSet<&str> = plan.collections.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names.len(), 7);
        for name in &names {
            assert!(validate_collection_name(name).is_ok(), "{name}");
        }
        assert!(names.contains(AGENT_DIRECTORY));
        assert!(names.contains(AGENT_MESSAGE_LOG));
        assert!(names.contains(SESSION_RESTORE_CONTEXT));
    }

    #[test]
    fn test_collection_metadata_types() {
        let plan = SeedPlan::command_center();
        let find = |name: &str| {
            plan.collections
                .iter()
                .find(|c| c.name == name)
                .map(|c| c.metadata.clone())
                .unwrap()
        };

        assert_eq!(
            find(AGENT_MESSAGE_LOG)["retention_days"],
            MetadataValue::Int(30)
        );
        assert_eq!(find("agent_commands")["auto_cleanup"], MetadataValue::Bool(true));
        assert_eq!(
            find("powerline_intelligence")["created_by"].as_str(),
            Some("theo_prometheus_collaboration")
        );
    }

    #[test]
    fn test_agent_ids() {
        let ids: Vec<String> = SeedPlan::command_center()
            .agents
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, ["agent_prometheus", "agent_theo_5001", "agent_marcus_5002"]);
    }

    #[test]
    fn test_agent_record_shape() {
        let plan = SeedPlan::command_center();
        let record = plan.agents[1].to_record();

        assert_eq!(record.id, "agent_theo_5001");
        assert_eq!(
            record.document,
            "Agent profile for THEO-5001: Frontend Development & Psychology Specialist"
        );
        assert_eq!(
            record.meta_str("specialties"),
            Some("frontend,psychology,dashboard_development")
        );
        assert_eq!(record.meta_str("last_seen"), Some(SEED_TIMESTAMP));

        let keys: Vec<&str> = record.metadata.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            ["agent_name", "agent_type", "last_seen", "specialties", "status"]
        );
    }

    #[test]
    fn test_message_record_shape() {
        let plan = SeedPlan::command_center();
        let record = plan.messages[0].to_record();

        assert_eq!(record.id, "msg_system_initialization_001");
        assert!(record.document.starts_with("ChromaDB Agent Command Center"));
        assert!(record.document.contains("INTERVECTOR COMMUNICATION protocol"));
        assert_eq!(record.metadata.len(), 8);
        assert_eq!(record.meta_str("priority"), Some("HIGH"));
        assert_eq!(record.meta_str("thread_id"), Some("thread_system_init"));
    }
}
