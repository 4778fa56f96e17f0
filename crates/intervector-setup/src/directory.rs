//! Typed views over the agent directory, message log and restore points.

use chrono::{SecondsFormat, Utc};
use intervector_core::{metadata, Record, RecordQuery, Result, Store};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::plan::{AGENT_DIRECTORY, AGENT_MESSAGE_LOG, SESSION_RESTORE_CONTEXT};

/// Default page size for message listings.
pub const DEFAULT_MESSAGE_LIMIT: usize = 50;

/// Default page size for restore point listings.
pub const DEFAULT_RESTORE_POINT_LIMIT: usize = 20;

/// An entry of the agent directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentProfile {
    pub id: String,
    pub agent_name: String,
    pub agent_type: String,
    pub status: String,
    pub specialties: Vec<String>,
    pub last_seen: Option<String>,
    pub document: String,
}

impl AgentProfile {
    #[must_use]
    pub fn from_record(record: &Record) -> Self {
        let field = |key: &str| record.meta_str(key).unwrap_or_default().to_string();
        Self {
            id: record.id.clone(),
            agent_name: field("agent_name"),
            agent_type: field("agent_type"),
            status: field("status"),
            specialties: split_list(record.meta_str("specialties").unwrap_or_default()),
            last_seen: record.meta_str("last_seen").map(str::to_string),
            document: record.document.clone(),
        }
    }
}

/// An entry of the message log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentMessage {
    pub id: String,
    pub from_agent: String,
    pub to_agent: String,
    pub message_type: String,
    pub priority: String,
    pub timestamp: String,
    pub thread_id: Option<String>,
    pub status: String,
    pub subject: Option<String>,
    pub content: String,
}

impl AgentMessage {
    #[must_use]
    pub fn from_record(record: &Record) -> Self {
        let field = |key: &str| record.meta_str(key).unwrap_or_default().to_string();
        Self {
            id: record.id.clone(),
            from_agent: field("from_agent"),
            to_agent: field("to_agent"),
            message_type: field("message_type"),
            priority: field("priority"),
            timestamp: field("timestamp"),
            thread_id: record.meta_str("thread_id").map(str::to_string),
            status: record.meta_str("status").unwrap_or("delivered").to_string(),
            subject: record.meta_str("subject").map(str::to_string),
            content: record.document.clone(),
        }
    }
}

/// Selection of messages from the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageFilter {
    pub from_agent: Option<String>,
    pub to_agent: Option<String>,
    pub thread_id: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for MessageFilter {
    fn default() -> Self {
        Self {
            from_agent: None,
            to_agent: None,
            thread_id: None,
            limit: DEFAULT_MESSAGE_LIMIT,
            offset: 0,
        }
    }
}

impl MessageFilter {
    fn to_query(&self) -> RecordQuery {
        let mut query = RecordQuery::new().limit(self.limit).offset(self.offset);
        for (key, value) in [
            ("from_agent", &self.from_agent),
            ("to_agent", &self.to_agent),
            ("thread_id", &self.thread_id),
        ] {
            if let Some(value) = value {
                query = query.where_eq(key, value.as_str());
            }
        }
        query
    }
}

/// A message to append to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    /// Record id; generated as `msg_<uuid>` when `None`.
    pub id: Option<String>,
    pub from_agent: String,
    pub to_agent: String,
    pub message_type: String,
    pub priority: String,
    pub thread_id: Option<String>,
    /// Delivery status, `delivered` when `None`.
    pub status: Option<String>,
    pub subject: Option<String>,
    pub content: String,
}

impl NewMessage {
    #[must_use]
    pub fn new(
        from_agent: impl Into<String>,
        to_agent: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            from_agent: from_agent.into(),
            to_agent: to_agent.into(),
            message_type: "direct_message".to_string(),
            priority: "NORMAL".to_string(),
            thread_id: None,
            status: None,
            subject: None,
            content: content.into(),
        }
    }

    fn to_record(&self, id: &str, timestamp: &str) -> Record {
        let mut meta = metadata! {
            "from_agent" => self.from_agent.as_str(),
            "to_agent" => self.to_agent.as_str(),
            "message_type" => self.message_type.as_str(),
            "priority" => self.priority.as_str(),
            "timestamp" => timestamp,
            "status" => self.status.as_deref().unwrap_or("delivered"),
        };
        for (key, value) in [("thread_id", &self.thread_id), ("subject", &self.subject)] {
            if let Some(value) = value {
                meta.insert(key.to_string(), value.as_str().into());
            }
        }
        Record::new(id, self.content.as_str()).with_metadata(meta)
    }
}

/// A saved session context that an agent can resume from.
///
/// The whole point is stored as the JSON document; the scalar fields are
/// repeated in the record metadata so they can be filtered on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestorePoint {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub created_by: String,
    pub timestamp: String,
    pub summary: String,
    pub metadata: RestoreDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreDetails {
    pub priority: String,
    pub tags: Vec<String>,
    pub restore_complexity: String,
}

impl RestorePoint {
    /// Decode a restore point from its stored document.
    pub fn from_record(record: &Record) -> Result<Self> {
        Ok(serde_json::from_str(&record.document)?)
    }

    fn to_record(&self) -> Result<Record> {
        let document = serde_json::to_string(self)?;
        Ok(Record::new(self.id.as_str(), document).with_metadata(metadata! {
            "type" => self.kind.as_str(),
            "created_by" => self.created_by.as_str(),
            "timestamp" => self.timestamp.as_str(),
            "priority" => self.metadata.priority.as_str(),
            "tags" => self.metadata.tags.join(","),
            "restore_complexity" => self.metadata.restore_complexity.as_str(),
        }))
    }
}

/// Input for [`create_restore_point`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRestorePoint {
    /// Record id; generated as `restore_<uuid>` when `None`.
    pub id: Option<String>,
    pub kind: String,
    pub created_by: String,
    pub summary: String,
    pub priority: String,
    pub tags: Vec<String>,
    pub restore_complexity: String,
}

impl NewRestorePoint {
    #[must_use]
    pub fn new(
        kind: impl Into<String>,
        created_by: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            kind: kind.into(),
            created_by: created_by.into(),
            summary: summary.into(),
            priority: "medium".to_string(),
            tags: Vec::new(),
            restore_complexity: "low".to_string(),
        }
    }
}

/// A status heartbeat for an agent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentStatusUpdate {
    pub agent_id: String,
    pub status: Option<String>,
    pub agent_type: Option<String>,
    pub specialties: Option<String>,
    pub current_task: Option<String>,
}

#[derive(Serialize)]
struct StatusDocument<'a> {
    id: &'a str,
    agent_name: &'a str,
    status: &'a str,
    current_task: Option<&'a str>,
    last_seen: &'a str,
}

/// All agents in registration order.
pub fn list_agents(store: &Store) -> Result<Vec<AgentProfile>> {
    let collection = store.get_collection(AGENT_DIRECTORY)?;
    let records = store.get_records(&collection, &RecordQuery::new())?;
    Ok(records.iter().map(AgentProfile::from_record).collect())
}

/// Messages matching `filter`, oldest first.
pub fn list_messages(store: &Store, filter: &MessageFilter) -> Result<Vec<AgentMessage>> {
    let collection = store.get_collection(AGENT_MESSAGE_LOG)?;
    let records = store.get_records(&collection, &filter.to_query())?;
    Ok(records.iter().map(AgentMessage::from_record).collect())
}

/// Append a message to the log.
///
/// An explicit id that is already in the log fails with
/// [`intervector_core::Error::DuplicateRecord`] and leaves the stored
/// message untouched.
pub fn send_message(store: &Store, message: &NewMessage) -> Result<AgentMessage> {
    let collection = store.get_collection(AGENT_MESSAGE_LOG)?;

    let id = message.id.clone().unwrap_or_else(|| generate_id("msg"));
    let record = message.to_record(&id, &now());
    store.add_records(&collection, std::slice::from_ref(&record))?;

    log::info!(
        "Logged message {id} from {} to {}",
        message.from_agent,
        message.to_agent
    );
    Ok(AgentMessage::from_record(&record))
}

/// Save a restore point in the session restore collection.
pub fn create_restore_point(store: &Store, input: &NewRestorePoint) -> Result<RestorePoint> {
    let collection = store.get_collection(SESSION_RESTORE_CONTEXT)?;

    let point = RestorePoint {
        id: input.id.clone().unwrap_or_else(|| generate_id("restore")),
        kind: input.kind.clone(),
        created_by: input.created_by.clone(),
        timestamp: now(),
        summary: input.summary.clone(),
        metadata: RestoreDetails {
            priority: input.priority.clone(),
            tags: input.tags.clone(),
            restore_complexity: input.restore_complexity.clone(),
        },
    };
    store.add_records(&collection, &[point.to_record()?])?;

    log::info!("Created restore point {} ({})", point.id, point.kind);
    Ok(point)
}

/// Up to `limit` restore points, oldest first.
pub fn list_restore_points(store: &Store, limit: usize) -> Result<Vec<RestorePoint>> {
    let collection = store.get_collection(SESSION_RESTORE_CONTEXT)?;
    let records = store.get_records(&collection, &RecordQuery::new().limit(limit))?;
    records.iter().map(RestorePoint::from_record).collect()
}

/// Record a status heartbeat, creating or replacing `agent_<agent_id>`.
pub fn update_agent_status(store: &Store, update: &AgentStatusUpdate) -> Result<Record> {
    let collection = store.get_collection(AGENT_DIRECTORY)?;

    let id = format!("agent_{}", update.agent_id);
    let status = update.status.as_deref().unwrap_or("online");
    let last_seen = now();

    let document = serde_json::to_string(&StatusDocument {
        id: &id,
        agent_name: &update.agent_id,
        status,
        current_task: update.current_task.as_deref(),
        last_seen: &last_seen,
    })?;

    let record = Record::new(id.as_str(), document).with_metadata(metadata! {
        "agent_name" => update.agent_id.as_str(),
        "status" => status,
        "agent_type" => update.agent_type.as_deref().unwrap_or("coordinator"),
        "last_seen" => last_seen.as_str(),
        "specialties" => update.specialties.as_deref().unwrap_or_default(),
    });

    store.upsert_records(&collection, std::slice::from_ref(&record))?;
    log::info!("Updated status of {id} to {status}");
    Ok(record)
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn generate_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

fn split_list(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::seed;
    use crate::plan::SeedPlan;
    use intervector_core::Error;

    fn seeded() -> Store {
        let store = Store::open_in_memory().unwrap();
        seed(&store, &SeedPlan::command_center(), |_| {});
        store
    }

    #[test]
    fn test_list_seeded_agents() {
        let store = seeded();
        let agents = list_agents(&store).unwrap();

        assert_eq!(agents.len(), 3);
        assert_eq!(agents[0].agent_name, "PROMETHEUS");
        assert_eq!(
            agents[0].specialties,
            ["coordination", "architecture", "protocol_design"]
        );
        assert_eq!(agents[2].agent_type, "developer");
        assert_eq!(agents[2].last_seen.as_deref(), Some("2025-07-26T18:00:00Z"));
    }

    #[test]
    fn test_list_seeded_messages() {
        let store = seeded();
        let messages = list_messages(&store, &MessageFilter::default()).unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].from_agent, "SYSTEM");
        assert_eq!(messages[0].to_agent, "ALL_AGENTS");
        assert_eq!(messages[0].thread_id.as_deref(), Some("thread_system_init"));
    }

    #[test]
    fn test_message_filters() {
        let store = seeded();
        let from_system = MessageFilter {
            from_agent: Some("SYSTEM".to_string()),
            ..MessageFilter::default()
        };
        assert_eq!(list_messages(&store, &from_system).unwrap().len(), 1);

        let other_thread = MessageFilter {
            thread_id: Some("thread_other".to_string()),
            ..MessageFilter::default()
        };
        assert!(list_messages(&store, &other_thread).unwrap().is_empty());

        let past_end = MessageFilter {
            offset: 1,
            ..MessageFilter::default()
        };
        assert!(list_messages(&store, &past_end).unwrap().is_empty());
    }

    #[test]
    fn test_update_agent_status_inserts_then_replaces() {
        let store = seeded();

        let update = AgentStatusUpdate {
            agent_id: "nova".to_string(),
            current_task: Some("indexing".to_string()),
            ..AgentStatusUpdate::default()
        };
        let record = update_agent_status(&store, &update).unwrap();
        assert_eq!(record.id, "agent_nova");
        assert_eq!(record.meta_str("status"), Some("online"));
        assert_eq!(record.meta_str("agent_type"), Some("coordinator"));
        assert!(record.document.contains("\"current_task\":\"indexing\""));
        assert_eq!(list_agents(&store).unwrap().len(), 4);

        let offline = AgentStatusUpdate {
            agent_id: "nova".to_string(),
            status: Some("offline".to_string()),
            ..AgentStatusUpdate::default()
        };
        update_agent_status(&store, &offline).unwrap();

        let agents = list_agents(&store).unwrap();
        assert_eq!(agents.len(), 4);
        let nova = agents.iter().find(|a| a.id == "agent_nova").unwrap();
        assert_eq!(nova.status, "offline");
    }

    #[test]
    fn test_send_message_defaults() {
        let store = seeded();
        let message = NewMessage {
            thread_id: Some("thread_review".to_string()),
            subject: Some("Schema review".to_string()),
            ..NewMessage::new("THEO-5001", "MARCUS-5002", "Please check the migrations")
        };

        let sent = send_message(&store, &message).unwrap();
        assert!(sent.id.starts_with("msg_"));
        assert_eq!(sent.status, "delivered");
        assert_eq!(sent.message_type, "direct_message");
        assert!(!sent.timestamp.is_empty());

        let thread = MessageFilter {
            thread_id: Some("thread_review".to_string()),
            ..MessageFilter::default()
        };
        let listed = list_messages(&store, &thread).unwrap();
        assert_eq!(listed, [sent]);
        assert_eq!(listed[0].subject.as_deref(), Some("Schema review"));
        assert_eq!(list_messages(&store, &MessageFilter::default()).unwrap().len(), 2);
    }

    #[test]
    fn test_send_message_without_thread() {
        let store = seeded();
        let sent = send_message(&store, &NewMessage::new("SYSTEM", "ALL_AGENTS", "ping")).unwrap();

        let record = store
            .get_record(&store.get_collection(AGENT_MESSAGE_LOG).unwrap(), &sent.id)
            .unwrap()
            .unwrap();
        assert!(!record.metadata.contains_key("thread_id"));
        assert!(sent.thread_id.is_none());
    }

    #[test]
    fn test_send_message_duplicate_id() {
        let store = seeded();
        let message = NewMessage {
            id: Some("msg_system_initialization_001".to_string()),
            ..NewMessage::new("THEO-5001", "ALL_AGENTS", "overwrite attempt")
        };

        let err = send_message(&store, &message).unwrap_err();
        assert!(err.is_already_exists());

        let messages = list_messages(&store, &MessageFilter::default()).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].from_agent, "SYSTEM");
    }

    #[test]
    fn test_restore_points_round_trip() {
        let store = seeded();
        let input = NewRestorePoint {
            priority: "high".to_string(),
            tags: vec!["powerline".to_string(), "dashboard".to_string()],
            ..NewRestorePoint::new("session_checkpoint", "PROMETHEUS", "Dashboard wiring done")
        };

        let created = create_restore_point(&store, &input).unwrap();
        assert!(created.id.starts_with("restore_"));

        let points = list_restore_points(&store, DEFAULT_RESTORE_POINT_LIMIT).unwrap();
        assert_eq!(points, [created.clone()]);
        assert_eq!(points[0].metadata.restore_complexity, "low");

        let collection = store.get_collection(SESSION_RESTORE_CONTEXT).unwrap();
        let record = store.get_record(&collection, &created.id).unwrap().unwrap();
        assert_eq!(record.meta_str("tags"), Some("powerline,dashboard"));
        assert_eq!(record.meta_str("type"), Some("session_checkpoint"));
        assert!(record.document.contains("\"type\":\"session_checkpoint\""));
    }

    #[test]
    fn test_list_restore_points_limit() {
        let store = seeded();
        for n in 0..3 {
            let input = NewRestorePoint {
                id: Some(format!("restore_{n}")),
                ..NewRestorePoint::new("session_checkpoint", "THEO-5001", format!("step {n}"))
            };
            create_restore_point(&store, &input).unwrap();
        }

        let points = list_restore_points(&store, 2).unwrap();
        let ids: Vec<&str> = points.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["restore_0", "restore_1"]);
    }

    #[test]
    fn test_views_need_bootstrap() {
        let store = Store::open_in_memory().unwrap();
        let err = list_agents(&store).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert!(list_restore_points(&store, 1).unwrap_err().is_not_found());
        assert!(send_message(&store, &NewMessage::new("a", "b", "c"))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("a, b,,c"), ["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }
}
