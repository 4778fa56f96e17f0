//! The bootstrap run: open the store, ensure collections, seed records.
//!
//! Only an unusable store is fatal. Every collection and record after that
//! is attempted exactly once; failures are logged, recorded in the
//! [`BootstrapReport`] and the run moves on to the next item.

use std::fmt;
use std::path::{Path, PathBuf};

use intervector_core::{check_requirements, Collection, Record, Store};

use crate::error::{SetupError, SetupResult};
use crate::plan::{SeedPlan, AGENT_DIRECTORY, AGENT_MESSAGE_LOG};

/// The steps of a run that touch collections or records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Collections,
    Agents,
    Messages,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collections => f.write_str("collections"),
            Self::Agents => f.write_str("agents"),
            Self::Messages => f.write_str("messages"),
        }
    }
}

/// What happened to a single collection or record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created,
    AlreadyExists,
    Failed(String),
}

/// Progress notifications emitted while a run advances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedEvent {
    StoreOpened { path: PathBuf },
    PhaseStarted(Phase),
    Collection { name: String, outcome: Outcome },
    Record {
        phase: Phase,
        id: String,
        label: String,
        outcome: Outcome,
    },
}

/// Counts of outcomes for one phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub created: usize,
    pub existing: usize,
    pub failed: usize,
}

impl Tally {
    fn of<'a>(outcomes: impl Iterator<Item = &'a Outcome>) -> Self {
        outcomes.fold(Self::default(), |mut tally, outcome| {
            match outcome {
                Outcome::Created => tally.created += 1,
                Outcome::AlreadyExists => tally.existing += 1,
                Outcome::Failed(_) => tally.failed += 1,
            }
            tally
        })
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.created + self.existing + self.failed
    }
}

/// Result of a run whose store opened successfully.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BootstrapReport {
    /// Store directory, `None` for in-memory stores.
    pub db_path: Option<PathBuf>,
    pub collections: Vec<(String, Outcome)>,
    pub agents: Vec<(String, Outcome)>,
    pub messages: Vec<(String, Outcome)>,
}

impl BootstrapReport {
    #[must_use]
    pub fn collection_tally(&self) -> Tally {
        Tally::of(self.collections.iter().map(|(_, o)| o))
    }

    #[must_use]
    pub fn agent_tally(&self) -> Tally {
        Tally::of(self.agents.iter().map(|(_, o)| o))
    }

    #[must_use]
    pub fn message_tally(&self) -> Tally {
        Tally::of(self.messages.iter().map(|(_, o)| o))
    }

    /// Names of collections in the given state.
    #[must_use]
    pub fn collections_where(&self, pred: impl Fn(&Outcome) -> bool) -> Vec<&str> {
        self.collections
            .iter()
            .filter(|(_, o)| pred(o))
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Whether every item was either created or already present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.collection_tally().failed == 0
            && self.agent_tally().failed == 0
            && self.message_tally().failed == 0
    }
}

/// Open the store at `db_path` and apply `plan` to it.
///
/// Returns `Err` only when the storage engine is unusable or the store
/// cannot be opened; everything else ends up in the report.
pub fn run<F>(db_path: &Path, plan: &SeedPlan, mut on_event: F) -> SetupResult<BootstrapReport>
where
    F: FnMut(&SeedEvent),
{
    check_requirements().map_err(SetupError::Requirements)?;

    let store = Store::open(db_path).map_err(|source| {
        log::error!("Failed to open store at {}: {source}", db_path.display());
        SetupError::Open {
            path: db_path.to_path_buf(),
            source,
        }
    })?;
    log::info!("Opened store at {}", db_path.display());
    on_event(&SeedEvent::StoreOpened {
        path: db_path.to_path_buf(),
    });

    Ok(seed(&store, plan, on_event))
}

/// Apply `plan` to an already open store.
pub fn seed<F>(store: &Store, plan: &SeedPlan, mut on_event: F) -> BootstrapReport
where
    F: FnMut(&SeedEvent),
{
    let mut report = BootstrapReport {
        db_path: store.location().map(Path::to_path_buf),
        ..BootstrapReport::default()
    };

    on_event(&SeedEvent::PhaseStarted(Phase::Collections));
    for spec in &plan.collections {
        let outcome = match store.create_collection(&spec.name, spec.metadata.clone()) {
            Ok(_) => Outcome::Created,
            Err(e) if e.is_already_exists() => {
                log::debug!("Collection {} already exists", spec.name);
                Outcome::AlreadyExists
            }
            Err(e) => {
                log::warn!("Skipping collection {}: {e}", spec.name);
                Outcome::Failed(e.to_string())
            }
        };
        on_event(&SeedEvent::Collection {
            name: spec.name.clone(),
            outcome: outcome.clone(),
        });
        report.collections.push((spec.name.clone(), outcome));
    }

    if !plan.agents.is_empty() {
        on_event(&SeedEvent::PhaseStarted(Phase::Agents));
        let records = plan
            .agents
            .iter()
            .map(|agent| (agent.agent_name.clone(), agent.to_record()));
        report.agents = seed_records(store, AGENT_DIRECTORY, Phase::Agents, records, &mut on_event);
    }

    if !plan.messages.is_empty() {
        on_event(&SeedEvent::PhaseStarted(Phase::Messages));
        let records = plan
            .messages
            .iter()
            .map(|message| (message.subject.clone(), message.to_record()));
        report.messages =
            seed_records(store, AGENT_MESSAGE_LOG, Phase::Messages, records, &mut on_event);
    }

    let tally = report.collection_tally();
    log::info!(
        "Bootstrap finished: {} created, {} existing, {} failed collections",
        tally.created,
        tally.existing,
        tally.failed
    );

    report
}

/// Insert each record on its own so one failure never blocks the rest.
fn seed_records<F>(
    store: &Store,
    collection_name: &str,
    phase: Phase,
    records: impl Iterator<Item = (String, Record)>,
    on_event: &mut F,
) -> Vec<(String, Outcome)>
where
    F: FnMut(&SeedEvent),
{
    let collection = store.get_collection(collection_name).map_err(|e| {
        log::error!("Cannot seed {phase}: collection {collection_name} unavailable: {e}");
        format!("collection {collection_name} unavailable: {e}")
    });

    records
        .map(|(label, record)| {
            let outcome = match &collection {
                Ok(collection) => insert_record(store, collection, &record),
                Err(reason) => Outcome::Failed(reason.clone()),
            };
            on_event(&SeedEvent::Record {
                phase,
                id: record.id.clone(),
                label,
                outcome: outcome.clone(),
            });
            (record.id, outcome)
        })
        .collect()
}

fn insert_record(store: &Store, collection: &Collection, record: &Record) -> Outcome {
    match store.add_records(collection, std::slice::from_ref(record)) {
        Ok(()) => {
            log::info!("Added {} to {}", record.id, collection.name);
            Outcome::Created
        }
        Err(e) if e.is_already_exists() => {
            log::debug!("{} already present in {}", record.id, collection.name);
            Outcome::AlreadyExists
        }
        Err(e) => {
            log::warn!("Skipping {} in {}: {e}", record.id, collection.name);
            Outcome::Failed(e.to_string())
        }
    }
}
