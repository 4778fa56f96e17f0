use intervector_setup::{bootstrap, BootstrapReport, Outcome, Phase, SeedEvent, SeedPlan, SetupError};
use std::path::Path;
use std::process::ExitCode;

/// Run the bootstrap and report progress on the console.
///
/// Returns failure only when the store itself is unusable.
pub fn run_setup(db_path: &Path) -> ExitCode {
    if setup_store(db_path) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Console bootstrap; `true` when the store was opened.
pub(crate) fn setup_store(db_path: &Path) -> bool {
    println!("🧠 Agent Intervector Command Center - Store Setup\n");
    println!("🚀 Setting up the store for Agent Command Center...");

    match bootstrap::run(db_path, &SeedPlan::command_center(), print_event) {
        Ok(report) => {
            print_summary(&report, db_path);
            println!("\n✨ Setup completed successfully!");
            true
        }
        Err(SetupError::Requirements(e)) => {
            eprintln!("❌ Storage engine check failed: {e}");
            false
        }
        Err(e) => {
            eprintln!("❌ Store setup failed: {e}");
            eprintln!("\n💥 Setup failed. Please check the errors above.");
            false
        }
    }
}

fn print_event(event: &SeedEvent) {
    match event {
        SeedEvent::StoreOpened { path } => {
            println!("✅ Store opened at: {}", path.display());
        }
        SeedEvent::PhaseStarted(Phase::Collections) => {
            println!("\n📦 Ensuring collections...");
        }
        SeedEvent::PhaseStarted(Phase::Agents) => {
            println!("\n🤖 Registering core agents...");
        }
        SeedEvent::PhaseStarted(Phase::Messages) => {
            println!("\n📡 Adding initial system message...");
        }
        SeedEvent::Collection { name, outcome } => match outcome {
            Outcome::Created => println!("✅ Created collection: {name}"),
            Outcome::AlreadyExists => println!("ℹ️  Collection already exists: {name}"),
            Outcome::Failed(reason) => eprintln!("❌ Error creating collection {name}: {reason}"),
        },
        SeedEvent::Record {
            phase: Phase::Agents,
            label,
            outcome,
            ..
        } => match outcome {
            Outcome::Created => println!("✅ Registered agent: {label}"),
            Outcome::AlreadyExists => println!("ℹ️  Agent {label} already registered"),
            Outcome::Failed(reason) => eprintln!("❌ Could not register agent {label}: {reason}"),
        },
        SeedEvent::Record {
            id, label, outcome, ..
        } => match outcome {
            Outcome::Created => println!("✅ Added message {id}: {label}"),
            Outcome::AlreadyExists => println!("ℹ️  Message {id} already exists"),
            Outcome::Failed(reason) => eprintln!("❌ Could not add message {id}: {reason}"),
        },
    }
}

fn print_summary(report: &BootstrapReport, db_path: &Path) {
    let collections = report.collection_tally();
    let agents = report.agent_tally();
    let messages = report.message_tally();

    println!("\n🎉 Store Setup Complete!");
    println!("📊 Created collections: {}", collections.created);
    println!("📊 Existing collections: {}", collections.existing);
    if collections.failed > 0 {
        println!("⚠️  Failed collections: {}", collections.failed);
    }
    println!(
        "🤖 Registered agents: {} (already registered: {})",
        agents.created, agents.existing
    );
    println!(
        "📡 System messages added: {} (already present: {})",
        messages.created, messages.existing
    );
    if agents.failed + messages.failed > 0 {
        println!(
            "⚠️  Records skipped after errors: {}",
            agents.failed + messages.failed
        );
    }
    println!("💾 Database location: {}", db_path.display());
    println!("\n🚀 Ready for Agent Intervector Communication!");
}
