//! List rules command implementation.

use arch_drift_core::RuleCode;

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!("{:<16} {:<8} Description", "Code", "Severity");
    println!("{}", "-".repeat(80));

    for code in RuleCode::ALL {
        println!(
            "{:<16} {:<8} {}",
            code.as_str(),
            code.severity().to_string(),
            code.description()
        );
        println!("{:<25} = help: {}", "", code.suggestion(Some("<via>")));
    }

    println!("\nRules are declared in arch-drift.toml, e.g.:");
    println!("  [[forbidden_dependencies]]");
    println!("  from = \"controllers\"");
    println!("  to = \"repositories\"");
}
