//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_RULES: &str = r#"# arch-drift rules
#
# Layers are matched in declaration order; the first layer whose pattern
# matches a file wins. Files matching no layer are classified as "unknown".

[[layers]]
name = "controllers"
patterns = ["app/controllers/**"]

[[layers]]
name = "services"
patterns = ["app/services/**"]

[[layers]]
name = "repositories"
patterns = ["app/repositories/**"]

[[layers]]
name = "ui"
patterns = ["frontend/components/**"]

# FORBIDDEN_DEP (high): any edge between these layers, imports and
# database calls alike.
[[forbidden_dependencies]]
from = "controllers"
to = "repositories"

# BYPASS_LAYER (medium): direct edge that should go through `via`.
[[must_route_via]]
from = "controllers"
to = "repositories"
via = "services"

# DISALLOWED_API (medium): regex patterns forbidden in a layer's sources.
[[disallowed_apis]]
layer = "controllers"
patterns = ['\.where\(', '\.find\(', 'ActiveRecord::Base']
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    let rules_path = Path::new("arch-drift.toml");

    if rules_path.exists() && !force {
        bail!(
            "Rules file already exists at {}. Use --force to overwrite.",
            rules_path.display()
        );
    }

    std::fs::write(rules_path, DEFAULT_RULES)?;

    println!("Created arch-drift.toml");
    println!("\nNext steps:");
    println!("  1. Edit arch-drift.toml to describe your layers");
    println!("  2. Run: arch-drift check");

    Ok(())
}
