//! Legacy inference tables.
//!
//! Legacy headers carry only name, description, and color; the richer
//! canonical fields are inferred from these fixed name-keyed tables so old
//! documents stay usable read-only without forced rewriting. Unknown names
//! get the empty or neutral default, never an error.
//!
//! Revision 3 of the tables, matching canonical schema 3.0.0. Update the
//! tables here, not inside parsing logic.

/// Table revision, bumped together with the canonical schema.
pub const REVISION: u32 = 3;

/// Tags historically associated with a document name.
pub fn tags(name: &str) -> &'static [&'static str] {
    match name {
        "coordinator" => &["core", "coordination"],
        "developer" => &["core", "technical"],
        "architect" => &["core", "technical", "design"],
        "tester" => &["core", "qa"],
        "strategist" => &["core", "analysis"],
        "designer" => &["creative", "design"],
        "documenter" => &["creative", "content"],
        "operator" => &["ops", "technical"],
        "analyst" => &["analysis", "data"],
        "marketer" => &["creative", "growth"],
        "support" => &["support", "customer"],
        _ => &[],
    }
}

/// Default reasoning-depth hint for a document name.
pub fn thinking_mode(name: &str) -> &'static str {
    match name {
        "architect" => "ultrathink",
        "strategist" => "think harder",
        "coordinator" => "think hard",
        "developer" => "think",
        "tester" => "think",
        "designer" => "think hard",
        _ => "think",
    }
}

/// Primary tool grants assumed when body extraction yields nothing.
pub fn default_tools(name: &str) -> &'static [&'static str] {
    match name {
        "coordinator" => &["Task", "TodoWrite", "Write", "Read", "Edit"],
        "developer" => &["Read", "Write", "Edit", "Bash", "Task"],
        "architect" => &["Read", "Write", "Edit", "Grep", "Glob", "Task"],
        "tester" => &["Read", "Bash", "Grep", "Glob", "Task"],
        "strategist" => &["Read", "Grep", "Glob", "Task"],
        _ => &["Read", "Task"],
    }
}

/// Documents a named document historically collaborates with.
pub fn collaborators(name: &str) -> &'static [&'static str] {
    match name {
        "developer" => &["architect", "tester", "operator"],
        "architect" => &["strategist", "developer"],
        "tester" => &["developer", "designer"],
        "designer" => &["strategist", "developer"],
        "operator" => &["developer", "architect"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_resolve_table_values() {
        assert_eq!(thinking_mode("coordinator"), "think hard");
        assert_eq!(thinking_mode("architect"), "ultrathink");
        assert_eq!(tags("tester"), &["core", "qa"]);
        assert_eq!(collaborators("developer"), &["architect", "tester", "operator"]);
    }

    #[test]
    fn unknown_names_get_neutral_defaults() {
        assert_eq!(thinking_mode("archivist"), "think");
        assert!(tags("archivist").is_empty());
        assert!(collaborators("archivist").is_empty());
        assert_eq!(default_tools("archivist"), &["Read", "Task"]);
    }
}
