//! `mediq catalog` — Inspect the role/task prompt catalog.

use std::sync::Arc;

use mediq_core::capability::CapabilityRegistry;
use mediq_core::pipeline::PipelineFactory;
use mediq_core::rate_limit::RateLimiter;
use mediq_core::service::{REQUIRED_ROLES, REQUIRED_TASKS};
use mediq_core::ServiceConfig;

const ROLE_WIDTHS: &[usize] = &[24, 32, 30];
const TASK_WIDTHS: &[usize] = &[15, 24, 23];

/// List the roles and tasks the pipeline is built from.
pub async fn list(catalog_dir: Option<&str>) -> Result<(), String> {
    let catalog = super::open_catalog(catalog_dir);
    let data = catalog.load().map_err(|e| e.to_string())?;

    let source = catalog
        .source_dir()
        .map(|d| d.display().to_string())
        .unwrap_or_else(|| "builtin".to_string());
    println!("Catalog source: {}", source);

    let mut roles: Vec<_> = data.roles.values().collect();
    roles.sort_by(|a, b| a.id.cmp(&b.id));

    println!();
    println!("{}", border(ROLE_WIDTHS, "┌", "┬", "┐"));
    println!("│ {:<24} │ {:<32} │ {:<30} │", "Role", "Name", "Capabilities");
    println!("{}", border(ROLE_WIDTHS, "├", "┼", "┤"));
    for role in &roles {
        let caps = if role.capabilities.is_empty() {
            "-".to_string()
        } else {
            role.capabilities.join(", ")
        };
        println!(
            "│ {:<24} │ {:<32} │ {:<30} │",
            super::truncate(&role.id, 24),
            super::truncate(&role.name, 32),
            super::truncate(&caps, 30),
        );
    }
    println!("{}", border(ROLE_WIDTHS, "└", "┴", "┘"));

    println!();
    println!("{}", border(TASK_WIDTHS, "┌", "┬", "┐"));
    println!("│ {:<15} │ {:<24} │ {:<23} │", "Task", "Role", "Upstream");
    println!("{}", border(TASK_WIDTHS, "├", "┼", "┤"));
    for task in &data.tasks {
        let upstream = if task.upstream.is_empty() {
            "-".to_string()
        } else {
            task.upstream.join(", ")
        };
        println!(
            "│ {:<15} │ {:<24} │ {:<23} │",
            super::truncate(&task.id, 15),
            super::truncate(&task.role, 24),
            super::truncate(&upstream, 23),
        );
    }
    println!("{}", border(TASK_WIDTHS, "└", "┴", "┘"));

    Ok(())
}

/// Verify the catalog parses and a full pipeline can be built from it.
///
/// Runs the same validation an analysis would hit: required roles and
/// tasks present, every capability reference registered, topology sound.
pub async fn check(catalog_dir: Option<&str>) -> Result<(), String> {
    let catalog = Arc::new(super::open_catalog(catalog_dir));
    let data = catalog.reload().map_err(|e| e.to_string())?;

    for id in REQUIRED_ROLES {
        if data.role(id).is_none() {
            return Err(format!("Required role '{}' is missing", id));
        }
    }
    for id in REQUIRED_TASKS {
        if data.task(id).is_none() {
            return Err(format!("Required task '{}' is missing", id));
        }
    }

    // Dry-run the factory without a backend or rate ceiling
    let factory = PipelineFactory::new(
        catalog.clone(),
        Arc::new(CapabilityRegistry::builtin()),
        ServiceConfig::default(),
    );
    let pipeline = factory
        .diagnostic_pipeline(Arc::new(RateLimiter::per_minute(0)))
        .map_err(|e| e.to_string())?;

    let source = catalog
        .source_dir()
        .map(|d| d.display().to_string())
        .unwrap_or_else(|| "builtin".to_string());

    println!("✅ Catalog is valid");
    println!("   Source: {}", source);
    println!("   Roles: {}", data.roles.len());
    println!("   Tasks: {}", data.tasks.len());
    for (i, task) in pipeline.tasks().iter().enumerate() {
        let upstream = if task.upstream.is_empty() {
            "-".to_string()
        } else {
            task.upstream.join(", ")
        };
        println!(
            "   {}. {} (agent: {}, upstream: {})",
            i + 1,
            task.name,
            task.agent.name,
            upstream
        );
    }

    Ok(())
}

fn border(widths: &[usize], left: &str, mid: &str, right: &str) -> String {
    let mut line = String::from(left);
    for (i, width) in widths.iter().enumerate() {
        if i > 0 {
            line.push_str(mid);
        }
        line.push_str(&"─".repeat(width + 2));
    }
    line.push_str(right);
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const ROLES_YAML: &str = r#"
- id: "intake_coordinator"
  name: "Medical Interview Specialist"
  goal: "Gather the patient's story"
  backstory: "A triage nurse."
  capabilities: ["interview"]
- id: "diagnostic_physician"
  name: "Diagnostic Physician"
  goal: "Rank candidate conditions"
  backstory: "An internist."
  capabilities: ["differential-diagnosis", "safety-check"]
- id: "communication_specialist"
  name: "Patient Communication Specialist"
  goal: "Explain findings plainly"
  backstory: "A health educator."
  capabilities: ["literacy-check"]
"#;

    const TASKS_YAML: &str = r#"
- id: "interview"
  description: "Interview about: ${patient_input}"
  expected_output: "Intake summary"
  role: "intake_coordinator"
- id: "diagnosis"
  description: "Diagnose from the intake summary"
  expected_output: "Ranked differential"
  role: "diagnostic_physician"
  upstream: ["interview"]
- id: "communication"
  description: "Explain the findings"
  expected_output: "Patient guidance"
  role: "communication_specialist"
  upstream: ["interview", "diagnosis"]
"#;

    fn write_catalog(dir: &Path, roles: &str, tasks: &str) {
        std::fs::write(dir.join("roles.yaml"), roles).unwrap();
        std::fs::write(dir.join("tasks.yaml"), tasks).unwrap();
    }

    #[tokio::test]
    async fn test_check_accepts_complete_catalog() {
        let tmp = tempfile::tempdir().unwrap();
        write_catalog(tmp.path(), ROLES_YAML, TASKS_YAML);

        check(Some(tmp.path().to_str().unwrap())).await.unwrap();
    }

    #[tokio::test]
    async fn test_check_rejects_missing_required_task() {
        let tmp = tempfile::tempdir().unwrap();
        let no_communication = TASKS_YAML
            .split("- id: \"communication\"")
            .next()
            .unwrap()
            .to_string();
        write_catalog(tmp.path(), ROLES_YAML, &no_communication);

        let err = check(Some(tmp.path().to_str().unwrap()))
            .await
            .unwrap_err();
        assert!(err.contains("Required task 'communication'"));
    }

    #[tokio::test]
    async fn test_check_rejects_unregistered_capability() {
        let tmp = tempfile::tempdir().unwrap();
        let bad_roles = ROLES_YAML.replace("\"literacy-check\"", "\"mri-scan\"");
        write_catalog(tmp.path(), &bad_roles, TASKS_YAML);

        let err = check(Some(tmp.path().to_str().unwrap()))
            .await
            .unwrap_err();
        assert!(err.contains("mri-scan"));
    }

    #[tokio::test]
    async fn test_list_requires_a_readable_catalog() {
        let tmp = tempfile::tempdir().unwrap();
        write_catalog(tmp.path(), ROLES_YAML, TASKS_YAML);
        list(Some(tmp.path().to_str().unwrap())).await.unwrap();

        let err = list(Some("/nonexistent/catalog")).await.unwrap_err();
        assert!(err.contains("Failed to read"));
    }

    #[test]
    fn test_border_widths() {
        let line = border(&[3, 5], "┌", "┬", "┐");
        assert_eq!(line, format!("┌{}┬{}┐", "─".repeat(5), "─".repeat(7)));
    }
}
