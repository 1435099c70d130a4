//! Role and task catalog — load prompt definitions from YAML files.
//!
//! Roles and tasks are defined in two YAML files (`roles.yaml` and
//! `tasks.yaml`) inside a catalog directory. Each file holds a list of
//! definitions:
//!
//! ```yaml
//! # roles.yaml
//! - id: "diagnostic_physician"
//!   name: "Diagnostic Physician"
//!   goal: "Analyze intake findings and rank candidate conditions"
//!   backstory: |
//!     A board-certified internist who weighs likelihood against severity.
//!   capabilities: ["differential-diagnosis", "safety-check"]
//! ```
//!
//! The catalog is read lazily on first use and memoized. Later edits to the
//! files are invisible until [`PromptCatalog::reload`] is called.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// A role (persona) definition loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleDef {
    /// Role ID (e.g., "intake_coordinator")
    pub id: String,

    /// Display name shown in logs and catalog listings
    pub name: String,

    /// What this role is trying to achieve
    pub goal: String,

    /// Persona background woven into the prompt
    pub backstory: String,

    /// IDs of the capabilities this role may invoke
    #[serde(default)]
    pub capabilities: Vec<String>,
}

/// A task definition loaded from YAML. Declaration order in the file is the
/// execution order of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDef {
    /// Task ID (e.g., "interview")
    pub id: String,

    /// Instructions for the task. May contain `${placeholder}` markers that
    /// are resolved against run inputs.
    pub description: String,

    /// Description of the artifact the task should produce
    pub expected_output: String,

    /// ID of the role this task is bound to
    pub role: String,

    /// IDs of earlier tasks whose outputs feed this one
    #[serde(default)]
    pub upstream: Vec<String>,
}

/// Parsed catalog contents. Tasks keep their file order.
#[derive(Debug, Clone)]
pub struct CatalogData {
    pub roles: HashMap<String, RoleDef>,
    pub tasks: Vec<TaskDef>,
}

impl CatalogData {
    /// Build from parsed definitions, rejecting duplicate IDs and dangling
    /// role references.
    pub fn new(roles: Vec<RoleDef>, tasks: Vec<TaskDef>) -> Result<Self> {
        let mut role_map = HashMap::new();
        for role in roles {
            if role_map.insert(role.id.clone(), role.clone()).is_some() {
                return Err(CoreError::Catalog(format!(
                    "Duplicate role id '{}'",
                    role.id
                )));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for task in &tasks {
            if !seen.insert(task.id.clone()) {
                return Err(CoreError::Catalog(format!(
                    "Duplicate task id '{}'",
                    task.id
                )));
            }
            if !role_map.contains_key(&task.role) {
                return Err(CoreError::Catalog(format!(
                    "Task '{}' references unknown role '{}'",
                    task.id, task.role
                )));
            }
        }

        Ok(Self {
            roles: role_map,
            tasks,
        })
    }

    /// Get a role by ID.
    pub fn role(&self, id: &str) -> Option<&RoleDef> {
        self.roles.get(id)
    }

    /// Get a task by ID.
    pub fn task(&self, id: &str) -> Option<&TaskDef> {
        self.tasks.iter().find(|t| t.id == id)
    }
}

/// Search paths checked when no explicit catalog directory is configured.
const CATALOG_DIRS: &[&str] = &["catalog", "resources/catalog", "../resources/catalog"];

const ROLES_FILE: &str = "roles.yaml";
const TASKS_FILE: &str = "tasks.yaml";

/// Lazily loaded, memoized role/task catalog.
///
/// The first call to [`load`](Self::load) reads the YAML files (or falls back
/// to the built-in definitions) and caches the result. Every later call
/// returns the cached snapshot until [`reload`](Self::reload) replaces it.
pub struct PromptCatalog {
    dir: Option<PathBuf>,
    cache: RwLock<Option<Arc<CatalogData>>>,
}

impl PromptCatalog {
    /// Create a catalog with an optional explicit directory. `None` means
    /// the default search paths, falling back to built-in definitions.
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self {
            dir,
            cache: RwLock::new(None),
        }
    }

    /// Get the catalog, reading it from disk on first use.
    pub fn load(&self) -> Result<Arc<CatalogData>> {
        if let Some(data) = self.cache.read().ok().and_then(|c| c.as_ref().cloned()) {
            return Ok(data);
        }
        self.reload()
    }

    /// Re-read the catalog from disk, replacing any cached snapshot.
    pub fn reload(&self) -> Result<Arc<CatalogData>> {
        let data = Arc::new(self.read_sources()?);
        if let Ok(mut cache) = self.cache.write() {
            *cache = Some(data.clone());
        }
        Ok(data)
    }

    /// Look up a role by ID, loading the catalog if needed.
    pub fn get_role(&self, id: &str) -> Result<RoleDef> {
        self.load()?
            .role(id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("Role '{}' not found in catalog", id)))
    }

    /// Look up a task by ID, loading the catalog if needed.
    pub fn get_task(&self, id: &str) -> Result<TaskDef> {
        self.load()?
            .task(id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("Task '{}' not found in catalog", id)))
    }

    /// The directory definitions are read from: the explicit directory when
    /// one was configured, otherwise the first search path holding both
    /// files. `None` means the built-in definitions are in effect.
    pub fn source_dir(&self) -> Option<PathBuf> {
        if let Some(ref dir) = self.dir {
            return Some(dir.clone());
        }
        CATALOG_DIRS
            .iter()
            .map(Path::new)
            .find(|p| p.join(ROLES_FILE).is_file() && p.join(TASKS_FILE).is_file())
            .map(Path::to_path_buf)
    }

    fn read_sources(&self) -> Result<CatalogData> {
        if let Some(dir) = self.source_dir() {
            return read_catalog_dir(&dir);
        }

        tracing::info!("[PromptCatalog] No catalog directory found, using built-in definitions");
        CatalogData::new(builtin_roles(), builtin_tasks())
    }
}

fn read_catalog_dir(dir: &Path) -> Result<CatalogData> {
    let roles: Vec<RoleDef> = read_yaml_list(&dir.join(ROLES_FILE))?;
    let tasks: Vec<TaskDef> = read_yaml_list(&dir.join(TASKS_FILE))?;
    let data = CatalogData::new(roles, tasks)?;
    tracing::info!(
        "[PromptCatalog] Loaded {} roles and {} tasks from '{}'",
        data.roles.len(),
        data.tasks.len(),
        dir.display()
    );
    Ok(data)
}

fn read_yaml_list<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CoreError::Catalog(format!("Failed to read '{}': {}", path.display(), e))
    })?;
    serde_yaml::from_str(&content).map_err(|e| {
        CoreError::Catalog(format!("Failed to parse '{}': {}", path.display(), e))
    })
}

/// Replace `${key}` markers with values from `inputs`. Unknown keys are left
/// in place.
pub fn resolve_placeholders(template: &str, inputs: &HashMap<String, String>) -> String {
    let re = regex::Regex::new(r"\$\{(\w+)\}").unwrap();
    re.replace_all(template, |caps: &regex::Captures| {
        let key = &caps[1];
        inputs
            .get(key)
            .cloned()
            .unwrap_or_else(|| format!("${{{}}}", key))
    })
    .to_string()
}

/// Built-in role definitions (hardcoded, no files needed).
pub fn builtin_roles() -> Vec<RoleDef> {
    vec![
        RoleDef {
            id: "intake_coordinator".to_string(),
            name: "Medical Interview Specialist".to_string(),
            goal: "Gather a complete picture of the patient's symptoms, history, \
                and concerns from their own description"
                .to_string(),
            backstory: "An experienced intake coordinator with years of triage work. \
                Skilled at drawing out the details patients forget to mention and \
                organizing them into a clear clinical picture."
                .to_string(),
            capabilities: vec!["interview".to_string()],
        },
        RoleDef {
            id: "diagnostic_physician".to_string(),
            name: "Diagnostic Physician".to_string(),
            goal: "Analyze intake findings and produce a ranked differential \
                diagnosis with reasoning and an urgency assessment"
                .to_string(),
            backstory: "A board-certified internist who works through every case \
                systematically, weighing likelihood against severity and never \
                dismissing a red flag."
                .to_string(),
            capabilities: vec![
                "differential-diagnosis".to_string(),
                "safety-check".to_string(),
            ],
        },
        RoleDef {
            id: "communication_specialist".to_string(),
            name: "Patient Communication Specialist".to_string(),
            goal: "Turn clinical findings into clear, compassionate guidance the \
                patient can understand and act on"
                .to_string(),
            backstory: "A health communication expert who translates medical \
                language into plain terms and always closes with concrete next \
                steps and safety advice."
                .to_string(),
            capabilities: vec!["literacy-check".to_string()],
        },
    ]
}

/// Built-in task definitions, in execution order.
pub fn builtin_tasks() -> Vec<TaskDef> {
    vec![
        TaskDef {
            id: "interview".to_string(),
            description: "Review the patient's own description of their situation:\n\n\
                ${patient_input}\n\n\
                Produce a structured intake summary: chief complaint, history of \
                the present illness, relevant context, and anything that sounds \
                urgent."
                .to_string(),
            expected_output: "A structured intake summary with chief complaint, \
                symptom timeline, relevant history, and flagged urgent findings."
                .to_string(),
            role: "intake_coordinator".to_string(),
            upstream: vec![],
        },
        TaskDef {
            id: "diagnosis".to_string(),
            description: "Using the intake summary, build a differential diagnosis. \
                Rank candidate conditions by likelihood, explain the reasoning for \
                each, and call out any red flags that would warrant immediate care."
                .to_string(),
            expected_output: "A ranked differential diagnosis with reasoning per \
                condition, red flags, and a recommended level of urgency."
                .to_string(),
            role: "diagnostic_physician".to_string(),
            upstream: vec!["interview".to_string()],
        },
        TaskDef {
            id: "communication".to_string(),
            description: "Combine the intake summary and the differential diagnosis \
                into guidance written for the patient. Use plain language, explain \
                what the findings mean, and give clear next steps including when to \
                seek immediate care."
                .to_string(),
            expected_output: "A plain-language summary for the patient with clear \
                next steps and safety-netting advice, ending with a reminder that \
                this is not a medical diagnosis and a professional should be \
                consulted."
                .to_string(),
            role: "communication_specialist".to_string(),
            upstream: vec!["interview".to_string(), "diagnosis".to_string()],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

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
"#;

    fn write_catalog(dir: &Path, roles: &str, tasks: &str) {
        std::fs::write(dir.join(ROLES_FILE), roles).unwrap();
        std::fs::write(dir.join(TASKS_FILE), tasks).unwrap();
    }

    #[test]
    fn test_parse_role_yaml() {
        let roles: Vec<RoleDef> = serde_yaml::from_str(ROLES_YAML).unwrap();
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[0].id, "intake_coordinator");
        assert_eq!(roles[0].capabilities, vec!["interview"]);
        assert!(roles[1].capabilities.is_empty());
    }

    #[test]
    fn test_parse_task_yaml_defaults() {
        let tasks: Vec<TaskDef> = serde_yaml::from_str(TASKS_YAML).unwrap();
        assert_eq!(tasks.len(), 2);
        assert!(tasks[0].upstream.is_empty());
        assert_eq!(tasks[1].upstream, vec!["interview"]);
    }

    #[test]
    fn test_builtin_catalog_is_consistent() {
        let data = CatalogData::new(builtin_roles(), builtin_tasks()).unwrap();
        assert_eq!(data.roles.len(), 3);
        assert_eq!(data.tasks.len(), 3);
        assert_eq!(data.tasks[0].id, "interview");
        assert_eq!(data.tasks[1].id, "diagnosis");
        assert_eq!(data.tasks[2].id, "communication");
        for task in &data.tasks {
            assert!(data.role(&task.role).is_some());
        }
        assert!(data.tasks[0].description.contains("${patient_input}"));
    }

    #[test]
    fn test_unknown_role_reference_is_error() {
        let roles = vec![builtin_roles().remove(0)];
        let tasks = vec![TaskDef {
            id: "diagnosis".to_string(),
            description: "d".to_string(),
            expected_output: "o".to_string(),
            role: "nonexistent".to_string(),
            upstream: vec![],
        }];
        let err = CatalogData::new(roles, tasks).unwrap_err();
        assert!(matches!(err, CoreError::Catalog(_)));
        assert!(err.to_string().contains("unknown role"));
    }

    #[test]
    fn test_duplicate_task_id_is_error() {
        let mut tasks = builtin_tasks();
        let mut dup = tasks[0].clone();
        dup.role = tasks[1].role.clone();
        tasks.push(dup);
        let err = CatalogData::new(builtin_roles(), tasks).unwrap_err();
        assert!(err.to_string().contains("Duplicate task id"));
    }

    #[test]
    fn test_resolve_placeholders() {
        let mut inputs = HashMap::new();
        inputs.insert("patient_input".to_string(), "chest pain".to_string());
        let out = resolve_placeholders("Symptoms: ${patient_input}. ${unknown}", &inputs);
        assert_eq!(out, "Symptoms: chest pain. ${unknown}");
    }

    #[test]
    fn test_load_memoizes_until_reload() {
        let tmp = tempfile::tempdir().unwrap();
        write_catalog(tmp.path(), ROLES_YAML, TASKS_YAML);

        let catalog = PromptCatalog::new(Some(tmp.path().to_path_buf()));
        let first = catalog.load().unwrap();
        assert_eq!(first.tasks.len(), 2);

        // Rewrite the tasks file with a single task. The cached snapshot
        // must stay in effect until reload.
        let single_task = r#"
- id: "interview"
  description: "Interview"
  expected_output: "Summary"
  role: "intake_coordinator"
"#;
        write_catalog(tmp.path(), ROLES_YAML, single_task);

        let cached = catalog.load().unwrap();
        assert_eq!(cached.tasks.len(), 2);

        let fresh = catalog.reload().unwrap();
        assert_eq!(fresh.tasks.len(), 1);
        assert_eq!(catalog.load().unwrap().tasks.len(), 1);
    }

    #[test]
    fn test_get_role_unknown_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        write_catalog(tmp.path(), ROLES_YAML, TASKS_YAML);
        let catalog = PromptCatalog::new(Some(tmp.path().to_path_buf()));

        assert!(catalog.get_role("intake_coordinator").is_ok());
        assert!(catalog.get_task("diagnosis").is_ok());

        let err = catalog.get_role("surgeon").unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
        let err = catalog.get_task("surgery").unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn test_missing_explicit_dir_is_error() {
        let catalog = PromptCatalog::new(Some(PathBuf::from("/nonexistent/catalog")));
        let err = catalog.load().unwrap_err();
        assert!(matches!(err, CoreError::Catalog(_)));
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        write_catalog(tmp.path(), "not: [valid", TASKS_YAML);
        let catalog = PromptCatalog::new(Some(tmp.path().to_path_buf()));
        let err = catalog.load().unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
