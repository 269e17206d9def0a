use clap::Args;
use serde_json::Value;

use prefeas_core::project::assumptions::ProjectInput;

use crate::input;

/// Where the project comes from, plus field overrides.
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Path to a JSON or YAML project file (otherwise read from stdin)
    #[arg(long)]
    pub input: Option<String>,

    /// Start from the built-in quick-fill example project
    #[arg(long, conflicts_with = "input")]
    pub sample: bool,

    /// Override a field: name=value, or name==expression (repeatable)
    #[arg(long = "set", value_name = "FIELD=VALUE", allow_hyphen_values = true)]
    pub overrides: Vec<String>,
}

/// A loaded project and any warnings raised while applying overrides.
pub struct LoadedProject {
    pub project: ProjectInput,
    pub warnings: Vec<String>,
}

pub fn load_project(args: &ProjectArgs) -> Result<LoadedProject, Box<dyn std::error::Error>> {
    let base: ProjectInput = if args.sample {
        ProjectInput::sample()
    } else if let Some(ref path) = args.input {
        input::file::read_project_file(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        return Err("--input <project.json>, --sample or a project on stdin is required".into());
    };

    let (project, warnings) = input::overrides::apply_overrides(&base, &args.overrides)?;
    Ok(LoadedProject { project, warnings })
}

/// Append input warnings to an output envelope's `warnings` array.
pub fn attach_warnings(mut value: Value, extra: Vec<String>) -> Value {
    if extra.is_empty() {
        return value;
    }
    if let Some(map) = value.as_object_mut() {
        let entry = map
            .entry("warnings")
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(list) = entry {
            list.extend(extra.into_iter().map(Value::String));
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_sample_with_overrides() {
        let args = ProjectArgs {
            input: None,
            sample: true,
            overrides: vec!["presale_pct=0.6".into()],
        };
        let loaded = load_project(&args).unwrap();
        assert_eq!(loaded.project.assumptions.presale_pct.to_string(), "0.6");
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_attach_warnings() {
        let value = json!({"result": 1, "warnings": ["a"]});
        let merged = attach_warnings(value, vec!["b".into()]);
        assert_eq!(merged["warnings"], json!(["a", "b"]));

        let bare = attach_warnings(json!({"complete": true}), vec!["c".into()]);
        assert_eq!(bare["warnings"], json!(["c"]));
    }
}
