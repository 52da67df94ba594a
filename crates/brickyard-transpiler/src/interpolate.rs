//! Orchestrator interpolation strings.
//!
//! Template placeholders (`{{...}}`) are substituted by the orchestrator
//! before a step runs; expression references (`tasks['..']...`) are
//! evaluated by its expression engine.

/// Placeholder bound to the current element of a fan-out.
pub const ITEM: &str = "{{item}}";

/// `{{inputs.parameters.<name>}}`
pub fn input_parameter(name: &str) -> String {
    format!("{{{{inputs.parameters.{name}}}}}")
}

/// `{{inputs.artifacts.<name>}}`
pub fn input_artifact(name: &str) -> String {
    format!("{{{{inputs.artifacts.{name}}}}}")
}

/// `{{inputs.artifacts.<name>.path}}`
pub fn input_artifact_path(name: &str) -> String {
    format!("{{{{inputs.artifacts.{name}.path}}}}")
}

/// `{{tasks.<task>.outputs.parameters.<name>}}`
pub fn task_parameter(task: &str, name: &str) -> String {
    format!("{{{{tasks.{task}.outputs.parameters.{name}}}}}")
}

/// `{{tasks.<task>.outputs.artifacts.<name>}}`
pub fn task_artifact(task: &str, name: &str) -> String {
    format!("{{{{tasks.{task}.outputs.artifacts.{name}}}}}")
}

/// `inputs.parameters['<name>']`, for expressions.
pub fn input_parameter_expr(name: &str) -> String {
    format!("inputs.parameters[{}]", quote(name))
}

/// `tasks['<task>'].outputs.parameters['<name>']`, for expressions.
pub fn task_parameter_expr(task: &str, name: &str) -> String {
    format!("tasks[{}].outputs.parameters[{}]", quote(task), quote(name))
}

/// `tasks['<task>'].outputs.artifacts['<name>']`, for expressions.
pub fn task_artifact_expr(task: &str, name: &str) -> String {
    format!("tasks[{}].outputs.artifacts[{}]", quote(task), quote(name))
}

/// Single-quotes a string literal for expressions.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Joins path fragments with `/`.
///
/// Empty fragments and duplicate separators are dropped; the result is
/// absolute when the first non-empty fragment is.
pub fn join_path<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    let mut path = String::new();
    let mut absolute = None;

    for part in parts {
        if absolute.is_none() && !part.is_empty() {
            absolute = Some(part.starts_with('/'));
        }
        for segment in part.split('/').filter(|s| !s.is_empty()) {
            if !path.is_empty() {
                path.push('/');
            }
            path.push_str(segment);
        }
    }

    if absolute == Some(true) {
        path.insert(0, '/');
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders() {
        assert_eq!(input_parameter("seed"), "{{inputs.parameters.seed}}");
        assert_eq!(input_artifact_path("doc"), "{{inputs.artifacts.doc.path}}");
        assert_eq!(input_artifact("doc"), "{{inputs.artifacts.doc}}");
        assert_eq!(
            task_parameter("N1", "value"),
            "{{tasks.N1.outputs.parameters.value}}"
        );
        assert_eq!(task_artifact("N1", "doc"), "{{tasks.N1.outputs.artifacts.doc}}");
    }

    #[test]
    fn expression_references() {
        assert_eq!(
            task_parameter_expr("when-true", "value"),
            "tasks['when-true'].outputs.parameters['value']"
        );
        assert_eq!(input_parameter_expr("n"), "inputs.parameters['n']");
        assert_eq!(quote("it's"), r"'it\'s'");
    }

    #[test]
    fn join_path_collapses_separators() {
        assert_eq!(join_path(["vols/mypath", "mount-0", ""]), "vols/mypath/mount-0");
        assert_eq!(join_path(["vols/mypath/", "/mount-0"]), "vols/mypath/mount-0");
        assert_eq!(join_path(["/mnt//data", "v", "sub/"]), "/mnt/data/v/sub");
        assert_eq!(join_path(["", "v", ""]), "v");
        assert_eq!(join_path(["", "/v"]), "/v");
    }
}
