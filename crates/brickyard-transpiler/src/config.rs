//! Transpiler configuration.

use std::collections::BTreeMap;

use derive_builder::Builder;

/// Default location of input artifacts inside containers.
pub const DEFAULT_ARTIFACT_ROOT: &str = "/tmp/artifacts";

const DEFAULT_MAP_TASK_NAME: &str = "map";
const DEFAULT_TRUE_TASK_NAME: &str = "when-true";
const DEFAULT_FALSE_TASK_NAME: &str = "when-false";

/// Configuration for the transpiler.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct TranspilerConfig {
    /// Directory under which container input artifacts are placed.
    #[builder(default = "DEFAULT_ARTIFACT_ROOT.to_owned()")]
    pub artifact_root: String,

    /// Name of the single task of a map template.
    #[builder(default = "DEFAULT_MAP_TASK_NAME.to_owned()")]
    pub map_task_name: String,

    /// Name of the guarded task running the true branch of a conditional.
    #[builder(default = "DEFAULT_TRUE_TASK_NAME.to_owned()")]
    pub true_task_name: String,

    /// Name of the guarded task running the false branch of a conditional.
    #[builder(default = "DEFAULT_FALSE_TASK_NAME.to_owned()")]
    pub false_task_name: String,

    /// Namespace override; the job workspace is used when unset.
    #[builder(default, setter(into, strip_option))]
    pub namespace: Option<String>,

    /// Service account the workflow pods run as.
    #[builder(default, setter(into, strip_option))]
    pub service_account: Option<String>,

    /// Extra labels on the emitted workflow.
    #[builder(default)]
    pub labels: BTreeMap<String, String>,

    /// Extra annotations on the emitted workflow.
    #[builder(default)]
    pub annotations: BTreeMap<String, String>,
}

impl TranspilerConfig {
    /// Returns a builder for the configuration.
    pub fn builder() -> TranspilerConfigBuilder {
        TranspilerConfigBuilder::default()
    }
}

impl TranspilerConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.artifact_root.as_deref().is_some_and(str::is_empty) {
            return Err("artifact_root must not be empty".into());
        }
        for name in [&self.map_task_name, &self.true_task_name, &self.false_task_name] {
            if name.as_deref().is_some_and(str::is_empty) {
                return Err("task names must not be empty".into());
            }
        }
        let true_task = self.true_task_name.as_deref().unwrap_or(DEFAULT_TRUE_TASK_NAME);
        let false_task = self.false_task_name.as_deref().unwrap_or(DEFAULT_FALSE_TASK_NAME);
        if true_task == false_task {
            return Err("true_task_name and false_task_name must differ".into());
        }
        Ok(())
    }
}

impl Default for TranspilerConfig {
    fn default() -> Self {
        Self {
            artifact_root: DEFAULT_ARTIFACT_ROOT.to_owned(),
            map_task_name: DEFAULT_MAP_TASK_NAME.to_owned(),
            true_task_name: DEFAULT_TRUE_TASK_NAME.to_owned(),
            false_task_name: DEFAULT_FALSE_TASK_NAME.to_owned(),
            namespace: None,
            service_account: None,
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
        }
    }
}
