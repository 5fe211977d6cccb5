//! Pipeline Composer use case (C8): ordered/parallel/nested tool-step
//! execution with `${dotted.path}` interpolation and `{"$ref": ...}`
//! resolution against a running `{vars, steps, last}` environment.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::{json, Map, Value};

use toolgate_domain::entities::PipelineStepResult;
use toolgate_domain::error::{Error, Result};
use toolgate_domain::ports::services::PipelineComposer;
use toolgate_domain::value_objects::{PipelineStepId, PipelineStepOutcome, TenantFingerprint};

use crate::config::PipelineConfig;

/// The tool at the center of pipeline recursion; implemented by tool
/// dispatch (C9) in the server crate and injected here to avoid a
/// dependency from the application layer onto the transport layer.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Invoke one named tool with resolved arguments and return its raw
    /// JSON result or a machine-stable error code.
    async fn invoke(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        tool: &str,
        args: Value,
    ) -> std::result::Result<Value, String>;
}

/// The `{vars, steps, last}` environment threaded through one pipeline run.
#[derive(Debug, Clone, Default)]
struct Environment {
    vars: Value,
    steps: Map<String, Value>,
    last: Value,
}

impl Environment {
    fn as_value(&self) -> Value {
        Value::Object(Map::from_iter([
            ("vars".to_owned(), self.vars.clone()),
            ("steps".to_owned(), Value::Object(self.steps.clone())),
            ("last".to_owned(), self.last.clone()),
        ]))
    }
}

fn resolve_dotted_path(root: &Value, path: &str) -> Option<Value> {
    let mut current = root.clone();
    for segment in path.split('.') {
        current = match segment.parse::<usize>() {
            Ok(index) => current.get(index)?.clone(),
            Err(_) => current.get(segment)?.clone(),
        };
    }
    Some(current)
}

/// Replaces every `${dotted.path}` substring in `text` and resolves whole
/// `{"$ref": "dotted.path"}` objects, recursing through arrays and objects.
fn interpolate(value: &Value, env: &Value) -> Value {
    match value {
        Value::Object(map) if map.len() == 1 => {
            if let Some(Value::String(path)) = map.get("$ref") {
                return resolve_dotted_path(env, path).unwrap_or(Value::Null);
            }
            Value::Object(map.iter().map(|(k, v)| (k.clone(), interpolate(v, env))).collect())
        }
        Value::Object(map) => Value::Object(map.iter().map(|(k, v)| (k.clone(), interpolate(v, env))).collect()),
        Value::Array(items) => Value::Array(items.iter().map(|v| interpolate(v, env)).collect()),
        Value::String(s) => Value::String(interpolate_string(s, env)),
        other => other.clone(),
    }
}

fn interpolate_string(template: &str, env: &Value) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let Some(end) = rest[start..].find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let path = &rest[start + 2..start + end];
        let resolved = resolve_dotted_path(env, path);
        match resolved {
            Some(Value::String(s)) => out.push_str(&s),
            Some(other) => out.push_str(&other.to_string()),
            None => {}
        }
        rest = &rest[start + end + 1..];
    }
    out.push_str(rest);
    out
}

/// One parsed step from a pipeline definition's `steps[]` array.
enum StepKind {
    Tool { tool: String, args: Value },
    Parallel { children: Vec<(String, StepKind)> },
    Nested { spec: Value },
}

fn parse_step(value: &Value) -> Result<(String, StepKind)> {
    let obj = value.as_object().ok_or_else(|| Error::invalid_argument("pipeline step must be an object"))?;
    let id = obj
        .get("id")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::invalid_argument("pipeline step requires a non-empty id"))?
        .to_owned();

    if let Some(tool) = obj.get("tool").and_then(Value::as_str) {
        if tool == "mcp_pipe" {
            return Err(Error::invalid_argument("mcp_pipe must not invoke itself directly"));
        }
        let args = obj.get("args").cloned().unwrap_or(Value::Object(Map::new()));
        return Ok((id, StepKind::Tool { tool: tool.to_owned(), args }));
    }
    if let Some(parallel) = obj.get("parallel").and_then(Value::as_array) {
        let mut children = Vec::with_capacity(parallel.len());
        for child in parallel {
            children.push(parse_step(child)?);
        }
        return Ok((id, StepKind::Parallel { children }));
    }
    if let Some(spec) = obj.get("pipe") {
        return Ok((id, StepKind::Nested { spec: spec.clone() }));
    }
    Err(Error::invalid_argument("pipeline step must be one of tool/parallel/pipe"))
}

/// Executes pipeline definitions against an injected [`ToolInvoker`].
pub struct Pipeline {
    invoker: Arc<dyn ToolInvoker>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(invoker: Arc<dyn ToolInvoker>, config: PipelineConfig) -> Self {
        Self { invoker, config }
    }

    fn step_result(name: &str, outcome: PipelineStepOutcome, output: Option<Value>, error_code: Option<String>) -> PipelineStepResult {
        PipelineStepResult {
            id: PipelineStepId::new(),
            name: name.to_owned(),
            outcome,
            output,
            error_code,
            duration_ms: 0,
        }
    }

    fn claim_step_budget(step_budget: &AtomicUsize) -> Result<()> {
        loop {
            let current = step_budget.load(Ordering::Acquire);
            if current == 0 {
                return Err(Error::invalid_argument("pipeline exceeds max_total_steps"));
            }
            if step_budget
                .compare_exchange(current, current - 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return Ok(());
            }
        }
    }

    async fn run_step(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        id: &str,
        kind: &StepKind,
        env: &mut Environment,
        depth: usize,
        step_budget: &Arc<AtomicUsize>,
    ) -> Result<PipelineStepResult> {
        if depth > self.config.max_nesting_depth {
            return Err(Error::invalid_argument("pipeline nesting exceeds max_nesting_depth"));
        }
        Self::claim_step_budget(step_budget)?;

        let result = match kind {
            StepKind::Tool { tool, args } => {
                let resolved_args = interpolate(args, &env.as_value());
                match self.invoker.invoke(tenant, project, tool, resolved_args).await {
                    Ok(output) => Self::step_result(id, PipelineStepOutcome::Ok, Some(output), None),
                    Err(code) => Self::step_result(id, PipelineStepOutcome::Error, None, Some(code)),
                }
            }
            StepKind::Parallel { children } => {
                if children.len() > self.config.max_parallel_concurrency {
                    return Err(Error::invalid_argument("parallel group exceeds max_parallel_concurrency"));
                }
                let env_snapshot = env.clone();
                let futures = children.iter().map(|(child_id, child_kind)| {
                    let mut child_env = env_snapshot.clone();
                    let budget = Arc::clone(step_budget);
                    async move {
                        let result = self.run_step(tenant, project, child_id, child_kind, &mut child_env, depth + 1, &budget).await;
                        (child_id.clone(), result)
                    }
                });
                let outcomes = join_all(futures).await;
                let mut child_results = Map::new();
                let mut any_error = false;
                for (child_id, outcome) in outcomes {
                    match outcome {
                        Ok(step_result) => {
                            any_error |= step_result.outcome == PipelineStepOutcome::Error;
                            child_results.insert(child_id, json_result(&step_result));
                        }
                        Err(e) => {
                            any_error = true;
                            child_results.insert(child_id, json_error(e.code()));
                        }
                    }
                }
                let output = Value::Object(Map::from_iter([("children".to_owned(), Value::Object(child_results))]));
                Self::step_result(
                    id,
                    if any_error { PipelineStepOutcome::Error } else { PipelineStepOutcome::Ok },
                    Some(output),
                    None,
                )
            }
            StepKind::Nested { spec } => {
                let resolved_spec = interpolate(spec, &env.as_value());
                match Box::pin(self.run_definition(tenant, project, resolved_spec, depth + 1, step_budget)).await {
                    Ok(nested_results) => {
                        let ok = nested_results.iter().all(|r| r.outcome != PipelineStepOutcome::Error);
                        let steps_map: Map<String, Value> =
                            nested_results.iter().map(|r| (r.name.clone(), json_result(r))).collect();
                        Self::step_result(
                            id,
                            if ok { PipelineStepOutcome::Ok } else { PipelineStepOutcome::Error },
                            Some(Value::Object(steps_map)),
                            None,
                        )
                    }
                    Err(e) => Self::step_result(id, PipelineStepOutcome::Error, None, Some(e.code().to_owned())),
                }
            }
        };

        if result.is_resolvable() {
            if let Some(output) = &result.output {
                env.last = output.clone();
            }
        }
        env.steps.insert(id.to_owned(), json_result(&result));

        Ok(result)
    }

    async fn run_definition(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        definition: Value,
        depth: usize,
        step_budget: &Arc<AtomicUsize>,
    ) -> Result<Vec<PipelineStepResult>> {
        let obj = definition.as_object().ok_or_else(|| Error::invalid_argument("pipeline definition must be an object"))?;
        let steps_def = obj
            .get("steps")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::invalid_argument("pipeline definition requires a steps array"))?;
        let continue_on_error = obj.get("continue_on_error").and_then(Value::as_bool).unwrap_or(false);

        let mut env = Environment { vars: obj.get("vars").cloned().unwrap_or(Value::Object(Map::new())), ..Environment::default() };

        let mut seen_ids = std::collections::HashSet::new();
        let mut results = Vec::with_capacity(steps_def.len());
        for step_value in steps_def {
            let (id, kind) = parse_step(step_value)?;
            if !seen_ids.insert(id.clone()) {
                return Err(Error::invalid_argument(format!("duplicate pipeline step id '{id}'")));
            }
            let result = self.run_step(tenant, project, &id, &kind, &mut env, depth, step_budget).await?;
            let failed = result.outcome == PipelineStepOutcome::Error;
            results.push(result);
            if failed && !continue_on_error {
                break;
            }
        }
        Ok(results)
    }
}

fn json_result(result: &PipelineStepResult) -> Value {
    match result.outcome {
        PipelineStepOutcome::Ok => result.output.clone().unwrap_or(Value::Null),
        PipelineStepOutcome::Error => json_error(result.error_code.as_deref().unwrap_or("INTERNAL_ERROR")),
        PipelineStepOutcome::Skipped => json!({"skipped": true}),
    }
}

fn json_error(code: &str) -> Value {
    json!({"ok": false, "error": {"code": code}})
}

#[async_trait]
impl PipelineComposer for Pipeline {
    async fn run(
        &self,
        tenant: &TenantFingerprint,
        project: &str,
        definition: Value,
    ) -> Result<Vec<PipelineStepResult>> {
        let step_budget = Arc::new(AtomicUsize::new(self.config.max_total_steps));
        self.run_definition(tenant, project, definition, 0, &step_budget).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoInvoker;

    #[async_trait]
    impl ToolInvoker for EchoInvoker {
        async fn invoke(&self, _tenant: &TenantFingerprint, _project: &str, tool: &str, args: Value) -> std::result::Result<Value, String> {
            if tool == "fail" {
                return Err("INVALID_ARGUMENT".to_owned());
            }
            Ok(json!({"echoed": args}))
        }
    }

    fn tenant() -> TenantFingerprint {
        TenantFingerprint::from_api_key("sk-test")
    }

    #[tokio::test]
    async fn sequential_steps_can_reference_earlier_output() {
        let pipeline = Pipeline::new(Arc::new(EchoInvoker), PipelineConfig::default());
        let definition = json!({
            "steps": [
                {"id": "first", "tool": "echo", "args": {"value": "hello"}},
                {"id": "second", "tool": "echo", "args": {"from_first": "${steps.first.echoed.value}"}}
            ]
        });
        let results = pipeline.run(&tenant(), "demo", definition).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].output.as_ref().unwrap()["echoed"]["from_first"], json!("hello"));
    }

    #[tokio::test]
    async fn failure_stops_without_continue_on_error() {
        let pipeline = Pipeline::new(Arc::new(EchoInvoker), PipelineConfig::default());
        let definition = json!({
            "steps": [
                {"id": "boom", "tool": "fail", "args": {}},
                {"id": "never", "tool": "echo", "args": {}}
            ]
        });
        let results = pipeline.run(&tenant(), "demo", definition).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].outcome, PipelineStepOutcome::Error);
    }

    #[tokio::test]
    async fn mcp_pipe_cannot_invoke_itself() {
        let pipeline = Pipeline::new(Arc::new(EchoInvoker), PipelineConfig::default());
        let definition = json!({"steps": [{"id": "x", "tool": "mcp_pipe", "args": {}}]});
        assert!(pipeline.run(&tenant(), "demo", definition).await.is_err());
    }

    #[test]
    fn ref_resolution_preserves_referent_type() {
        let env = json!({"vars": {}, "steps": {"a": {"items": [1, 2, 3]}}, "last": null});
        let resolved = interpolate(&json!({"$ref": "steps.a.items"}), &env);
        assert_eq!(resolved, json!([1, 2, 3]));
    }
}
