use serde_json::Value;

use crate::errors::FieldlightResult;
use crate::executor::command::{ToolAction, ToolCommand, ToolParams};
use crate::llm::session::ModelSession;

/// What the planner's raw output amounts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanOutcome {
    Command(ToolCommand),
    /// The model said no tool applies (`"action": "none"`, or no action at all).
    NoAction,
    /// A well-formed command naming an action outside the catalog.
    UnknownAction(String),
    /// Nothing parseable between the first `{` and the last `}`.
    Unparsed,
}

/// Formats the planning prompt and runs it through the model, single-shot.
pub struct IntentPlanner {
    session: ModelSession,
    app_name: String,
}

impl IntentPlanner {
    pub fn new(session: ModelSession, app_name: impl Into<String>) -> Self {
        Self {
            session,
            app_name: app_name.into(),
        }
    }

    pub async fn plan(&self, user_text: &str, context: &str, tool_names: &[&str]) -> FieldlightResult<String> {
        let prompt = build_plan_prompt(&self.app_name, user_text, context, tool_names);
        tracing::debug!(prompt_len = prompt.len(), "planning");
        let out = self.session.prompt(&prompt).await?;
        let out = out.trim().to_string();
        tracing::info!(raw = %out, "planner responded");
        Ok(out)
    }
}

pub fn build_plan_prompt(app_name: &str, user_text: &str, context: &str, tool_names: &[&str]) -> String {
    let tool_list = tool_names.join(", ");
    format!(
        r#"You are a local page agent for {app_name}. You can call tools by returning ONLY JSON.
Tools you can use: {tool_list}

Context about the current record (read-only):
{context}

Rules:
- If the user asks to highlight/unhighlight/flash/start flashing/stop flashing a field label, plan the appropriate tool call.
- "target" may be a field label or a field name; use the string that best matches the user's intent.
- If no tool is needed, return {{"action":"none","params":{{}}}} only.

Examples:
User: "highlight account_type yellow"
Return: {{"action":"highlightField","params":{{"target":"account_type","color":"yellow"}}}}

User: "make the Billing Address label stand out"
Return: {{"action":"highlightField","params":{{"target":"Billing Address","strong":true}}}}

User: "clear the highlight on Industry"
Return: {{"action":"unhighlightField","params":{{"target":"Industry"}}}}

User: "flash the Status label"
Return: {{"action":"flashField","params":{{"target":"Status","ms":2000}}}}

User: "start flashing Description"
Return: {{"action":"startFlashField","params":{{"target":"Description"}}}}

User: "stop flashing description"
Return: {{"action":"stopFlashField","params":{{"target":"description"}}}}

Now respond for the user query, ONLY JSON, no extra text:
Question: {user_text}"#
    )
}

/// Cuts the span from the first `{` to the last `}`, inclusive.
///
/// Not nesting-aware: two objects in one reply, or a stray brace inside a
/// string, select the wrong span and the parse then fails.
pub fn extract_json_span(raw: &str) -> Option<&str> {
    let first = raw.find('{')?;
    let last = raw.rfind('}')?;
    if last < first {
        return None;
    }
    Some(&raw[first..=last])
}

pub fn recover_command(raw: &str) -> PlanOutcome {
    let Some(span) = extract_json_span(raw) else {
        return PlanOutcome::Unparsed;
    };
    let Ok(json) = serde_json::from_str::<Value>(span) else {
        tracing::debug!(candidate = %span, "planner output is not JSON");
        return PlanOutcome::Unparsed;
    };

    let action = match json.get("action") {
        Some(Value::String(a)) if a == "none" => return PlanOutcome::NoAction,
        Some(Value::String(a)) if !a.is_empty() => a.as_str(),
        // A truthy non-string action is still an attempted tool call.
        Some(other) if truthy(other) => return PlanOutcome::UnknownAction(other.to_string()),
        _ => return PlanOutcome::NoAction,
    };
    let Some(action_kind) = ToolAction::from_name(action) else {
        return PlanOutcome::UnknownAction(action.to_string());
    };

    let params = json.get("params").unwrap_or(&Value::Null);
    PlanOutcome::Command(ToolCommand::new(action_kind, params_from_json(params)))
}

fn params_from_json(params: &Value) -> ToolParams {
    let target = match params.get("target") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    let color = params
        .get("color")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);
    ToolParams {
        target,
        color,
        strong: params.get("strong").is_some_and(truthy),
        ms: params.get("ms").and_then(positive_ms),
    }
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
        Value::Null => false,
    }
}

/// A usable duration: a positive number or numeric string. Anything else means "default".
fn positive_ms(v: &Value) -> Option<u64> {
    let f = match v {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (f.is_finite() && f >= 1.0).then(|| f as u64)
}
