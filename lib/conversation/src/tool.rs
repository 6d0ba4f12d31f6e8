//! Local tools the assistant can call mid-run.
//!
//! The set of tools is closed: a run can only ask for something in
//! [`ToolKind`]. Anything else comes back as [`ToolOutcome::UnknownTool`].
//! The lead and schedule tools are simulated; they synthesize their records
//! instead of talking to a real backend.

use crate::error::ToolError;
use concierge_assistant::{FunctionTool, ToolCall, ToolOutput};
use concierge_core::{Result, ToolCallId};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{info, warn};

/// Identifier returned for every simulated lead.
pub const SIMULATED_LEAD_ID: &str = "12345";

/// The tools the assistant is configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    CreateLead,
    TimeSchedule,
}

impl ToolKind {
    /// Every supported tool.
    pub const ALL: [ToolKind; 2] = [ToolKind::CreateLead, ToolKind::TimeSchedule];

    /// Returns the function name the provider uses.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateLead => "create_lead",
            Self::TimeSchedule => "time_schedule",
        }
    }

    /// Looks a tool up by function name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Returns the function definition registered with the assistant.
    #[must_use]
    pub fn definition(&self) -> FunctionTool {
        match self {
            Self::CreateLead => FunctionTool::new(
                self.name(),
                "Capture lead details and save them to the CRM.",
            )
            .with_parameters(serde_json::json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": "Full name of the lead." },
                    "email": { "type": "string", "description": "Email address of the lead." },
                    "company": { "type": "string", "description": "Company the lead works for." }
                },
                "required": ["name", "email", "company"]
            })),
            Self::TimeSchedule => FunctionTool::new(
                self.name(),
                "Retrieve the upcoming schedule for a user.",
            )
            .with_parameters(serde_json::json!({
                "type": "object",
                "properties": {
                    "user_id": { "type": "string", "description": "The user to look up." }
                },
                "required": ["user_id"]
            })),
        }
    }

    /// Returns the definitions of every supported tool.
    #[must_use]
    pub fn definitions() -> Vec<FunctionTool> {
        Self::ALL.iter().map(ToolKind::definition).collect()
    }
}

/// Arguments of `create_lead`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateLeadArgs {
    pub name: String,
    pub email: String,
    pub company: String,
}

/// Arguments of `time_schedule`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimeScheduleArgs {
    /// Echoed back verbatim, whatever JSON type the model chose.
    pub user_id: JsonValue,
}

/// A decoded tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInvocation {
    CreateLead(CreateLeadArgs),
    TimeSchedule(TimeScheduleArgs),
}

impl ToolInvocation {
    /// Decodes the arguments of a known tool.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments are not valid JSON for the tool.
    pub fn decode(kind: ToolKind, arguments: &str) -> Result<Self, ToolError> {
        let invalid = |e: serde_json::Error| ToolError::InvalidArguments {
            name: kind.name().to_string(),
            reason: e.to_string(),
        };
        let invocation = match kind {
            ToolKind::CreateLead => {
                Self::CreateLead(serde_json::from_str(arguments).map_err(invalid)?)
            }
            ToolKind::TimeSchedule => {
                Self::TimeSchedule(serde_json::from_str(arguments).map_err(invalid)?)
            }
        };
        Ok(invocation)
    }

    /// Returns which tool this invocation targets.
    #[must_use]
    pub fn kind(&self) -> ToolKind {
        match self {
            Self::CreateLead(_) => ToolKind::CreateLead,
            Self::TimeSchedule(_) => ToolKind::TimeSchedule,
        }
    }
}

/// A simulated CRM lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub status: String,
    pub lead_id: String,
    pub name: String,
    pub email: String,
    pub company: String,
}

/// A user's upcoming schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub user_id: JsonValue,
    pub schedule: Vec<ScheduleEntry>,
}

/// One scheduled event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub date: String,
    pub time: String,
    pub event: String,
}

impl ScheduleEntry {
    fn new(date: &str, time: &str, event: &str) -> Self {
        Self {
            date: date.to_string(),
            time: time.to_string(),
            event: event.to_string(),
        }
    }
}

/// Simulates creating a lead.
#[must_use]
pub fn create_lead(args: CreateLeadArgs) -> Lead {
    info!(name = %args.name, email = %args.email, company = %args.company, "Creating lead");
    Lead {
        status: "success".to_string(),
        lead_id: SIMULATED_LEAD_ID.to_string(),
        name: args.name,
        email: args.email,
        company: args.company,
    }
}

/// Simulates looking up a user's schedule.
#[must_use]
pub fn time_schedule(args: TimeScheduleArgs) -> Schedule {
    info!(user_id = %args.user_id, "Retrieving time schedule");
    Schedule {
        user_id: args.user_id,
        schedule: vec![
            ScheduleEntry::new("2024-10-18", "10:00 AM", "Meeting with HR"),
            ScheduleEntry::new("2024-10-19", "02:00 PM", "Client Call"),
        ],
    }
}

/// Result of dispatching one tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// The tool ran; the output is ready for submission.
    Output { kind: ToolKind, output: ToolOutput },
    /// The run asked for a tool we do not have.
    UnknownTool { call_id: ToolCallId, name: String },
}

impl ToolOutcome {
    /// Converts the outcome into the output submitted to the provider.
    ///
    /// Unknown tools are answered with an error object so the run is not
    /// left waiting on a call id that never gets an output.
    #[must_use]
    pub fn into_output(self) -> ToolOutput {
        match self {
            Self::Output { output, .. } => output,
            Self::UnknownTool { call_id, name } => ToolOutput {
                tool_call_id: call_id,
                output: serde_json::json!({ "error": format!("unknown tool: {name}") })
                    .to_string(),
            },
        }
    }
}

/// Executes tool calls requested by a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolDispatcher;

impl ToolDispatcher {
    /// Creates a dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Runs the tool named by `call` and encodes its result.
    ///
    /// # Errors
    ///
    /// Returns an error if the call's arguments cannot be decoded.
    pub fn dispatch(&self, call: &ToolCall) -> Result<ToolOutcome, ToolError> {
        let Some(kind) = ToolKind::from_name(&call.function.name) else {
            warn!(tool = %call.function.name, call_id = %call.id, "Run requested an unknown tool");
            return Ok(ToolOutcome::UnknownTool {
                call_id: call.id.clone(),
                name: call.function.name.clone(),
            });
        };

        let encoded = match ToolInvocation::decode(kind, &call.function.arguments)? {
            ToolInvocation::CreateLead(args) => serde_json::to_string(&create_lead(args)),
            ToolInvocation::TimeSchedule(args) => serde_json::to_string(&time_schedule(args)),
        };
        let output = encoded.map_err(|e| ToolError::ExecutionFailed {
            name: kind.name().to_string(),
            reason: e.to_string(),
        })?;

        Ok(ToolOutcome::Output {
            kind,
            output: ToolOutput {
                tool_call_id: call.id.clone(),
                output,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_output(outcome: ToolOutcome) -> JsonValue {
        let output = outcome.into_output();
        serde_json::from_str(&output.output).expect("output is json")
    }

    #[test]
    fn create_lead_echoes_fields_with_simulated_id() {
        let lead = create_lead(CreateLeadArgs {
            name: "A".to_string(),
            email: "a@x.com".to_string(),
            company: "C".to_string(),
        });

        assert_eq!(lead.status, "success");
        assert_eq!(lead.lead_id, SIMULATED_LEAD_ID);
        assert_eq!(lead.name, "A");
        assert_eq!(lead.email, "a@x.com");
        assert_eq!(lead.company, "C");
    }

    #[test]
    fn dispatch_create_lead() {
        let call = ToolCall::function(
            "call_1",
            "create_lead",
            r#"{"name":"A","email":"a@x.com","company":"C"}"#,
        );

        let outcome = ToolDispatcher::new().dispatch(&call).expect("dispatch");
        assert!(matches!(
            outcome,
            ToolOutcome::Output {
                kind: ToolKind::CreateLead,
                ..
            }
        ));

        let json = decode_output(outcome);
        assert_eq!(
            json,
            serde_json::json!({
                "status": "success",
                "lead_id": "12345",
                "name": "A",
                "email": "a@x.com",
                "company": "C"
            })
        );
    }

    #[test]
    fn dispatch_time_schedule() {
        let call = ToolCall::function("call_2", "time_schedule", r#"{"user_id":"u-7"}"#);

        let json = decode_output(ToolDispatcher::new().dispatch(&call).expect("dispatch"));

        assert_eq!(json["user_id"], "u-7");
        assert_eq!(json["schedule"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["schedule"][0]["event"], "Meeting with HR");
        assert_eq!(json["schedule"][1]["time"], "02:00 PM");
    }

    #[test]
    fn numeric_user_id_is_echoed() {
        let call = ToolCall::function("call_3", "time_schedule", r#"{"user_id":42}"#);
        let json = decode_output(ToolDispatcher::new().dispatch(&call).expect("dispatch"));
        assert_eq!(json["user_id"], 42);
    }

    #[test]
    fn unknown_tool_is_reported_not_skipped() {
        let call = ToolCall::function("call_4", "delete_everything", "{}");

        let outcome = ToolDispatcher::new().dispatch(&call).expect("dispatch");
        assert_eq!(
            outcome,
            ToolOutcome::UnknownTool {
                call_id: ToolCallId::new("call_4"),
                name: "delete_everything".to_string(),
            }
        );

        let output = outcome.into_output();
        assert_eq!(output.tool_call_id.as_str(), "call_4");
        let json: JsonValue = serde_json::from_str(&output.output).expect("json");
        assert_eq!(json["error"], "unknown tool: delete_everything");
    }

    #[test]
    fn malformed_arguments_are_an_error() {
        let call = ToolCall::function("call_5", "create_lead", r#"{"name":"A"}"#);

        let err = ToolDispatcher::new().dispatch(&call).expect_err("should fail");
        assert!(matches!(
            err.current_context(),
            ToolError::InvalidArguments { name, .. } if name == "create_lead"
        ));
    }

    #[test]
    fn definitions_cover_every_tool() {
        let definitions = ToolKind::definitions();
        let names: Vec<_> = definitions.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["create_lead", "time_schedule"]);
        assert_eq!(
            definitions[0].parameters["required"],
            serde_json::json!(["name", "email", "company"])
        );
    }

    #[test]
    fn kind_lookup_round_trips_names() {
        for kind in ToolKind::ALL {
            assert_eq!(ToolKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ToolKind::from_name("unknown"), None);
    }
}
