//! MCP Tool Definitions
//!
//! Defines the tools exposed to the agent: `ask`, `notify` and `tweak`.

use super::protocol::Tool;
use crate::dialog::MAX_CHOICES;
use serde_json::json;

pub const ASK: &str = "ask";
pub const NOTIFY: &str = "notify";
pub const TWEAK: &str = "tweak";

/// Get all available MCP tools
pub fn get_tools() -> Vec<Tool> {
    vec![
        Tool {
            name: ASK.into(),
            description: "Ask the user a question in a native dialog and wait for the answer. \
                Use type 'confirm' for yes/no, 'pick' for a list of choices, 'text' for free \
                text, 'form' for several questions at once. Never add an 'all of the above' \
                style choice; set multi (or multiSelect) instead."
                .into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "type": {
                        "type": "string",
                        "enum": ["confirm", "pick", "text", "form"],
                        "description": "Dialog type"
                    },
                    "body": {
                        "type": "string",
                        "description": "Question text (required except for form, where it is the title)"
                    },
                    "yes": {
                        "type": "string",
                        "description": "Confirm button label (confirm)"
                    },
                    "no": {
                        "type": "string",
                        "description": "Cancel button label (confirm)"
                    },
                    "choices": {
                        "type": "array",
                        "items": {"type": "string"},
                        "maxItems": MAX_CHOICES,
                        "description": "Choices (pick)"
                    },
                    "multi": {
                        "type": "boolean",
                        "default": false,
                        "description": "Allow selecting several choices (pick)"
                    },
                    "descriptions": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "One description per choice (pick)"
                    },
                    "default": {
                        "type": "string",
                        "description": "Preselected choice (pick) or prefilled value (text)"
                    },
                    "hidden": {
                        "type": "boolean",
                        "default": false,
                        "description": "Mask the input, e.g. for passwords (text)"
                    },
                    "questions": {
                        "type": "array",
                        "description": "Questions (form)",
                        "items": {
                            "type": "object",
                            "properties": {
                                "id": {"type": "string"},
                                "question": {"type": "string"},
                                "options": {
                                    "type": "array",
                                    "items": {
                                        "oneOf": [
                                            {"type": "string"},
                                            {
                                                "type": "object",
                                                "properties": {
                                                    "label": {"type": "string"},
                                                    "description": {"type": "string"}
                                                },
                                                "required": ["label"]
                                            }
                                        ]
                                    }
                                },
                                "multiSelect": {"type": "boolean", "default": false}
                            },
                            "required": ["question", "options"]
                        }
                    },
                    "mode": {
                        "type": "string",
                        "enum": ["wizard", "accordion"],
                        "description": "Form layout: one question per step, or all on one page"
                    },
                    "title": {
                        "type": "string",
                        "description": "Window title"
                    },
                    "position": {
                        "type": "string",
                        "enum": ["left", "center", "right"]
                    },
                    "project_path": {
                        "type": "string",
                        "description": "Absolute path of the current project"
                    }
                },
                "required": ["type"]
            }),
        },
        Tool {
            name: NOTIFY.into(),
            description: "Show a non-blocking notification to the user.".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "body": {
                        "type": "string",
                        "description": "Notification text"
                    },
                    "title": {
                        "type": "string"
                    },
                    "subtitle": {
                        "type": "string"
                    }
                },
                "required": ["body"]
            }),
        },
        Tool {
            name: TWEAK.into(),
            description: "Let the user adjust numeric values in source files with sliders. \
                Locate each value by CSS selector + property, by a search pattern with one {v} \
                placeholder, or by line/column/expectedText."
                .into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "parameters": {
                        "type": "array",
                        "minItems": 1,
                        "items": {
                            "type": "object",
                            "properties": {
                                "label": {"type": "string"},
                                "file": {"type": "string"},
                                "min": {"type": "number"},
                                "max": {"type": "number"},
                                "step": {"type": "number"},
                                "unit": {"type": "string"},
                                "selector": {"type": "string"},
                                "property": {"type": "string"},
                                "index": {"type": "integer", "minimum": 0},
                                "fn": {"type": "string"},
                                "search": {"type": "string"},
                                "line": {"type": "integer", "minimum": 1},
                                "column": {"type": "integer", "minimum": 1},
                                "expectedText": {"type": "string"},
                                "current": {"type": "number"}
                            },
                            "required": ["label", "file", "min", "max"]
                        }
                    },
                    "title": {"type": "string"},
                    "position": {
                        "type": "string",
                        "enum": ["left", "center", "right"]
                    },
                    "project_path": {
                        "type": "string",
                        "description": "Base directory for relative file paths"
                    }
                },
                "required": ["parameters"]
            }),
        },
    ]
}
