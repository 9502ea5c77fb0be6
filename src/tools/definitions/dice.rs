//! Dice rolling tool.

use std::sync::Arc;

use rand::Rng;
use serde_json::{Value, json};

use crate::tools::error::ToolError;
use crate::tools::handler::{Arguments, ToolDescriptor, ToolHandler};
use crate::tools::schema::{InputSchema, ParamType};

/// Rolls one or more dice with a configurable number of faces.
#[derive(Debug, Clone, Default)]
pub struct DiceRollTool;

impl DiceRollTool {
    /// Tool name as advertised to clients.
    pub const NAME: &'static str = "roll_dice";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Roll one or more dice and return each die's result. 'sides' selects the \
         number of faces per die; 'n_dice' selects how many dice to roll (default 1).";

    pub fn new() -> Self {
        Self
    }

    /// Build the registration descriptor for this tool.
    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new(
            Self::NAME,
            Self::DESCRIPTION,
            Self::schema(),
            Arc::new(Self::new()),
        )
    }

    fn schema() -> InputSchema {
        InputSchema::builder()
            .required("sides", ParamType::Integer, "Number of faces per die")
            .optional("n_dice", ParamType::Integer, "Number of dice to roll (default: 1)")
            .build()
    }
}

#[async_trait::async_trait]
impl ToolHandler for DiceRollTool {
    async fn call(&self, arguments: Arguments) -> Result<Value, ToolError> {
        let sides = arguments
            .get("sides")
            .and_then(Value::as_i64)
            .ok_or_else(|| ToolError::invalid_arguments("missing required parameter 'sides'"))?;
        if sides < 1 {
            return Err(ToolError::invalid_arguments(
                "parameter 'sides': must be at least 1",
            ));
        }

        let n_dice = arguments.get("n_dice").and_then(Value::as_i64).unwrap_or(1);
        if n_dice < 1 {
            return Err(ToolError::invalid_arguments(
                "parameter 'n_dice': must be at least 1",
            ));
        }

        let mut rng = rand::rng();
        let rolls: Vec<i64> = (0..n_dice).map(|_| rng.random_range(1..=sides)).collect();

        Ok(json!({ "rolls": rolls }))
    }
}
