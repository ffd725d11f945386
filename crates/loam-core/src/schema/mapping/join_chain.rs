use crate::{Error, Result};

/// An ordered description of the tables/keys to traverse from a feature's
/// own table to where a property's value actually lives.
///
/// One step reaches a related property table; two steps traverse a classic
/// many-to-many join table. Longer chains are not supported and fail at
/// schema-build time.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinChain {
    steps: Vec<JoinStep>,

    /// Column of the final table that holds an engine-generated synthetic
    /// key, when the generator policy says the join table owns its key.
    pub generated_key: Option<String>,
}

/// One join hop: `JOIN table ON table.target_column = prev.source_column`.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinStep {
    pub table: String,

    /// Column on the previous table in the chain.
    pub source_column: String,

    /// Column on this step's table.
    pub target_column: String,
}

impl JoinChain {
    pub fn new(steps: Vec<JoinStep>, generated_key: Option<String>) -> Result<JoinChain> {
        if steps.is_empty() {
            return Err(Error::invalid_schema("empty join chain"));
        }
        if steps.len() > 2 {
            return Err(Error::invalid_schema(format!(
                "join chains with more than 2 steps are not supported (got {})",
                steps.len()
            )));
        }

        Ok(JoinChain {
            steps,
            generated_key,
        })
    }

    pub fn steps(&self) -> &[JoinStep] {
        &self.steps
    }

    /// The table the property's value is stored in.
    pub fn target_table(&self) -> &str {
        &self.steps.last().unwrap().table
    }

    /// True when the chain traverses a many-to-many join table.
    pub fn is_join_table(&self) -> bool {
        self.steps.len() == 2
    }
}
