use std::error::Error;

use super::DeleteCmd;
use crate::commands::{read_json, read_params, Execute};
use crate::config::ConfigFile;
use crate::query::{Condition, Translated};

impl Execute for DeleteCmd {
    type Output = Translated;

    fn execute(self, config: &ConfigFile) -> Result<Self::Output, Box<dyn Error>> {
        let condition: Option<Condition> = match &self.condition {
            Some(path) => Some(read_json(path)?),
            None => None,
        };
        let params = read_params(self.params.as_deref())?;
        Ok(config
            .query_builder()
            .delete(self.labels, condition.as_ref(), params)?)
    }
}
