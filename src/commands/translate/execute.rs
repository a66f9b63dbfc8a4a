use std::error::Error;

use super::TranslateCmd;
use crate::commands::{read_json, read_params, Execute};
use crate::config::ConfigFile;
use crate::query::{QueryDescriptor, Translated};

impl Execute for TranslateCmd {
    type Output = Translated;

    fn execute(self, config: &ConfigFile) -> Result<Self::Output, Box<dyn Error>> {
        let descriptor: QueryDescriptor = read_json(&self.descriptor)?;
        let params = read_params(self.params.as_deref())?;
        log::info!("translating {}", self.descriptor.display());
        Ok(config.query_builder().translate(&descriptor, params)?)
    }
}
