use std::path::Path;

use crate::{
    infra::{
        self, config::FileConfigAdapter, contracts::ConfigAdapter, error::AppError,
        storage_layout::StorageLayout,
    },
    usecases::context::AppContext,
};

pub fn bootstrap(config_path: Option<&Path>) -> Result<AppContext, AppError> {
    let context = build_context(&FileConfigAdapter::new(config_path))?;
    let guard = infra::logging::init(&context.config.logging)?;

    Ok(context.with_log_guard(guard))
}

fn build_context(config_adapter: &dyn ConfigAdapter) -> Result<AppContext, AppError> {
    let config = config_adapter.load()?;
    let layout = StorageLayout::resolve()?;

    Ok(AppContext::new(config, layout))
}
