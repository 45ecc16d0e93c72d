use std::path::Path;

use repeater_storage::{WorkspaceConfig, WorkspaceLayout, WorkspacePaths};

#[derive(Debug, Clone)]
pub struct WorkspaceContext {
    pub paths: WorkspacePaths,
    pub config: WorkspaceConfig,
}

pub fn open_or_create_workspace(path: impl AsRef<Path>) -> Result<WorkspaceContext, String> {
    let layout = WorkspaceLayout::default();
    let paths = WorkspacePaths::new(path.as_ref(), &layout);
    paths.ensure()?;
    let config = WorkspaceConfig::load_or_create(&paths.config)?;
    Ok(WorkspaceContext { paths, config })
}
