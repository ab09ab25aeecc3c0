use portkit::infrastructure::{bootstrap, Collaborators};
use portkit::AppConfig;

use super::HandlerResult;

/// 输出默认组合中所有契约的描述
pub fn handle_describe(config: &AppConfig) -> HandlerResult<()> {
    let container = bootstrap(config, &Collaborators::in_memory())?;
    let descriptors = container.descriptors();
    println!("{}", serde_json::to_string_pretty(&descriptors)?);
    Ok(())
}
