use anyhow::Result;

use crm_application::load_statistics;
use crm_infrastructure::CrmPaths;

use super::Workspace;

pub async fn run(paths: &CrmPaths, json: bool) -> Result<()> {
    let workspace = Workspace::open(paths)?;
    let stats = load_statistics(workspace.repository.as_ref()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("Categories:                {}", stats.categories);
        println!("Categorized conversations: {}", stats.categorized);
    }
    Ok(())
}
