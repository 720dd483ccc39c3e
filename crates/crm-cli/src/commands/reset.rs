use anyhow::Result;

use crm_infrastructure::CrmPaths;

use super::{Workspace, confirm, persist};

pub async fn run(paths: &CrmPaths, yes: bool) -> Result<()> {
    let workspace = Workspace::open(paths)?;
    let mut store = workspace.load_store().await?;

    let prompt = format!(
        "Delete all {} categories from {}?",
        store.categories().len(),
        workspace.storage_file.display()
    );
    if !confirm(&prompt, yes)?.is_confirmed() {
        println!("Cancelled");
        return Ok(());
    }

    store.reset();
    persist(&store).await?;
    println!("All categories deleted");
    Ok(())
}
