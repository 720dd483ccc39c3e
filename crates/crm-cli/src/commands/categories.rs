use anyhow::{Result, bail};

use crm_core::category::{AssignOutcome, CategoryStore, CategoryTarget, UNCATEGORIZED};
use crm_infrastructure::CrmPaths;

use super::{Workspace, confirm, persist};

pub async fn list(paths: &CrmPaths, json: bool) -> Result<()> {
    let workspace = Workspace::open(paths)?;
    let store = workspace.load_store().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(store.categories())?);
        return Ok(());
    }

    if store.categories().is_empty() {
        println!("No categories in {}", workspace.storage_file.display());
        return Ok(());
    }

    for category in store.categories() {
        println!("{}  {} ({})", category.id, category.name, category.len());
        for conversation in &category.conversation_ids {
            println!("    {}", conversation);
        }
    }
    Ok(())
}

pub async fn create(paths: &CrmPaths, name: &str) -> Result<()> {
    let workspace = Workspace::open(paths)?;
    let mut store = workspace.load_store().await?;

    let Some(category) = store.create(name) else {
        bail!("Category name must not be empty");
    };
    persist(&store).await?;

    println!("Created {} ({})", category.name, category.id);
    Ok(())
}

pub async fn rename(paths: &CrmPaths, id: &str, name: &str) -> Result<()> {
    let workspace = Workspace::open(paths)?;
    let mut store = workspace.load_store().await?;

    if !store.rename(id, name) {
        bail!("No category '{}', or the new name is empty", id);
    }
    persist(&store).await?;

    println!("Renamed {} to {}", id, name.trim());
    Ok(())
}

pub async fn delete(paths: &CrmPaths, id: &str, yes: bool) -> Result<()> {
    let workspace = Workspace::open(paths)?;
    let mut store = workspace.load_store().await?;

    let Some(category) = store.get(id) else {
        bail!("No category '{}'", id);
    };
    let prompt = format!(
        "Delete '{}'? Its {} conversations become uncategorized.",
        category.name,
        category.len()
    );
    if !confirm(&prompt, yes)?.is_confirmed() {
        println!("Cancelled");
        return Ok(());
    }

    if let Some(removed) = store.delete(id) {
        persist(&store).await?;
        println!("Deleted {}", removed.name);
    }
    Ok(())
}

pub async fn assign(paths: &CrmPaths, conversation: &str, target: &str) -> Result<()> {
    let workspace = Workspace::open(paths)?;
    let mut store = workspace.load_store().await?;

    let target = resolve_target(&store, target)?;
    let outcome = store.assign(conversation, &target);
    persist(&store).await?;

    match outcome {
        AssignOutcome::Assigned { category_id } => {
            println!("Moved '{}' to {}", conversation, category_id)
        }
        AssignOutcome::Uncategorized => println!("'{}' is now uncategorized", conversation),
    }
    Ok(())
}

/// Accepts a category id, an exact category name, or the uncategorized
/// sentinel.
fn resolve_target(store: &CategoryStore, target: &str) -> Result<CategoryTarget> {
    if target == UNCATEGORIZED || store.get(target).is_some() {
        return Ok(CategoryTarget::parse(target));
    }

    let mut by_name = store.categories().iter().filter(|c| c.name == target);
    match (by_name.next(), by_name.next()) {
        (Some(category), None) => Ok(CategoryTarget::Category(category.id.clone())),
        (Some(_), Some(_)) => bail!("Several categories are named '{}'; use its id", target),
        (None, _) => bail!("No category '{}'", target),
    }
}
