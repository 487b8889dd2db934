use std::path::Path;
use std::sync::mpsc::channel;

use anyhow::{anyhow, Result};
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, error, info, warn};

use crate::catalog::Catalog;
use crate::common;
use crate::icons::{IconResolver, IconTemplate};
use crate::plan::{ExportFileType, ExportProfileItem, Plan};

fn load_catalog_fragment(file_path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(file_path)?;
    let catalog: Catalog = serde_yaml::from_str(&content)?;
    Ok(catalog)
}

/// Merges every import profile into one catalog snapshot, in profile
/// order so theme listing order follows the plan.
fn load_catalog(plan: &Plan, plan_file_path: &Path) -> Result<Catalog> {
    let parent_dir = plan_file_path
        .parent()
        .ok_or_else(|| anyhow!("Plan file has no parent directory"))?;

    let mut catalog = Catalog::default();
    for profile in &plan.import.profiles {
        let import_file_path = parent_dir.join(&profile.filename);
        info!("Importing catalog fragment: {}", import_file_path.display());
        let fragment = load_catalog_fragment(&import_file_path)?;
        debug!("Fragment loaded. {}", fragment.stats());
        catalog.merge(fragment);
    }

    info!("Catalog loaded. {}", catalog.stats());
    Ok(catalog)
}

/// Renders one export profile and writes it to disk
fn export_catalog(
    catalog: &Catalog,
    plan: &Plan,
    profile: &ExportProfileItem,
    icons: &dyn IconResolver,
) -> Result<()> {
    info!(
        "Starting export to file: {} using exporter {:?}",
        profile.filename, profile.exporter
    );

    let result = match &profile.exporter {
        ExportFileType::MobileConfig => crate::export::to_mobile_config::render(
            catalog,
            &profile.get_mobile_config(&plan.functionalities),
            icons,
        ),
        ExportFileType::Viewer => {
            crate::export::to_viewer::render(catalog, &profile.get_viewer_config(), icons)
        }
        ExportFileType::CatalogJSON => crate::export::to_catalog_json::render(catalog),
    };

    match result {
        Ok(output) => {
            if let Err(e) = common::write_string_to_file(&profile.filename, &output) {
                error!("Failed to write to file {}: {}", profile.filename, e);
            }
        }
        Err(e) => {
            error!("Failed to export file {}: {}", profile.filename, e);
        }
    }

    Ok(())
}

/// Executes a single resolve plan
fn run_plan(plan: Plan, plan_file_path: &Path) -> Result<()> {
    let catalog = load_catalog(&plan, plan_file_path)?;

    let icons = IconTemplate::new(&plan.functionalities.get_icon_template())
        .map_err(|e| anyhow!("Invalid icon template: {}", e))?;

    match catalog.verify_catalog_integrity() {
        Ok(_) => {
            info!("Catalog integrity verified : ok - rendering exports");
            for profile in &plan.export.profiles {
                if let Err(e) = export_catalog(&catalog, &plan, profile, &icons) {
                    error!("Failed to export catalog: {}", e);
                }
            }
        }
        Err(errors) => {
            warn!("Identified {} catalog integrity error(s)", errors.len());
            errors.iter().for_each(|e| warn!("{}", e));
            warn!("Not rendering exports");
        }
    }

    Ok(())
}

/// Main function to execute a plan, with optional file watching
pub fn execute_plan(plan: String, watch: bool) -> Result<()> {
    info!("Executing plan {}", plan);

    let plan_file_path = std::path::Path::new(&plan);
    let path_content = std::fs::read_to_string(plan_file_path)?;
    let plan: Plan = serde_yaml::from_str(&path_content)?;

    debug!("Executing plan: {:?}", plan);
    run_plan(plan.clone(), plan_file_path)?;

    if watch {
        watch_for_changes(plan, plan_file_path)?;
    }

    Ok(())
}

/// Loads the catalog named by a plan file and reports integrity
/// findings, for the `verify` subcommand.
pub fn verify_plan(plan: String) -> Result<()> {
    let plan_file_path = std::path::Path::new(&plan);
    let path_content = std::fs::read_to_string(plan_file_path)?;
    let plan: Plan = serde_yaml::from_str(&path_content)?;

    let catalog = load_catalog(&plan, plan_file_path)?;
    match catalog.verify_catalog_integrity() {
        Ok(_) => {
            info!("Catalog integrity verified : ok");
            Ok(())
        }
        Err(errors) => {
            errors.iter().for_each(|e| warn!("{}", e));
            Err(anyhow!(
                "Identified {} catalog integrity error(s)",
                errors.len()
            ))
        }
    }
}

/// Sets up file watching for imported catalog fragments to re-run the
/// plan on changes
fn watch_for_changes(plan: Plan, plan_file_path: &Path) -> Result<()> {
    info!("Watching for changes");
    let files: Vec<String> = plan
        .import
        .profiles
        .iter()
        .map(|profile| profile.filename.clone())
        .collect();

    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(tx, Config::default())?;
    for file in &files {
        let parent_dir = plan_file_path
            .parent()
            .ok_or_else(|| anyhow!("Plan file has no parent directory"))?;
        let path = parent_dir.join(file);
        watcher.watch(&path, RecursiveMode::NonRecursive)?;
    }

    loop {
        match rx.recv() {
            Ok(event) => {
                if let Ok(event) = event {
                    if let EventKind::Modify(_) = event.kind {
                        debug!("File modified {:?}", event.paths);
                        info!("Change detected, re-executing plan");
                        run_plan(plan.clone(), plan_file_path)?;
                    }
                }
            }
            Err(e) => error!("Watch error: {:?}", e),
        }
    }
}
