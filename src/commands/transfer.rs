//! `taskboard export` and `taskboard import` commands.

use std::path::{Path, PathBuf};

use super::context_label;
use crate::config::BoardConfig;
use crate::context::ServiceContext;
use crate::switcher::ContextSwitcher;
use crate::transfer::{export_file_name, export_json, parse_import};

/// Execute the `export` command.
///
/// Writes to `output`, to stdout for `-`, or to `tasks-<date>.json` in the
/// working directory.
///
/// # Errors
///
/// Returns an error string if the list cannot be loaded or the file written.
pub fn export(
    ctx: &ServiceContext,
    switcher: &ContextSwitcher<'_>,
    config: &BoardConfig,
    output: Option<&Path>,
) -> Result<(), String> {
    let store = switcher.task_store_with(config.stale_after).map_err(|e| e.to_string())?;
    let json = export_json(store.tasks()).map_err(|e| e.to_string())?;

    if output == Some(Path::new("-")) {
        println!("{json}");
        return Ok(());
    }
    let path = output.map_or_else(
        || PathBuf::from(export_file_name(ctx.clock.now().date_naive())),
        Path::to_path_buf,
    );
    std::fs::write(&path, format!("{json}\n"))
        .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
    println!("Exported {} task(s) to {}", store.tasks().len(), path.display());
    Ok(())
}

/// Execute the `import` command.
///
/// # Errors
///
/// Returns an error string without `--yes`, if the file cannot be read, if
/// it is not a JSON array of task objects (the list is left untouched), or
/// if the write fails.
pub fn import(switcher: &ContextSwitcher<'_>, config: &BoardConfig, path: &Path, yes: bool) -> Result<(), String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let tasks = parse_import(&text).map_err(|e| e.to_string())?;
    if !yes {
        return Err(format!(
            "Importing {} task(s) replaces every task in the {}; rerun with --yes.",
            tasks.len(),
            context_label(switcher)
        ));
    }
    let mut store = switcher.task_store_with(config.stale_after).map_err(|e| e.to_string())?;
    let count = tasks.len();
    let healed = store.replace_all(tasks).map_err(|e| e.to_string())?;
    println!("Imported {count} task(s).");
    if !healed.is_empty() {
        println!("Repaired timers on {} task(s).", healed.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::ManualClock;
    use crate::model::NewTask;
    use crate::storage::StorageGateway;

    fn ctx() -> ServiceContext {
        ServiceContext::in_memory(ManualClock::new("2024-04-01T10:00:00Z".parse().unwrap()))
    }

    #[test]
    fn export_then_import_elsewhere() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("out.json");
        let config = BoardConfig::default();

        let source = ctx();
        let switcher = ContextSwitcher::open(&source, None).unwrap();
        switcher.task_store().unwrap().create(NewTask::titled("carry me")).unwrap();
        export(&source, &switcher, &config, Some(&file)).unwrap();

        let target = ctx();
        let switcher = ContextSwitcher::open(&target, None).unwrap();
        import(&switcher, &config, &file, true).unwrap();
        let tasks = StorageGateway::new(&target).load_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "carry me");
    }

    #[test]
    fn import_refuses_without_confirmation_or_with_bad_shape() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.json");
        let bad = dir.path().join("bad.json");
        std::fs::write(&good, r#"[{"id":"x","title":"A"}]"#).unwrap();
        std::fs::write(&bad, r#"{"id":"x"}"#).unwrap();

        let ctx = ctx();
        let switcher = ContextSwitcher::open(&ctx, None).unwrap();
        switcher.task_store().unwrap().create(NewTask::titled("keep")).unwrap();

        assert!(import(&switcher, &BoardConfig::default(), &good, false).is_err());
        let err = import(&switcher, &BoardConfig::default(), &bad, true).unwrap_err();
        assert!(err.contains("array"));
        let tasks = StorageGateway::new(&ctx).load_tasks().unwrap();
        assert_eq!(tasks[0].title, "keep");
    }
}
