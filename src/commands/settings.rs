//! `taskboard settings` command.

use crate::cli::SettingsCommand;
use crate::context::ServiceContext;
use crate::model::SettingKey;
use crate::storage::StorageGateway;

/// Execute the `settings` command: show every flag, or set/toggle one.
///
/// # Errors
///
/// Returns an error string if the settings record cannot be read or written.
pub fn run(ctx: &ServiceContext, action: Option<&SettingsCommand>) -> Result<(), String> {
    let gateway = StorageGateway::new(ctx);
    let mut settings = gateway.load_settings().map_err(|e| e.to_string())?;
    match action {
        None => {
            for key in SettingKey::ALL {
                println!("{key:<16} {}", if settings.get(key) { "on" } else { "off" });
            }
            return Ok(());
        }
        Some(SettingsCommand::Set { key, value }) => settings.set(*key, *value),
        Some(SettingsCommand::Toggle { key }) => {
            settings.toggle(*key);
        }
    }
    gateway.save_settings(&settings).map_err(|e| e.to_string())?;
    println!("Settings saved.");
    Ok(())
}
