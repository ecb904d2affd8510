//! `taskboard member` commands.

use crate::cli::MemberCommand;
use crate::switcher::ContextSwitcher;

/// Execute a `member` subcommand.
///
/// # Errors
///
/// Returns an error string for a blank name, an unknown member id, or a
/// storage failure.
pub fn run(switcher: &mut ContextSwitcher<'_>, action: &MemberCommand) -> Result<(), String> {
    match action {
        MemberCommand::Add { name, routines } => {
            let member = switcher.add_member(name, routines).map_err(|e| e.to_string())?;
            println!("Added {} ({}) with {} task(s)", member.name, member.id, member.tasks.len());
        }
        MemberCommand::Edit { id, name, routines } => {
            let member = switcher.edit_member(id, name, routines).map_err(|e| e.to_string())?;
            println!("Updated {} ({})", member.name, member.id);
        }
        MemberCommand::Rm { id } => {
            if switcher.delete_member(id).map_err(|e| e.to_string())? {
                println!("Deleted member {id}");
            } else {
                println!("No member with id {id}; nothing deleted.");
            }
        }
        MemberCommand::List => list(switcher)?,
        MemberCommand::Use { id } => {
            switcher.switch_to(id).map_err(|e| e.to_string())?;
            if let Some(theme) = switcher.applied_theme() {
                println!("Now viewing {id} (theme {} -> {})", theme.start, theme.end);
            }
        }
        MemberCommand::Default => {
            switcher.switch_to_default().map_err(|e| e.to_string())?;
            println!("Now viewing the default list");
        }
    }
    Ok(())
}

fn list(switcher: &ContextSwitcher<'_>) -> Result<(), String> {
    let roster = switcher.members().map_err(|e| e.to_string())?;
    if roster.members.is_empty() {
        println!("No members yet. Add one with `taskboard member add <NAME>`.");
        return Ok(());
    }
    let active = switcher.active().member_id();
    let id_width = roster.members.iter().map(|m| m.id.len()).max().unwrap_or(2).max(2);
    let name_width = roster.members.iter().map(|m| m.name.chars().count()).max().unwrap_or(4).max(4);
    println!("  {:<id_width$}  {:<name_width$}  TASKS  ROUTINES", "ID", "NAME");
    for member in &roster.members {
        let marker = if active == Some(member.id.as_str()) { '*' } else { ' ' };
        println!(
            "{marker} {:<id_width$}  {:<name_width$}  {:<5}  {}",
            member.id,
            member.name,
            member.tasks.len(),
            member.routines.join(", ")
        );
    }
    Ok(())
}
