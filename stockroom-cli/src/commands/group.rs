//! `stockroom group add|rename|describe|delete`

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use super::{non_blank, Inventory};

/// Manage groups.
#[derive(Subcommand, Debug)]
pub enum GroupCommand {
    /// Create a new group.
    Add(AddArgs),

    /// Give a group a new name.
    Rename(RenameArgs),

    /// Replace a group's description.
    Describe(DescribeArgs),

    /// Delete a group together with all of its records.
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Group name (e.g. "Tools").
    pub name: String,

    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Show what would be committed without writing anything.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct RenameArgs {
    /// Group id or unique name.
    pub group: String,

    pub name: String,

    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Group id or unique name.
    pub group: String,

    pub description: String,

    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Group id or unique name.
    pub group: String,

    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(cmd: GroupCommand) -> Result<()> {
    match cmd {
        GroupCommand::Add(args) => add(args),
        GroupCommand::Rename(args) => rename(args),
        GroupCommand::Describe(args) => describe(args),
        GroupCommand::Delete(args) => delete(args),
    }
}

fn add(args: AddArgs) -> Result<()> {
    let name = non_blank("group", &args.name)?;
    let mut inventory = Inventory::open()?;
    inventory.ws.add_group(name, args.description);
    inventory.save(args.dry_run)
}

fn rename(args: RenameArgs) -> Result<()> {
    let name = non_blank("group", &args.name)?;
    let mut inventory = Inventory::open()?;
    let key = inventory.group_key(&args.group)?;
    inventory.ws.group_mut(key)?.set_name(name);
    inventory.save(args.dry_run)
}

fn describe(args: DescribeArgs) -> Result<()> {
    let mut inventory = Inventory::open()?;
    let key = inventory.group_key(&args.group)?;
    inventory.ws.group_mut(key)?.set_description(args.description);
    inventory.save(args.dry_run)
}

fn delete(args: DeleteArgs) -> Result<()> {
    let mut inventory = Inventory::open()?;
    let key = inventory.group_key(&args.group)?;
    inventory
        .ws
        .delete_group(key)
        .with_context(|| format!("failed to delete group '{}'", args.group))?;
    inventory.save(args.dry_run)
}
