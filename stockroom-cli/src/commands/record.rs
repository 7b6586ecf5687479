//! `stockroom record add|edit|delete`

use anyhow::{bail, Result};
use clap::{Args, Subcommand};

use stockroom_core::Record;

use super::{non_blank, Inventory};

/// Manage records.
#[derive(Subcommand, Debug)]
pub enum RecordCommand {
    /// Add a record to a group.
    Add(AddArgs),

    /// Change a record's fields or move it to another group.
    Edit(EditArgs),

    /// Delete a record.
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Owning group: id or unique name.
    pub group: String,

    pub name: String,

    #[arg(long, short = 'q')]
    pub quantity: u32,

    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Show what would be committed without writing anything.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Record id.
    pub id: i64,

    #[arg(long, short = 'q')]
    pub quantity: Option<u32>,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Move the record to this group (id or unique name).
    #[arg(long, short = 'g')]
    pub group: Option<String>,

    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Record id.
    pub id: i64,

    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(cmd: RecordCommand) -> Result<()> {
    match cmd {
        RecordCommand::Add(args) => add(args),
        RecordCommand::Edit(args) => edit(args),
        RecordCommand::Delete(args) => delete(args),
    }
}

fn add(args: AddArgs) -> Result<()> {
    let name = non_blank("record", &args.name)?;
    let mut inventory = Inventory::open()?;
    let group = inventory.group_key(&args.group)?;
    inventory
        .ws
        .add_record(group, Record::new(args.quantity, name, args.description))?;
    inventory.save(args.dry_run)
}

fn edit(args: EditArgs) -> Result<()> {
    if args.quantity.is_none()
        && args.name.is_none()
        && args.description.is_none()
        && args.group.is_none()
    {
        bail!("nothing to change; pass --quantity, --name, --description or --group");
    }
    let name = args
        .name
        .as_deref()
        .map(|n| non_blank("record", n))
        .transpose()?;

    let mut inventory = Inventory::open()?;
    let key = inventory.record_key(args.id)?;
    let target = args
        .group
        .as_deref()
        .map(|g| inventory.group_key(g))
        .transpose()?;

    let record = inventory.ws.record_mut(key)?;
    if let Some(quantity) = args.quantity {
        record.set_quantity(quantity);
    }
    if let Some(name) = name {
        record.set_name(name);
    }
    if let Some(description) = args.description {
        record.set_description(description);
    }
    if let Some(target) = target {
        inventory.ws.move_record(key, target)?;
    }
    inventory.save(args.dry_run)
}

fn delete(args: DeleteArgs) -> Result<()> {
    let mut inventory = Inventory::open()?;
    let key = inventory.record_key(args.id)?;
    inventory.ws.delete_record(key)?;
    inventory.save(args.dry_run)
}
