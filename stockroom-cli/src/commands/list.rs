//! `stockroom list` and `stockroom show <record-id>`.

use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use stockroom_core::{Group, Record, RecordId};

use super::Inventory;

/// Arguments for `stockroom list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `stockroom show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Record id.
    pub id: i64,
}

#[derive(Serialize)]
struct GroupJson<'a> {
    id: Option<i64>,
    name: &'a str,
    description: &'a str,
    records: Vec<RecordJson<'a>>,
}

#[derive(Serialize)]
struct RecordJson<'a> {
    id: Option<i64>,
    quantity: u32,
    name: &'a str,
    description: &'a str,
}

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "group")]
    group: String,
    #[tabled(rename = "quantity")]
    quantity: u32,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "description")]
    description: String,
}

impl ListArgs {
    pub fn run(self) -> Result<()> {
        let inventory = Inventory::open()?;
        let groups = inventory.ws.groups();

        if self.json {
            let payload: Vec<GroupJson> = groups.iter().map(group_json).collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize inventory")?
            );
            return Ok(());
        }

        if groups.is_empty() {
            println!("No groups yet.");
            println!("Run: stockroom group add <name>");
            return Ok(());
        }

        for group in groups {
            let id = group.id().map(|id| id.0).unwrap_or_default();
            println!("{}", format!("{id:02} {}", group.name()).bold());
            if !group.description().is_empty() {
                println!("   {}", group.description().bright_black());
            }
            for record in group.records() {
                println!("   {}", record_line(record));
            }
        }
        Ok(())
    }
}

impl ShowArgs {
    pub fn run(self) -> Result<()> {
        let inventory = Inventory::open()?;
        let (group, record) = inventory
            .ws
            .groups()
            .iter()
            .flat_map(|g| g.records().iter().map(move |r| (g, r)))
            .find(|(_, r)| r.id() == Some(RecordId(self.id)))
            .ok_or_else(|| anyhow!("no record with id {}", self.id))?;

        let row = RecordRow {
            id: self.id.to_string(),
            group: group.name().to_string(),
            quantity: record.quantity(),
            name: record.name().to_string(),
            description: record.description().to_string(),
        };
        let mut table = Table::new([row]);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}

/// Zero-padded quantity followed by the name.
fn record_line(record: &Record) -> String {
    format!("{:06}   {}", record.quantity(), record.name())
}

fn group_json(group: &Group) -> GroupJson<'_> {
    GroupJson {
        id: group.id().map(|id| id.0),
        name: group.name(),
        description: group.description(),
        records: group
            .records()
            .iter()
            .map(|r| RecordJson {
                id: r.id().map(|id| id.0),
                quantity: r.quantity(),
                name: r.name(),
                description: r.description(),
            })
            .collect(),
    }
}
