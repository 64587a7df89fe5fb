//! List stored memories.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use crate::cli::ListArgs;
use crate::error::Result;
use crate::model::Record;
use crate::sync::Filter;

use super::{format_bytes, format_timestamp, open_coordinator};

/// Row emitted in `--json` mode. The payload itself is omitted; it can be
/// megabytes of base64 and `mk export` exists for full dumps.
#[derive(Serialize)]
struct ListRow<'a> {
    id: i64,
    #[serde(rename = "type")]
    kind: String,
    category: &'a str,
    caption: &'a str,
    timestamp: i64,
    size: i64,
}

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if the store cannot be opened.
pub fn execute(args: &ListArgs, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let coordinator = open_coordinator(db_path)?;

    let filter = if args.videos {
        Filter::Videos
    } else if let Some(category) = &args.category {
        Filter::Category(category.clone())
    } else {
        Filter::All
    };

    let mut records = coordinator.list_filtered(&filter);
    if let Some(limit) = args.limit {
        records.truncate(limit);
    }

    if json {
        let rows: Vec<ListRow<'_>> = records.iter().map(to_row).collect();
        println!("{}", serde_json::to_string(&rows)?);
        return Ok(());
    }

    if records.is_empty() {
        match &filter {
            Filter::All => println!("No memories yet. Add one with `mk add`."),
            Filter::Videos => println!("No videos found."),
            Filter::Category(c) => println!("No memories in category '{c}'."),
        }
        return Ok(());
    }

    println!(
        "{:<15} {:<6} {:<14} {:>10}  {:<16} CAPTION",
        "ID".bold(),
        "TYPE".bold(),
        "CATEGORY".bold(),
        "SIZE".bold(),
        "DATE".bold()
    );
    for record in &records {
        println!(
            "{:<15} {:<6} {:<14} {:>10}  {:<16} {}",
            record.id,
            record.kind.to_string(),
            record.category,
            format_bytes(record.size),
            format_timestamp(record.timestamp),
            record.caption
        );
    }
    println!();
    println!("{} record(s)", records.len());

    Ok(())
}

fn to_row(record: &Record) -> ListRow<'_> {
    ListRow {
        id: record.id,
        kind: record.kind.to_string(),
        category: &record.category,
        caption: &record.caption,
        timestamp: record.timestamp,
        size: record.size,
    }
}
