//! Browse command handler.

use std::path::PathBuf;
use std::str::FromStr;

use color_eyre::Result;
use serde::Serialize;

use crate::context::Context;
use crate::di::FromRef;
use crate::error::AppError;
use crate::models::EntryInfo;
use crate::navigation::{Breadcrumb, Finder, KeyInput};
use crate::schema::{Keyword, SchemaEntry};
use crate::services::FinderService;

use super::App;

/// A `<column>:<row>` selection from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub col: usize,
    pub row: usize,
}

impl FromStr for Selection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::InvalidSelection(s.to_string());
        let (col, row) = s.split_once(':').ok_or_else(invalid)?;
        Ok(Self {
            col: col.trim().parse().map_err(|_| invalid())?,
            row: row.trim().parse().map_err(|_| invalid())?,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Row<'a> {
    key: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    group: Option<Keyword>,
    pointer: String,
    has_children: bool,
    is_required: bool,
    selected: bool,
}

#[derive(Serialize)]
struct BrowseOutput<'a> {
    path: &'a [usize],
    breadcrumbs: Vec<Breadcrumb>,
    columns: Vec<Vec<Row<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    info: Option<EntryInfo>,
}

impl<'a> BrowseOutput<'a> {
    fn new(finder: &'a Finder) -> Self {
        let columns = finder
            .columns()
            .iter()
            .enumerate()
            .map(|(col, entries)| {
                let selected = finder.path().get(col).copied();
                entries.iter().map(|e| row(e, selected == Some(e.idx))).collect()
            })
            .collect();

        Self {
            path: finder.path(),
            breadcrumbs: finder.breadcrumbs(),
            columns,
            info: finder.selected().map(EntryInfo::from_entry),
        }
    }

    fn print(&self) {
        for (col, rows) in self.columns.iter().enumerate() {
            println!("[{col}]");
            for row in rows {
                let marker = if row.selected { '>' } else { ' ' };
                let required = if row.is_required { " *" } else { "" };
                let more = if row.has_children { " ›" } else { "" };
                println!("  {marker} {}{required}{more}", row.name);
            }
        }

        if !self.breadcrumbs.is_empty() {
            let trail: Vec<_> = self.breadcrumbs.iter().map(|b| b.label.as_str()).collect();
            println!();
            println!("{}", trail.join(" / "));
        }

        if let Some(info) = &self.info {
            println!();
            println!("{}", info.title);
            if let Some(value_type) = &info.value_type {
                println!("  type: {value_type}");
            }
            if let Some(description) = &info.description {
                println!("  description: {description}");
            }
            if !info.enum_values.is_empty() {
                println!("  enum: {}", info.enum_values.join(", "));
            }
            if !info.required.is_empty() {
                println!("  required: {}", info.required.join(", "));
            }
            for (keyword, value) in &info.validations {
                println!("  {keyword}: {value}");
            }
            for example in &info.examples {
                println!("  example: {example}");
            }
            println!("  pointer: {}", info.pointer);
        }
    }
}

fn row(entry: &SchemaEntry, selected: bool) -> Row<'_> {
    Row {
        key: &entry.key,
        name: &entry.name,
        group: entry.group,
        pointer: entry.pointer(),
        has_children: entry.has_children,
        is_required: entry.is_required,
        selected,
    }
}

impl App {
    /// Open the files, replay selections and keys, print the browser state.
    pub async fn run_browse(
        &self,
        ctx: &Context,
        files: &[PathBuf],
        keys: Option<&str>,
        selections: &[Selection],
        json: bool,
    ) -> Result<()> {
        let service = FinderService::from_ref(ctx);
        let schemas = service.load_schemas(files).await?;
        let mut finder = service.open(&schemas).await;

        for selection in selections {
            service.select(&mut finder, selection.col, selection.row).await?;
        }

        for key in keys.unwrap_or_default().split_whitespace() {
            let input: KeyInput = key.parse()?;
            if !service.press(&mut finder, &input).await? {
                tracing::warn!(key, "Ignoring unbound key");
            }
        }

        let output = BrowseOutput::new(&finder);
        if json {
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            output.print();
        }

        Ok(())
    }
}
