//! Subcommand handlers.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail, ensure};
use timeliner_api::{Block, BlockPosition, Color, Grid, Timeline, TimelineId};
use timeliner_gateway::{HttpGateway, Library};
use timeliner_kernel::export::{self, ExportFile};
use timeliner_kernel::{Command, Editor, EditorEvent, LocalStore};

use crate::cli::{Commands, EditAction};
use crate::config::Config;

pub async fn run(command: Commands, config: &Config) -> Result<()> {
    let library = open_library(config)?;

    match command {
        Commands::List => list(&library).await,
        Commands::Show { id, json } => {
            let doc = match id {
                Some(id) => library.get(&TimelineId(id)).await?,
                None => current(&library).await?,
            };
            show(&doc, json)
        }
        Commands::New { name } => {
            let doc = library.create(&name).await.context("failed to create timeline")?;
            println!("created {}", describe(&doc));
            Ok(())
        }
        Commands::Open { id } => {
            let doc = library.open(&TimelineId(id)).await?;
            println!("opened {}", describe(&doc));
            Ok(())
        }
        Commands::Rename { name } => {
            let doc = current(&library).await?;
            let renamed = library.rename(&doc, &name).await?;
            println!("renamed to {}", describe(&renamed));
            Ok(())
        }
        Commands::Delete => {
            let doc = current(&library).await?;
            match library.delete(&doc).await? {
                Some(next) if library.is_online() => println!("deleted; now on {}", describe(&next)),
                Some(_) => println!("local timeline reset"),
                None => println!("deleted; no timelines left"),
            }
            Ok(())
        }
        Commands::Import { file } => {
            let doc = library
                .import(&file)
                .await
                .with_context(|| format!("failed to import {}", file.display()))?;
            println!("imported {}", describe(&doc));
            Ok(())
        }
        Commands::Export { out } => {
            let doc = current(&library).await?;
            write_export(&out, export::export_document(&doc)?)
        }
        Commands::ExportOutlines { out } => {
            let doc = current(&library).await?;
            write_export(&out, export::export_outlines(&doc)?)
        }
        Commands::Edit { action } => edit(&library, config, action).await,
    }
}

fn open_library(config: &Config) -> Result<Library> {
    let store = LocalStore::open(&config.data_dir)
        .with_context(|| format!("failed to open data directory {}", config.data_dir.display()))?;

    match config.backend() {
        Some((url, token)) => {
            tracing::info!(url, "using backend");
            let gateway = HttpGateway::new(url, token)?;
            Ok(Library::online(store, Arc::new(gateway)))
        }
        None => {
            tracing::info!(path = %store.path().display(), "working offline");
            Ok(Library::offline(store))
        }
    }
}

async fn current(library: &Library) -> Result<Timeline> {
    library
        .startup()
        .await?
        .context("no timelines yet; create one with `timeliner new <name>`")
}

async fn list(library: &Library) -> Result<()> {
    if !library.is_online() {
        let doc = current(library).await?;
        println!("offline: {}", describe(&doc));
        return Ok(());
    }

    for timeline in library.list().await? {
        println!(
            "{}\t{}\t{}",
            timeline.id,
            timeline.name,
            timeline.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

fn describe(doc: &Timeline) -> String {
    match &doc.id {
        Some(id) => format!("{} (id {})", doc.display_name(), id),
        None => doc.display_name().to_string(),
    }
}

fn show(doc: &Timeline, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&doc.data)?);
    } else {
        print!("{}", outline(doc));
    }
    Ok(())
}

fn outline(doc: &Timeline) -> String {
    let mut out = format!("{}\n", describe(doc));
    for (r, row) in doc.data.rows.iter().enumerate() {
        let title = if row.title.is_empty() { "(untitled)" } else { &row.title };
        out.push_str(&format!("row {r}: {title}\n"));
        for (c, column) in row.columns.iter().enumerate() {
            out.push_str(&format!("  column {c}\n"));
            for (i, block) in column.iter().enumerate() {
                let pad = "  ".repeat(usize::from(block.indent));
                if block.show_title {
                    out.push_str(&format!("    {i}. {pad}{} [{}]\n", block.title, block.color));
                } else {
                    out.push_str(&format!("    {i}. {pad}[{}]\n", block.color));
                }
                if block.show_body && !block.body.is_empty() {
                    out.push_str(&format!("       {pad}{}\n", block.body));
                }
            }
        }
    }
    out
}

fn write_export(dir: &Path, file: ExportFile) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(&file.filename);
    std::fs::write(&path, &file.contents).with_context(|| format!("failed to write {}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(())
}

async fn edit(library: &Library, config: &Config, action: EditAction) -> Result<()> {
    let doc = current(library).await?;
    let (mut editor, mut events) = Editor::with_sink(doc, config.editor.clone(), library.sink());

    let result = apply_edit(&mut editor, action);
    let snapshot = editor.snapshot();
    editor.shutdown().await;
    result?;

    while let Ok(event) = events.try_recv() {
        if let EditorEvent::SaveFailed { message, .. } = event {
            bail!("save failed: {message}");
        }
    }

    print!("{}", outline(&snapshot));
    Ok(())
}

/// Run one edit against the editor, rejecting positions outside the grid.
fn apply_edit(editor: &mut Editor, action: EditAction) -> Result<()> {
    let rows = editor.grid().row_count();
    let columns = editor.grid().column_count();

    match action {
        EditAction::AddRow { at: None } => {
            editor.add_preview_row();
        }
        EditAction::AddRow { at: Some(at) } => {
            ensure!(at <= rows, "row {at} is out of range (timeline has {rows} rows)");
            editor.insert_row(at);
        }
        EditAction::AddColumn { at } => {
            let at = at.unwrap_or(columns);
            ensure!(at <= columns, "column {at} is out of range (timeline has {columns} columns)");
            editor.insert_column(at);
        }
        EditAction::AddBlock {
            row,
            column,
            index,
            title,
            body,
            color,
        } => {
            let len = column_len(editor.grid(), row, column);
            let pos = BlockPosition::new(row, column, index.unwrap_or(len));
            ensure!(
                editor.grid().is_insertion_point(pos),
                "cannot insert a block at {pos}"
            );

            let mut block = Block::preview();
            block.title = title;
            block.body = body;
            if let Some(color) = color {
                block.color = Color::parse(&color)?;
            }
            editor.insert_block(pos, block);
        }
        EditAction::MoveBlock { from, to } => {
            ensure!(editor.grid().block(from).is_some(), "no block at {from}");
            let mut len = column_len(editor.grid(), to.row, to.column);
            if from.same_column(&to) {
                len -= 1;
            }
            ensure!(
                to.row < rows && to.column <= columns && to.index <= len,
                "cannot move a block to {to}"
            );
            editor.move_block(from, to);
        }
        EditAction::RemoveBlock { at } => {
            ensure!(editor.grid().block(at).is_some(), "no block at {at}");
            editor.remove_block(at);
        }
        EditAction::SetRowTitle { row, title } => {
            ensure!(row < rows, "row {row} is out of range (timeline has {rows} rows)");
            editor.set_row_title(row, title);
        }
        EditAction::Indent { at } => run_on_block(editor, at, &Command::IndentBlock)?,
        EditAction::Outdent { at } => run_on_block(editor, at, &Command::OutdentBlock)?,
    }
    Ok(())
}

fn column_len(grid: &Grid, row: usize, column: usize) -> usize {
    grid.column(row, column).map_or(0, Vec::len)
}

fn run_on_block(editor: &mut Editor, at: BlockPosition, command: &Command) -> Result<()> {
    ensure!(editor.grid().block(at).is_some(), "no block at {at}");
    editor.click_block(at);
    if !editor.execute(command) {
        println!("{} has no effect on the block at {at}", command.name());
    }
    Ok(())
}
