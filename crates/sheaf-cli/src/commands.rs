use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use sheaf_collection::{Collection, CollectionKey};
use sheaf_editor::{CollectionEditor, EditorConfig, EditorEvent, EditorOutcome};
use sheaf_store::{AssetStore, FsAssetStore};
use sheaf_types::{AssetObject, AssetPath, ObjectId};
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    debug!(
        root = %cli.root.display(),
        config = ?cli.config,
        collision_policy = ?config.transfer.collision_policy,
        write_ahead = config.transfer.write_ahead,
        "opening store"
    );
    let store = Arc::new(
        FsAssetStore::open(&cli.root)
            .with_context(|| format!("opening store at {}", cli.root.display()))?,
    );
    let mut editor = CollectionEditor::new(store.clone(), config);

    match cli.command {
        Command::New(args) => cmd_new(store.as_ref(), args),
        Command::Collection(args) => cmd_collection(store.as_ref(), args),
        Command::Adopt(args) => {
            let candidate = main_object(store.as_ref(), &args.candidate)?;
            apply(&mut editor, &args.target, EditorEvent::Dropped { candidate })
        }
        Command::Add(args) => apply(&mut editor, &args, EditorEvent::Add),
        Command::Clone(args) => apply(&mut editor, &args, EditorEvent::Clone),
        Command::Replace(args) => {
            let candidate = main_object(store.as_ref(), &args.candidate)?;
            apply(
                &mut editor,
                &args.target,
                EditorEvent::Replaced { index: args.index, candidate: Some(candidate) },
            )
        }
        Command::Evict(args) => {
            apply(&mut editor, &args.target, EditorEvent::Remove { index: args.index })
        }
        Command::Rename(args) => apply(
            &mut editor,
            &args.target,
            EditorEvent::Rename { index: args.index, name: args.name },
        ),
        Command::Show(args) => cmd_show(&mut editor, &args),
        Command::Ls(args) => cmd_ls(store.as_ref(), &args),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<EditorConfig> {
    let Some(path) = &cli.config else {
        return Ok(EditorConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    Ok(EditorConfig::from_toml_str(&text)?)
}

fn parse_path(raw: &str) -> anyhow::Result<AssetPath> {
    AssetPath::parse(raw).with_context(|| format!("invalid asset path {raw:?}"))
}

/// Id of the main object stored at `raw`.
fn main_object(store: &dyn AssetStore, raw: &str) -> anyhow::Result<ObjectId> {
    let path = parse_path(raw)?;
    match store.load_main_asset_at_path(&path)? {
        Some(obj) => Ok(obj.id),
        None => bail!("no asset at {path}"),
    }
}

fn collection_key(store: &dyn AssetStore, target: &TargetArgs) -> anyhow::Result<CollectionKey> {
    Ok(CollectionKey::new(
        main_object(store, &target.container)?,
        target.property.as_str(),
    ))
}

fn cmd_new(store: &dyn AssetStore, args: NewArgs) -> anyhow::Result<()> {
    let path = parse_path(&args.path)?;
    let name = args.name.unwrap_or_else(|| path.file_stem().to_string());
    let object = AssetObject::new(name, args.kind);
    let id = object.id;
    store.create_asset(object, &path)?;
    store.persist()?;
    println!("{} Created {} ({})", "✓".green().bold(), path.to_string().bold(), id.short_id().cyan());
    Ok(())
}

fn cmd_collection(store: &dyn AssetStore, args: CollectionArgs) -> anyhow::Result<()> {
    let path = parse_path(&args.path)?;
    let name = args.name.unwrap_or_else(|| path.file_stem().to_string());
    let owner = AssetObject::new(name, args.owner_kind);
    let owner_id = owner.id;
    store.create_asset(owner, &path)?;
    Collection::init(store, owner_id, &args.property, &args.kind)?;
    store.persist()?;
    println!(
        "{} Created collection {} of {} in {}",
        "✓".green().bold(),
        args.property.yellow(),
        args.kind.cyan(),
        path.to_string().bold()
    );
    Ok(())
}

fn apply(editor: &mut CollectionEditor, target: &TargetArgs, event: EditorEvent) -> anyhow::Result<()> {
    let key = collection_key(editor.engine().store().as_ref(), target)?;
    let outcome = editor.handle(&key, event)?;
    report(&outcome);
    cmd_show(editor, target)
}

fn report(outcome: &EditorOutcome) {
    for path in &outcome.evicted {
        println!("  {} {}", "evicted:".green(), path);
    }
    for warning in &outcome.warnings {
        println!("  {} {}", "warning:".yellow().bold(), warning);
    }
}

fn cmd_show(editor: &mut CollectionEditor, target: &TargetArgs) -> anyhow::Result<()> {
    let key = collection_key(editor.engine().store().as_ref(), target)?;
    let rows = editor.rows(&key)?;
    let height = editor.height(&key)?;
    println!(
        "{} {} ({} rows, height {})",
        target.container.bold(),
        target.property.yellow(),
        rows.len(),
        height
    );
    for row in rows {
        let id = row
            .member
            .map(|id| id.short_id().cyan().to_string())
            .unwrap_or_else(|| "-".dimmed().to_string());
        println!("  [{}] {} {}", row.index, row.label, id);
    }
    Ok(())
}

fn cmd_ls(store: &dyn AssetStore, args: &LsArgs) -> anyhow::Result<()> {
    let paths = store.list_assets(&args.dir)?;
    if paths.is_empty() {
        println!("No assets.");
        return Ok(());
    }
    for path in paths {
        let Some(main) = store.load_main_asset_at_path(&path)? else {
            continue;
        };
        let embedded = store.embedded_objects(&path)?.len();
        println!(
            "{}  {} ({}){}",
            path.to_string().bold(),
            main.name,
            main.kind.cyan(),
            if embedded > 0 {
                format!(" +{embedded} embedded").dimmed().to_string()
            } else {
                String::new()
            }
        );
    }
    Ok(())
}
