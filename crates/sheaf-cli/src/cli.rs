use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "sheaf",
    about = "Sheaf: asset collections that own their members",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Store root directory
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// TOML file with [transfer] and [layout] settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an independent asset
    New(NewArgs),
    /// Create a container asset holding an empty collection
    Collection(CollectionArgs),
    /// Adopt an independent asset into a collection
    Adopt(AdoptArgs),
    /// Append an empty row
    Add(TargetArgs),
    /// Duplicate the last member into a new row
    Clone(TargetArgs),
    /// Replace a row's member with an independent asset
    Replace(ReplaceArgs),
    /// Remove a row, turning its member back into an independent asset
    Evict(RowArgs),
    /// Rename the member in a row
    Rename(RenameArgs),
    /// Show a collection's rows and display height
    Show(TargetArgs),
    /// List backing files
    Ls(LsArgs),
}

/// A collection: the container file plus the property holding the list.
#[derive(Args)]
pub struct TargetArgs {
    pub container: String,
    #[arg(short, long, default_value = "items")]
    pub property: String,
}

#[derive(Args)]
pub struct NewArgs {
    pub path: String,
    /// Object name (defaults to the file stem)
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long, default_value = "Item")]
    pub kind: String,
}

#[derive(Args)]
pub struct CollectionArgs {
    pub path: String,
    #[arg(long)]
    pub name: Option<String>,
    /// Kind of the container object
    #[arg(long, default_value = "Collection")]
    pub owner_kind: String,
    #[arg(short, long, default_value = "items")]
    pub property: String,
    /// Element kind the collection accepts
    #[arg(long, default_value = "Item")]
    pub kind: String,
}

#[derive(Args)]
pub struct AdoptArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    /// Path of the independent asset to adopt
    pub candidate: String,
}

#[derive(Args)]
pub struct ReplaceArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    pub index: usize,
    pub candidate: String,
}

#[derive(Args)]
pub struct RowArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    pub index: usize,
}

#[derive(Args)]
pub struct RenameArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    pub index: usize,
    pub name: String,
}

#[derive(Args)]
pub struct LsArgs {
    #[arg(default_value = "")]
    pub dir: String,
}
