use sheaf_types::ObjectId;

/// One user action on a collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorEvent {
    /// An object was dropped onto the collection header.
    Dropped { candidate: ObjectId },
    /// The object picker of row `index` was set to `candidate`.
    Replaced {
        index: usize,
        candidate: Option<ObjectId>,
    },
    /// Append an empty row.
    Add,
    /// Duplicate the last member into a new row.
    Clone,
    /// Remove row `index`, evicting its member.
    Remove { index: usize },
    /// Commit a new name for the member in row `index`.
    Rename { index: usize, name: String },
    /// Expand or collapse the collection.
    Toggle,
}

impl EditorEvent {
    /// Short name used in log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Dropped { .. } => "dropped",
            Self::Replaced { .. } => "replaced",
            Self::Add => "add",
            Self::Clone => "clone",
            Self::Remove { .. } => "remove",
            Self::Rename { .. } => "rename",
            Self::Toggle => "toggle",
        }
    }
}

/// What handling an event did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditorOutcome {
    /// Non-fatal rejections, in the order they happened.
    pub warnings: Vec<String>,
    /// Whether the slot list changed.
    pub changed: bool,
    /// Independent assets created by evictions during this event.
    pub evicted: Vec<sheaf_types::AssetPath>,
}

impl EditorOutcome {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%message, "collection edit rejected");
        self.warnings.push(message);
    }
}
