use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "jotter")]
#[command(version, about = "A local, single-user note keeper with tags")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new notebook in the current directory
    Init,

    /// Add a new note
    Add {
        /// Note title
        title: String,

        /// Note body in markdown
        #[arg(long, short = 'm', conflicts_with = "stdin")]
        markdown: Option<String>,

        /// Read the note body from stdin
        #[arg(long)]
        stdin: bool,

        /// Tag labels (can be specified multiple times; unknown labels
        /// create new tags)
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List notes, optionally filtered by title and tags
    List {
        /// Keep only notes whose title contains this text
        /// (case-insensitive)
        #[arg(long)]
        title: Option<String>,

        /// Keep only notes carrying every one of these tag labels
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single note
    Get {
        /// Note id (full UUID or unique prefix)
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit a note
    Edit {
        /// Note id (full UUID or unique prefix)
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New body in markdown
        #[arg(long, short = 'm', conflicts_with = "stdin")]
        markdown: Option<String>,

        /// Read the new body from stdin
        #[arg(long)]
        stdin: bool,

        /// Replace the note's tags with these labels
        #[arg(long = "tag", short = 't')]
        tags: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a note
    Delete {
        /// Note id (full UUID or unique prefix)
        id: String,
    },

    /// Manage tags
    Tag(TagCommand),
}

#[derive(Args, Debug)]
pub struct TagCommand {
    #[command(subcommand)]
    pub action: TagAction,
}

#[derive(Subcommand, Debug)]
pub enum TagAction {
    /// List all tags
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rename a tag; every note carrying it shows the new label
    Rename {
        /// Tag id (full UUID or unique prefix)
        id: String,

        /// New label
        label: String,
    },

    /// Delete a tag and remove it from every note that carries it
    Delete {
        /// Tag id (full UUID or unique prefix)
        id: String,
    },
}
