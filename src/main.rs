use clap::Parser;
use jotter::cli::{
    handle_add, handle_delete, handle_edit, handle_get, handle_init, handle_list,
    handle_tag_delete, handle_tag_list, handle_tag_rename, Cli, Commands, TagAction,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => handle_init(),
        Commands::Add {
            title,
            markdown,
            stdin,
            tags,
            json,
        } => handle_add(title, markdown, stdin, tags, json),
        Commands::List { title, tags, json } => handle_list(title, tags, json),
        Commands::Get { id, json } => handle_get(id, json),
        Commands::Edit {
            id,
            title,
            markdown,
            stdin,
            tags,
            json,
        } => handle_edit(id, title, markdown, stdin, tags, json),
        Commands::Delete { id } => handle_delete(id),
        Commands::Tag(tag_cmd) => match tag_cmd.action {
            TagAction::List { json } => handle_tag_list(json),
            TagAction::Rename { id, label } => handle_tag_rename(id, label),
            TagAction::Delete { id } => handle_tag_delete(id),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
