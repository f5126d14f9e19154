mod commands;
mod handlers;

pub use commands::{Cli, Commands, TagAction, TagCommand};
pub use handlers::{
    handle_add, handle_delete, handle_edit, handle_get, handle_init, handle_list,
    handle_tag_delete, handle_tag_list, handle_tag_rename,
};
