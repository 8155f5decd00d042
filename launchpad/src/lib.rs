pub mod commands;
pub mod handlers;

pub use commands::command_argument_builder;
pub use handlers::{
    build_options, handle_generate, handle_init, handle_robots, handle_sitemap, handle_sync,
    load_rows, load_site_config, print_banner,
};
