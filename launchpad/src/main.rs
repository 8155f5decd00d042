use colored::Colorize;
use launchpad::{
    command_argument_builder, handle_generate, handle_init, handle_robots, handle_sitemap,
    handle_sync, print_banner,
};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let chosen_command = command_argument_builder().get_matches();

    // Global flags are read from the deepest matches they propagate to
    let flags = chosen_command
        .subcommand()
        .map(|(_, args)| args)
        .unwrap_or(&chosen_command);
    let quiet = flags.get_flag("quiet");
    init_tracing(flags.get_flag("verbose"));

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    let result = match chosen_command.subcommand() {
        Some(("init", args)) => handle_init(args),
        Some(("sitemap", args)) => handle_sitemap(args).await,
        Some(("robots", args)) => handle_robots(args),
        Some(("generate", args)) => handle_generate(args).await,
        Some(("sync", args)) => handle_sync(args).await,
        // No subcommand provided, just show the banner
        None => return,
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}
