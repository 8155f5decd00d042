use clap::{Arg, arg, command};
use std::path::PathBuf;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub const DEFAULT_CONFIG_DIR: &str = "~/.config/launchpad/";

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("launchpad")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("launchpad")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and non-essential output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(-v --"verbose" "Log debug output to stderr")
                .required(false)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Creates a site configuration and an empty snapshot store")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Directory to store site.json and launchpad.db")
                        .default_value(DEFAULT_CONFIG_DIR),
                )
                .arg(
                    arg!(--"base-url" <URL>)
                        .required(false)
                        .help("Public site origin written into site.json")
                        .default_value("http://localhost:3000"),
                )
                .arg(
                    arg!(-f --"force")
                        .help("Overwrites any existing configuration and snapshot store.")
                        .required(false),
                ),
        )
        .subcommand(
            command!("sitemap")
                .about("Builds the sitemap from the site configuration and a row source")
                .args(config_args())
                .args(source_args())
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Output format: xml, json, text")
                        .value_parser(["xml", "json", "text"])
                        .default_value("xml"),
                )
                .arg(output_arg()),
        )
        .subcommand(
            command!("robots")
                .about("Builds the robots document")
                .args(config_args())
                .arg(
                    arg!(--"disallow" <PATH>)
                        .required(false)
                        .help("Disallowed path prefix, repeatable. Replaces the configured list.")
                        .action(clap::ArgAction::Append),
                )
                .arg(output_arg()),
        )
        .subcommand(
            command!("generate")
                .about("Writes sitemap.xml and robots.txt into a directory")
                .args(config_args())
                .args(source_args())
                .arg(
                    arg!(-d --"out-dir" <DIR>)
                        .required(false)
                        .help("Directory to write the documents into")
                        .value_parser(clap::value_parser!(PathBuf))
                        .default_value("."),
                ),
        )
        .subcommand(
            command!("sync")
                .about("Copies backend rows into the local snapshot store")
                .arg(
                    arg!(--"rest" <URL>)
                        .required(false)
                        .help("PostgREST-compatible backend endpoint")
                        .conflicts_with("snapshot"),
                )
                .arg(api_key_arg())
                .arg(
                    arg!(--"snapshot" <PATH>)
                        .required(false)
                        .help("JSON snapshot to import")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--"db" <PATH>)
                        .required(true)
                        .help("SQLite snapshot store to replace")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--"export" <PATH>)
                        .required(false)
                        .help("Also write the rows as a JSON snapshot")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
}

fn config_args() -> Vec<Arg> {
    vec![
        arg!(-c --"config" <PATH>)
            .required(false)
            .help("Path to site.json"),
        arg!(--"base-url" <URL>)
            .required(false)
            .help("Public site origin, overrides the configured one"),
    ]
}

fn source_args() -> Vec<Arg> {
    vec![
        arg!(--"rest" <URL>)
            .required(false)
            .help("Fetch rows from a PostgREST-compatible backend")
            .conflicts_with_all(["db", "snapshot"]),
        api_key_arg(),
        arg!(--"db" <PATH>)
            .required(false)
            .help("Read rows from a SQLite snapshot store")
            .value_parser(clap::value_parser!(PathBuf))
            .conflicts_with("snapshot"),
        arg!(--"snapshot" <PATH>)
            .required(false)
            .help("Read rows from a JSON snapshot")
            .value_parser(clap::value_parser!(PathBuf)),
        arg!(--"pre-filtered")
            .required(false)
            .help("Rows are already moderated; list every startup")
            .action(clap::ArgAction::SetTrue),
        arg!(--"stamp-static")
            .required(false)
            .help("Stamp static pages with the current time as lastmod")
            .action(clap::ArgAction::SetTrue),
    ]
}

fn api_key_arg() -> Arg {
    arg!(--"api-key" <KEY>)
        .required(false)
        .help("Backend API key")
        .env("LAUNCHPAD_API_KEY")
        .hide_env_values(true)
}

fn output_arg() -> Arg {
    arg!(-o --"output" <PATH>)
        .required(false)
        .help("Save to file (default: print to stdout)")
        .value_parser(clap::value_parser!(PathBuf))
}
