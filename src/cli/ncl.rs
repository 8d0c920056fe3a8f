// SPDX-License-Identifier: Apache-2.0

mod config;
mod error;
mod render;
mod result;
mod state;

use env_logger::Builder;
use log::LevelFilter;

use crate::render::{
    ARG_CONFIG, ARG_NO_POSTCMDS, ARG_RENDERER, ARG_ROOT, ARG_STATE_FILE,
};
use crate::result::print_result_and_exit;

const APP_NAME: &str = "netrenderctl";

const SUB_CMD_RENDER: &str = "render";
const SUB_CMD_PERSISTENT_NET: &str = "persistent-net";
const SUB_CMD_LIST: &str = "list";
const SUB_CMD_VERSION: &str = "version";

fn root_arg() -> clap::Arg<'static> {
    clap::Arg::new(ARG_ROOT)
        .long("root")
        .takes_value(true)
        .help("Root folder holding the configuration files, default is /")
}

fn renderer_arg() -> clap::Arg<'static> {
    clap::Arg::new(ARG_RENDERER)
        .long("renderer")
        .takes_value(true)
        .multiple_occurrences(true)
        .help(
            "Renderer to search in order, could be comma separated list. \
            Supported: gentoo, freebsd, netbsd, openbsd",
        )
}

fn config_arg() -> clap::Arg<'static> {
    clap::Arg::new(ARG_CONFIG)
        .long("config")
        .short('c')
        .takes_value(true)
        .help("Configuration file, default is /etc/netrender/netrender.conf")
}

fn main() {
    let matches = clap::Command::new(APP_NAME)
        .version(clap::crate_version!())
        .about("Compile network state into native OS network configuration")
        .subcommand_required(true)
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .multiple_occurrences(true)
                .help("Set verbose level")
                .global(true),
        )
        .arg(
            clap::Arg::new("quiet")
                .short('q')
                .help("Disable logging")
                .global(true),
        )
        .subcommand(
            clap::Command::new(SUB_CMD_RENDER)
                .about("Write native network configuration of current OS")
                .arg(
                    clap::Arg::new(ARG_STATE_FILE)
                        .required(true)
                        .index(1)
                        .help("Network state file, `-` for stdin"),
                )
                .arg(root_arg())
                .arg(renderer_arg())
                .arg(config_arg())
                .arg(
                    clap::Arg::new(ARG_NO_POSTCMDS)
                        .long("no-postcmds")
                        .takes_value(false)
                        .help("Only write files, do not restart services"),
                ),
        )
        .subcommand(
            clap::Command::new(SUB_CMD_PERSISTENT_NET)
                .about("Show udev rules pinning interface names")
                .arg(
                    clap::Arg::new(ARG_STATE_FILE)
                        .required(true)
                        .index(1)
                        .help("Network state file, `-` for stdin"),
                ),
        )
        .subcommand(
            clap::Command::new(SUB_CMD_LIST)
                .about("List renderers available on current OS")
                .arg(root_arg())
                .arg(renderer_arg())
                .arg(config_arg()),
        )
        .subcommand(
            clap::Command::new(SUB_CMD_VERSION).about("Show version"),
        )
        .get_matches();

    let (log_module_filters, log_level) =
        match matches.occurrences_of("verbose") {
            0 => (vec!["netrender", "netrenderctl"], LevelFilter::Info),
            1 => (vec!["netrender", "netrenderctl"], LevelFilter::Debug),
            _ => (vec![""], LevelFilter::Trace),
        };

    if !matches.is_present("quiet") {
        let mut log_builder = Builder::new();
        for log_module_filter in log_module_filters {
            if !log_module_filter.is_empty() {
                log_builder.filter(Some(log_module_filter), log_level);
            } else {
                log_builder.filter(None, log_level);
            }
        }
        log_builder.init();
    }

    if let Some(matches) = matches.subcommand_matches(SUB_CMD_RENDER) {
        print_result_and_exit(render::render(matches));
    } else if let Some(matches) =
        matches.subcommand_matches(SUB_CMD_PERSISTENT_NET)
    {
        print_result_and_exit(render::persistent_net(matches));
    } else if let Some(matches) = matches.subcommand_matches(SUB_CMD_LIST) {
        print_result_and_exit(render::list(matches));
    } else if matches.subcommand_matches(SUB_CMD_VERSION).is_some() {
        print_result_and_exit(Ok(format!(
            "{} {}",
            APP_NAME,
            clap::crate_version!()
        )));
    }
}
