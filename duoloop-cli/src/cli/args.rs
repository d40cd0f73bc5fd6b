//! CLI argument definitions for `duoloop`.

use clap::{builder::PossibleValuesParser, Arg, ArgAction, Command};
use duoloop_lib::ObjectFit;

/// Build the CLI argument parser and command definitions.
pub fn build_cli() -> Command {
    let fits: Vec<&'static str> = ObjectFit::ALL.iter().map(|fit| fit.as_str()).collect();

    Command::new("duoloop")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Loop a media source seamlessly with two alternating instances")
        .arg_required_else_help(true)
        .arg(
            Arg::new("cutover-ms")
                .long("cutover-ms")
                .value_name("MS")
                .global(true)
                .help("Lead time before the end at which the hand-off happens [default: 1000]"),
        )
        .arg(
            Arg::new("crossfade-ms")
                .long("crossfade-ms")
                .value_name("MS")
                .global(true)
                .help("Blend window centred on the cutover; 0 swaps instantly [default: 0]"),
        )
        .arg(
            Arg::new("settle-ms")
                .long("settle-ms")
                .value_name("MS")
                .global(true)
                .help("Delay between the swap and retiring the outgoing instance [default: 100]"),
        )
        .arg(
            Arg::new("object-fit")
                .long("object-fit")
                .value_name("FIT")
                .global(true)
                .value_parser(PossibleValuesParser::new(fits))
                .help("Fit mode forwarded to both instances [default: cover]"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("PATH")
                .global(true)
                .help("JSON settings file; explicit flags override its values"),
        )
        .arg(
            Arg::new("fps")
                .long("fps")
                .value_name("HZ")
                .default_value("60")
                .global(true)
                .help("Frame rate driving the scheduler"),
        )
        .arg(
            Arg::new("duration-ms")
                .long("duration-ms")
                .value_name("MS")
                .default_value("10000")
                .global(true)
                .help("Clip length reported by the simulated instances"),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .action(ArgAction::SetTrue)
                .help("Skip the dashboard, run for --run-ms and print the final state"),
        )
        .arg(
            Arg::new("run-ms")
                .long("run-ms")
                .value_name("MS")
                .default_value("5000")
                .help("How long to run with --quiet"),
        )
        .arg(
            Arg::new("INPUT")
                .help("The media source to loop")
                .required(false)
                .index(1),
        )
        .subcommand(
            Command::new("simulate")
                .about("Run the scheduler on a manual clock and print events as JSON lines")
                .arg(
                    Arg::new("cycles")
                        .long("cycles")
                        .value_name("COUNT")
                        .default_value("3")
                        .help("Number of hand-offs to run through"),
                )
                .arg(
                    Arg::new("jitter-ms")
                        .long("jitter-ms")
                        .value_name("MS")
                        .default_value("0")
                        .help("Maximum random deviation of each frame interval"),
                )
                .arg(
                    Arg::new("drop-probability")
                        .long("drop-probability")
                        .value_name("P")
                        .default_value("0")
                        .help("Chance (0.0-1.0) that a frame is skipped"),
                )
                .arg(
                    Arg::new("metadata-delay-ms")
                        .long("metadata-delay-ms")
                        .value_name("MS")
                        .default_value("0")
                        .help("Delay before the clip duration becomes known"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_name("SEED")
                        .default_value("0")
                        .help("Seed for jitter and skipped frames"),
                )
                .arg(
                    Arg::new("INPUT")
                        .help("Source name recorded on the simulated instances")
                        .required(false)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("create")
                .about("Emit default JSON payloads")
                .subcommand(
                    Command::new("settings-json").about("Print the default loop settings JSON"),
                ),
        )
}
