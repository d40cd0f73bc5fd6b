use clap::ArgMatches;
use duoloop_lib::{LoopError, LoopSettings};

/// Handle `duoloop create ...`. Returns an exit code if a payload was printed.
pub fn maybe_run_create(args: &ArgMatches) -> Result<Option<i32>, LoopError> {
    let Some(create) = args.subcommand_matches("create") else {
        return Ok(None);
    };

    match create.subcommand_name() {
        Some("settings-json") => {
            println!("{}", LoopSettings::default().to_json_pretty()?);
            Ok(Some(0))
        }
        _ => {
            eprintln!("Nothing to create. Try `duoloop create settings-json`.");
            Ok(Some(1))
        }
    }
}
