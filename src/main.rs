use clap::CommandFactory;
use std::process;
use verprobe::{
    cli::{Args, Command},
    error::handle_error,
};

/// Exit code for usage errors
const USAGE_EXIT_CODE: i32 = -1;

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Nothing to probe: show usage
    if args.input_path().is_none() {
        let _ = Args::command().print_help();
        println!();
        process::exit(USAGE_EXIT_CODE);
    }

    process::exit(run_command(&args));
}

/// Run the command and map the result to an exit code
fn run_command(args: &Args) -> i32 {
    let outcome = Command::from_args(args).and_then(|command| command.execute());

    match outcome {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            let code = err.error_code().exit_code();
            handle_error(err);
            code
        }
    }
}
