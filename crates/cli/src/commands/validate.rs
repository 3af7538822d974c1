//! Validate test case files without running them

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use stepwise_engine::loader;

use crate::output::{print_error, print_success};

#[derive(Args)]
pub struct ValidateArgs {
    /// Test case files or directories
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

/// Returns true when every test case is valid
pub fn execute(args: ValidateArgs) -> Result<bool> {
    let cases = loader::load_paths(&args.paths)?;
    let mut valid = true;

    for case in &cases {
        match case.validate() {
            Ok(()) => print_success(&format!("{} ({} steps)", case.name, case.steps.len())),
            Err(e) => {
                valid = false;
                print_error(&e.to_string());
            }
        }
    }

    if cases.is_empty() {
        print_error("No test cases found");
        valid = false;
    }

    Ok(valid)
}
