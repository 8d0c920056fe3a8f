// SPDX-License-Identifier: Apache-2.0

use crate::error::CliError;

pub(crate) fn print_result_and_exit(result: Result<String, CliError>) {
    match result {
        Ok(s) => {
            if !s.is_empty() {
                print!("{s}");
                if !s.ends_with('\n') {
                    println!();
                }
            }
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(e.code);
        }
    }
}
