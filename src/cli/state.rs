// SPDX-License-Identifier: Apache-2.0

use std::io::Read;
use std::path::Path;

use netrender::NetworkState;

use crate::error::CliError;

const STDIN_PATH: &str = "-";

/// Load network state from file or stdin (`-`). Files with `.json`
/// extension are parsed as JSON, everything else as YAML.
pub(crate) fn state_from_file(
    file_path: &str,
) -> Result<NetworkState, CliError> {
    let content = if file_path == STDIN_PATH {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        content
    } else {
        std::fs::read_to_string(file_path).map_err(|e| CliError {
            code: crate::error::EX_DATAERR,
            error_msg: format!("Failed to read {file_path}: {e}"),
        })?
    };
    let is_json = Path::new(file_path)
        .extension()
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    log::debug!("Loading network state from {file_path}");
    if is_json {
        Ok(NetworkState::new_from_json(&content)?)
    } else {
        Ok(NetworkState::new_from_yaml(&content)?)
    }
}
