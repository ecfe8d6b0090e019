//! JSON dictionary loading.
//!
//! Dictionary files carry two arrays of templates:
//!
//! ```json
//! {
//!   "commands": [
//!     { "opcode": 66, "component": "MATH", "mnemonic": "ADD", "argument_count": 2 }
//!   ],
//!   "channels": [
//!     { "id": 1, "name": "MATH.RESULT", "value_type": "U32" }
//!   ]
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use gndlink_link::{ChannelTemplate, CommandTemplate, InMemoryDictionary};

use crate::exit::{io_error, CliError, CliResult, DATA_INVALID};

#[derive(Debug, Deserialize)]
struct DictionaryFile {
    #[serde(default)]
    commands: Vec<CommandTemplate>,
    #[serde(default)]
    channels: Vec<ChannelTemplate>,
}

pub fn load_dictionary(path: &Path) -> CliResult<Arc<InMemoryDictionary>> {
    let text = std::fs::read_to_string(path)
        .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
    let file: DictionaryFile = serde_json::from_str(&text).map_err(|err| {
        CliError::new(
            DATA_INVALID,
            format!("{} is not a valid dictionary: {err}", path.display()),
        )
    })?;

    info!(
        path = %path.display(),
        commands = file.commands.len(),
        channels = file.channels.len(),
        "dictionary loaded"
    );
    Ok(Arc::new(InMemoryDictionary::new(
        file.commands,
        file.channels,
    )))
}
