use tracing::info;

use gndlink_codec::{build_data_frame, encode_command};
use gndlink_link::DictionaryService;
use gndlink_transport::{PortAdapter, UdpFactory};

use crate::cmd::SendArgs;
use crate::dictionary::load_dictionary;
use crate::exit::{frame_error, transport_error, CliError, CliResult, FAILURE, SUCCESS, USAGE};

pub fn run(args: SendArgs) -> CliResult<i32> {
    let dictionary = load_dictionary(&args.dictionary)?;
    let template = dictionary.command_by_name(&args.command).ok_or_else(|| {
        CliError::new(
            USAGE,
            format!("command '{}' not found in dictionary", args.command),
        )
    })?;
    if args.args.len() != template.argument_count {
        return Err(CliError::new(
            USAGE,
            format!(
                "{} (opcode {:#010x}) takes {} argument(s), got {}",
                template.full_name(),
                template.opcode,
                template.argument_count,
                args.args.len()
            ),
        ));
    }

    let adapter = PortAdapter::connect(args.port.to_config(), &UdpFactory)
        .map_err(|err| transport_error("connect failed", err))?;

    let body = encode_command(template.opcode, &args.args);
    let frame = build_data_frame(adapter.identity(), &body)
        .map_err(|err| frame_error("frame too large", err))?;

    let sent = adapter.send(&frame);
    adapter.disconnect();
    if sent {
        info!(
            command = %template.full_name(),
            bytes = frame.len(),
            "command sent"
        );
        Ok(SUCCESS)
    } else {
        Err(CliError::new(FAILURE, "send failed"))
    }
}
