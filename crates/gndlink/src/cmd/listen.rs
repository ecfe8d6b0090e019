use std::sync::Arc;

use tracing::info;

use gndlink_link::{
    CommandDispatcher, CommandExecutor, LinkConfig, LinkSession, LoggingExecutor,
};
use gndlink_transport::UdpFactory;

use crate::cmd::{install_ctrlc_handler, ListenArgs};
use crate::dictionary::load_dictionary;
use crate::executor::ProcessCommandExecutor;
use crate::exit::{link_error, CliResult, SUCCESS};

pub fn run(args: ListenArgs) -> CliResult<i32> {
    let dictionary = load_dictionary(&args.dictionary)?;
    let executor: Arc<dyn CommandExecutor> = match &args.run_with {
        Some(program) => Arc::new(ProcessCommandExecutor::new(
            program.clone(),
            args.dictionary.clone(),
        )),
        None => Arc::new(LoggingExecutor),
    };
    let dispatcher = CommandDispatcher::new(dictionary, executor);

    let mut config = LinkConfig::new(args.port.to_config());
    config.display_name = args.name;

    let session = LinkSession::new(config, dispatcher.into_callback());
    session
        .start(&UdpFactory)
        .map_err(|err| link_error("session start failed", err))?;
    install_ctrlc_handler(session.shutdown_signal())?;

    info!("listening for command frames; Ctrl-C to stop");
    session.run();
    Ok(SUCCESS)
}
