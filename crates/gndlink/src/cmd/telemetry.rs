use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use gndlink_codec::{build_telemetry_frame, encode_telemetry, ChannelReading};
use gndlink_link::{
    unix_timestamp, ChannelTemplate, ChannelValue, InMemoryDictionary, LinkConfig, LinkSession,
    TelemetryDispatcher, TelemetrySink, ValueType,
};
use gndlink_transport::{PortAdapter, ShutdownSignal, UdpFactory};

use crate::cmd::{install_ctrlc_handler, TelemetryArgs, TelemetryMode};
use crate::dictionary::load_dictionary;
use crate::exit::{
    frame_error, link_error, transport_error, CliError, CliResult, FAILURE, SUCCESS,
};

pub fn run(args: TelemetryArgs) -> CliResult<i32> {
    match args.mode {
        TelemetryMode::Ground => run_ground(args),
        TelemetryMode::Downlink => run_downlink(args),
    }
}

/// Sink that narrates channel updates to the log.
struct LogSink;

impl TelemetrySink for LogSink {
    fn accept(&self, channel: &ChannelTemplate, value: ChannelValue, timestamp: u64) {
        info!(channel = %channel.name, %value, timestamp, "channel update");
    }
}

fn run_ground(args: TelemetryArgs) -> CliResult<i32> {
    let dictionary = load_dictionary(&args.dictionary)?;
    let dispatcher = TelemetryDispatcher::new(dictionary, Arc::new(LogSink));

    let mut config = LinkConfig::new(args.port.to_config());
    config.display_name = args.name;

    let session = LinkSession::new(config, dispatcher.into_callback());
    session
        .start(&UdpFactory)
        .map_err(|err| link_error("session start failed", err))?;
    install_ctrlc_handler(session.shutdown_signal())?;

    info!("receiving telemetry; Ctrl-C to stop");
    session.run();
    Ok(SUCCESS)
}

fn run_downlink(args: TelemetryArgs) -> CliResult<i32> {
    let dictionary = load_dictionary(&args.dictionary)?;
    let adapter = PortAdapter::connect(args.port.to_config(), &UdpFactory)
        .map_err(|err| transport_error("connect failed", err))?;

    let stop = Arc::new(ShutdownSignal::new());
    install_ctrlc_handler(Arc::clone(&stop))?;

    let interval = Duration::from_secs(args.interval.max(1));
    info!(
        channels = dictionary.channels().count(),
        ?interval,
        "downlinking synthetic telemetry; Ctrl-C to stop"
    );

    let mut counter: u64 = 0;
    loop {
        let readings = sample_readings(&dictionary, counter);
        let packet = encode_telemetry(&readings, unix_timestamp())
            .map_err(|err| frame_error("telemetry encode failed", err))?;
        let frame = build_telemetry_frame(&packet);

        if adapter.send(&frame) {
            info!(channels = readings.len(), bytes = frame.len(), "sent telemetry packet");
        } else {
            warn!("telemetry send failed");
        }
        if !adapter.is_connected() {
            return Err(CliError::new(FAILURE, "link went down during downlink"));
        }

        counter += 1;
        if stop.wait_timeout(interval) {
            break;
        }
    }

    adapter.disconnect();
    Ok(SUCCESS)
}

fn sample_readings(dictionary: &InMemoryDictionary, counter: u64) -> Vec<ChannelReading> {
    let mut channels: Vec<&ChannelTemplate> = dictionary.channels().collect();
    channels.sort_by_key(|channel| channel.id);
    channels
        .iter()
        .map(|channel| ChannelReading::new(channel.id, sample_bytes(channel.value_type, counter)))
        .collect()
}

/// Counter-derived value bytes for one channel, in its declared wire type.
fn sample_bytes(value_type: ValueType, counter: u64) -> Vec<u8> {
    match value_type {
        ValueType::U8 => vec![counter as u8],
        ValueType::U16 => (counter as u16).to_be_bytes().to_vec(),
        ValueType::U32 => (counter as u32).to_be_bytes().to_vec(),
        ValueType::U64 => counter.to_be_bytes().to_vec(),
        ValueType::I8 => vec![counter as i8 as u8],
        ValueType::I16 => (counter as i16).to_be_bytes().to_vec(),
        ValueType::I32 => (counter as i32).to_be_bytes().to_vec(),
        ValueType::I64 => (counter as i64).to_be_bytes().to_vec(),
        ValueType::F32 => (counter as f32).to_be_bytes().to_vec(),
        ValueType::F64 => (counter as f64).to_be_bytes().to_vec(),
        ValueType::Text => format!("sample-{counter}").into_bytes(),
    }
}
