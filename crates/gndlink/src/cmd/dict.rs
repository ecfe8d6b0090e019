use gndlink_link::{CommandTemplate, DictionaryService, InMemoryDictionary};

use crate::cmd::DictArgs;
use crate::dictionary::load_dictionary;
use crate::exit::{CliError, CliResult, SUCCESS, USAGE};

pub fn run(args: DictArgs) -> CliResult<i32> {
    let dictionary = load_dictionary(&args.dictionary)?;

    match &args.command {
        Some(name) => {
            let template = dictionary.command_by_name(name).ok_or_else(|| {
                CliError::new(USAGE, format!("command '{name}' not found in dictionary"))
            })?;
            print!("{}", describe_command(template));
        }
        None => print!("{}", list_dictionary(&dictionary)),
    }
    Ok(SUCCESS)
}

fn describe_command(template: &CommandTemplate) -> String {
    format!(
        "{} (opcode {:#010x})\n  arguments: {}\n",
        template.full_name(),
        template.opcode,
        template.argument_count
    )
}

fn list_dictionary(dictionary: &InMemoryDictionary) -> String {
    let mut commands: Vec<_> = dictionary.commands().collect();
    commands.sort_by_key(|command| command.opcode);
    let mut channels: Vec<_> = dictionary.channels().collect();
    channels.sort_by_key(|channel| channel.id);

    let mut out = String::new();
    out.push_str(&format!("commands ({}):\n", commands.len()));
    for command in commands {
        out.push_str(&format!(
            "  {:#010x}  {} ({} args)\n",
            command.opcode,
            command.full_name(),
            command.argument_count
        ));
    }
    out.push_str(&format!("channels ({}):\n", channels.len()));
    for channel in channels {
        out.push_str(&format!(
            "  {:>10}  {} ({})\n",
            channel.id, channel.name, channel.value_type
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use gndlink_link::{ChannelTemplate, ValueType};

    use super::*;

    fn dictionary() -> InMemoryDictionary {
        InMemoryDictionary::new(
            vec![CommandTemplate {
                opcode: 0x42,
                component: "MATH".into(),
                mnemonic: "ADD".into(),
                argument_count: 2,
            }],
            vec![ChannelTemplate {
                id: 1,
                name: "MATH.RESULT".into(),
                value_type: ValueType::U32,
            }],
        )
    }

    #[test]
    fn describe_includes_opcode_and_arity() {
        let dict = dictionary();
        let template = dict.command_by_name("MATH.ADD").unwrap();
        let text = describe_command(template);
        assert!(text.contains("MATH.ADD"));
        assert!(text.contains("0x00000042"));
        assert!(text.contains("arguments: 2"));
    }

    #[test]
    fn listing_is_sorted_and_complete() {
        let text = list_dictionary(&dictionary());
        assert!(text.contains("commands (1):"));
        assert!(text.contains("MATH.ADD"));
        assert!(text.contains("channels (1):"));
        assert!(text.contains("MATH.RESULT (U32)"));
    }
}
