// Command line definition and conversion into an AppConfig

use crate::core::config::{AppConfig, BrowserSettings, MailSettings, DEFAULT_SUBJECT};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

pub fn build_cli() -> Command {
    Command::new("supplymon")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Checks printer consumables and mails an order report when supplies run low")
        .arg(
            Arg::new("printers")
                .long("printers")
                .value_name("FILE")
                .env("PRINTERS_CONFIG")
                .default_value("printers.yaml")
                .global(true)
                .help("YAML file listing the monitored printers"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_name("FILE")
                .env("LOG_FILE_PATH")
                .default_value("supply_monitor.log")
                .global(true)
                .help("Append-only status log"),
        )
        .arg(
            Arg::new("mail-credentials")
                .long("mail-credentials")
                .value_name("FILE")
                .env("MAIL_CREDENTIALS_PATH")
                .default_value("credentials.json")
                .global(true)
                .help("OAuth client secrets for the mail API"),
        )
        .arg(
            Arg::new("mail-token")
                .long("mail-token")
                .value_name("FILE")
                .env("MAIL_TOKEN_PATH")
                .default_value("token.json")
                .global(true)
                .help("Stored OAuth token"),
        )
        .arg(
            Arg::new("chrome")
                .long("chrome")
                .value_name("PATH")
                .env("CHROME_PATH")
                .global(true)
                .help("Chrome/Chromium executable for script-rendered pages"),
        )
        .subcommand(
            Command::new("run")
                .about("Poll every printer and mail the report if supplies are needed")
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .help("Print the report instead of mailing it")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("device")
                        .long("device")
                        .value_name("NAME")
                        .help("Only poll the named printer (repeatable)")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("recipient")
                        .long("recipient")
                        .value_name("ADDRESS")
                        .env("MAIL_RECIPIENT")
                        .required_unless_present("dry-run")
                        .help("Report recipient"),
                )
                .arg(
                    Arg::new("sender")
                        .long("sender")
                        .value_name("ADDRESS")
                        .env("MAIL_SENDER")
                        .help("Report sender (defaults to the recipient)"),
                )
                .arg(
                    Arg::new("subject")
                        .long("subject")
                        .value_name("TEXT")
                        .default_value(DEFAULT_SUBJECT)
                        .help("Report subject"),
                ),
        )
        .subcommand(
            Command::new("authorize")
                .about("Interactive OAuth consent; stores the mail token for scheduled runs"),
        )
        .subcommand(Command::new("devices").about("Validate the printers file and list devices"))
        .subcommand(Command::new("version").about("Shows version information"))
}

/// Build the run configuration from parsed arguments. `sub_matches` carries
/// the `run` subcommand options when present.
pub fn config_from_matches(matches: &ArgMatches, sub_matches: Option<&ArgMatches>) -> AppConfig {
    let path = |id: &str| {
        matches
            .get_one::<String>(id)
            .map(PathBuf::from)
            .unwrap_or_default()
    };
    let run_value = |id: &str| sub_matches.and_then(|m| m.get_one::<String>(id)).cloned();

    let defaults = AppConfig::default();

    AppConfig {
        printers_path: path("printers"),
        log_file: path("log-file"),
        mail: MailSettings {
            credentials_path: path("mail-credentials"),
            token_path: path("mail-token"),
            recipient: run_value("recipient"),
            sender: run_value("sender"),
            subject: run_value("subject").unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
        },
        browser: BrowserSettings {
            chrome_path: matches.get_one::<String>("chrome").map(PathBuf::from),
            ..defaults.browser
        },
        http_timeout: defaults.http_timeout,
    }
}
