use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli_style;
use cli_style::get_styles;

use callbell::deep_link::{ChannelUrlSource, DispatchOutcome, LoggingNavigator};
use callbell::device::AppSettings;
use callbell::notifications::{CallKind, LoggingLocalNotifier, NotificationAction};
use callbell::{DeviceContext, FileKeyValueStore};

use rustyline::{
    completion::Completer,
    highlight::Highlighter,
    history::FileHistory,
    validate::Validator,
    CompletionType, Config, Editor, Helper,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(styles=get_styles())]
struct CliArgs {
    /// Path to the JSON file holding the device's key-value storage.
    #[clap(value_parser = parse_path, default_value = "device.json")]
    pub path: PathBuf,

    /// URL the simulated app is launched with.
    #[clap(long)]
    pub launch_url: Option<String>,
}

#[derive(Parser)]
#[command(styles=get_styles(),name = "")]
struct InnerCli {
    #[command(subcommand)]
    command: InnerCommand,
}

#[derive(Clone, Copy, ValueEnum)]
enum Setting {
    Notifications,
    Sound,
    Vibration,
    HeadsUp,
    BadgeCount,
}

#[derive(Clone, Copy, ValueEnum)]
enum Switch {
    On,
    Off,
}

#[derive(Subcommand)]
enum InnerCommand {
    /// Simulates an incoming call notification.
    Call {
        caller: String,
        #[clap(default_value = "voice")]
        kind: CallKind,
    },

    /// Simulates a new message notification.
    Message { sender: String, message: String },

    /// Shows the notification history, newest first.
    List,

    /// Marks a notification as read.
    Read { id: String },

    /// Marks every notification as read.
    ReadAll,

    /// Deletes the whole notification history.
    Clear,

    /// Taps a stored notification, or one of its buttons (answer, decline),
    /// routing it like the app would.
    Tap {
        id: String,
        #[clap(default_value = "default")]
        action: NotificationAction,
    },

    /// Opens the app with the given URL.
    Open { url: String },

    /// Shows the current settings.
    Settings,

    /// Changes a setting.
    Set { setting: Setting, value: Switch },

    /// Shows the saved push token, or saves a new one.
    Token { token: Option<String> },

    /// Shows the path of the device storage file.
    Where,

    /// Close this program.
    Exit,
}

enum CommandExecutionResult {
    Ok,
    Exit,
    Error(String),
}

const PROMPT: &str = ">> ";

struct Session {
    context: DeviceContext,
    urls: Arc<ChannelUrlSource>,
    path: PathBuf,
}

fn apply_setting(mut settings: AppSettings, setting: Setting, enabled: bool) -> AppSettings {
    match setting {
        Setting::Notifications => settings.notifications = enabled,
        Setting::Sound => settings.sound = enabled,
        Setting::Vibration => settings.vibration = enabled,
        Setting::HeadsUp => settings.heads_up = enabled,
        Setting::BadgeCount => settings.badge_count = enabled,
    }
    settings
}

async fn execute_command(line: String, session: &Session) -> CommandExecutionResult {
    if line.is_empty() {
        return CommandExecutionResult::Ok;
    }

    let args =
        shlex::split(&line).unwrap_or_else(|| line.split_whitespace().map(String::from).collect());

    let cli = InnerCli::try_parse_from(std::iter::once(" ").chain(args.iter().map(String::as_str)));

    let notifications = session.context.notifications();
    match cli {
        Ok(cli) => {
            println!("{} {}", PROMPT, &line);
            match cli.command {
                InnerCommand::Call { caller, kind } => {
                    match notifications.create_call_notification(&caller, kind).await {
                        Some(id) => println!("Created {}", id),
                        None => {
                            return CommandExecutionResult::Error(
                                "Could not store the notification.".to_string(),
                            )
                        }
                    }
                }
                InnerCommand::Message { sender, message } => {
                    match notifications
                        .create_message_notification(&sender, &message)
                        .await
                    {
                        Some(id) => println!("Created {}", id),
                        None => {
                            return CommandExecutionResult::Error(
                                "Could not store the notification.".to_string(),
                            )
                        }
                    }
                }
                InnerCommand::List => {
                    let records = notifications.list_notifications().await;
                    if records.is_empty() {
                        println!("No notifications.");
                    }
                    for record in records.iter() {
                        println!(
                            "{} {} [{}] {}: {} ({})",
                            if record.read { " " } else { "*" },
                            record.id,
                            record.kind,
                            record.title,
                            record.body,
                            record.created_at.to_rfc3339()
                        );
                    }
                    println!("{} unread", notifications.unread_count());
                }
                InnerCommand::Read { id } => notifications.mark_as_read(&id).await,
                InnerCommand::ReadAll => notifications.mark_all_as_read().await,
                InnerCommand::Clear => notifications.clear_all().await,
                InnerCommand::Tap { id, action } => {
                    let records = notifications.list_notifications().await;
                    let Some(record) = records.iter().find(|r| r.id == id) else {
                        return CommandExecutionResult::Error(format!(
                            "No notification with id {}",
                            id
                        ));
                    };
                    notifications.mark_as_read(&record.id).await;
                    let outcome = session.context.handle_notification_response(
                        &record.id,
                        action,
                        &record.payload,
                    );
                    if outcome == DispatchOutcome::Ignored && action != NotificationAction::Decline
                    {
                        println!("Nothing to open for {}", id);
                    }
                }
                InnerCommand::Open { url } => {
                    if !session.urls.open_url(url) {
                        return CommandExecutionResult::Error(
                            "Deep link listener is not running.".to_string(),
                        );
                    }
                }
                InnerCommand::Settings => {
                    println!("{:#?}", session.context.settings());
                }
                InnerCommand::Set { setting, value } => {
                    let enabled = matches!(value, Switch::On);
                    let settings = apply_setting(session.context.settings(), setting, enabled);
                    if !session.context.update_settings(settings).await {
                        return CommandExecutionResult::Error(
                            "Could not save settings.".to_string(),
                        );
                    }
                }
                InnerCommand::Token { token } => match token {
                    Some(token) => {
                        if !session.context.save_push_token(&token).await {
                            return CommandExecutionResult::Error(
                                "Could not save push token.".to_string(),
                            );
                        }
                    }
                    None => match session.context.push_token().await {
                        Some(token) => println!("{}", token),
                        None => println!("No push token saved."),
                    },
                },
                InnerCommand::Where => {
                    println!("{}", session.path.display());
                }
                InnerCommand::Exit => return CommandExecutionResult::Exit,
            }
            notifications.settle().await;
        }

        Err(e) => {
            if e.print().is_err() {
                println!("{}", e);
            }
        }
    }
    CommandExecutionResult::Ok
}

#[derive(rustyline_derive::Hinter)]
struct MyHelper {
    commands_names: Vec<String>,
}

impl MyHelper {
    pub fn new() -> Self {
        let commands_names: Vec<String> = InnerCli::command()
            .get_subcommands()
            .map(|sc| sc.get_name().to_string())
            .collect();

        MyHelper { commands_names }
    }
}

impl Completer for MyHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        if line.contains(' ') {
            return Ok((0, Vec::with_capacity(0)));
        }
        let matches = self
            .commands_names
            .iter()
            .filter(|c| c.starts_with(line))
            .map(|c| c.to_string())
            .collect::<Vec<_>>();

        Ok((0, matches))
    }
}

impl Highlighter for MyHelper {}
impl Validator for MyHelper {}
impl Helper for MyHelper {}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let kv = Arc::new(FileKeyValueStore::new(cli_args.path.clone()));
    let context = DeviceContext::new(
        kv,
        Arc::new(LoggingLocalNotifier),
        Arc::new(LoggingNavigator),
    )
    .await;
    let urls = Arc::new(ChannelUrlSource::new(cli_args.launch_url));
    let subscription = context.start(urls.clone());
    let session = Session {
        context,
        urls,
        path: cli_args.path,
    };

    InnerCli::command().print_long_help()?;

    let config = Config::builder()
        .completion_type(CompletionType::List)
        .build();

    let mut rl = Editor::<MyHelper, FileHistory>::with_config(config)?;

    let helper = MyHelper::new();
    rl.set_helper(Some(helper));

    loop {
        let readline = rl.readline(PROMPT);

        match readline {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                match execute_command(line, &session).await {
                    CommandExecutionResult::Ok => {}
                    CommandExecutionResult::Exit => {
                        break;
                    }
                    CommandExecutionResult::Error(err) => {
                        eprintln!("Error: {}", err);
                        continue;
                    }
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("CTRL-D: exiting.");
                break;
            }
            Err(e) => {
                println!("Error: {:?}", e);
                break;
            }
        }
    }

    subscription.dispose().await;
    session.context.notifications().settle().await;
    Ok(())
}
