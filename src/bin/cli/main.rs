//! remotecmd - interactive client for the remotecmd daemon
//!
//! Reads commands from the terminal, sends them as frames over TCP and prints
//! the daemon's responses. Screen images received with `send photo` are saved
//! to disk.

use async_std::io as async_io;
use async_std::net::TcpStream;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Local;
use clap::Parser;
use futures::io::BufReader;
use remotecmd::{CommandKind, DispatchOutcome, Frame, FrameCodec, ResponseEnvelope};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// remotecmd - send commands to a remotecmd daemon
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Daemon address
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Daemon TCP port
    #[arg(short, long, default_value_t = 1729)]
    port: u16,

    /// Directory where received screen images are saved
    #[arg(long, default_value = ".")]
    photo_dir: PathBuf,

    /// Log file path
    #[arg(long, default_value = "client.log")]
    log_file: PathBuf,
}

/// What to show the user for a response
#[derive(Debug, PartialEq, Eq)]
enum Report {
    Failed,
    Succeeded,
    Listing(String),
    Photo(Vec<u8>),
}

#[async_std::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    let _log_guard = setup_logging(&cli.log_file)?;

    let stream = match TcpStream::connect((cli.host.as_str(), cli.port)).await {
        Ok(stream) => stream,
        Err(e) => {
            error!("Failed to connect to {}:{}: {}", cli.host, cli.port, e);
            eprintln!("🔴 Connection failed: {}", e);
            std::process::exit(1);
        }
    };
    info!("Connected to {}:{}", cli.host, cli.port);

    let mut client = RemoteClient::new(stream, cli.photo_dir);
    client.run().await
}

/// Log to a file only; the terminal belongs to the interactive prompt
fn setup_logging(path: &Path) -> Result<WorkerGuard, BoxError> {
    let file = OpenOptions::new().append(true).create(true).open(path)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(env_filter)
        .try_init()?;

    Ok(guard)
}

struct RemoteClient {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
    codec: FrameCodec,
    photo_dir: PathBuf,
}

impl RemoteClient {
    fn new(stream: TcpStream, photo_dir: PathBuf) -> Self {
        Self {
            reader: BufReader::new(stream.clone()),
            writer: stream,
            codec: FrameCodec::default(),
            photo_dir,
        }
    }

    /// Run the main interactive command loop
    async fn run(&mut self) -> Result<(), BoxError> {
        show_menu();
        let stdin = async_io::stdin();

        loop {
            print!("[{}]> ", get_hostname());
            io::stdout().flush()?;

            let mut input = String::new();
            if stdin.read_line(&mut input).await? == 0 {
                // End of input behaves like exit
                self.send(CommandKind::Exit, "").await?;
                return Ok(());
            }

            let line = input.trim();
            if line.is_empty() {
                continue;
            }

            let Some((kind, args)) = CommandKind::parse_input(line) else {
                info!("User entered invalid command: {}", line);
                println!("Unknown command, choose one of the listed commands");
                continue;
            };

            if let Err(e) = kind.arity().split(args) {
                println!("Invalid arguments for {}: {}", kind, e);
                continue;
            }

            let Some(response) = self.send(kind, args).await? else {
                info!("Exit sent, closing connection");
                return Ok(());
            };

            match report(kind, response) {
                Report::Failed => println!("Operation {} failed", kind),
                Report::Succeeded => println!("Operation {} was successful", kind),
                Report::Listing(listing) => println!("{}", listing),
                Report::Photo(bytes) => match self.save_photo(&bytes) {
                    Ok(path) => println!("Screen image saved to {}", path.display()),
                    Err(e) => {
                        error!("Failed to save screen image: {}", e);
                        println!("Could not save the screen image: {}", e);
                    }
                },
            }
        }
    }

    /// Send one command; returns the response unless the command was `exit`
    async fn send(
        &mut self,
        kind: CommandKind,
        args: &str,
    ) -> Result<Option<Frame>, remotecmd::FrameError> {
        let request = Frame::new(kind.id(), args)?;
        self.codec.write(&mut self.writer, &request).await?;

        if kind == CommandKind::Exit {
            return Ok(None);
        }

        let response = self.codec.decode(&mut self.reader).await?;
        if response.kind() != kind.id() {
            warn!("Response type {} does not match request {}", response.kind(), kind.id());
        }
        Ok(Some(response))
    }

    fn save_photo(&self, bytes: &[u8]) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.photo_dir)?;
        let path = self.photo_dir.join(photo_file_name(Local::now()));
        fs::write(&path, bytes)?;
        info!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}

/// Decide how a response is presented
fn report(kind: CommandKind, response: Frame) -> Report {
    let (_, outcome) = ResponseEnvelope::decode(response);
    let payload = match outcome {
        DispatchOutcome::Failure => return Report::Failed,
        DispatchOutcome::Success(payload) => payload,
    };

    match kind {
        CommandKind::Dir => Report::Listing(String::from_utf8_lossy(&payload).into_owned()),
        CommandKind::SendPhoto => match STANDARD.decode(&payload) {
            Ok(bytes) => Report::Photo(bytes),
            Err(e) => {
                warn!("Screen image is not valid base64: {}", e);
                Report::Failed
            }
        },
        _ => Report::Succeeded,
    }
}

fn photo_file_name(now: chrono::DateTime<Local>) -> String {
    format!("photo-{}.jpg", now.format("%Y.%m.%d-%Hh%M.%S"))
}

fn show_menu() {
    println!("Choose one of the following commands:");
    for kind in CommandKind::ALL {
        let usage = match kind {
            CommandKind::Copy => format!("{} <source> <destination>", kind),
            CommandKind::Dir | CommandKind::Delete | CommandKind::Execute => {
                format!("{} <path>", kind)
            }
            _ => kind.to_string(),
        };
        println!("  {}", usage);
    }
    println!("{}", "─".repeat(80));
}

/// Get the hostname of the current machine
fn get_hostname() -> String {
    match hostname::get() {
        Ok(name) => name.to_string_lossy().to_string(),
        Err(_) => "localhost".to_string(),
    }
}
