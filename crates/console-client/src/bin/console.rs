use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use console_core::log::shared_buffer;
use console_core::{
    CommandDispatcher, ConnectionManager, ConnectionState, SharedLogBuffer, StatusTone,
    StreamEvent,
};
use console_client::{Endpoints, HttpControl, WsStream};

#[derive(Parser, Debug)]
#[clap(name = "console")]
#[clap(about = "Operator console for a remote managed process", long_about = None)]
struct Args {
    /// Host of the remote console, e.g. 127.0.0.1:8080; falls back to
    /// CONSOLE_HOST / CONSOLE_SECURE when omitted
    host: Option<String>,

    /// Use wss/https instead of ws/http
    #[clap(long)]
    secure: bool,
}

fn print_new_entries(logs: &SharedLogBuffer, printed: &mut usize) {
    let buffer = logs.lock().unwrap();
    // A reset may have shrunk the buffer under us.
    if *printed > buffer.len() {
        *printed = 0;
    }
    for entry in &buffer.entries()[*printed..] {
        println!("{}", entry);
    }
    *printed = buffer.len();
}

fn tone_label(state: ConnectionState) -> &'static str {
    match state.tone() {
        StatusTone::Healthy => "●",
        StatusTone::Transitional => "◐",
        StatusTone::Down => "○",
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let endpoints = match &args.host {
        Some(host) => Endpoints::from_host(host, args.secure),
        None => Endpoints::from_env(),
    };

    let logs = shared_buffer();
    let mut manager = ConnectionManager::new(WsStream, endpoints.ws_url.clone(), logs.clone());
    let dispatcher = CommandDispatcher::new(HttpControl::new(endpoints.api_url.clone())?, logs.clone());

    println!("Operator console for {}", endpoints.ws_url);
    println!("Commands: /connect /disconnect /start /stop /quit, anything else is sent as-is");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    let mut events: Option<mpsc::Receiver<StreamEvent>> = None;
    let mut printed = 0usize;

    loop {
        tokio::select! {
            event = async {
                match events.as_mut() {
                    Some(rx) => rx.recv().await,
                    None => std::future::pending().await,
                }
            } => {
                match event {
                    Some(event) => manager.handle_stream_event(event).await,
                    None => events = None,
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "" => {}
                    "/quit" => break,
                    "/connect" => {
                        if let Some(rx) = manager.connect().await {
                            events = Some(rx);
                        }
                    }
                    "/disconnect" => manager.disconnect().await,
                    // Command eligibility is a facade-side guard: the two
                    // channels are independent, but commands only mean
                    // something while the stream is up.
                    "/start" if manager.state() == ConnectionState::Connected => {
                        dispatcher.start().await;
                    }
                    "/stop" if manager.state() == ConnectionState::Connected => {
                        dispatcher.stop().await;
                    }
                    text if manager.state() == ConnectionState::Connected => {
                        dispatcher.send_command(text).await;
                    }
                    _ => println!("(not connected; /connect first)"),
                }
            }
        }

        print_new_entries(&logs, &mut printed);
        println!("{} {}", tone_label(manager.state()), manager.state());
    }

    Ok(())
}
