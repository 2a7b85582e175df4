use std::io::{self, Write};

use anyhow::Result;
use parlor_client::{
    ChatHandle, ChatHandler, ChatMessage, Client, Composer, Credentials,
    DEFAULT_LOGIN_URL, DEFAULT_SERVER_URL, Session, Timeline, load_image,
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

struct CliChat {
    username: String,
    timeline: Timeline,
}

impl CliChat {
    fn notice(&mut self, text: String) {
        println!("* {}", text);
        self.timeline.push_notice(text);
    }

    fn show(&mut self, message: ChatMessage) {
        if message.is_image() {
            let src = message.content();
            println!(
                "[{}] {} sent an image: {}...",
                message.time_label(),
                message.sender_label(),
                &src[..src.len().min(32)]
            );
        } else {
            println!(
                "[{}] {}: {}",
                message.time_label(),
                message.sender_label(),
                message.content()
            );
        }
        self.timeline.push_message(message);
    }
}

impl ChatHandler for CliChat {
    async fn on_connected(&mut self) {
        let username = self.username.clone();
        self.notice(format!("You joined the chat as {}.", username));
    }

    async fn on_disconnected(&mut self) {
        self.notice("You have been disconnected.".to_string());
    }

    async fn on_connect_error(&mut self, _detail: &str) {
        self.notice("Could not connect to chat server. Please check server.".to_string());
    }

    async fn on_message(&mut self, message: &ChatMessage) {
        self.show(message.clone());
    }

    async fn on_history(&mut self, messages: &[ChatMessage]) {
        for message in messages {
            self.show(message.clone());
        }
    }

    async fn on_system_notice(&mut self, notice: &str) {
        self.notice(notice.to_string());
    }
}

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    Ok(lines.next_line().await?.unwrap_or_default())
}

/// Prompt for credentials until login succeeds. Enter moves from the
/// username prompt to the password prompt, then submits.
async fn login(session: &Session, lines: &mut Lines<BufReader<Stdin>>) -> Result<String> {
    loop {
        let username = prompt(lines, "Username").await?;
        let password = prompt(lines, "Password").await?;

        match session
            .login(DEFAULT_LOGIN_URL, &Credentials::new(username, password))
            .await
        {
            Ok(confirmed) => return Ok(confirmed),
            Err(e) => println!("{}", e),
        }
    }
}

async fn handle_input(line: &str, handle: &ChatHandle, composer: &mut Composer) -> bool {
    if let Some(rest) = line.strip_prefix('/') {
        let parts: Vec<&str> = rest.splitn(2, ' ').collect();
        let cmd = parts[0];
        let arg = parts.get(1).map(|s| s.trim());

        match cmd {
            "image" => {
                if let Some(path) = arg {
                    match load_image(std::path::Path::new(path)).await {
                        Ok(data_url) => {
                            if let Err(e) = handle.send_image(&data_url) {
                                println!("Error: {}", e);
                            }
                        }
                        Err(e) => println!("{}", e),
                    }
                } else {
                    println!("Usage: /image <path>");
                }
            }
            "quit" | "exit" => return false,
            _ => println!("Unknown command: /{}. Commands: /image <path>, /quit", cmd),
        }
        return true;
    }

    composer.set(line);
    if let Some(text) = composer.submit() {
        if let Err(e) = handle.send_text(&text) {
            println!("Error: {}", e);
        }
    }
    true
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let session = Session::new();
    let username = login(&session, &mut lines).await?;

    let (handle, mut receiver) = match Client::connect(DEFAULT_SERVER_URL, &session).await {
        Ok(pair) => pair,
        Err(_) => {
            println!("Could not connect to chat server. Please check server.");
            return Ok(());
        }
    };

    tokio::spawn(async move {
        let mut chat = CliChat {
            username,
            timeline: Timeline::new(),
        };
        if let Err(e) = receiver.run(&mut chat).await {
            println!("Receive error: {}", e);
        }
    });

    let mut composer = Composer::new();
    while let Some(line) = lines.next_line().await? {
        if !handle_input(&line, &handle, &mut composer).await {
            break;
        }
    }

    Ok(())
}
