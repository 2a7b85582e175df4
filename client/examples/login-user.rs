use anyhow::Result;
use parlor_client::{Client, Credentials, DEFAULT_LOGIN_URL, DEFAULT_SERVER_URL, Session};

#[tokio::main]
async fn main() -> Result<()> {
    let username =
        std::env::var("PARLOR_USERNAME").expect("Set PARLOR_USERNAME environment variable");
    let password =
        std::env::var("PARLOR_PASSWORD").expect("Set PARLOR_PASSWORD environment variable");

    let session = Session::new();
    let confirmed = session
        .login(DEFAULT_LOGIN_URL, &Credentials::new(username, password))
        .await?;
    println!("Logged in as: {}", confirmed);

    let (_handle, _receiver) = Client::connect(DEFAULT_SERVER_URL, &session).await?;
    println!("Channel connected.");

    Ok(())
}
