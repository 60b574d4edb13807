#[tokio::main]
async fn main() {
    jokebook::start_server().await;
}
