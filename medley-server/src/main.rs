use medley_library::Config;
use medley_server::{init_logger, run_server};

#[tokio::main]
async fn main() {
    init_logger();
    run_server(Config::default()).await;
}
