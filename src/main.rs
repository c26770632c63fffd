use tracing::error;

#[tokio::main]
async fn main() {
    if let Err(error) = course_market::run().await {
        error!("Server exited with error: {}", error);
        std::process::exit(1);
    }
}
