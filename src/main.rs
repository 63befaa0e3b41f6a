#[tokio::main]
async fn main() {
    fieldlight_lib::run().await
}
