#[actix_web::main]
async fn main() -> std::io::Result<()> {
    sitalaris_server::run().await
}
