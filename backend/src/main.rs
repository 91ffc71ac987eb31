#[actix_web::main]
async fn main() -> std::io::Result<()> {
    backend::start_server().await
}
