#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tabula_lib::run().await
}
