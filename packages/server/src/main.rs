#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Development API server binary.
//!
//! Pass `--interactive` to be prompted for the bind address, port and
//! fixture before the server starts.

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    if std::env::args().any(|arg| arg == "--interactive") {
        munifor_server::interactive::run().await?;
    } else {
        munifor_server::run_server().await?;
    }
    Ok(())
}
