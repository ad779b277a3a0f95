fn main() {
    if let Err(e) = uiforge_lib::run() {
        tracing::error!(error = %e, "uiforge failed");
        eprintln!("uiforge: {e}");
        std::process::exit(1);
    }
}
