fn main() {
    if let Err(err) = schema_discovery::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
