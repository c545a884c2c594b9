fn main() {
    #[cfg(feature = "cli")]
    revdelta::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("revdelta: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
