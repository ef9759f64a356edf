fn main() {
    #[cfg(feature = "cli")]
    oxiups::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("oxiups: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
