//! revtag CLI binary entrypoint.

fn main() {
    if let Err(err) = revtag_cli::app::run() {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
