mod cli;

use cli::app::SessionExpiredError;

fn main() {
    if let Err(e) = cli::run() {
        if e.downcast_ref::<SessionExpiredError>().is_some() {
            eprintln!("{e}");
            std::process::exit(2);
        }
        eprintln!("{}", cli::render::error_report(&e));
        std::process::exit(1);
    }
}
