use boardgate::cli::run_from_env;

fn main() {
    env_logger::init();
    if let Err(error) = run_from_env() {
        eprintln!("{error}");
        std::process::exit(1);
    }
}
