use chess_rules::console::ConsoleHandler;
use log::info;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    info!("starting chess console");

    let mut console = ConsoleHandler::new();
    console.run()
}
