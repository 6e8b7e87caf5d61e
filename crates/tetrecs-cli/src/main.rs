mod command;
mod score_file;
mod util;

fn main() -> anyhow::Result<()> {
    command::run()
}
