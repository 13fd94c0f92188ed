use miette::Result;

fn main() -> Result<()> {
    d1_sync::cli::run()
}
